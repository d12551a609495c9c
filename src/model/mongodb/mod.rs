mod bson;
mod collection;
mod errors;
mod retry;

pub use bson::{serde_opt_datetime, Id};
pub use collection::{ensure_indexes_exist, Coll, MongoCollection};
pub use errors::{is_duplicate_key_error, is_transient_error, DUPLICATE_KEY};
pub use retry::{with_backoff, MAX_ATTEMPTS};
