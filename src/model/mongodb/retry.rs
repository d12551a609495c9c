use std::future::Future;
use std::time::Duration;

use mongodb::error::Error as DbError;
use rocket::tokio::time::sleep;

use super::errors::is_transient_error;

/// Maximum attempts for a storage operation wrapped in [`with_backoff`].
pub const MAX_ATTEMPTS: u32 = 3;

/// Delay before the first retry; doubles on each subsequent one.
const BASE_DELAY: Duration = Duration::from_millis(50);

/// Run a storage operation, retrying transient infrastructure failures with
/// exponential backoff. Only the vote ledger's commit and its failure-prone
/// read paths go through here; eligibility failures and uniqueness
/// violations are returned on the first attempt, untouched.
pub async fn with_backoff<T, F, Fut>(op_name: &str, mut op: F) -> Result<T, DbError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < MAX_ATTEMPTS && is_transient_error(&err) => {
                let delay = BASE_DELAY * 2u32.pow(attempt - 1);
                warn!(
                    "{op_name}: transient storage error on attempt {attempt}/{MAX_ATTEMPTS}, \
retrying in {delay:?}: {err}"
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
