//! DB-compatible (e.g. de/serialisable) types.
//!
//! The types in this module are serialised in a DB-friendly way: IDs and
//! datetimes use MongoDB's own formats, and every document follows the
//! core/ID-wrapped pattern so the same shape serves inserts and reads.

pub mod candidate;
pub mod election;
pub mod vote;
pub mod voter;
pub mod zone;
