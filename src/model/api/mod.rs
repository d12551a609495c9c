//! API-compatible (e.g. de/serialisable) types.
//!
//! The types in this module cross the HTTP boundary as JSON; anything
//! MongoDB-specific stays in [`super::db`].

mod ballot;
mod candidate;
mod election;
mod phone;
mod voter;
mod zone;

pub use ballot::{BallotEntry, BallotView, PositionContest, VoteSubmission};
pub use candidate::{ApprovalDecision, CandidateView, NominationSpec};
pub use election::ElectionView;
pub use phone::Phone;
pub use voter::{DashboardView, DashboardZone, VoterView};
pub use zone::{ZoneSpec, ZoneView};
