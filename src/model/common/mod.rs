mod candidate;
mod election;
mod position;

pub use candidate::ApprovalStatus;
pub use election::{ElectionStatus, ElectionType, UnknownElectionType};
pub use position::{Position, PositionScope};
