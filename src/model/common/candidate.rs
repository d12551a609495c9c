use std::fmt::{self, Display, Formatter};

use mongodb::bson::{to_bson, Bson};
use serde::{Deserialize, Serialize};

/// States in the candidate nomination lifecycle.
/// Only `Approved` candidates may appear on a ballot or receive votes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    /// Freshly nominated, paperwork incomplete.
    Pending,
    /// Nomination submitted for administrative review.
    Submitted,
    /// Cleared to stand.
    Approved,
    /// Refused, with an optional reason on the candidate record.
    Rejected,
}

impl ApprovalStatus {
    /// The wire/database form of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "PENDING",
            ApprovalStatus::Submitted => "SUBMITTED",
            ApprovalStatus::Approved => "APPROVED",
            ApprovalStatus::Rejected => "REJECTED",
        }
    }
}

impl Display for ApprovalStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ApprovalStatus> for Bson {
    fn from(status: ApprovalStatus) -> Self {
        to_bson(&status).expect("Serialisation is infallible")
    }
}
