use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    common::{ElectionStatus, ElectionType, Position},
    db::voter::Voter,
    mongodb::Id,
};

/// A voter as returned by directory lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterView {
    pub id: Id,
    pub roll_number: String,
    pub phone: String,
    pub age: Option<u32>,
    pub region: Option<String>,
    pub active: bool,
    /// Elections this voter has completed, in stable order.
    pub voted: Vec<ElectionType>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<&Voter> for VoterView {
    fn from(voter: &Voter) -> Self {
        let mut voted: Vec<_> = voter.voted.iter().copied().collect();
        voted.sort();
        Self {
            id: voter.id,
            roll_number: voter.roll_number.clone(),
            phone: voter.phone.canonical(),
            age: voter.age,
            region: voter.region.clone(),
            active: voter.active,
            voted,
            last_login: voter.last_login,
        }
    }
}

/// The zone summary shown on a voter's dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardZone {
    pub id: Id,
    pub code: String,
    pub name: String,
    pub open_for_voting: bool,
}

/// The read-only per-election summary shown on a voter's dashboard.
///
/// Assembled from directory and ledger state, and allowed to be slightly
/// stale: the dashboard endpoint serves it from a TTL cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardView {
    pub election_type: ElectionType,
    pub status: ElectionStatus,
    pub voting_open: bool,
    pub zone: Option<DashboardZone>,
    pub has_voted: bool,
    /// The positions the voter has cast votes for, in stable order.
    pub positions_voted: Vec<Position>,
}
