use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    common::{ElectionStatus, ElectionType},
    db::election::Election,
};

/// An election as returned by registry reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionView {
    pub election_type: ElectionType,
    pub status: ElectionStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub voter_min_age: Option<u32>,
    pub voter_max_age: Option<u32>,
    pub candidate_min_age: Option<u32>,
    pub candidate_max_age: Option<u32>,
    pub voter_jurisdiction: Option<String>,
    pub candidate_jurisdiction: Option<String>,
}

impl From<&Election> for ElectionView {
    fn from(election: &Election) -> Self {
        Self {
            election_type: election.election_type,
            status: election.status,
            start_time: election.start_time,
            end_time: election.end_time,
            voter_min_age: election.voter_min_age,
            voter_max_age: election.voter_max_age,
            candidate_min_age: election.candidate_min_age,
            candidate_max_age: election.candidate_max_age,
            voter_jurisdiction: election.voter_jurisdiction.clone(),
            candidate_jurisdiction: election.candidate_jurisdiction.clone(),
        }
    }
}
