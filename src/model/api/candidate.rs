use serde::{Deserialize, Serialize};

use crate::model::{
    common::{ApprovalStatus, Position},
    db::candidate::{Candidate, NewCandidate},
    mongodb::Id,
};

/// A nomination for a position in a zone, as submitted by an administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NominationSpec {
    pub name: String,
    pub position: Position,
    pub manifesto: Option<String>,
}

impl NominationSpec {
    pub fn into_candidate(self, zone_id: Id) -> NewCandidate {
        NewCandidate::nomination(self.name, zone_id, self.position, self.manifesto)
    }
}

/// A candidate as returned by administrative reads and rulings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateView {
    pub id: Id,
    pub name: String,
    pub manifesto: Option<String>,
    pub zone_id: Id,
    pub position: Position,
    pub status: ApprovalStatus,
    pub rejection_reason: Option<String>,
    pub nota: bool,
}

impl From<&Candidate> for CandidateView {
    fn from(candidate: &Candidate) -> Self {
        Self {
            id: candidate.id,
            name: candidate.name.clone(),
            manifesto: candidate.manifesto.clone(),
            zone_id: candidate.zone_id,
            position: candidate.position.clone(),
            status: candidate.status,
            rejection_reason: candidate.rejection_reason.clone(),
            nota: candidate.nota,
        }
    }
}

/// An administrative ruling on a nomination.
///
/// Only `Approved` and `Rejected` are acceptable rulings; the boundary
/// rejects the intermediate lifecycle states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalDecision {
    pub status: ApprovalStatus,
    pub reason: Option<String>,
}
