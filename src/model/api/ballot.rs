use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{
    common::{ElectionType, Position},
    db::candidate::Candidate,
    mongodb::Id,
};

/// One candidate row on a ballot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotEntry {
    pub id: Id,
    pub name: String,
    pub manifesto: Option<String>,
    pub nota: bool,
}

impl From<&Candidate> for BallotEntry {
    fn from(candidate: &Candidate) -> Self {
        Self {
            id: candidate.id,
            name: candidate.name.clone(),
            manifesto: candidate.manifesto.clone(),
            nota: candidate.nota,
        }
    }
}

/// The candidates contesting one position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionContest {
    pub position: Position,
    pub candidates: Vec<BallotEntry>,
}

/// Everything a voter needs in order to vote in one election: the approved
/// candidates of their zone, grouped by position.
///
/// Positions are never suppressed; a contest whose only entry is NOTA is
/// still presented. A voter who has already voted still receives the ballot
/// for display, flagged accordingly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotView {
    pub election_type: ElectionType,
    pub zone_id: Id,
    pub zone_code: String,
    pub zone_name: String,
    pub already_voted: bool,
    pub contests: Vec<PositionContest>,
}

/// A full ballot submission: the chosen candidate for every position the
/// voter is voting on, submitted as one atomic unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteSubmission {
    pub selections: HashMap<Position, Id>,
}
