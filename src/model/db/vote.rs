use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::bson::{doc, serde_helpers::chrono_datetime_as_bson_datetime};
use mongodb::error::Error as DbError;
use rocket::futures::TryStreamExt;
use rocket::request::{self, FromRequest, Request};
use serde::{Deserialize, Serialize};

use crate::model::{
    common::{ElectionType, Position},
    mongodb::{Coll, Id},
};

use super::candidate::Candidate;

/// Where a vote submission came from, for the audit trail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionAudit {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for SubmissionAudit {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        request::Outcome::Success(Self {
            ip: req.client_ip().map(|ip| ip.to_string()),
            user_agent: req.headers().get_one("User-Agent").map(str::to_string),
        })
    }
}

/// Core vote data, as stored in the database.
///
/// One row per (voter, election, position), enforced by a unique index; the
/// election type discriminates which contest the single candidate reference
/// belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCore {
    /// Who cast this vote.
    pub voter_id: Id,
    /// Which election it was cast in.
    pub election_type: ElectionType,
    /// The chosen candidate (possibly a NOTA pseudo-candidate).
    pub candidate_id: Id,
    /// The position the candidate stood for, denormalised from the
    /// candidate so the one-vote-per-position constraint is indexable.
    pub position: Position,
    /// The zone the vote was cast in.
    pub zone_id: Id,
    /// When the vote was cast.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub cast_at: DateTime<Utc>,
    /// Submission audit trail.
    pub audit: SubmissionAudit,
}

impl VoteCore {
    /// A vote by the given voter for the given candidate, cast now.
    pub fn new(
        voter_id: Id,
        election_type: ElectionType,
        candidate: &Candidate,
        audit: SubmissionAudit,
    ) -> Self {
        Self {
            voter_id,
            election_type,
            candidate_id: candidate.id,
            position: candidate.position.clone(),
            zone_id: candidate.zone_id,
            cast_at: Utc::now(),
            audit,
        }
    }
}

/// A vote without an ID.
pub type NewVote = VoteCore;

/// A vote from the database, with its unique ID.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub vote: VoteCore,
}

impl Vote {
    /// All votes a voter has cast in an election.
    pub async fn for_voter(
        votes: &Coll<Vote>,
        voter_id: Id,
        election_type: ElectionType,
    ) -> Result<Vec<Vote>, DbError> {
        votes
            .find(
                doc! { "voter_id": voter_id, "election_type": election_type },
                None,
            )
            .await?
            .try_collect()
            .await
    }
}

impl Deref for Vote {
    type Target = VoteCore;

    fn deref(&self) -> &Self::Target {
        &self.vote
    }
}

impl DerefMut for Vote {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.vote
    }
}
