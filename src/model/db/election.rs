use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::bson::{doc, serde_helpers::chrono_datetime_as_bson_datetime};
use mongodb::error::Error as DbError;
use mongodb::Database;
use serde::{Deserialize, Serialize};

use crate::model::{
    common::{ElectionStatus, ElectionType},
    mongodb::{is_duplicate_key_error, Coll, Id},
};

/// Core election data, as stored in the database.
///
/// There is exactly one election document per [`ElectionType`], enforced by a
/// unique index and seeded at startup by [`ensure_elections_exist`].
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct ElectionCore {
    /// Which of the organisation's contests this is.
    pub election_type: ElectionType,
    /// Lifecycle status; the sole authority on whether voting is open.
    pub status: ElectionStatus,
    /// Advertised start time. Informational only, never enforced.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub start_time: DateTime<Utc>,
    /// Advertised end time. Informational only, never enforced.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub end_time: DateTime<Utc>,
    /// Youngest age allowed to vote, if bounded.
    pub voter_min_age: Option<u32>,
    /// Oldest age allowed to vote, if bounded.
    pub voter_max_age: Option<u32>,
    /// Youngest age allowed to stand, if bounded.
    pub candidate_min_age: Option<u32>,
    /// Oldest age allowed to stand, if bounded.
    pub candidate_max_age: Option<u32>,
    /// Residency requirement for voters, recorded but not enforced here.
    pub voter_jurisdiction: Option<String>,
    /// Residency requirement for candidates, recorded but not enforced here.
    pub candidate_jurisdiction: Option<String>,
}

impl ElectionCore {
    /// Create a new election in the `Upcoming` state with no eligibility
    /// bounds.
    pub fn new(election_type: ElectionType) -> Self {
        let now = Utc::now();
        Self {
            election_type,
            status: ElectionStatus::Upcoming,
            start_time: now,
            end_time: now,
            voter_min_age: None,
            voter_max_age: None,
            candidate_min_age: None,
            candidate_max_age: None,
            voter_jurisdiction: None,
            candidate_jurisdiction: None,
        }
    }

    /// Whether votes may currently be cast in this election.
    pub fn is_voting_open(&self) -> bool {
        self.status == ElectionStatus::Active
    }

    /// Whether a voter of the given age may vote in this election.
    ///
    /// An unknown age fails any configured bound.
    pub fn voter_age_eligible(&self, age: Option<u32>) -> bool {
        if self.voter_min_age.is_none() && self.voter_max_age.is_none() {
            return true;
        }
        match age {
            Some(age) => {
                self.voter_min_age.map_or(true, |min| age >= min)
                    && self.voter_max_age.map_or(true, |max| age <= max)
            }
            None => false,
        }
    }
}

/// An election without an ID.
pub type NewElection = ElectionCore;

/// An election from the database, with its unique ID.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Election {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub election: ElectionCore,
}

impl Election {
    /// Look up the election of the given type.
    pub async fn by_type(
        elections: &Coll<Election>,
        election_type: ElectionType,
    ) -> Result<Option<Election>, DbError> {
        elections
            .find_one(doc! { "election_type": election_type }, None)
            .await
    }

    /// Set the status of the election of the given type.
    ///
    /// Idempotent; reapplying the current status is a successful no-op.
    /// Returns false if no such election exists.
    pub async fn set_status(
        elections: &Coll<Election>,
        election_type: ElectionType,
        status: ElectionStatus,
    ) -> Result<bool, DbError> {
        let result = elections
            .update_one(
                doc! { "election_type": election_type },
                doc! { "$set": { "status": status } },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }
}

impl Deref for Election {
    type Target = ElectionCore;

    fn deref(&self) -> &Self::Target {
        &self.election
    }
}

impl DerefMut for Election {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.election
    }
}

/// Ensure that one election document exists per election type.
///
/// Seeded elections start `Upcoming`; losing a creation race to a concurrent
/// instance is fine. This operation is idempotent.
pub async fn ensure_elections_exist(db: &Database) -> Result<(), DbError> {
    debug!("Ensuring election documents exist");
    let elections = Coll::<NewElection>::from_db(db);
    for election_type in ElectionType::ALL {
        match elections.insert_one(NewElection::new(election_type), None).await {
            Ok(_) => info!("Seeded {} election", election_type),
            Err(err) if is_duplicate_key_error(&err) => {}
            Err(err) => return Err(err),
        }
    }
    Ok(())
}
