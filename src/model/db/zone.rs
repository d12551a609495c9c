use std::ops::{Deref, DerefMut};

use mongodb::bson::doc;
use mongodb::error::Error as DbError;
use mongodb::options::FindOptions;
use rocket::futures::TryStreamExt;
use serde::{Deserialize, Serialize};

use crate::model::{
    common::ElectionType,
    mongodb::{Coll, Id},
};

use super::election::ElectionCore;

/// Core zone data, as stored in the database.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct ZoneCore {
    /// Short code, unique within an election type.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Optional display name in the community's own language.
    pub local_name: Option<String>,
    /// The election this zone belongs to.
    pub election_type: ElectionType,
    /// Number of seats contested in this zone.
    pub seat_count: u32,
    /// Inactive zones are hidden from listings and refuse votes.
    pub active: bool,
    /// Administrative voting window. A closed zone refuses votes even while
    /// its election is active.
    pub open_for_voting: bool,
}

impl ZoneCore {
    /// Create a new zone, active and open for voting.
    pub fn new(code: String, name: String, election_type: ElectionType, seat_count: u32) -> Self {
        Self {
            code,
            name,
            local_name: None,
            election_type,
            seat_count,
            active: true,
            open_for_voting: true,
        }
    }

    /// Whether this zone currently accepts votes.
    ///
    /// The owning election's status always dominates the per-zone flags; a
    /// zone can never accept votes for an election that is not active.
    pub fn accepts_votes(&self, election: &ElectionCore) -> bool {
        election.is_voting_open() && self.active && self.open_for_voting
    }
}

/// A zone without an ID.
pub type NewZone = ZoneCore;

/// A zone from the database, with its unique ID.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub zone: ZoneCore,
}

impl Zone {
    /// Look up a zone by its code within an election.
    pub async fn by_code(
        zones: &Coll<Zone>,
        code: &str,
        election_type: ElectionType,
    ) -> Result<Option<Zone>, DbError> {
        zones
            .find_one(doc! { "code": code, "election_type": election_type }, None)
            .await
    }

    /// List the zones of an election in code order, optionally restricted
    /// to active ones.
    pub async fn list(
        zones: &Coll<Zone>,
        election_type: ElectionType,
        active_only: bool,
    ) -> Result<Vec<Zone>, DbError> {
        let mut filter = doc! { "election_type": election_type };
        if active_only {
            filter.insert("active", true);
        }
        let options = FindOptions::builder().sort(doc! { "code": 1 }).build();
        zones.find(filter, options).await?.try_collect().await
    }
}

impl Deref for Zone {
    type Target = ZoneCore;

    fn deref(&self) -> &Self::Target {
        &self.zone
    }
}

impl DerefMut for Zone {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.zone
    }
}
