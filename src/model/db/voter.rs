use std::collections::HashSet;
use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::bson::{doc, Regex};
use mongodb::error::Error as DbError;
use serde::{Deserialize, Serialize};

use crate::model::{
    api::Phone,
    common::ElectionType,
    mongodb::{serde_opt_datetime, Coll, Id},
};

/// Core voter data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterCore {
    /// External voter-roll identifier.
    pub roll_number: String,
    /// Normalised phone number; the voter's lookup handle.
    pub phone: Phone,
    /// Age in years as registered; absent on legacy rows.
    pub age: Option<u32>,
    /// Free-form home region.
    pub region: Option<String>,
    /// Default zone relation, the fallback for any election.
    pub primary_zone: Option<Id>,
    /// Dedicated zone relation for the Karobari members election.
    pub karobari_zone: Option<Id>,
    /// Dedicated zone relation for the trustees election.
    pub trustee_zone: Option<Id>,
    /// Dedicated zone relation for the Yuva Pankh election.
    pub yuva_pankh_zone: Option<Id>,
    /// Inactive voters receive no ballots and cast no votes.
    pub active: bool,
    /// The elections this voter has completed voting in.
    #[serde(default)]
    pub voted: HashSet<ElectionType>,
    /// Last successful login, maintained by the surrounding application.
    #[serde(default, with = "serde_opt_datetime")]
    pub last_login: Option<DateTime<Utc>>,
}

impl VoterCore {
    /// Create a new active voter with no zone relations.
    pub fn new(roll_number: String, phone: Phone) -> Self {
        Self {
            roll_number,
            phone,
            age: None,
            region: None,
            primary_zone: None,
            karobari_zone: None,
            trustee_zone: None,
            yuva_pankh_zone: None,
            active: true,
            voted: HashSet::new(),
            last_login: None,
        }
    }

    /// The zone relation used for the given election type.
    ///
    /// A voter without a dedicated relation falls back to their primary
    /// zone.
    pub fn zone_id_for(&self, election_type: ElectionType) -> Option<Id> {
        let dedicated = match election_type {
            ElectionType::KarobariMembers => self.karobari_zone,
            ElectionType::Trustees => self.trustee_zone,
            ElectionType::YuvaPankh => self.yuva_pankh_zone,
        };
        dedicated.or(self.primary_zone)
    }

    /// Whether this voter has completed voting in the given election.
    pub fn has_voted(&self, election_type: ElectionType) -> bool {
        self.voted.contains(&election_type)
    }
}

/// A voter without an ID.
pub type NewVoter = VoterCore;

/// A voter from the database, with its unique ID.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub voter: VoterCore,
}

impl Voter {
    /// Look up a voter by ID.
    pub async fn by_id(voters: &Coll<Voter>, id: Id) -> Result<Option<Voter>, DbError> {
        voters.find_one(id.as_doc(), None).await
    }

    /// Point lookup by phone.
    ///
    /// Tries the canonical form first, then falls back to matching the last
    /// ten digits, so rows imported with `+91` or trunk-`0` prefixes still
    /// resolve.
    pub async fn by_phone(voters: &Coll<Voter>, phone: &Phone) -> Result<Option<Voter>, DbError> {
        if let Some(voter) = voters
            .find_one(doc! { "phone": phone.canonical() }, None)
            .await?
        {
            return Ok(Some(voter));
        }
        let suffix_match = Regex {
            pattern: format!("{}$", phone.suffix()),
            options: String::new(),
        };
        voters.find_one(doc! { "phone": suffix_match }, None).await
    }
}

impl Deref for Voter {
    type Target = VoterCore;

    fn deref(&self) -> &Self::Target {
        &self.voter
    }
}

impl DerefMut for Voter {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.voter
    }
}
