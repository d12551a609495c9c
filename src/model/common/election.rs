use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use mongodb::bson::{to_bson, Bson};
use rocket::{
    http::{
        impl_from_uri_param_identity,
        uri::fmt::{Path, UriDisplay},
    },
    request::FromParam,
};
use serde::{Deserialize, Serialize};

/// The fixed set of contests this organisation runs.
/// Each type has its own zones, eligibility rules, and lifecycle.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElectionType {
    KarobariMembers,
    Trustees,
    YuvaPankh,
}

impl ElectionType {
    /// All election types, in a stable order.
    pub const ALL: [ElectionType; 3] = [
        ElectionType::KarobariMembers,
        ElectionType::Trustees,
        ElectionType::YuvaPankh,
    ];

    /// The wire/database form of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ElectionType::KarobariMembers => "KAROBARI_MEMBERS",
            ElectionType::Trustees => "TRUSTEES",
            ElectionType::YuvaPankh => "YUVA_PANKH",
        }
    }
}

impl Display for ElectionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElectionType {
    type Err = UnknownElectionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "KAROBARI_MEMBERS" => Ok(ElectionType::KarobariMembers),
            "TRUSTEES" => Ok(ElectionType::Trustees),
            "YUVA_PANKH" => Ok(ElectionType::YuvaPankh),
            _ => Err(UnknownElectionType(s.to_string())),
        }
    }
}

/// Failed to parse an [`ElectionType`] from its wire form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown election type '{0}'")]
pub struct UnknownElectionType(pub String);

impl<'a> FromParam<'a> for ElectionType {
    type Error = UnknownElectionType;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        param.parse()
    }
}

impl UriDisplay<Path> for ElectionType {
    fn fmt(&self, formatter: &mut rocket::http::uri::fmt::Formatter<'_, Path>) -> fmt::Result {
        formatter.write_value(self.as_str())
    }
}

impl_from_uri_param_identity!([Path] ElectionType);

impl From<ElectionType> for Bson {
    fn from(election_type: ElectionType) -> Self {
        to_bson(&election_type).expect("Serialisation is infallible")
    }
}

/// States in the election lifecycle.
/// Only `Active` permits voting; transitions are otherwise unconstrained.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElectionStatus {
    /// Provisioned but not yet open for voting.
    Upcoming,
    /// Open for voting.
    Active,
    /// Closed; results may be tallied.
    Completed,
}

impl From<ElectionStatus> for Bson {
    fn from(status: ElectionStatus) -> Self {
        to_bson(&status).expect("Serialisation is infallible")
    }
}

impl Display for ElectionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            ElectionStatus::Upcoming => "UPCOMING",
            ElectionStatus::Active => "ACTIVE",
            ElectionStatus::Completed => "COMPLETED",
        };
        f.write_str(s)
    }
}
