use serde::{Deserialize, Serialize};

use crate::model::{
    common::ElectionType,
    db::zone::{NewZone, Zone},
    mongodb::Id,
};

/// The specification of a new zone, as submitted by an administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneSpec {
    pub code: String,
    pub name: String,
    pub local_name: Option<String>,
    pub election_type: ElectionType,
    pub seat_count: u32,
}

impl ZoneSpec {
    pub fn into_zone(self) -> NewZone {
        let mut zone = NewZone::new(self.code, self.name, self.election_type, self.seat_count);
        zone.local_name = self.local_name;
        zone
    }
}

/// A zone as returned by registry reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneView {
    pub id: Id,
    pub code: String,
    pub name: String,
    pub local_name: Option<String>,
    pub election_type: ElectionType,
    pub seat_count: u32,
    pub active: bool,
    pub open_for_voting: bool,
}

impl From<&Zone> for ZoneView {
    fn from(zone: &Zone) -> Self {
        Self {
            id: zone.id,
            code: zone.code.clone(),
            name: zone.name.clone(),
            local_name: zone.local_name.clone(),
            election_type: zone.election_type,
            seat_count: zone.seat_count,
            active: zone.active,
            open_for_voting: zone.open_for_voting,
        }
    }
}
