use rocket::{serde::json::Json, Route};

use crate::error::{Error, Result};
use crate::model::{
    api::{ElectionView, ZoneView},
    common::ElectionType,
    db::{election::Election, zone::Zone},
    mongodb::Coll,
};

pub fn routes() -> Vec<Route> {
    routes![get_election, list_zones, get_zone]
}

/// Describe one election.
#[get("/elections/<election_type>")]
async fn get_election(
    election_type: ElectionType,
    elections: Coll<Election>,
) -> Result<Json<ElectionView>> {
    let election = Election::by_type(&elections, election_type)
        .await?
        .ok_or(Error::ElectionNotFound(election_type))?;
    Ok(Json(ElectionView::from(&election)))
}

/// List the zones of an election, optionally hiding inactive ones.
#[get("/elections/<election_type>/zones?<active_only>")]
async fn list_zones(
    election_type: ElectionType,
    active_only: Option<bool>,
    zones: Coll<Zone>,
) -> Result<Json<Vec<ZoneView>>> {
    let zones = Zone::list(&zones, election_type, active_only.unwrap_or(false)).await?;
    Ok(Json(zones.iter().map(ZoneView::from).collect()))
}

/// Look up a single zone by its code.
#[get("/elections/<election_type>/zones/<code>")]
async fn get_zone(
    election_type: ElectionType,
    code: &str,
    zones: Coll<Zone>,
) -> Result<Json<ZoneView>> {
    let zone = Zone::by_code(&zones, code, election_type)
        .await?
        .ok_or_else(|| {
            Error::NotFound(format!("Zone '{}' in the {} election", code, election_type))
        })?;
    Ok(Json(ZoneView::from(&zone)))
}
