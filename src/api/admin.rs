use mongodb::{bson::doc, Client, Database};
use rocket::{serde::json::Json, Route, State};

use crate::cache::DashboardCache;
use crate::error::{Error, Result};
use crate::model::{
    api::{ApprovalDecision, CandidateView, ElectionView, NominationSpec, ZoneSpec, ZoneView},
    common::{ApprovalStatus, ElectionStatus, ElectionType},
    db::{
        candidate::{ensure_nota_for_zone, Candidate, NewCandidate},
        election::Election,
        zone::{NewZone, Zone},
    },
    mongodb::{is_duplicate_key_error, Coll, Id},
};
use crate::voting::ledger;

pub fn routes() -> Vec<Route> {
    routes![
        set_election_status,
        create_zone,
        set_zone_voting,
        provision_nota,
        nominate_candidate,
        rule_on_nomination,
        annul_votes,
    ]
}

/// Move an election through its lifecycle. Transitions are unconstrained;
/// only the resulting status matters for vote acceptance.
#[put("/elections/<election_type>/status", data = "<status>", format = "json")]
async fn set_election_status(
    election_type: ElectionType,
    status: Json<ElectionStatus>,
    elections: Coll<Election>,
) -> Result<Json<ElectionView>> {
    let updated = Election::set_status(&elections, election_type, status.0).await?;
    if !updated {
        return Err(Error::ElectionNotFound(election_type));
    }
    info!("The {} election is now {}", election_type, status.0);

    let election = Election::by_type(&elections, election_type)
        .await?
        .ok_or(Error::ElectionNotFound(election_type))?;
    Ok(Json(ElectionView::from(&election)))
}

#[post("/zones", data = "<spec>", format = "json")]
async fn create_zone(
    spec: Json<ZoneSpec>,
    new_zones: Coll<NewZone>,
    zones: Coll<Zone>,
) -> Result<Json<ZoneView>> {
    let spec = spec.0;
    if spec.seat_count < 1 {
        return Err(Error::BadRequest(
            "A zone must have at least one seat".to_string(),
        ));
    }

    let code = spec.code.clone();
    let election_type = spec.election_type;
    let id: Id = match new_zones.insert_one(spec.into_zone(), None).await {
        Ok(result) => result.inserted_id.as_object_id().unwrap().into(),
        Err(err) if is_duplicate_key_error(&err) => {
            return Err(Error::BadRequest(format!(
                "Zone code {} is already in use for the {} election",
                code, election_type
            )));
        }
        Err(err) => return Err(err.into()),
    };
    info!("Created zone {} for the {} election", code, election_type);

    let zone = zones.find_one(id.as_doc(), None).await?.unwrap(); // Just inserted.
    Ok(Json(ZoneView::from(&zone)))
}

/// Open or close a zone's voting window without touching the election.
#[put("/zones/<zone_id>/voting", data = "<open>", format = "json")]
async fn set_zone_voting(zone_id: Id, open: Json<bool>, zones: Coll<Zone>) -> Result<()> {
    let result = zones
        .update_one(
            zone_id.as_doc(),
            doc! { "$set": { "open_for_voting": open.0 } },
            None,
        )
        .await?;
    if result.matched_count != 1 {
        return Err(Error::NotFound(format!("Zone with ID {}", zone_id)));
    }
    info!(
        "Zone {} is now {} for voting",
        zone_id,
        if open.0 { "open" } else { "closed" }
    );
    Ok(())
}

/// Provision the zone's NOTA entries, returning their IDs. Safe to repeat.
#[post("/zones/<zone_id>/nota")]
async fn provision_nota(
    zone_id: Id,
    zones: Coll<Zone>,
    candidates: Coll<Candidate>,
) -> Result<Json<Vec<Id>>> {
    let zone = zones
        .find_one(zone_id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Zone with ID {}", zone_id)))?;

    let ids = ensure_nota_for_zone(&candidates, &zone).await?;
    info!("Provisioned {} NOTA entries for zone {}", ids.len(), zone.code);
    Ok(Json(ids))
}

#[post("/zones/<zone_id>/candidates", data = "<nomination>", format = "json")]
async fn nominate_candidate(
    zone_id: Id,
    nomination: Json<NominationSpec>,
    zones: Coll<Zone>,
    new_candidates: Coll<NewCandidate>,
    candidates: Coll<Candidate>,
) -> Result<Json<CandidateView>> {
    zones
        .find_one(zone_id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Zone with ID {}", zone_id)))?;

    let nomination = nomination.0;
    if nomination.position.is_nota() {
        return Err(Error::BadRequest(format!(
            "Position {} is reserved for NOTA entries",
            nomination.position
        )));
    }

    let result = new_candidates
        .insert_one(nomination.into_candidate(zone_id), None)
        .await?;
    let id: Id = result.inserted_id.as_object_id().unwrap().into();

    let candidate = candidates.find_one(id.as_doc(), None).await?.unwrap(); // Just inserted.
    info!(
        "Nominated {} for position {} in zone {}",
        candidate.name, candidate.position, zone_id
    );
    Ok(Json(CandidateView::from(&candidate)))
}

/// Rule on a nomination. Only final statuses are acceptable rulings, and
/// synthetic NOTA entries are not subject to review.
#[put("/candidates/<candidate_id>/approval", data = "<decision>", format = "json")]
async fn rule_on_nomination(
    candidate_id: Id,
    decision: Json<ApprovalDecision>,
    candidates: Coll<Candidate>,
) -> Result<Json<CandidateView>> {
    let decision = decision.0;
    if !matches!(
        decision.status,
        ApprovalStatus::Approved | ApprovalStatus::Rejected
    ) {
        return Err(Error::BadRequest(format!(
            "A ruling must approve or reject, not set {}",
            decision.status
        )));
    }

    let candidate = Candidate::by_id(&candidates, candidate_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Candidate with ID {}", candidate_id)))?;
    if candidate.nota {
        return Err(Error::BadRequest(
            "NOTA entries are not subject to approval".to_string(),
        ));
    }

    let reason = match decision.status {
        ApprovalStatus::Rejected => decision.reason,
        _ => None,
    };
    candidates
        .update_one(
            candidate_id.as_doc(),
            doc! { "$set": { "status": decision.status, "rejection_reason": reason } },
            None,
        )
        .await?;
    info!("Nomination {} is now {}", candidate_id, decision.status);

    let updated = Candidate::by_id(&candidates, candidate_id).await?.unwrap(); // Presence already checked.
    Ok(Json(CandidateView::from(&updated)))
}

/// Administrative override: erase a voter's votes for one election so they
/// can vote again. Returns the number of vote rows removed.
#[delete("/voters/<voter_id>/elections/<election_type>/votes")]
async fn annul_votes(
    voter_id: Id,
    election_type: ElectionType,
    client: &State<Client>,
    db: &State<Database>,
    cache: &State<DashboardCache>,
) -> Result<Json<u64>> {
    let removed = ledger::annul_votes(client, db, voter_id, election_type).await?;
    cache.invalidate(voter_id, election_type);
    Ok(Json(removed))
}
