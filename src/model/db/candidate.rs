use std::ops::{Deref, DerefMut};

use mongodb::bson::doc;
use mongodb::error::Error as DbError;
use rocket::futures::TryStreamExt;
use serde::{Deserialize, Serialize};

use crate::model::{
    common::{ApprovalStatus, Position, PositionScope},
    mongodb::{is_duplicate_key_error, Coll, Id},
};

use super::zone::Zone;

/// Display name shared by all NOTA pseudo-candidates.
const NOTA_NAME: &str = "None of the Above";

/// Core candidate data, as stored in the database.
///
/// NOTA pseudo-candidates live in the same collection as real candidates,
/// flagged with `nota: true` and born `Approved`. A partial unique index on
/// `(zone_id, position)` over NOTA rows guarantees at most one per position
/// per zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateCore {
    /// Display name.
    pub name: String,
    /// Optional election manifesto.
    pub manifesto: Option<String>,
    /// The zone this candidate stands in.
    pub zone_id: Id,
    /// The position contested.
    pub position: Position,
    /// Nomination lifecycle status.
    pub status: ApprovalStatus,
    /// Why the nomination was rejected, if it was.
    pub rejection_reason: Option<String>,
    /// Whether this is a synthetic NOTA entry.
    pub nota: bool,
}

impl CandidateCore {
    /// A fresh nomination, awaiting review.
    pub fn nomination(
        name: String,
        zone_id: Id,
        position: Position,
        manifesto: Option<String>,
    ) -> Self {
        Self {
            name,
            manifesto,
            zone_id,
            position,
            status: ApprovalStatus::Pending,
            rejection_reason: None,
            nota: false,
        }
    }

    /// The NOTA pseudo-candidate for the given scope within a zone.
    pub fn nota(zone_id: Id, scope: PositionScope) -> Self {
        Self {
            name: NOTA_NAME.to_string(),
            manifesto: None,
            zone_id,
            position: scope.nota_position(),
            status: ApprovalStatus::Approved,
            rejection_reason: None,
            nota: true,
        }
    }
}

/// A candidate without an ID.
pub type NewCandidate = CandidateCore;

/// A candidate from the database, with its unique ID.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub candidate: CandidateCore,
}

impl Candidate {
    /// Look up a candidate by ID.
    pub async fn by_id(
        candidates: &Coll<Candidate>,
        id: Id,
    ) -> Result<Option<Candidate>, DbError> {
        candidates.find_one(id.as_doc(), None).await
    }

    /// All approved candidates of a zone, NOTA entries included.
    pub async fn approved_for_zone(
        candidates: &Coll<Candidate>,
        zone_id: Id,
    ) -> Result<Vec<Candidate>, DbError> {
        candidates
            .find(
                doc! { "zone_id": zone_id, "status": ApprovalStatus::Approved },
                None,
            )
            .await?
            .try_collect()
            .await
    }
}

impl Deref for Candidate {
    type Target = CandidateCore;

    fn deref(&self) -> &Self::Target {
        &self.candidate
    }
}

impl DerefMut for Candidate {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.candidate
    }
}

/// Ensure the NOTA pseudo-candidate for the given scope exists in a zone,
/// returning its ID.
///
/// Looks up first, then creates. Losing the creation race to a concurrent
/// caller is success: the winner's row is re-read and returned, so callers
/// always observe exactly one NOTA per (zone, position).
pub async fn ensure_nota_candidate(
    candidates: &Coll<Candidate>,
    zone_id: Id,
    scope: PositionScope,
) -> Result<Id, DbError> {
    let filter = doc! {
        "zone_id": zone_id,
        "position": scope.nota_position(),
        "nota": true,
    };
    if let Some(existing) = candidates.find_one(filter.clone(), None).await? {
        return Ok(existing.id);
    }

    match candidates
        .clone_with_type::<NewCandidate>()
        .insert_one(NewCandidate::nota(zone_id, scope), None)
        .await
    {
        // Unwrap is valid because the ID comes directly from the DB.
        Ok(result) => Ok(result.inserted_id.as_object_id().unwrap().into()),
        Err(err) if is_duplicate_key_error(&err) => {
            // Someone else created it between our lookup and insert.
            match candidates.find_one(filter, None).await? {
                Some(existing) => Ok(existing.id),
                None => Err(err),
            }
        }
        Err(err) => Err(err),
    }
}

/// Ensure every NOTA entry a zone needs exists: a single whole-zone NOTA for
/// single-seat zones, one per seat index otherwise.
pub async fn ensure_nota_for_zone(
    candidates: &Coll<Candidate>,
    zone: &Zone,
) -> Result<Vec<Id>, DbError> {
    if zone.seat_count <= 1 {
        return Ok(vec![
            ensure_nota_candidate(candidates, zone.id, PositionScope::Whole).await?,
        ]);
    }
    let mut ids = Vec::with_capacity(zone.seat_count as usize);
    for seat in 1..=zone.seat_count {
        ids.push(ensure_nota_candidate(candidates, zone.id, PositionScope::Seat(seat)).await?);
    }
    Ok(ids)
}
