//! Eligibility checks and ballot assembly.
//!
//! Assembly runs the eligibility gauntlet in a fixed order, so clients can
//! rely on which failure they see first: voter, election status, zone
//! assignment, age bounds, then the zone's voting window.

use std::collections::BTreeMap;

use mongodb::Database;

use crate::error::{Error, Result};
use crate::model::{
    api::{BallotEntry, BallotView, PositionContest},
    common::ElectionType,
    db::{candidate::Candidate, election::Election, voter::Voter, zone::Zone},
    mongodb::{Coll, Id},
};

/// Assemble the ballot a voter sees for one election.
///
/// A voter who has already voted is not turned away: they receive the
/// ballot flagged `already_voted` so clients can render their completed
/// state, and the zone's voting window is not held against them.
pub async fn assemble_ballot(
    db: &Database,
    voter_id: Id,
    election_type: ElectionType,
) -> Result<BallotView> {
    let voters = Coll::<Voter>::from_db(db);
    let elections = Coll::<Election>::from_db(db);
    let zones = Coll::<Zone>::from_db(db);
    let candidates = Coll::<Candidate>::from_db(db);

    let voter = Voter::by_id(&voters, voter_id)
        .await?
        .ok_or(Error::VoterNotFound)?;
    if !voter.active {
        // Inactive voters are indistinguishable from absent ones.
        return Err(Error::VoterNotFound);
    }

    let election = Election::by_type(&elections, election_type)
        .await?
        .ok_or(Error::ElectionNotFound(election_type))?;
    if !election.is_voting_open() {
        return Err(Error::VotingClosed(election_type));
    }

    let zone = resolve_zone(&voter, election_type, &zones).await?;

    if !election.voter_age_eligible(voter.age) {
        return Err(Error::AgeIneligible(election_type));
    }

    let already_voted = voter.has_voted(election_type);
    if !zone.accepts_votes(&election) && !already_voted {
        return Err(Error::ZoneFrozen(zone.code.clone()));
    }

    let approved = Candidate::approved_for_zone(&candidates, zone.id).await?;
    debug!(
        "Assembled {} ballot for voter {}: {} approved candidates in zone {}",
        election_type,
        voter_id,
        approved.len(),
        zone.code
    );

    Ok(BallotView {
        election_type,
        zone_id: zone.id,
        zone_code: zone.zone.code,
        zone_name: zone.zone.name,
        already_voted,
        contests: group_contests(approved),
    })
}

/// Resolve the zone a voter votes in for an election.
///
/// Uses the voter's dedicated relation with primary-zone fallback. A
/// relation pointing at a zone of a different election counts as no
/// assignment rather than leaking another contest's ballot.
pub(crate) async fn resolve_zone(
    voter: &Voter,
    election_type: ElectionType,
    zones: &Coll<Zone>,
) -> Result<Zone> {
    let zone_id = voter
        .zone_id_for(election_type)
        .ok_or(Error::NoZoneAssigned(election_type))?;
    let zone = zones
        .find_one(zone_id.as_doc(), None)
        .await?
        .ok_or(Error::NoZoneAssigned(election_type))?;
    if zone.election_type != election_type {
        warn!(
            "Voter {} has a {} zone relation pointing at {} zone {}",
            voter.id, election_type, zone.election_type, zone.code
        );
        return Err(Error::NoZoneAssigned(election_type));
    }
    Ok(zone)
}

/// Group candidates into per-position contests with a stable order.
///
/// Real positions come first, lexicographically; NOTA positions follow, by
/// seat index. Within a contest, candidates are ordered by name with NOTA
/// rows last. Nothing is suppressed: a contest whose only entry is NOTA is
/// still a contest.
fn group_contests(candidates: Vec<Candidate>) -> Vec<PositionContest> {
    let mut by_position: BTreeMap<_, Vec<Candidate>> = BTreeMap::new();
    for candidate in candidates {
        by_position
            .entry(candidate.position.clone())
            .or_default()
            .push(candidate);
    }

    let mut contests: Vec<_> = by_position
        .into_iter()
        .map(|(position, mut group)| {
            group.sort_by(|a, b| (a.nota, &a.name).cmp(&(b.nota, &b.name)));
            PositionContest {
                position,
                candidates: group.iter().map(BallotEntry::from).collect(),
            }
        })
        .collect();

    contests.sort_by_key(|contest| {
        (
            contest.position.is_nota(),
            contest.position.nota_seat_index().unwrap_or(0),
            contest.position.clone(),
        )
    });
    contests
}
