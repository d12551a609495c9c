//! The vote ledger: transactional vote casting and administrative
//! annulment.
//!
//! All writes for one submission happen inside a client-session
//! transaction, so a submission lands in full or not at all. The unique
//! index on `(voter_id, election_type, position)` stays the final authority
//! under concurrency: whatever the in-memory checks concluded, a racing
//! duplicate aborts the transaction and surfaces as "already voted".

use std::collections::HashMap;

use mongodb::bson::doc;
use mongodb::error::{Error as DbError, UNKNOWN_TRANSACTION_COMMIT_RESULT};
use mongodb::{Client, ClientSession, Database};

use crate::error::{Error, Result};
use crate::model::{
    common::{ElectionType, Position},
    db::{
        candidate::Candidate,
        election::Election,
        vote::{NewVote, SubmissionAudit, Vote},
        voter::Voter,
        zone::Zone,
    },
    mongodb::{is_duplicate_key_error, with_backoff, Coll, Id},
};

use super::assembler::resolve_zone;

/// Record a voter's complete submission for one election.
///
/// The submission is gated on the voter's completion set, election status,
/// the zone's voting window, and candidate validity, then committed as a
/// single transaction: one vote row per selection plus the completion-set
/// update. Partial insertion is impossible.
pub async fn cast_votes(
    client: &Client,
    db: &Database,
    voter_id: Id,
    election_type: ElectionType,
    selections: &HashMap<Position, Id>,
    audit: &SubmissionAudit,
) -> Result<()> {
    if selections.is_empty() {
        return Err(Error::BadRequest(
            "A submission must select at least one candidate".to_string(),
        ));
    }

    let voters = Coll::<Voter>::from_db(db);
    let elections = Coll::<Election>::from_db(db);
    let zones = Coll::<Zone>::from_db(db);
    let candidates = Coll::<Candidate>::from_db(db);
    let votes = Coll::<NewVote>::from_db(db);

    let voter = with_backoff("cast_votes voter load", || Voter::by_id(&voters, voter_id))
        .await?
        .ok_or(Error::VoterNotFound)?;
    if !voter.active {
        return Err(Error::VoterNotFound);
    }

    if voter.has_voted(election_type) {
        return Err(Error::AlreadyVoted(election_type));
    }

    let election = Election::by_type(&elections, election_type)
        .await?
        .ok_or(Error::ElectionNotFound(election_type))?;
    if !election.is_voting_open() {
        return Err(Error::VotingClosed(election_type));
    }

    let zone = resolve_zone(&voter, election_type, &zones).await?;
    if !zone.accepts_votes(&election) {
        return Err(Error::ZoneFrozen(zone.code.clone()));
    }

    // Resolve every selection against the approved candidates of the
    // assigned zone before writing anything.
    let approved = with_backoff("cast_votes candidate load", || {
        Candidate::approved_for_zone(&candidates, zone.id)
    })
    .await?;
    let mut new_votes = Vec::with_capacity(selections.len());
    for (position, candidate_id) in selections {
        let candidate = approved
            .iter()
            .find(|candidate| candidate.id == *candidate_id && &candidate.position == position)
            .ok_or_else(|| {
                Error::InvalidCandidate(format!(
                    "candidate {} is not approved for position {} in zone {}",
                    candidate_id, position, zone.code
                ))
            })?;
        new_votes.push(NewVote::new(voter_id, election_type, candidate, audit.clone()));
    }

    let result = with_backoff("cast_votes", || {
        let voters = voters.clone();
        let votes = votes.clone();
        let new_votes = new_votes.clone();
        async move {
            let mut session = client.start_session(None).await?;
            session.start_transaction(None).await?;
            votes
                .insert_many_with_session(&new_votes, None, &mut session)
                .await?;
            voters
                .update_one_with_session(
                    voter_id.as_doc(),
                    doc! { "$addToSet": { "voted": election_type } },
                    None,
                    &mut session,
                )
                .await?;
            commit(&mut session).await
        }
    })
    .await;

    match result {
        Ok(()) => {
            info!(
                "Recorded {} votes for voter {} in the {} election",
                selections.len(),
                voter_id,
                election_type
            );
            Ok(())
        }
        // A racing submission hit the (voter, election, position) index
        // first; their votes stand, this submission does not.
        Err(err) if is_duplicate_key_error(&err) => Err(Error::AlreadyVoted(election_type)),
        Err(err) => Err(err.into()),
    }
}

/// Administrative override: erase a voter's votes for one election and
/// remove the election from their completion set, transactionally.
///
/// Returns the number of vote rows removed.
pub async fn annul_votes(
    client: &Client,
    db: &Database,
    voter_id: Id,
    election_type: ElectionType,
) -> Result<u64> {
    let voters = Coll::<Voter>::from_db(db);
    let votes = Coll::<Vote>::from_db(db);

    // The voter must exist, but inactive voters can still be cleaned up.
    with_backoff("annul_votes voter load", || Voter::by_id(&voters, voter_id))
        .await?
        .ok_or(Error::VoterNotFound)?;

    let removed = with_backoff("annul_votes", || {
        let voters = voters.clone();
        let votes = votes.clone();
        async move {
            let mut session = client.start_session(None).await?;
            session.start_transaction(None).await?;
            let deleted = votes
                .delete_many_with_session(
                    doc! { "voter_id": voter_id, "election_type": election_type },
                    None,
                    &mut session,
                )
                .await?
                .deleted_count;
            voters
                .update_one_with_session(
                    voter_id.as_doc(),
                    doc! { "$pull": { "voted": election_type } },
                    None,
                    &mut session,
                )
                .await?;
            commit(&mut session).await?;
            Ok(deleted)
        }
    })
    .await?;

    info!(
        "Annulled {} votes for voter {} in the {} election",
        removed, voter_id, election_type
    );
    Ok(removed)
}

/// Commit, retrying while the driver cannot tell whether the commit landed.
async fn commit(session: &mut ClientSession) -> std::result::Result<(), DbError> {
    loop {
        match session.commit_transaction().await {
            Err(err) if err.contains_label(UNKNOWN_TRANSACTION_COMMIT_RESULT) => {
                warn!("Transaction commit result unknown; retrying commit");
            }
            result => return result,
        }
    }
}
