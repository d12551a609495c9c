use mongodb::{Client, Database};
use rocket::{serde::json::Json, Route, State};

use crate::cache::DashboardCache;
use crate::error::{Error, Result};
use crate::model::{
    api::{BallotView, DashboardView, DashboardZone, Phone, VoteSubmission, VoterView},
    common::ElectionType,
    db::{
        election::Election,
        vote::{SubmissionAudit, Vote},
        voter::Voter,
        zone::Zone,
    },
    mongodb::{Coll, Id},
};
use crate::voting::{assembler, ledger};

pub fn routes() -> Vec<Route> {
    routes![lookup_voter, get_ballot, cast_votes, get_dashboard]
}

/// Find a voter by phone number, tolerating formatting variants.
#[get("/voters?<phone>")]
async fn lookup_voter(phone: Phone, voters: Coll<Voter>) -> Result<Json<VoterView>> {
    let voter = Voter::by_phone(&voters, &phone)
        .await?
        .ok_or(Error::VoterNotFound)?;
    Ok(Json(VoterView::from(&voter)))
}

/// The voter's ballot for one election, grouped by position.
#[get("/voters/<voter_id>/elections/<election_type>/ballot")]
async fn get_ballot(
    voter_id: Id,
    election_type: ElectionType,
    db: &State<Database>,
) -> Result<Json<BallotView>> {
    let ballot = assembler::assemble_ballot(db, voter_id, election_type).await?;
    Ok(Json(ballot))
}

/// Record the voter's completed ballot for one election.
#[post(
    "/voters/<voter_id>/elections/<election_type>/votes",
    data = "<submission>",
    format = "json"
)]
async fn cast_votes(
    voter_id: Id,
    election_type: ElectionType,
    submission: Json<VoteSubmission>,
    audit: SubmissionAudit,
    client: &State<Client>,
    db: &State<Database>,
    cache: &State<DashboardCache>,
) -> Result<()> {
    ledger::cast_votes(
        client,
        db,
        voter_id,
        election_type,
        &submission.selections,
        &audit,
    )
    .await?;
    cache.invalidate(voter_id, election_type);
    Ok(())
}

/// A cached, read-only summary of the voter's standing in one election.
#[get("/voters/<voter_id>/elections/<election_type>/dashboard")]
async fn get_dashboard(
    voter_id: Id,
    election_type: ElectionType,
    db: &State<Database>,
    cache: &State<DashboardCache>,
) -> Result<Json<DashboardView>> {
    if let Some(view) = cache.get(voter_id, election_type) {
        return Ok(Json(view));
    }

    let view = build_dashboard(db, voter_id, election_type).await?;
    cache.put(voter_id, election_type, view.clone());
    Ok(Json(view))
}

async fn build_dashboard(
    db: &Database,
    voter_id: Id,
    election_type: ElectionType,
) -> Result<DashboardView> {
    let voters = Coll::<Voter>::from_db(db);
    let elections = Coll::<Election>::from_db(db);
    let zones = Coll::<Zone>::from_db(db);
    let votes = Coll::<Vote>::from_db(db);

    let voter = Voter::by_id(&voters, voter_id)
        .await?
        .ok_or(Error::VoterNotFound)?;
    let election = Election::by_type(&elections, election_type)
        .await?
        .ok_or(Error::ElectionNotFound(election_type))?;

    let zone = match voter.zone_id_for(election_type) {
        Some(zone_id) => zones
            .find_one(zone_id.as_doc(), None)
            .await?
            .filter(|zone| zone.election_type == election_type)
            .map(|zone| DashboardZone {
                id: zone.id,
                open_for_voting: zone.zone.open_for_voting,
                code: zone.zone.code,
                name: zone.zone.name,
            }),
        None => None,
    };

    let mut positions_voted = Vote::for_voter(&votes, voter_id, election_type)
        .await?
        .into_iter()
        .map(|vote| vote.vote.position)
        .collect::<Vec<_>>();
    positions_voted.sort();

    Ok(DashboardView {
        election_type,
        status: election.status,
        voting_open: election.is_voting_open(),
        zone,
        has_voted: voter.has_voted(election_type),
        positions_voted,
    })
}

#[cfg(test)]
mod tests {
    use mongodb::bson::doc;
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::serde_json,
    };

    use crate::model::{
        common::{ElectionStatus, Position, PositionScope},
        db::{
            candidate::{CandidateCore, NewCandidate},
            voter::{NewVoter, VoterCore},
            zone::{NewZone, ZoneCore},
        },
    };

    use super::*;

    #[backend_test]
    async fn phone_lookup_tolerates_formatting(client: Client, voters: Coll<NewVoter>) {
        voters.insert_one(VoterCore::example(), None).await.unwrap();

        // International, STD-prefixed, and bare national forms all resolve
        // to the same voter.
        for query in ["%2B919820216044", "09820216044", "9820216044"] {
            let response = client
                .get(format!("/voters?phone={}", query))
                .dispatch()
                .await;

            assert_eq!(Status::Ok, response.status());
            let raw_response = response.into_string().await.unwrap();
            let view = serde_json::from_str::<VoterView>(&raw_response).unwrap();
            assert_eq!("R-1001", view.roll_number);
            assert_eq!("9820216044", view.phone);
        }

        let response = client.get("/voters?phone=9111111111").dispatch().await;
        assert_eq!(Status::NotFound, response.status());
        let raw_response = response.into_string().await.unwrap();
        let body = serde_json::from_str::<serde_json::Value>(&raw_response).unwrap();
        assert_eq!("VOTER_NOT_FOUND", body["code"]);

        // Unparseable numbers never match the route.
        let response = client.get("/voters?phone=not-a-number").dispatch().await;
        assert_eq!(Status::NotFound, response.status());
    }

    #[backend_test]
    async fn ballots_need_an_active_election(
        client: Client,
        elections: Coll<Election>,
        zones: Coll<NewZone>,
        voters: Coll<NewVoter>,
    ) {
        let zone_id: Id = zones
            .insert_one(ZoneCore::example(), None)
            .await
            .unwrap()
            .inserted_id
            .as_object_id()
            .unwrap()
            .into();
        let voter_id: Id = voters
            .insert_one(VoterCore::example_with_primary_zone(zone_id), None)
            .await
            .unwrap()
            .inserted_id
            .as_object_id()
            .unwrap()
            .into();

        // Elections are seeded UPCOMING.
        let response = client
            .get(uri!(get_ballot(voter_id, ElectionType::KarobariMembers)))
            .dispatch()
            .await;
        assert_eq!(Status::Forbidden, response.status());
        let raw_response = response.into_string().await.unwrap();
        let body = serde_json::from_str::<serde_json::Value>(&raw_response).unwrap();
        assert_eq!("VOTING_CLOSED", body["code"]);

        // A completed election is just as closed.
        elections
            .update_one(
                doc! { "election_type": ElectionType::KarobariMembers },
                doc! { "$set": { "status": ElectionStatus::Completed } },
                None,
            )
            .await
            .unwrap();
        let response = client
            .get(uri!(get_ballot(voter_id, ElectionType::KarobariMembers)))
            .dispatch()
            .await;
        assert_eq!(Status::Forbidden, response.status());
    }

    #[backend_test]
    async fn ballots_gather_contests_for_the_assigned_zone(
        client: Client,
        elections: Coll<Election>,
        zones: Coll<NewZone>,
        voters: Coll<NewVoter>,
        candidates: Coll<NewCandidate>,
    ) {
        elections
            .update_one(
                doc! { "election_type": ElectionType::KarobariMembers },
                doc! { "$set": { "status": ElectionStatus::Active } },
                None,
            )
            .await
            .unwrap();
        let zone_id: Id = zones
            .insert_one(ZoneCore::example(), None)
            .await
            .unwrap()
            .inserted_id
            .as_object_id()
            .unwrap()
            .into();
        let voter_id: Id = voters
            .insert_one(VoterCore::example_with_primary_zone(zone_id), None)
            .await
            .unwrap()
            .inserted_id
            .as_object_id()
            .unwrap()
            .into();

        // One approved candidate, one still pending, one NOTA entry, and an
        // approved candidate in some other zone.
        let mut pending = CandidateCore::example(zone_id);
        pending.name = "Bharat Shah".to_string();
        candidates
            .insert_many(
                [
                    CandidateCore::example_approved(zone_id),
                    pending,
                    CandidateCore::nota(zone_id, PositionScope::Whole),
                    CandidateCore::example_approved(Id::new()),
                ],
                None,
            )
            .await
            .unwrap();

        let response = client
            .get(uri!(get_ballot(voter_id, ElectionType::KarobariMembers)))
            .dispatch()
            .await;

        assert_eq!(Status::Ok, response.status());
        let raw_response = response.into_string().await.unwrap();
        let ballot = serde_json::from_str::<BallotView>(&raw_response).unwrap();
        assert_eq!(ElectionType::KarobariMembers, ballot.election_type);
        assert_eq!("MUM-N", ballot.zone_code);
        assert!(!ballot.already_voted);

        // Real contests come first; the NOTA pseudo-contest trails.
        assert_eq!(2, ballot.contests.len());
        assert_eq!(
            Position::new("KAROBARI_MEMBER"),
            ballot.contests[0].position
        );
        assert_eq!(1, ballot.contests[0].candidates.len());
        assert_eq!("Asha Patel", ballot.contests[0].candidates[0].name);
        assert!(!ballot.contests[0].candidates[0].nota);

        assert_eq!(Position::nota(), ballot.contests[1].position);
        assert_eq!(1, ballot.contests[1].candidates.len());
        assert!(ballot.contests[1].candidates[0].nota);
    }

    #[backend_test]
    async fn ballots_are_refused_without_eligibility(
        client: Client,
        elections: Coll<Election>,
        zones: Coll<NewZone>,
        voters: Coll<NewVoter>,
    ) {
        elections
            .update_one(
                doc! { "election_type": ElectionType::KarobariMembers },
                doc! { "$set": { "status": ElectionStatus::Active } },
                None,
            )
            .await
            .unwrap();
        let zone_id: Id = zones
            .insert_one(ZoneCore::example(), None)
            .await
            .unwrap()
            .inserted_id
            .as_object_id()
            .unwrap()
            .into();
        let voter_id: Id = voters
            .insert_one(VoterCore::example_with_primary_zone(zone_id), None)
            .await
            .unwrap()
            .inserted_id
            .as_object_id()
            .unwrap()
            .into();

        // A voter with no zone relation for the election.
        let mut unassigned = VoterCore::example();
        unassigned.roll_number = "R-2002".to_string();
        unassigned.phone = Phone::example_other();
        let unassigned_id: Id = voters
            .insert_one(unassigned, None)
            .await
            .unwrap()
            .inserted_id
            .as_object_id()
            .unwrap()
            .into();
        let response = client
            .get(uri!(get_ballot(unassigned_id, ElectionType::KarobariMembers)))
            .dispatch()
            .await;
        assert_eq!(Status::Forbidden, response.status());
        let raw_response = response.into_string().await.unwrap();
        let body = serde_json::from_str::<serde_json::Value>(&raw_response).unwrap();
        assert_eq!("NO_ZONE_ASSIGNED", body["code"]);

        // An age floor the voter does not clear.
        elections
            .update_one(
                doc! { "election_type": ElectionType::KarobariMembers },
                doc! { "$set": { "voter_min_age": 18 } },
                None,
            )
            .await
            .unwrap();
        voters
            .update_one(
                doc! { "_id": voter_id },
                doc! { "$set": { "age": 15 } },
                None,
            )
            .await
            .unwrap();
        let response = client
            .get(uri!(get_ballot(voter_id, ElectionType::KarobariMembers)))
            .dispatch()
            .await;
        assert_eq!(Status::Forbidden, response.status());
        let raw_response = response.into_string().await.unwrap();
        let body = serde_json::from_str::<serde_json::Value>(&raw_response).unwrap();
        assert_eq!("AGE_INELIGIBLE", body["code"]);
        voters
            .update_one(
                doc! { "_id": voter_id },
                doc! { "$set": { "age": 30 } },
                None,
            )
            .await
            .unwrap();

        // A frozen zone refuses ballots until it reopens.
        zones
            .update_one(
                doc! { "_id": zone_id },
                doc! { "$set": { "open_for_voting": false } },
                None,
            )
            .await
            .unwrap();
        let response = client
            .get(uri!(get_ballot(voter_id, ElectionType::KarobariMembers)))
            .dispatch()
            .await;
        assert_eq!(Status::Forbidden, response.status());
        let raw_response = response.into_string().await.unwrap();
        let body = serde_json::from_str::<serde_json::Value>(&raw_response).unwrap();
        assert_eq!("ZONE_FROZEN", body["code"]);

        // Deactivated voters are indistinguishable from absent ones.
        voters
            .update_one(
                doc! { "_id": voter_id },
                doc! { "$set": { "active": false } },
                None,
            )
            .await
            .unwrap();
        let response = client
            .get(uri!(get_ballot(voter_id, ElectionType::KarobariMembers)))
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());

        let response = client
            .get(uri!(get_ballot(Id::new(), ElectionType::KarobariMembers)))
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());
    }

    #[backend_test]
    async fn casting_is_final(
        client: Client,
        elections: Coll<Election>,
        zones: Coll<NewZone>,
        voters: Coll<NewVoter>,
        voter_docs: Coll<Voter>,
        candidates: Coll<NewCandidate>,
        votes: Coll<Vote>,
    ) {
        elections
            .update_one(
                doc! { "election_type": ElectionType::KarobariMembers },
                doc! { "$set": { "status": ElectionStatus::Active } },
                None,
            )
            .await
            .unwrap();
        let zone_id: Id = zones
            .insert_one(ZoneCore::example(), None)
            .await
            .unwrap()
            .inserted_id
            .as_object_id()
            .unwrap()
            .into();
        let voter_id: Id = voters
            .insert_one(VoterCore::example_with_primary_zone(zone_id), None)
            .await
            .unwrap()
            .inserted_id
            .as_object_id()
            .unwrap()
            .into();
        let candidate_id: Id = candidates
            .insert_one(CandidateCore::example_approved(zone_id), None)
            .await
            .unwrap()
            .inserted_id
            .as_object_id()
            .unwrap()
            .into();
        let nota_id: Id = candidates
            .insert_one(CandidateCore::nota(zone_id, PositionScope::Whole), None)
            .await
            .unwrap()
            .inserted_id
            .as_object_id()
            .unwrap()
            .into();

        // One real selection plus an explicit NOTA for its own position.
        let submission = VoteSubmission::example([
            (Position::new("KAROBARI_MEMBER"), candidate_id),
            (Position::nota(), nota_id),
        ]);
        let response = client
            .post(uri!(cast_votes(voter_id, ElectionType::KarobariMembers)))
            .header(ContentType::JSON)
            .body(serde_json::to_string(&submission).unwrap())
            .dispatch()
            .await;

        assert_eq!(Status::Ok, response.status());
        let recorded = Vote::for_voter(&votes, voter_id, ElectionType::KarobariMembers)
            .await
            .unwrap();
        assert_eq!(2, recorded.len());
        assert!(recorded.iter().any(|vote| vote.candidate_id == candidate_id));
        assert!(recorded.iter().any(|vote| vote.candidate_id == nota_id));
        let voter = Voter::by_id(&voter_docs, voter_id).await.unwrap().unwrap();
        assert!(voter.has_voted(ElectionType::KarobariMembers));

        // Any resubmission bounces, whatever its payload.
        let retry = VoteSubmission::example([(Position::new("KAROBARI_MEMBER"), candidate_id)]);
        let response = client
            .post(uri!(cast_votes(voter_id, ElectionType::KarobariMembers)))
            .header(ContentType::JSON)
            .body(serde_json::to_string(&retry).unwrap())
            .dispatch()
            .await;

        assert_eq!(Status::Conflict, response.status());
        let raw_response = response.into_string().await.unwrap();
        let body = serde_json::from_str::<serde_json::Value>(&raw_response).unwrap();
        assert_eq!("ALREADY_VOTED", body["code"]);
        let recorded = Vote::for_voter(&votes, voter_id, ElectionType::KarobariMembers)
            .await
            .unwrap();
        assert_eq!(2, recorded.len());

        // The ballot stays viewable afterwards, marked as already voted.
        let response = client
            .get(uri!(get_ballot(voter_id, ElectionType::KarobariMembers)))
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let raw_response = response.into_string().await.unwrap();
        let ballot = serde_json::from_str::<BallotView>(&raw_response).unwrap();
        assert!(ballot.already_voted);
    }

    #[backend_test]
    async fn simultaneous_casts_commit_once(
        client: Client,
        elections: Coll<Election>,
        zones: Coll<NewZone>,
        voters: Coll<NewVoter>,
        voter_docs: Coll<Voter>,
        candidates: Coll<NewCandidate>,
        votes: Coll<Vote>,
    ) {
        elections
            .update_one(
                doc! { "election_type": ElectionType::KarobariMembers },
                doc! { "$set": { "status": ElectionStatus::Active } },
                None,
            )
            .await
            .unwrap();
        let zone_id: Id = zones
            .insert_one(ZoneCore::example(), None)
            .await
            .unwrap()
            .inserted_id
            .as_object_id()
            .unwrap()
            .into();
        let voter_id: Id = voters
            .insert_one(VoterCore::example_with_primary_zone(zone_id), None)
            .await
            .unwrap()
            .inserted_id
            .as_object_id()
            .unwrap()
            .into();
        let candidate_id: Id = candidates
            .insert_one(CandidateCore::example_approved(zone_id), None)
            .await
            .unwrap()
            .inserted_id
            .as_object_id()
            .unwrap()
            .into();

        // A double-click: the same ballot submitted twice at once.
        let submission =
            VoteSubmission::example([(Position::new("KAROBARI_MEMBER"), candidate_id)]);
        let body = serde_json::to_string(&submission).unwrap();
        let (first, second) = rocket::tokio::join!(
            client
                .post(uri!(cast_votes(voter_id, ElectionType::KarobariMembers)))
                .header(ContentType::JSON)
                .body(&body)
                .dispatch(),
            client
                .post(uri!(cast_votes(voter_id, ElectionType::KarobariMembers)))
                .header(ContentType::JSON)
                .body(&body)
                .dispatch(),
        );

        // Exactly one submission lands; the other observes the completed vote.
        let statuses = [first.status(), second.status()];
        assert!(statuses.contains(&Status::Ok));
        assert!(statuses.contains(&Status::Conflict));
        let recorded = Vote::for_voter(&votes, voter_id, ElectionType::KarobariMembers)
            .await
            .unwrap();
        assert_eq!(1, recorded.len());
        assert_eq!(candidate_id, recorded[0].candidate_id);
        let voter = Voter::by_id(&voter_docs, voter_id).await.unwrap().unwrap();
        assert!(voter.has_voted(ElectionType::KarobariMembers));
    }

    #[backend_test]
    async fn casting_rejects_bad_selections(
        client: Client,
        elections: Coll<Election>,
        zones: Coll<NewZone>,
        voters: Coll<NewVoter>,
        candidates: Coll<NewCandidate>,
        votes: Coll<Vote>,
    ) {
        elections
            .update_one(
                doc! { "election_type": ElectionType::KarobariMembers },
                doc! { "$set": { "status": ElectionStatus::Active } },
                None,
            )
            .await
            .unwrap();
        let zone_id: Id = zones
            .insert_one(ZoneCore::example(), None)
            .await
            .unwrap()
            .inserted_id
            .as_object_id()
            .unwrap()
            .into();
        let voter_id: Id = voters
            .insert_one(VoterCore::example_with_primary_zone(zone_id), None)
            .await
            .unwrap()
            .inserted_id
            .as_object_id()
            .unwrap()
            .into();
        let approved_id: Id = candidates
            .insert_one(CandidateCore::example_approved(zone_id), None)
            .await
            .unwrap()
            .inserted_id
            .as_object_id()
            .unwrap()
            .into();
        let pending_id: Id = candidates
            .insert_one(CandidateCore::example(zone_id), None)
            .await
            .unwrap()
            .inserted_id
            .as_object_id()
            .unwrap()
            .into();

        // A pending candidate cannot receive votes.
        let submission = VoteSubmission::example([(Position::new("KAROBARI_MEMBER"), pending_id)]);
        let response = client
            .post(uri!(cast_votes(voter_id, ElectionType::KarobariMembers)))
            .header(ContentType::JSON)
            .body(serde_json::to_string(&submission).unwrap())
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());
        let raw_response = response.into_string().await.unwrap();
        let body = serde_json::from_str::<serde_json::Value>(&raw_response).unwrap();
        assert_eq!("INVALID_CANDIDATE", body["code"]);

        // An approved candidate filed under the wrong position is refused.
        let submission = VoteSubmission::example([(Position::new("TRUSTEE"), approved_id)]);
        let response = client
            .post(uri!(cast_votes(voter_id, ElectionType::KarobariMembers)))
            .header(ContentType::JSON)
            .body(serde_json::to_string(&submission).unwrap())
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());

        // An empty submission is refused outright.
        let submission = VoteSubmission::example([]);
        let response = client
            .post(uri!(cast_votes(voter_id, ElectionType::KarobariMembers)))
            .header(ContentType::JSON)
            .body(serde_json::to_string(&submission).unwrap())
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());

        // Nothing was recorded by any of the refused attempts.
        assert_eq!(0, votes.count_documents(None, None).await.unwrap());
    }

    #[backend_test]
    async fn closed_elections_refuse_votes(
        client: Client,
        zones: Coll<NewZone>,
        voters: Coll<NewVoter>,
        candidates: Coll<NewCandidate>,
        votes: Coll<Vote>,
    ) {
        let zone_id: Id = zones
            .insert_one(ZoneCore::example(), None)
            .await
            .unwrap()
            .inserted_id
            .as_object_id()
            .unwrap()
            .into();
        let voter_id: Id = voters
            .insert_one(VoterCore::example_with_primary_zone(zone_id), None)
            .await
            .unwrap()
            .inserted_id
            .as_object_id()
            .unwrap()
            .into();
        let candidate_id: Id = candidates
            .insert_one(CandidateCore::example_approved(zone_id), None)
            .await
            .unwrap()
            .inserted_id
            .as_object_id()
            .unwrap()
            .into();

        // The election is still UPCOMING.
        let submission =
            VoteSubmission::example([(Position::new("KAROBARI_MEMBER"), candidate_id)]);
        let response = client
            .post(uri!(cast_votes(voter_id, ElectionType::KarobariMembers)))
            .header(ContentType::JSON)
            .body(serde_json::to_string(&submission).unwrap())
            .dispatch()
            .await;

        assert_eq!(Status::Forbidden, response.status());
        let raw_response = response.into_string().await.unwrap();
        let body = serde_json::from_str::<serde_json::Value>(&raw_response).unwrap();
        assert_eq!("VOTING_CLOSED", body["code"]);
        assert_eq!(0, votes.count_documents(None, None).await.unwrap());
    }

    #[backend_test]
    async fn dashboards_summarise_and_tolerate_staleness(
        client: Client,
        elections: Coll<Election>,
        zones: Coll<NewZone>,
        voters: Coll<NewVoter>,
        candidates: Coll<NewCandidate>,
        votes: Coll<Vote>,
    ) {
        elections
            .update_one(
                doc! { "election_type": ElectionType::KarobariMembers },
                doc! { "$set": { "status": ElectionStatus::Active } },
                None,
            )
            .await
            .unwrap();
        let zone_id: Id = zones
            .insert_one(ZoneCore::example(), None)
            .await
            .unwrap()
            .inserted_id
            .as_object_id()
            .unwrap()
            .into();
        let voter_id: Id = voters
            .insert_one(VoterCore::example_with_primary_zone(zone_id), None)
            .await
            .unwrap()
            .inserted_id
            .as_object_id()
            .unwrap()
            .into();
        let candidate_id: Id = candidates
            .insert_one(CandidateCore::example_approved(zone_id), None)
            .await
            .unwrap()
            .inserted_id
            .as_object_id()
            .unwrap()
            .into();

        let response = client
            .get(uri!(get_dashboard(voter_id, ElectionType::KarobariMembers)))
            .dispatch()
            .await;

        assert_eq!(Status::Ok, response.status());
        let raw_response = response.into_string().await.unwrap();
        let dashboard = serde_json::from_str::<DashboardView>(&raw_response).unwrap();
        assert_eq!(ElectionStatus::Active, dashboard.status);
        assert!(dashboard.voting_open);
        assert!(!dashboard.has_voted);
        assert!(dashboard.positions_voted.is_empty());
        assert_eq!("MUM-N", dashboard.zone.unwrap().code);

        // Casting invalidates the cached summary.
        let submission =
            VoteSubmission::example([(Position::new("KAROBARI_MEMBER"), candidate_id)]);
        let response = client
            .post(uri!(cast_votes(voter_id, ElectionType::KarobariMembers)))
            .header(ContentType::JSON)
            .body(serde_json::to_string(&submission).unwrap())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());

        let response = client
            .get(uri!(get_dashboard(voter_id, ElectionType::KarobariMembers)))
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let raw_response = response.into_string().await.unwrap();
        let dashboard = serde_json::from_str::<DashboardView>(&raw_response).unwrap();
        assert!(dashboard.has_voted);
        assert_eq!(
            vec![Position::new("KAROBARI_MEMBER")],
            dashboard.positions_voted
        );

        // Mutating the database behind the cache's back is tolerated: the
        // summary may stay stale until its entry expires.
        votes
            .delete_many(doc! { "voter_id": voter_id }, None)
            .await
            .unwrap();
        let response = client
            .get(uri!(get_dashboard(voter_id, ElectionType::KarobariMembers)))
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let raw_response = response.into_string().await.unwrap();
        let dashboard = serde_json::from_str::<DashboardView>(&raw_response).unwrap();
        assert!(dashboard.has_voted);

        let response = client
            .get(uri!(get_dashboard(Id::new(), ElectionType::KarobariMembers)))
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());
    }
}
