use std::ops::Deref;

use mongodb::{
    bson::doc, error::Error as DbError, options::IndexOptions, Collection, Database, IndexModel,
};
use rocket::{
    request::{self, FromRequest, Request},
    State,
};

use crate::model::db::{
    candidate::{Candidate, NewCandidate},
    election::{Election, NewElection},
    vote::{NewVote, Vote},
    voter::{NewVoter, Voter},
    zone::{NewZone, Zone},
};

/// A type that can be directly inserted/read to/from the database.
pub trait MongoCollection {
    /// The name of the collection.
    const NAME: &'static str;
}

/// A database collection of the given type.
pub struct Coll<T>(Collection<T>);

impl<T> Coll<T>
where
    T: MongoCollection,
{
    /// Get a handle on this collection in the given database.
    pub fn from_db(db: &Database) -> Self {
        Self(db.collection(T::NAME))
    }
}

// `Derive(Clone)` would only derive if `T: Clone`, but we don't need that bound.
impl<T> Clone for Coll<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Deref for Coll<T> {
    type Target = Collection<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[rocket::async_trait]
impl<'r, T> FromRequest<'r> for Coll<T>
where
    T: MongoCollection,
{
    type Error = ();

    /// Get the database connection from the managed state and wrap it in a collection.
    ///
    /// Panics iff the [`Database`] is not managed by [`rocket::Rocket`].
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let db = req.guard::<&State<Database>>().await.unwrap();
        request::Outcome::Success(Coll::from_db(db))
    }
}

// Voter collections
const VOTERS: &str = "voters";
impl MongoCollection for Voter {
    const NAME: &'static str = VOTERS;
}
impl MongoCollection for NewVoter {
    const NAME: &'static str = VOTERS;
}

// Zone collections
const ZONES: &str = "zones";
impl MongoCollection for Zone {
    const NAME: &'static str = ZONES;
}
impl MongoCollection for NewZone {
    const NAME: &'static str = ZONES;
}

// Election collections
const ELECTIONS: &str = "elections";
impl MongoCollection for Election {
    const NAME: &'static str = ELECTIONS;
}
impl MongoCollection for NewElection {
    const NAME: &'static str = ELECTIONS;
}

// Candidate collections
const CANDIDATES: &str = "candidates";
impl MongoCollection for Candidate {
    const NAME: &'static str = CANDIDATES;
}
impl MongoCollection for NewCandidate {
    const NAME: &'static str = CANDIDATES;
}

// Vote collections
const VOTES: &str = "votes";
impl MongoCollection for Vote {
    const NAME: &'static str = VOTES;
}
impl MongoCollection for NewVote {
    const NAME: &'static str = VOTES;
}

/// Ensure that all the required indexes exist on the given database.
///
/// This operation is idempotent.
pub async fn ensure_indexes_exist(db: &Database) -> Result<(), DbError> {
    debug!("Ensuring collection indexes exist");

    let unique = IndexOptions::builder().unique(true).build();

    // Voter collection: phone numbers and roll numbers are both unique handles.
    let phone_index = IndexModel::builder()
        .keys(doc! {"phone": 1})
        .options(unique.clone())
        .build();
    let roll_number_index = IndexModel::builder()
        .keys(doc! {"roll_number": 1})
        .options(unique.clone())
        .build();
    Coll::<Voter>::from_db(db)
        .create_indexes([phone_index, roll_number_index], None)
        .await?;

    // Zone collection: codes are unique within an election.
    let zone_index = IndexModel::builder()
        .keys(doc! {"code": 1, "election_type": 1})
        .options(unique.clone())
        .build();
    Coll::<Zone>::from_db(db)
        .create_index(zone_index, None)
        .await?;

    // Election collection: at most one election per type.
    let election_index = IndexModel::builder()
        .keys(doc! {"election_type": 1})
        .options(unique.clone())
        .build();
    Coll::<Election>::from_db(db)
        .create_index(election_index, None)
        .await?;

    // Candidate collection: at most one NOTA entry per zone and position.
    // Real candidates share positions freely, so the constraint is partial.
    let nota_index = IndexModel::builder()
        .keys(doc! {"zone_id": 1, "position": 1})
        .options(
            IndexOptions::builder()
                .unique(true)
                .partial_filter_expression(doc! {"nota": true})
                .build(),
        )
        .build();
    Coll::<Candidate>::from_db(db)
        .create_index(nota_index, None)
        .await?;

    // Vote collection: this is the one-vote-per-position invariant.
    // Concurrent submissions race on this index rather than on any read check.
    let vote_index = IndexModel::builder()
        .keys(doc! {"voter_id": 1, "election_type": 1, "position": 1})
        .options(unique)
        .build();
    Coll::<Vote>::from_db(db)
        .create_index(vote_index, None)
        .await?;

    Ok(())
}
