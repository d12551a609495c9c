use mongodb::error::Error as DbError;
use rocket::{
    http::Status,
    response::{self, status, Responder},
    serde::json::Json,
    Request,
};
use serde::Serialize;
use thiserror::Error;

use crate::model::common::ElectionType;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong at the voting boundary.
///
/// Every variant maps to a stable machine-readable code, so clients react to
/// [`Error::code`] rather than parsing messages.
#[derive(Debug, Error)]
pub enum Error {
    #[error("No such voter, or the voter is inactive")]
    VoterNotFound,
    #[error("No {0} election exists")]
    ElectionNotFound(ElectionType),
    #[error("Voting in the {0} election is closed")]
    VotingClosed(ElectionType),
    #[error("Zone {0} is not currently accepting votes")]
    ZoneFrozen(String),
    #[error("Voter has no zone assignment for the {0} election")]
    NoZoneAssigned(ElectionType),
    #[error("Voter does not meet the age bounds of the {0} election")]
    AgeIneligible(ElectionType),
    #[error("Voter has already voted in the {0} election")]
    AlreadyVoted(ElectionType),
    #[error("Invalid candidate selection: {0}")]
    InvalidCandidate(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Db(#[from] DbError),
}

impl Error {
    /// The stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Error::VoterNotFound => "VOTER_NOT_FOUND",
            Error::ElectionNotFound(_) => "ELECTION_NOT_FOUND",
            Error::VotingClosed(_) => "VOTING_CLOSED",
            Error::ZoneFrozen(_) => "ZONE_FROZEN",
            Error::NoZoneAssigned(_) => "NO_ZONE_ASSIGNED",
            Error::AgeIneligible(_) => "AGE_INELIGIBLE",
            Error::AlreadyVoted(_) => "ALREADY_VOTED",
            Error::InvalidCandidate(_) => "INVALID_CANDIDATE",
            Error::BadRequest(_) => "BAD_REQUEST",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Db(_) => "STORAGE_UNAVAILABLE",
        }
    }

    fn status(&self) -> Status {
        match self {
            Error::VoterNotFound | Error::ElectionNotFound(_) | Error::NotFound(_) => {
                Status::NotFound
            }
            Error::VotingClosed(_)
            | Error::ZoneFrozen(_)
            | Error::NoZoneAssigned(_)
            | Error::AgeIneligible(_) => Status::Forbidden,
            Error::AlreadyVoted(_) => Status::Conflict,
            Error::InvalidCandidate(_) | Error::BadRequest(_) => Status::BadRequest,
            Error::Db(_) => Status::ServiceUnavailable,
        }
    }
}

/// The JSON body every error response carries.
#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl<'r> Responder<'r, 'static> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let code = self.code();
        let http_status = self.status();
        let message = match self {
            // Driver details are logged, never surfaced.
            Error::Db(err) => {
                error!("Storage error: {}", err);
                "The vote store is temporarily unavailable".to_string()
            }
            other => other.to_string(),
        };
        status::Custom(http_status, Json(ErrorBody { code, message })).respond_to(req)
    }
}
