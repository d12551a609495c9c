use std::fmt::{self, Display, Formatter};

use mongodb::bson::{to_bson, Bson};
use serde::{Deserialize, Serialize};

/// Prefix shared by all NOTA position labels.
const NOTA_LABEL: &str = "NOTA";
const NOTA_SEAT_PREFIX: &str = "NOTA_SEAT_";

/// A ballot position label, e.g. `TRUSTEE`, `KAROBARI_MEMBER`, `NOTA`,
/// `NOTA_SEAT_2`. Candidates are nominated to a position; a ballot groups
/// candidates by position; the vote ledger is unique per (voter, position).
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Position(String);

impl Position {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// The canonical NOTA position for a whole single-seat zone.
    pub fn nota() -> Self {
        Self(NOTA_LABEL.to_string())
    }

    /// The canonical NOTA position for one seat of a multi-seat zone.
    /// Seat indices are 1-based.
    pub fn nota_seat(seat: u32) -> Self {
        Self(format!("{NOTA_SEAT_PREFIX}{seat}"))
    }

    /// Is this a NOTA position (whole-zone or per-seat)?
    pub fn is_nota(&self) -> bool {
        self.0 == NOTA_LABEL || self.0.starts_with(NOTA_SEAT_PREFIX)
    }

    /// The seat index of a per-seat NOTA position, if this is one.
    pub fn nota_seat_index(&self) -> Option<u32> {
        self.0.strip_prefix(NOTA_SEAT_PREFIX)?.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Position {
    fn from(label: &str) -> Self {
        Self(label.to_string())
    }
}

impl From<String> for Position {
    fn from(label: String) -> Self {
        Self(label)
    }
}

impl From<Position> for Bson {
    fn from(position: Position) -> Self {
        to_bson(&position).expect("Serialisation is infallible")
    }
}

/// The scope of a NOTA pseudo-candidate within a zone.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PositionScope {
    /// One NOTA covering the whole zone (single-seat contests).
    Whole,
    /// One NOTA for the given 1-based seat index (multi-seat contests).
    Seat(u32),
}

impl PositionScope {
    /// The canonical NOTA position label for this scope.
    pub fn nota_position(&self) -> Position {
        match self {
            PositionScope::Whole => Position::nota(),
            PositionScope::Seat(seat) => Position::nota_seat(*seat),
        }
    }
}
