use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use mongodb::bson::{to_bson, Bson};
use phonenumber::{country, PhoneNumber};
use rocket::form::{self, error::ErrorKind, FromFormField, ValueField};
use serde::{Deserialize, Serialize};

/// A voter's phone number.
///
/// Voters type these in whatever form they are used to: `+919820216044`,
/// `09820216044` or a bare `9820216044`. All of them parse (with India as
/// the default region) to the same number, whose national significant number
/// is the canonical form stored in and matched against the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Phone {
    inner: PhoneNumber,
}

impl Phone {
    /// The canonical stored form: the national significant number.
    pub fn canonical(&self) -> String {
        let national = self.inner.national();
        format!(
            "{}{}",
            "0".repeat(national.zeros() as usize),
            national.value()
        )
    }

    /// The last ten digits of the canonical form, for tolerant matching
    /// against directory rows stored in older formats.
    pub fn suffix(&self) -> String {
        let canonical = self.canonical();
        let start = canonical.len().saturating_sub(10);
        canonical[start..].to_string()
    }
}

impl Display for Phone {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl FromStr for Phone {
    type Err = phonenumber::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Phone {
            inner: phonenumber::parse(Some(country::IN), s)?,
        })
    }
}

impl TryFrom<String> for Phone {
    type Error = phonenumber::ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Phone> for String {
    fn from(phone: Phone) -> Self {
        phone.canonical()
    }
}

impl From<Phone> for Bson {
    fn from(phone: Phone) -> Self {
        to_bson(&phone).expect("Serialisation is infallible")
    }
}

impl<'r> FromFormField<'r> for Phone {
    fn from_value(field: ValueField<'r>) -> form::Result<'r, Self> {
        field
            .value
            .parse()
            .map_err(|err| ErrorKind::Custom(Box::new(err)).into())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equivalent_forms_normalise_identically() {
        let canonical = Phone::example().canonical();
        assert_eq!(canonical, "9820216044");
        for form in ["+919820216044", "09820216044", "9820216044"] {
            let phone: Phone = form.parse().unwrap();
            assert_eq!(phone.canonical(), canonical);
            assert_eq!(phone, Phone::example());
        }
    }

    #[test]
    fn suffix_is_last_ten_digits() {
        assert_eq!(Phone::example().suffix(), "9820216044");
    }

    #[test]
    fn garbage_is_rejected() {
        assert!("not a number".parse::<Phone>().is_err());
        assert!("".parse::<Phone>().is_err());
    }

    #[test]
    fn round_trips_through_stored_form() {
        let phone = Phone::example();
        let stored = String::from(phone.clone());
        let reparsed: Phone = stored.try_into().unwrap();
        assert_eq!(reparsed, phone);
    }
}
