use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::models::types::TraderId;

pub const DOB_FORMAT: &str = "%Y-%m-%d";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trader {
    #[serde(default)]
    pub id: Option<TraderId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub country: String,
    pub dob: NaiveDate,
}

impl Trader {
    pub fn new(
        first_name: String,
        last_name: String,
        email: String,
        country: String,
        dob: NaiveDate,
    ) -> Self {
        Trader {
            id: None,
            first_name,
            last_name,
            email,
            country,
            dob,
        }
    }

    pub fn with_id(mut self, id: TraderId) -> Self {
        self.id = Some(id);
        self
    }

    /// Name of the first required profile field that is blank, if any.
    pub fn blank_field(&self) -> Option<&'static str> {
        [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("email", &self.email),
            ("country", &self.country),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }
}

/// Parses a `YYYY-MM-DD` date of birth.
pub fn parse_dob(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(raw.trim(), DOB_FORMAT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Trader {
        Trader::new(
            "First".to_string(),
            "Last".to_string(),
            "flast@email.org".to_string(),
            "CA".to_string(),
            NaiveDate::from_ymd_opt(1994, 5, 11).unwrap(),
        )
    }

    #[test]
    fn parses_iso_dates_only() {
        assert_eq!(parse_dob("1994-05-11").unwrap(), NaiveDate::from_ymd_opt(1994, 5, 11).unwrap());
        assert!(parse_dob("11/05/1994").is_err());
        assert!(parse_dob("1994-13-01").is_err());
        assert!(parse_dob("").is_err());
    }

    #[test]
    fn reports_first_blank_field() {
        assert_eq!(sample().blank_field(), None);

        let mut trader = sample();
        trader.email = "   ".to_string();
        trader.country = String::new();
        assert_eq!(trader.blank_field(), Some("email"));
    }

    #[test]
    fn payload_without_id_deserializes() {
        let json = r#"{"firstName":"First","lastName":"Last","email":"flast@email.org","country":"CA","dob":"1994-05-11"}"#;
        let trader: Trader = serde_json::from_str(json).unwrap();
        assert_eq!(trader, sample());
    }
}
