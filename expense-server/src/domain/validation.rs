//! Form input validation for records and routes.
//!
//! Inputs arrive as loosely-typed form data. Validation collects every
//! field error at once so the form can highlight all of them, and produces
//! typed drafts on success.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Fare, RouteDetails, TransportationType};

/// Maximum length of a station or stop name, in characters.
pub const MAX_STATION_NAME_CHARS: usize = 100;

/// Maximum length of a company name, in characters.
pub const MAX_COMPANY_CHARS: usize = 50;

/// Field-level validation failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("invalid input in {} field(s)", .fields.len())]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.insert(field, message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<&'static str, String> {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() { Ok(value()) } else { Err(self) }
    }
}

/// Parse a strict `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shape_ok {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

pub fn is_valid_station_name(value: &str) -> bool {
    !value.trim().is_empty() && value.chars().count() <= MAX_STATION_NAME_CHARS
}

/// Empty is allowed: the company is optional.
pub fn is_valid_company(value: &str) -> bool {
    value.chars().count() <= MAX_COMPANY_CHARS
}

/// A fare as submitted by a form: either a JSON number or the raw text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FareInput {
    Number(f64),
    Text(String),
}

impl FareInput {
    fn parse(&self) -> Result<Fare, super::InvalidFare> {
        match self {
            FareInput::Number(n) => Fare::from_f64(*n),
            FareInput::Text(s) => Fare::parse(s),
        }
    }
}

/// Unvalidated route fields shared by record and route forms.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteFields {
    #[serde(default)]
    pub from_station: String,
    #[serde(default)]
    pub to_station: String,
    #[serde(default)]
    pub transportation_type: String,
    #[serde(default)]
    pub transportation_company: Option<String>,
    #[serde(default)]
    pub fare: Option<FareInput>,
}

impl RouteFields {
    fn check(&self, errors: &mut ValidationErrors) -> Option<RouteDetails> {
        if !is_valid_station_name(&self.from_station) {
            errors.add("fromStation", "Departure station must be 1 to 100 characters");
        }
        if !is_valid_station_name(&self.to_station) {
            errors.add("toStation", "Arrival station must be 1 to 100 characters");
        }

        let transportation_type = self.transportation_type.parse::<TransportationType>().ok();
        if transportation_type.is_none() {
            errors.add("transportationType", "Choose either train or bus");
        }

        let company = self
            .transportation_company
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());
        if let Some(company) = company
            && !is_valid_company(company)
        {
            errors.add("transportationCompany", "Company name must be at most 50 characters");
        }

        let fare = match &self.fare {
            Some(input) => input.parse().ok(),
            None => None,
        };
        if fare.is_none() {
            errors.add(
                "fare",
                "Fare must be a number of 0 or more with at most 2 decimal places",
            );
        }

        Some(RouteDetails {
            from_station: self.from_station.trim().to_string(),
            to_station: self.to_station.trim().to_string(),
            transportation_type: transportation_type?,
            transportation_company: company.map(str::to_string),
            fare: fare?,
        })
    }
}

/// Record form submission.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordInput {
    #[serde(default)]
    pub date: String,
    #[serde(flatten)]
    pub route: RouteFields,
}

/// A validated record without an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDraft {
    pub date: NaiveDate,
    pub route: RouteDetails,
}

impl RecordInput {
    pub fn validate(&self) -> Result<RecordDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let date = parse_date(self.date.trim());
        if date.is_none() {
            errors.add("date", "Date must be in YYYY-MM-DD format");
        }
        let route = self.route.check(&mut errors);

        match (date, route) {
            (Some(date), Some(route)) => errors.into_result(|| RecordDraft { date, route }),
            _ => Err(errors),
        }
    }
}

/// Frequent-route form submission.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteInput {
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub route: RouteFields,
}

/// A validated frequent route without an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDraft {
    pub name: String,
    pub route: RouteDetails,
}

impl RouteInput {
    pub fn validate(&self) -> Result<RouteDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.add("name", "Route name is required");
        }
        let route = self.route.check(&mut errors);

        match route {
            Some(route) => errors.into_result(|| RouteDraft {
                name: name.to_string(),
                route,
            }),
            None => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record_input(value: serde_json::Value) -> RecordInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn parse_date_requires_exact_shape() {
        assert!(parse_date("2025-11-10").is_some());
        assert!(parse_date("2025-02-30").is_none());
        assert!(parse_date("2025-1-10").is_none());
        assert!(parse_date("2025/11/10").is_none());
        assert!(parse_date("").is_none());
        assert!(parse_date("2025-11-10T00:00").is_none());
    }

    #[test]
    fn station_name_limits() {
        assert!(is_valid_station_name("渋谷"));
        assert!(!is_valid_station_name(""));
        assert!(!is_valid_station_name("   "));
        assert!(is_valid_station_name(&"駅".repeat(100)));
        assert!(!is_valid_station_name(&"駅".repeat(101)));
    }

    #[test]
    fn company_limits() {
        assert!(is_valid_company(""));
        assert!(is_valid_company(&"a".repeat(50)));
        assert!(!is_valid_company(&"a".repeat(51)));
    }

    #[test]
    fn valid_record() {
        let draft = record_input(json!({
            "date": "2025-11-10",
            "fromStation": " 新宿 ",
            "toStation": "渋谷",
            "transportationType": "train",
            "transportationCompany": "JR",
            "fare": "200"
        }))
        .validate()
        .unwrap();

        assert_eq!(draft.date, NaiveDate::from_ymd_opt(2025, 11, 10).unwrap());
        assert_eq!(draft.route.from_station, "新宿");
        assert_eq!(draft.route.transportation_company.as_deref(), Some("JR"));
        assert_eq!(draft.route.fare, Fare::from_yen(200));
    }

    #[test]
    fn blank_company_becomes_none() {
        let draft = record_input(json!({
            "date": "2025-11-10",
            "fromStation": "a",
            "toStation": "b",
            "transportationType": "bus",
            "transportationCompany": "",
            "fare": 180
        }))
        .validate()
        .unwrap();
        assert_eq!(draft.route.transportation_company, None);
    }

    #[test]
    fn collects_all_errors() {
        let errors = record_input(json!({
            "date": "11/10/2025",
            "fromStation": "",
            "toStation": "b",
            "transportationType": "plane",
            "transportationCompany": "x".repeat(60),
            "fare": "-3"
        }))
        .validate()
        .unwrap_err();

        assert!(errors.get("date").is_some());
        assert!(errors.get("fromStation").is_some());
        assert!(errors.get("toStation").is_none());
        assert!(errors.get("transportationType").is_some());
        assert!(errors.get("transportationCompany").is_some());
        assert!(errors.get("fare").is_some());
        assert_eq!(errors.to_string(), "invalid input in 5 field(s)");
    }

    #[test]
    fn missing_fare_is_an_error() {
        let errors = record_input(json!({
            "date": "2025-11-10",
            "fromStation": "a",
            "toStation": "b",
            "transportationType": "train"
        }))
        .validate()
        .unwrap_err();
        assert_eq!(errors.fields().len(), 1);
        assert!(errors.get("fare").is_some());
    }

    #[test]
    fn route_requires_name() {
        let input: RouteInput = serde_json::from_value(json!({
            "name": "  ",
            "fromStation": "池袋",
            "toStation": "上野",
            "transportationType": "train",
            "fare": 220
        }))
        .unwrap();
        let errors = input.validate().unwrap_err();
        assert!(errors.get("name").is_some());

        let input: RouteInput = serde_json::from_value(json!({
            "name": "通勤",
            "fromStation": "池袋",
            "toStation": "上野",
            "transportationType": "train",
            "fare": 220
        }))
        .unwrap();
        let draft = input.validate().unwrap();
        assert_eq!(draft.name, "通勤");
        assert_eq!(draft.route.fare, Fare::from_yen(220));
    }
}
