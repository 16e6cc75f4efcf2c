//! Travel records and frequent routes.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Fare;

/// Error returned when parsing an unknown transportation type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown transportation type: {0:?}")]
pub struct InvalidTransportationType(String);

/// How a trip was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportationType {
    Train,
    Bus,
}

impl TransportationType {
    /// The wire tag, also used as the sort key.
    pub fn as_str(self) -> &'static str {
        match self {
            TransportationType::Train => "train",
            TransportationType::Bus => "bus",
        }
    }

    /// Label shown in the history list and exports.
    pub fn label(self) -> &'static str {
        match self {
            TransportationType::Train => "電車",
            TransportationType::Bus => "バス",
        }
    }
}

impl FromStr for TransportationType {
    type Err = InvalidTransportationType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "train" => Ok(TransportationType::Train),
            "bus" => Ok(TransportationType::Bus),
            other => Err(InvalidTransportationType(other.to_string())),
        }
    }
}

impl fmt::Display for TransportationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a record or route, unique within its collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The reusable part of a trip: everything except id and date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDetails {
    pub from_station: String,
    pub to_station: String,
    pub transportation_type: TransportationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transportation_company: Option<String>,
    pub fare: Fare,
}

/// One logged trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelRecord {
    pub id: RecordId,

    /// Calendar date of the trip, `YYYY-MM-DD` on the wire.
    pub date: NaiveDate,

    pub from_station: String,
    pub to_station: String,
    pub transportation_type: TransportationType,

    /// Operator name. Older data stores an empty string for "none".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transportation_company: Option<String>,

    pub fare: Fare,
}

impl TravelRecord {
    /// Build a record from route details.
    pub fn from_route(id: RecordId, date: NaiveDate, route: RouteDetails) -> Self {
        Self {
            id,
            date,
            from_station: route.from_station,
            to_station: route.to_station,
            transportation_type: route.transportation_type,
            transportation_company: route.transportation_company,
            fare: route.fare,
        }
    }

    /// Company name, or the empty string when unset.
    pub fn company(&self) -> &str {
        self.transportation_company.as_deref().unwrap_or("")
    }

    /// `YYYY-MM` of the trip date.
    pub fn month_key(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }

    pub fn route(&self) -> RouteDetails {
        RouteDetails {
            from_station: self.from_station.clone(),
            to_station: self.to_station.clone(),
            transportation_type: self.transportation_type,
            transportation_company: self.transportation_company.clone(),
            fare: self.fare,
        }
    }
}

/// A named template for trips the user makes often.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequentRoute {
    pub id: RecordId,
    pub name: String,
    pub from_station: String,
    pub to_station: String,
    pub transportation_type: TransportationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transportation_company: Option<String>,
    pub fare: Fare,
}

impl FrequentRoute {
    pub fn new(id: RecordId, name: String, route: RouteDetails) -> Self {
        Self {
            id,
            name,
            from_station: route.from_station,
            to_station: route.to_station,
            transportation_type: route.transportation_type,
            transportation_company: route.transportation_company,
            fare: route.fare,
        }
    }

    pub fn route(&self) -> RouteDetails {
        RouteDetails {
            from_station: self.from_station.clone(),
            to_station: self.to_station.clone(),
            transportation_type: self.transportation_type,
            transportation_company: self.transportation_company.clone(),
            fare: self.fare,
        }
    }

    /// Instantiate the route as a trip on `date`.
    pub fn to_record(&self, id: RecordId, date: NaiveDate) -> TravelRecord {
        TravelRecord::from_route(id, date, self.route())
    }
}
