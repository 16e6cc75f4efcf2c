//! Nearby-place DTOs and candidate types.
//!
//! `RawPlace` mirrors one entry of the HeartRails Express `getStations`
//! response. HeartRails has shipped coordinates both as JSON numbers and as
//! strings, and distances as strings like `"120m"`, so numeric fields are
//! read leniently and parsed later.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::companies::guess_company_from_line;

/// Kind of place being searched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceType {
    Station,
    Bus,
}

impl fmt::Display for PlaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceType::Station => f.write_str("station"),
            PlaceType::Bus => f.write_str("bus"),
        }
    }
}

/// A number that may arrive as a JSON number or as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Number(f64),
    Text(String),
}

impl LooseNumber {
    /// The numeric value, or `NaN` if the text has no leading number.
    ///
    /// Text is read up to the first character that cannot continue a
    /// decimal number, so `"120m"` is 120.
    pub fn value(&self) -> f64 {
        match self {
            LooseNumber::Number(n) => *n,
            LooseNumber::Text(s) => leading_number(s),
        }
    }
}

impl From<f64> for LooseNumber {
    fn from(n: f64) -> Self {
        LooseNumber::Number(n)
    }
}

impl From<&str> for LooseNumber {
    fn from(s: &str) -> Self {
        LooseNumber::Text(s.to_string())
    }
}

fn leading_number(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }
    if digits == 0 {
        return f64::NAN;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().unwrap_or(f64::NAN)
}

/// One station entry as returned by the remote provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPlace {
    pub name: String,

    /// Line or operator label, e.g. "JR山手線".
    #[serde(default)]
    pub line: Option<String>,

    /// Longitude.
    #[serde(default)]
    pub x: Option<LooseNumber>,

    /// Latitude.
    #[serde(default)]
    pub y: Option<LooseNumber>,

    /// Precomputed distance in meters, when the provider supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<LooseNumber>,
}

impl RawPlace {
    pub fn latitude(&self) -> f64 {
        self.y.as_ref().map_or(f64::NAN, LooseNumber::value)
    }

    pub fn longitude(&self) -> f64 {
        self.x.as_ref().map_or(f64::NAN, LooseNumber::value)
    }
}

/// Identifier of a candidate within one lookup's result set.
///
/// This is the entry's position in the provider's raw list, so it is only
/// meaningful together with the lookup that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceId(pub u32);

/// A ranked nearby-place candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: PlaceId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "type")]
    pub place_type: PlaceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    pub distance_meters: u32,
}

impl Place {
    /// Company to pre-fill in the record form, guessed from the line label.
    pub fn suggested_company(&self) -> Option<&'static str> {
        self.operator.as_deref().and_then(guess_company_from_line)
    }
}

/// Body of a `getStations` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeartRailsBody {
    /// Usually an array; anything else is treated as "no stations".
    #[serde(default)]
    pub station: Option<serde_json::Value>,

    /// Set instead of `station` when the provider rejects the request.
    #[serde(default)]
    pub error: Option<String>,
}

/// Envelope of every HeartRails JSON response.
#[derive(Debug, Clone, Deserialize)]
pub struct HeartRailsResponse {
    #[serde(default)]
    pub response: HeartRailsBody,
}
