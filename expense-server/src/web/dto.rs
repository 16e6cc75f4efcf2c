//! Data transfer objects for web requests and responses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::QueryDefaults;
use crate::history::{Filters, GroupBy, HistoryView, QuerySpec, SortBy, SortOrder};
use crate::places::{
    ErrorCode, Place, PlaceType, Position, PositionError, PositionReport, ResolverError,
    ResolverSnapshot, ResolverStatus,
};

/// Largest page size a client may ask for.
pub const MAX_PAGE_SIZE: usize = 100;

/// History query string: `?q&from&to&sortBy&sortOrder&groupBy&page&pageSize`.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryParams {
    /// Text filter over stations and company
    pub q: Option<String>,

    /// Inclusive lower date bound (YYYY-MM-DD)
    pub from: Option<String>,

    /// Inclusive upper date bound (YYYY-MM-DD)
    pub to: Option<String>,

    pub sort_by: Option<SortBy>,
    pub sort_order: Option<SortOrder>,
    pub group_by: Option<GroupBy>,

    /// 1-based page number
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl HistoryParams {
    pub fn to_spec(&self, defaults: QueryDefaults) -> QuerySpec {
        let QuerySpec {
            sort_by,
            sort_order,
            group_by,
            page,
            ..
        } = QuerySpec::default();
        let page_size = self
            .page_size
            .unwrap_or(defaults.page_size)
            .clamp(1, MAX_PAGE_SIZE);

        QuerySpec {
            filters: Filters {
                text_query: self.q.clone(),
                date_from: self.from.clone(),
                date_to: self.to.clone(),
            },
            sort_by: self.sort_by.unwrap_or(sort_by),
            sort_order: self.sort_order.unwrap_or(sort_order),
            group_by: self.group_by.unwrap_or(group_by),
            page: self.page.unwrap_or(page),
            page_size,
        }
    }
}

/// History view plus the filters that were ignored.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    #[serde(flatten)]
    pub view: HistoryView,

    /// Date bounds that did not parse and were not applied
    pub ignored_filters: Vec<&'static str>,
}

/// Query string of `GET /api/companies`.
#[derive(Debug, Deserialize)]
pub struct CompaniesParams {
    #[serde(rename = "type")]
    pub transportation_type: Option<String>,
}

/// Company suggestions.
#[derive(Debug, Serialize)]
pub struct CompaniesResponse {
    pub companies: Vec<&'static str>,
}

/// Body of `POST /api/places/lookup`.
///
/// The browser sends either the fix it obtained or the Geolocation API
/// error code. `supported: false` means the browser has no Geolocation API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupRequest {
    #[serde(default = "default_place_type")]
    pub place_type: PlaceType,

    pub position: Option<Position>,

    pub error_code: Option<u16>,

    #[serde(default = "default_supported")]
    pub supported: bool,
}

fn default_place_type() -> PlaceType {
    PlaceType::Station
}

fn default_supported() -> bool {
    true
}

impl LookupRequest {
    /// The report to hand to the position source, if the request carries one.
    pub fn report(&self) -> Option<PositionReport> {
        if !self.supported {
            return Some(Err(PositionError::NotSupported));
        }
        if let Some(code) = self.error_code {
            return Some(Err(PositionError::from_code(code)));
        }
        self.position.map(Ok)
    }
}

/// A candidate with the company the form should pre-fill.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateResult {
    #[serde(flatten)]
    pub place: Place,

    pub suggested_company: Option<&'static str>,
}

/// Resolver state as returned by the places endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacesResponse {
    pub status: ResolverStatus,
    pub candidates: Vec<CandidateResult>,
    pub error: Option<ResolverError>,
    pub generation: u64,
}

impl PlacesResponse {
    pub fn from_snapshot(snapshot: ResolverSnapshot) -> Self {
        let candidates = snapshot
            .candidates
            .into_iter()
            .map(|place| CandidateResult {
                suggested_company: place.suggested_company(),
                place,
            })
            .collect();

        Self {
            status: snapshot.status,
            candidates,
            error: snapshot.error,
            generation: snapshot.generation,
        }
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        self.error.as_ref().map(|e| e.code)
    }
}

/// Query string of `GET /api/export`.
#[derive(Debug, Default, Deserialize)]
pub struct ExportParams {
    /// `all`, `custom` or `monthly`
    pub range: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    /// `YYYY-MM`, for monthly exports
    pub month: Option<String>,
    /// `xlsx` (default) or `csv`
    pub format: Option<String>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,

    /// Per-field validation messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<&'static str, String>>,
}
