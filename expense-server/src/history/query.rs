//! Query specification for the history view.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::validation::parse_date;

/// Default number of records per page in the flat view.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    #[default]
    Date,
    TransportationType,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// The opposite direction (the "asc/desc" toggle button).
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// How the filtered, sorted records are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    /// Flat list, paginated.
    #[default]
    None,
    /// One section per `YYYY-MM`, never paginated.
    Month,
}

/// Text and date-window filters.
///
/// Bounds are kept as the raw strings the user typed. A bound that is not a
/// valid `YYYY-MM-DD` date imposes no constraint; use [`Filters::invalid_bounds`]
/// to report such input instead of silently ignoring it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    /// Case-insensitive substring of stations or company.
    pub text_query: Option<String>,
    /// Inclusive lower bound.
    pub date_from: Option<String>,
    /// Inclusive upper bound.
    pub date_to: Option<String>,
}

impl Filters {
    /// Filter on text only.
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            text_query: Some(query.into()),
            ..Self::default()
        }
    }

    /// Filter on a date window only.
    pub fn between(from: Option<&str>, to: Option<&str>) -> Self {
        Self {
            text_query: None,
            date_from: from.map(str::to_string),
            date_to: to.map(str::to_string),
        }
    }

    /// Lowercased needle, or `None` when there is no text constraint.
    pub(crate) fn needle(&self) -> Option<String> {
        self.text_query
            .as_deref()
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase)
    }

    pub(crate) fn from_date(&self) -> Option<NaiveDate> {
        bound(self.date_from.as_deref())
    }

    pub(crate) fn to_date(&self) -> Option<NaiveDate> {
        bound(self.date_to.as_deref())
    }

    /// Names of bounds that are set but will be ignored because they do not parse.
    pub fn invalid_bounds(&self) -> Vec<&'static str> {
        let mut invalid = Vec::new();
        if is_set(self.date_from.as_deref()) && self.from_date().is_none() {
            invalid.push("dateFrom");
        }
        if is_set(self.date_to.as_deref()) && self.to_date().is_none() {
            invalid.push("dateTo");
        }
        invalid
    }

    pub fn is_empty(&self) -> bool {
        self.needle().is_none()
            && !is_set(self.date_from.as_deref())
            && !is_set(self.date_to.as_deref())
    }
}

fn is_set(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

fn bound(value: Option<&str>) -> Option<NaiveDate> {
    let raw = value.map(str::trim).filter(|v| !v.is_empty())?;
    let parsed = parse_date(raw);
    if parsed.is_none() {
        tracing::debug!(bound = raw, "ignoring malformed date bound");
    }
    parsed
}

/// Everything needed to derive one history view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySpec {
    pub filters: Filters,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    pub group_by: GroupBy,
    /// 1-based page number.
    pub page: usize,
    pub page_size: usize,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            filters: Filters::default(),
            sort_by: SortBy::Date,
            sort_order: SortOrder::Desc,
            group_by: GroupBy::None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl QuerySpec {
    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_sort(mut self, sort_by: SortBy, sort_order: SortOrder) -> Self {
        self.sort_by = sort_by;
        self.sort_order = sort_order;
        self
    }

    pub fn with_group_by(mut self, group_by: GroupBy) -> Self {
        self.group_by = group_by;
        self
    }

    pub fn with_page(mut self, page: usize, page_size: usize) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }

    /// See [`Filters::invalid_bounds`].
    pub fn invalid_bounds(&self) -> Vec<&'static str> {
        self.filters.invalid_bounds()
    }
}
