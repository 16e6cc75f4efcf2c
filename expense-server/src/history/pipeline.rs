//! Filter, sort, group and paginate a snapshot of travel records.
//!
//! Every function here is pure: it reads the slice it is given and returns
//! new values. Callers compose them as filter → sort → (group | paginate);
//! [`derive_view`] does exactly that and is what the web layer uses.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{Fare, TravelRecord};

use super::query::{Filters, GroupBy, QuerySpec, SortBy, SortOrder};

/// Records of one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthGroup {
    /// `YYYY-MM`.
    pub month: String,
    pub total_fare: Fare,
    pub records: Vec<TravelRecord>,
}

/// One page of the flat view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub records: Vec<TravelRecord>,
}

/// Layout of a derived view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum ViewBody {
    Page(PageView),
    Groups { groups: Vec<MonthGroup> },
}

/// A displayable history view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryView {
    /// Number of records that passed the filters.
    pub total_records: usize,
    /// Sum of fares over the filtered records.
    pub total_fare: Fare,
    #[serde(flatten)]
    pub body: ViewBody,
}

impl HistoryView {
    /// Records in display order, across pages or groups.
    pub fn records(&self) -> Box<dyn Iterator<Item = &TravelRecord> + '_> {
        match &self.body {
            ViewBody::Page(page) => Box::new(page.records.iter()),
            ViewBody::Groups { groups } => Box::new(groups.iter().flat_map(|g| g.records.iter())),
        }
    }
}

/// Keep records matching both the text query and the date window.
///
/// The text query matches case-insensitively against `"<from> <to>"` and
/// against the company name. Missing or malformed bounds impose no constraint.
pub fn filter(records: &[TravelRecord], filters: &Filters) -> Vec<TravelRecord> {
    let needle = filters.needle();
    let from = filters.from_date();
    let to = filters.to_date();

    records
        .iter()
        .filter(|r| needle.as_deref().is_none_or(|q| matches_text(r, q)))
        .filter(|r| from.is_none_or(|from| r.date >= from))
        .filter(|r| to.is_none_or(|to| r.date <= to))
        .cloned()
        .collect()
}

fn matches_text(record: &TravelRecord, needle: &str) -> bool {
    let stations = format!("{} {}", record.from_station, record.to_station).to_lowercase();
    stations.contains(needle) || record.company().to_lowercase().contains(needle)
}

fn compare(a: &TravelRecord, b: &TravelRecord, sort_by: SortBy) -> Ordering {
    match sort_by {
        SortBy::Date => a.date.cmp(&b.date),
        SortBy::TransportationType => a
            .transportation_type
            .as_str()
            .cmp(b.transportation_type.as_str()),
    }
}

/// Return a sorted copy. The sort is stable in both directions: records with
/// equal keys keep their input order.
pub fn sort(records: &[TravelRecord], sort_by: SortBy, order: SortOrder) -> Vec<TravelRecord> {
    let mut sorted = records.to_vec();
    match order {
        SortOrder::Asc => sorted.sort_by(|a, b| compare(a, b, sort_by)),
        SortOrder::Desc => sorted.sort_by(|a, b| compare(b, a, sort_by)),
    }
    sorted
}

/// Group by `YYYY-MM`, most recent month first. Order within a group is the
/// input order.
pub fn group_by_month(records: &[TravelRecord]) -> Vec<MonthGroup> {
    let mut months: BTreeMap<String, Vec<TravelRecord>> = BTreeMap::new();
    for record in records {
        months
            .entry(record.month_key())
            .or_default()
            .push(record.clone());
    }

    months
        .into_iter()
        .rev()
        .map(|(month, records)| MonthGroup {
            total_fare: records.iter().map(|r| r.fare).sum(),
            month,
            records,
        })
        .collect()
}

/// The 1-based `page` of size `page_size`. Pages outside the range, including
/// page 0, are empty.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let start = page
        .checked_sub(1)
        .and_then(|p| p.checked_mul(page_size))
        .unwrap_or(usize::MAX);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Number of pages needed for `total` items. Always at least 1.
pub fn total_pages(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    total.div_ceil(page_size).max(1)
}

/// Run the whole pipeline for one query.
pub fn derive_view(records: &[TravelRecord], spec: &QuerySpec) -> HistoryView {
    let filtered = filter(records, &spec.filters);
    let sorted = sort(&filtered, spec.sort_by, spec.sort_order);
    let total_records = sorted.len();
    let total_fare = sorted.iter().map(|r| r.fare).sum();

    let body = match spec.group_by {
        GroupBy::Month => ViewBody::Groups {
            groups: group_by_month(&sorted),
        },
        GroupBy::None => ViewBody::Page(PageView {
            page: spec.page,
            page_size: spec.page_size,
            total_pages: total_pages(total_records, spec.page_size),
            records: paginate(&sorted, spec.page, spec.page_size).to_vec(),
        }),
    };

    HistoryView {
        total_records,
        total_fare,
        body,
    }
}

/// Distinct `YYYY-MM` months present, most recent first.
pub fn available_months(records: &[TravelRecord]) -> Vec<String> {
    let mut months: Vec<String> = records.iter().map(TravelRecord::month_key).collect();
    months.sort_unstable_by(|a, b| b.cmp(a));
    months.dedup();
    months
}

/// Earliest and latest trip dates, if any records exist.
pub fn date_span(records: &[TravelRecord]) -> Option<(NaiveDate, NaiveDate)> {
    let min = records.iter().map(|r| r.date).min()?;
    let max = records.iter().map(|r| r.date).max()?;
    Some((min, max))
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
