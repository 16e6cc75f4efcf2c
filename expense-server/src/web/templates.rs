//! Askama templates for the web frontend.

use askama::Template;

use crate::companies::{BUS_COMPANIES, RAILWAY_COMPANIES};
use crate::domain::{FrequentRoute, TravelRecord};
use crate::format::{format_currency, percent_encode};
use crate::history::{
    GroupBy, HistoryView, QuerySpec, SortBy, SortOrder, ViewBody, available_months, date_span,
};

// ============================================================================
// Page Templates (extend base.html)
// ============================================================================

/// History page: filters, record list, frequent routes and export form.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub query: QueryView,
    pub total_records: usize,
    pub total_fare: String,
    pub sections: Vec<SectionView>,
    pub pagination: Option<PaginationView>,
    pub routes: Vec<RouteView>,
    pub months: Vec<MonthOption>,
    /// Export form defaults: the earliest and latest trip dates.
    pub export_start: String,
    pub export_end: String,
    pub warnings: Vec<String>,
    pub railway_companies: &'static [&'static str],
    pub bus_companies: &'static [&'static str],
}

impl IndexTemplate {
    pub fn new(
        spec: &QuerySpec,
        view: &HistoryView,
        records: &[TravelRecord],
        routes: &[FrequentRoute],
    ) -> Self {
        let query = QueryView::from_spec(spec);

        let (sections, pagination) = match &view.body {
            ViewBody::Groups { groups } => {
                let sections = groups
                    .iter()
                    .map(|g| SectionView {
                        title: Some(month_label(&g.month)),
                        total_fare: Some(format_currency(g.total_fare)),
                        records: g.records.iter().map(RecordView::from_record).collect(),
                    })
                    .collect();
                (sections, None)
            }
            ViewBody::Page(page) => {
                let section = SectionView {
                    title: None,
                    total_fare: None,
                    records: page.records.iter().map(RecordView::from_record).collect(),
                };
                let pagination = PaginationView::new(&query, page.page, page.total_pages);
                (vec![section], Some(pagination))
            }
        };

        let warnings = spec
            .invalid_bounds()
            .into_iter()
            .map(|field| format!("Ignored {field}: dates must be YYYY-MM-DD"))
            .collect();

        let (export_start, export_end) = match date_span(records) {
            Some((start, end)) => (start.to_string(), end.to_string()),
            None => (String::new(), String::new()),
        };

        Self {
            query,
            total_records: view.total_records,
            total_fare: format_currency(view.total_fare),
            sections,
            pagination,
            routes: routes.iter().map(RouteView::from_route).collect(),
            months: available_months(records)
                .into_iter()
                .map(|month| MonthOption {
                    label: month_label(&month),
                    value: month,
                })
                .collect(),
            export_start,
            export_end,
            warnings,
            railway_companies: RAILWAY_COMPANIES,
            bus_companies: BUS_COMPANIES,
        }
    }
}

/// Error page.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub title: String,
    pub message: String,
    pub details: Option<String>,
}

// ============================================================================
// View Models (for templates)
// ============================================================================

/// Current query, echoed back into the filter form.
#[derive(Debug, Clone, Default)]
pub struct QueryView {
    pub q: String,
    pub from: String,
    pub to: String,
    pub sort_by: &'static str,
    pub sort_order: &'static str,
    toggled_order: &'static str,
    pub group_by: &'static str,
    pub page_size: usize,
}

impl QueryView {
    pub fn from_spec(spec: &QuerySpec) -> Self {
        Self {
            q: spec.filters.text_query.clone().unwrap_or_default(),
            from: spec.filters.date_from.clone().unwrap_or_default(),
            to: spec.filters.date_to.clone().unwrap_or_default(),
            sort_by: match spec.sort_by {
                SortBy::Date => "date",
                SortBy::TransportationType => "transportationType",
            },
            sort_order: order_str(spec.sort_order),
            toggled_order: order_str(spec.sort_order.toggled()),
            group_by: match spec.group_by {
                GroupBy::None => "none",
                GroupBy::Month => "month",
            },
            page_size: spec.page_size,
        }
    }

    /// Link to `page` of the same query.
    pub fn href(&self, page: usize) -> String {
        self.link(self.sort_order, page)
    }

    /// Link to the first page with the sort direction reversed.
    pub fn toggle_order_href(&self) -> String {
        self.link(self.toggled_order, 1)
    }

    fn link(&self, sort_order: &str, page: usize) -> String {
        let mut href = format!(
            "/?sortBy={}&sortOrder={}&groupBy={}&pageSize={}&page={}",
            self.sort_by, sort_order, self.group_by, self.page_size, page
        );
        for (key, value) in [("q", &self.q), ("from", &self.from), ("to", &self.to)] {
            if !value.is_empty() {
                href.push_str(&format!("&{key}={}", percent_encode(value)));
            }
        }
        href
    }
}

fn order_str(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Asc => "asc",
        SortOrder::Desc => "desc",
    }
}

/// Choice in the monthly export selector.
#[derive(Debug, Clone)]
pub struct MonthOption {
    pub value: String,
    pub label: String,
}

/// Pagination links for the flat view.
#[derive(Debug, Clone)]
pub struct PaginationView {
    pub page: usize,
    pub total_pages: usize,
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
}

impl PaginationView {
    pub fn new(query: &QueryView, page: usize, total_pages: usize) -> Self {
        Self {
            page,
            total_pages,
            prev_href: (page > 1).then(|| query.href(page.min(total_pages + 1) - 1)),
            next_href: (page < total_pages).then(|| query.href(page + 1)),
        }
    }
}

/// One titled block of records: a month, or the current page.
#[derive(Debug, Clone)]
pub struct SectionView {
    pub title: Option<String>,
    pub total_fare: Option<String>,
    pub records: Vec<RecordView>,
}

/// Record view model for templates.
#[derive(Debug, Clone)]
pub struct RecordView {
    pub id: String,
    pub date: String,
    pub from_station: String,
    pub to_station: String,
    pub type_label: &'static str,
    pub company: String,
    pub fare: String,
}

impl RecordView {
    pub fn from_record(record: &TravelRecord) -> Self {
        Self {
            id: record.id.to_string(),
            date: record.date.to_string(),
            from_station: record.from_station.clone(),
            to_station: record.to_station.clone(),
            type_label: record.transportation_type.label(),
            company: record.company().to_string(),
            fare: format_currency(record.fare),
        }
    }
}

/// Frequent route view model.
#[derive(Debug, Clone)]
pub struct RouteView {
    pub id: String,
    pub name: String,
    pub from_station: String,
    pub to_station: String,
    pub type_label: &'static str,
    pub company: String,
    pub fare: String,
}

impl RouteView {
    pub fn from_route(route: &FrequentRoute) -> Self {
        Self {
            id: route.id.to_string(),
            name: route.name.clone(),
            from_station: route.from_station.clone(),
            to_station: route.to_station.clone(),
            type_label: route.transportation_type.label(),
            company: route.transportation_company.clone().unwrap_or_default(),
            fare: format_currency(route.fare),
        }
    }
}

/// `2025-11` → `2025年11月`.
pub fn month_label(month: &str) -> String {
    match month.split_once('-') {
        Some((year, month)) => format!("{year}年{}月", month.trim_start_matches('0')),
        None => month.to_string(),
    }
}
