//! History query pipeline.
//!
//! Turns a snapshot of travel records plus a [`QuerySpec`] into a view the
//! presentation layer can render: filter, then sort, then either group by
//! month or paginate.

mod pipeline;
mod query;

pub use pipeline::{
    HistoryView, MonthGroup, PageView, ViewBody, available_months, date_span, derive_view,
    filter, group_by_month, paginate, sort, total_pages,
};
pub use query::{DEFAULT_PAGE_SIZE, Filters, GroupBy, QuerySpec, SortBy, SortOrder};
