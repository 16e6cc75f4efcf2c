//! Travel expense tracker server.
//!
//! Logs train and bus trips with their fares, keeps frequent routes as
//! templates, answers history queries (filter, sort, group by month,
//! paginate), suggests nearby stations from the browser's position and
//! exports records as CSV.

pub mod companies;
pub mod config;
pub mod domain;
pub mod export;
pub mod format;
pub mod geo;
pub mod history;
pub mod places;
pub mod store;
pub mod web;
