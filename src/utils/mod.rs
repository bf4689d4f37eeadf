pub mod credit_metrics;
pub mod db_utils;
pub mod filters;
pub mod pagination;
pub mod query_builder;
pub mod spreadsheet;
pub mod zone_lookup;
