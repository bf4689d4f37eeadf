//! SQL text and bind lists for every dashboard query. Nothing here touches
//! the pool; handlers run the returned [`SqlQuery`](crate::utils::query_builder::SqlQuery).

pub mod credits;
pub mod directory;
