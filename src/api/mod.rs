use actix_web::HttpResponse;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::{ApiResult, server_error};
use crate::utils::spreadsheet::{XlsxExport, attachment};

pub mod companies;
pub mod credits;
pub mod employee_zone;
pub mod employees;
pub mod locations;

/// Free-text filter of the directory listings.
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Matched with `LIKE %q%`; blank means no filter
    pub q: Option<String>,
}

/// Required hire-date range of the employee listing and export.
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RangeQuery {
    /// `YYYY-MM-DD`
    pub from: Option<String>,
    /// `YYYY-MM-DD`
    pub to: Option<String>,
}

/// Serializes a finished workbook into an attachment, or the endpoint's 500.
pub(crate) fn workbook_response(
    export: XlsxExport,
    file_name: &str,
    failure: &'static str,
) -> ApiResult<HttpResponse> {
    let bytes = export.into_bytes().map_err(server_error(failure))?;
    Ok(attachment(file_name, bytes))
}

#[cfg(test)]
pub(crate) mod test_support {
    use sqlx::MySqlPool;
    use sqlx::mysql::MySqlPoolOptions;

    /// A pool that never connects until a query runs, so `size() == 0`
    /// after a request proves no query was issued.
    pub fn lazy_pool() -> MySqlPool {
        MySqlPoolOptions::new()
            .max_connections(1)
            .connect_lazy("mysql://wotc@127.0.0.1:1/wotc")
            .expect("lazy pool")
    }
}
