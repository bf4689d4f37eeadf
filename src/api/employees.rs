use actix_web::{HttpResponse, web};
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::IntoParams;

use crate::api::{RangeQuery, workbook_response};
use crate::error::{ApiResult, server_error};
use crate::model::wage::Wage;
use crate::queries::directory;
use crate::utils::filters::{DateRange, parse_optional_date, parse_path_id};
use crate::utils::pagination::{LimitRule, Page, PageParams, PageRule, Window, clamp_limit};
use crate::utils::spreadsheet::{XlsxExport, file_name};

const EMPLOYEE_PAGE: PageRule = PageRule {
    default_size: 100,
    max_size: 500,
};
const WAGE_LIMIT: LimitRule = LimitRule {
    default: 200,
    max: 1000,
};

const EMPLOYEES_FAILED: &str = "Failed to load employees";
const EXPORT_FAILED: &str = "Failed to generate employees Excel";

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WageQuery {
    /// Only periods starting on or after this date
    pub from: Option<String>,
    /// Only periods ending on or before this date
    pub to: Option<String>,
    pub limit: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/employees",
    params(RangeQuery, PageParams),
    responses(
        (status = 200, description = "`{items,total,page,pageSize}` of employees hired in range", body = Object),
        (status = 400, description = "Missing or malformed range"),
        (status = 500, description = "Failed to load employees")
    ),
    tag = "Employees",
    security(("session_cookie" = []))
)]
pub async fn list_employees(
    pool: web::Data<MySqlPool>,
    range: web::Query<RangeQuery>,
    paging: web::Query<PageParams>,
) -> ApiResult<HttpResponse> {
    let range = DateRange::parse(range.from.as_deref(), range.to.as_deref())?;
    let request = paging.page_request(EMPLOYEE_PAGE);
    let pool = pool.get_ref();

    let items = directory::employees(&range, request.window())
        .fetch_records(pool)
        .await
        .map_err(server_error(EMPLOYEES_FAILED))?;
    let total = directory::employees_count(&range)
        .fetch_count(pool)
        .await
        .map_err(server_error(EMPLOYEES_FAILED))?;

    Ok(HttpResponse::Ok().json(Page::new(items, total, request)))
}

#[utoipa::path(
    get,
    path = "/api/employees/export",
    params(RangeQuery),
    responses(
        (status = 200, description = "employees_{from}_{to}.xlsx"),
        (status = 400, description = "Missing or malformed range"),
        (status = 500, description = "Failed to generate employees Excel")
    ),
    tag = "Employees",
    security(("session_cookie" = []))
)]
pub async fn export_employees(
    pool: web::Data<MySqlPool>,
    range: web::Query<RangeQuery>,
) -> ApiResult<HttpResponse> {
    let range = DateRange::parse(range.from.as_deref(), range.to.as_deref())?;
    let rows = directory::employees(&range, Window::All)
        .fetch_records(pool.get_ref())
        .await
        .map_err(server_error(EXPORT_FAILED))?;

    let mut export = XlsxExport::new();
    export
        .records_sheet("Employees", &rows)
        .map_err(server_error(EXPORT_FAILED))?;

    let name = file_name(&["employees", &range.from_param(), &range.to_param()], None, None);
    workbook_response(export, &name, EXPORT_FAILED)
}

#[utoipa::path(
    get,
    path = "/api/employees/{employeeId}",
    params(("employeeId" = u64, Path, description = "Employee id")),
    responses(
        (status = 200, description = "The `wotcemployee` row, or null when absent", body = Object),
        (status = 400, description = "Invalid employeeId"),
        (status = 500, description = "Failed to load employee details")
    ),
    tag = "Employees",
    security(("session_cookie" = []))
)]
pub async fn get_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let employee_id = parse_path_id("employeeId", &path)?;
    let employee = directory::employee(employee_id)
        .fetch_optional_record(pool.get_ref())
        .await
        .map_err(server_error("Failed to load employee details"))?;

    Ok(HttpResponse::Ok().json(employee))
}

#[utoipa::path(
    get,
    path = "/api/employees/{employeeId}/wages",
    params(("employeeId" = u64, Path, description = "Employee id"), WageQuery),
    responses(
        (status = 200, description = "Pay periods ordered by start date", body = [Wage]),
        (status = 400, description = "Invalid employeeId or date"),
        (status = 500, description = "Failed to load wages")
    ),
    tag = "Employees",
    security(("session_cookie" = []))
)]
pub async fn employee_wages(
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
    query: web::Query<WageQuery>,
) -> ApiResult<HttpResponse> {
    let employee_id = parse_path_id("employeeId", &path)?;
    let from = parse_optional_date("from", query.from.as_deref())?;
    let to = parse_optional_date("to", query.to.as_deref())?;
    let limit = clamp_limit(query.limit.as_deref(), WAGE_LIMIT);

    let wages = directory::wages(employee_id, from, to, limit)
        .fetch_all_as::<Wage>(pool.get_ref())
        .await
        .map_err(server_error("Failed to load wages"))?;

    Ok(HttpResponse::Ok().json(wages))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::lazy_pool;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::json;

    macro_rules! employees_app {
        ($pool:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($pool.clone()))
                    .route("/api/employees", web::get().to(list_employees))
                    .route("/api/employees/export", web::get().to(export_employees))
                    .route("/api/employees/{employeeId}", web::get().to(get_employee))
                    .route(
                        "/api/employees/{employeeId}/wages",
                        web::get().to(employee_wages),
                    ),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn listing_and_export_need_a_range() {
        let pool = lazy_pool();
        let app = employees_app!(pool);

        for uri in [
            "/api/employees?page=2",
            "/api/employees/export?from=2025-01-01",
        ] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
        }
        assert_eq!(pool.size(), 0);
    }

    #[actix_web::test]
    async fn wage_filters_are_validated() {
        let pool = lazy_pool();
        let app = employees_app!(pool);

        let req = test::TestRequest::get()
            .uri("/api/employees/0/wages")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "Invalid employeeId" }));

        let req = test::TestRequest::get()
            .uri("/api/employees/7/wages?from=01/02/2025")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        assert_eq!(pool.size(), 0);
    }
}
