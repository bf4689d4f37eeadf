use actix_web::{HttpResponse, web};
use sqlx::MySqlPool;
use tracing::debug;

use crate::api::SearchQuery;
use crate::error::{ApiResult, server_error};
use crate::model::employee::LocationEmployee;
use crate::model::location::LocationSearchResult;
use crate::queries::directory;
use crate::utils::filters::{parse_path_id, search_term};
use crate::utils::pagination::{LimitRule, Page, PageParams, PageRule};

const SEARCH_PAGE: PageRule = PageRule {
    default_size: 50,
    max_size: 200,
};
const EMPLOYEE_LIMIT: LimitRule = LimitRule {
    default: 200,
    max: 500,
};

const SEARCH_FAILED: &str = "Failed to load locations";

#[utoipa::path(
    get,
    path = "/api/locations",
    params(SearchQuery, PageParams),
    responses(
        (status = 200, description = "`{items,total,page,pageSize}`; a blank `q` returns an empty page", body = [LocationSearchResult]),
        (status = 500, description = "Failed to load locations")
    ),
    tag = "Locations",
    security(("session_cookie" = []))
)]
pub async fn search_locations(
    pool: web::Data<MySqlPool>,
    search: web::Query<SearchQuery>,
    paging: web::Query<PageParams>,
) -> ApiResult<HttpResponse> {
    let request = paging.page_request_or_limit(SEARCH_PAGE);
    let Some(q) = search_term(search.q.as_deref()) else {
        return Ok(HttpResponse::Ok().json(Page::<LocationSearchResult>::empty(request)));
    };
    let pool = pool.get_ref();

    let items = directory::location_search(&q, request.window())
        .fetch_all_as::<LocationSearchResult>(pool)
        .await
        .map_err(server_error(SEARCH_FAILED))?;
    let total = directory::location_search_count(&q)
        .fetch_count(pool)
        .await
        .map_err(server_error(SEARCH_FAILED))?;

    debug!(q = %q, total, "Location search");
    Ok(HttpResponse::Ok().json(Page::new(items, total, request)))
}

#[utoipa::path(
    get,
    path = "/api/locations/{locationId}/employees",
    params(
        ("locationId" = u64, Path, description = "Location id"),
        SearchQuery,
        PageParams
    ),
    responses(
        (status = 200, description = "Employees of the location", body = [LocationEmployee]),
        (status = 400, description = "Invalid locationId"),
        (status = 500, description = "Failed to load employees")
    ),
    tag = "Locations",
    security(("session_cookie" = []))
)]
pub async fn location_employees(
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
    search: web::Query<SearchQuery>,
    paging: web::Query<PageParams>,
) -> ApiResult<HttpResponse> {
    let location_id = parse_path_id("locationId", &path)?;
    let q = search_term(search.q.as_deref());
    let limit = paging.limit(EMPLOYEE_LIMIT);

    let rows = directory::location_employees(location_id, q.as_deref(), limit)
        .fetch_all_as::<LocationEmployee>(pool.get_ref())
        .await
        .map_err(server_error("Failed to load employees"))?;

    Ok(HttpResponse::Ok().json(rows))
}
