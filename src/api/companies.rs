use actix_web::{HttpResponse, web};
use sqlx::MySqlPool;

use crate::api::SearchQuery;
use crate::error::{ApiResult, server_error};
use crate::model::company::{CompanyContact, CompanySummary};
use crate::model::location::LocationSummary;
use crate::queries::directory;
use crate::utils::filters::{parse_path_id, search_term};
use crate::utils::pagination::{LimitRule, Listing, Page, PageParams, PageRule, Window};

const COMPANY_LIMIT: LimitRule = LimitRule {
    default: 50,
    max: 100,
};
const COMPANY_PAGE: PageRule = PageRule {
    default_size: 50,
    max_size: 200,
};
const LOCATION_PAGE: PageRule = PageRule {
    default_size: 50,
    max_size: 200,
};

const COMPANIES_FAILED: &str = "Failed to load companies";
const LOCATIONS_FAILED: &str = "Failed to load locations";

#[utoipa::path(
    get,
    path = "/api/companies",
    params(SearchQuery, PageParams),
    responses(
        (status = 200, description = "Array of companies, or `{items,total,page,pageSize}` when `page`/`pageSize` is given", body = [CompanySummary]),
        (status = 500, description = "Failed to load companies")
    ),
    tag = "Companies",
    security(("session_cookie" = []))
)]
pub async fn list_companies(
    pool: web::Data<MySqlPool>,
    search: web::Query<SearchQuery>,
    paging: web::Query<PageParams>,
) -> ApiResult<HttpResponse> {
    let q = search_term(search.q.as_deref());
    let pool = pool.get_ref();

    let listing = if paging.is_paginated() {
        let request = paging.page_request(COMPANY_PAGE);
        let items = directory::companies(q.as_deref(), request.window())
            .fetch_all_as::<CompanySummary>(pool)
            .await
            .map_err(server_error(COMPANIES_FAILED))?;
        let total = directory::companies_count(q.as_deref())
            .fetch_count(pool)
            .await
            .map_err(server_error(COMPANIES_FAILED))?;
        Listing::Page(Page::new(items, total, request))
    } else {
        let limit = paging.limit(COMPANY_LIMIT);
        let items = directory::companies(q.as_deref(), Window::Limit(limit))
            .fetch_all_as::<CompanySummary>(pool)
            .await
            .map_err(server_error(COMPANIES_FAILED))?;
        Listing::Items(items)
    };

    Ok(HttpResponse::Ok().json(listing))
}

#[utoipa::path(
    get,
    path = "/api/companies/{customerId}",
    params(("customerId" = u64, Path, description = "Customer id")),
    responses(
        (status = 200, description = "The `customers` row, or null when absent", body = Object),
        (status = 400, description = "Invalid customerId"),
        (status = 500, description = "Failed to load company details")
    ),
    tag = "Companies",
    security(("session_cookie" = []))
)]
pub async fn get_company(
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let customer_id = parse_path_id("customerId", &path)?;
    let company = directory::company(customer_id)
        .fetch_optional_record(pool.get_ref())
        .await
        .map_err(server_error("Failed to load company details"))?;

    Ok(HttpResponse::Ok().json(company))
}

#[utoipa::path(
    get,
    path = "/api/companies/{customerId}/locations",
    params(
        ("customerId" = u64, Path, description = "Customer id"),
        SearchQuery,
        PageParams
    ),
    responses(
        (status = 200, description = "All active locations, or a page of them when `page`/`pageSize` is given", body = [LocationSummary]),
        (status = 400, description = "Invalid customerId"),
        (status = 500, description = "Failed to load locations")
    ),
    tag = "Companies",
    security(("session_cookie" = []))
)]
pub async fn company_locations(
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
    search: web::Query<SearchQuery>,
    paging: web::Query<PageParams>,
) -> ApiResult<HttpResponse> {
    let customer_id = parse_path_id("customerId", &path)?;
    let q = search_term(search.q.as_deref());
    let pool = pool.get_ref();

    let listing = if paging.is_paginated() {
        let request = paging.page_request(LOCATION_PAGE);
        let items = directory::company_locations(customer_id, q.as_deref(), request.window())
            .fetch_all_as::<LocationSummary>(pool)
            .await
            .map_err(server_error(LOCATIONS_FAILED))?;
        let total = directory::company_locations_count(customer_id, q.as_deref())
            .fetch_count(pool)
            .await
            .map_err(server_error(LOCATIONS_FAILED))?;
        Listing::Page(Page::new(items, total, request))
    } else {
        let items = directory::company_locations(customer_id, q.as_deref(), Window::All)
            .fetch_all_as::<LocationSummary>(pool)
            .await
            .map_err(server_error(LOCATIONS_FAILED))?;
        Listing::Items(items)
    };

    Ok(HttpResponse::Ok().json(listing))
}

#[utoipa::path(
    get,
    path = "/api/companies/{customerId}/contact",
    params(("customerId" = u64, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Main contact, or null", body = CompanyContact),
        (status = 400, description = "Invalid customerId"),
        (status = 500, description = "Failed to load contact")
    ),
    tag = "Companies",
    security(("session_cookie" = []))
)]
pub async fn company_contact(
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let customer_id = parse_path_id("customerId", &path)?;
    let contact = directory::company_contact(customer_id)
        .fetch_optional_as::<CompanyContact>(pool.get_ref())
        .await
        .map_err(server_error("Failed to load contact"))?;

    Ok(HttpResponse::Ok().json(contact))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::lazy_pool;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::json;

    #[actix_web::test]
    async fn path_ids_must_be_positive() {
        let pool = lazy_pool();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(pool.clone()))
                .route("/api/companies/{customerId}", web::get().to(get_company))
                .route(
                    "/api/companies/{customerId}/locations",
                    web::get().to(company_locations),
                )
                .route(
                    "/api/companies/{customerId}/contact",
                    web::get().to(company_contact),
                ),
        )
        .await;

        for uri in [
            "/api/companies/abc",
            "/api/companies/0/locations",
            "/api/companies/-3/contact",
        ] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
            let body: serde_json::Value = test::read_body_json(resp).await;
            assert_eq!(body, json!({ "error": "Invalid customerId" }));
        }
        assert_eq!(pool.size(), 0);
    }
}
