use actix_web::{HttpResponse, web};
use sqlx::MySqlPool;
use tracing::debug;

use crate::api::workbook_response;
use crate::config::Config;
use crate::error::{ApiResult, server_error};
use crate::model::credit::{CreditCounts, CreditEmployee, CreditSummary};
use crate::queries;
use crate::utils::credit_metrics::{CreditEstimates, CreditRates};
use crate::utils::filters::{CreditFilter, CreditFilterQuery, Metric};
use crate::utils::pagination::{LimitRule, clamp_limit};
use crate::utils::spreadsheet::{Cell, XlsxExport, file_name};

const EMPLOYEE_LIMIT: LimitRule = LimitRule {
    default: 200,
    max: 1000,
};

const SUMMARY_FAILED: &str = "Failed to compute credits summary";
const CREDITS_EXPORT_FAILED: &str = "Failed to generate credits Excel";
const COMPANIES_EXPORT_FAILED: &str = "Failed to generate companies Excel";
const LOCATIONS_EXPORT_FAILED: &str = "Failed to generate locations Excel";
const EMPLOYEES_EXPORT_FAILED: &str = "Failed to generate employees Excel";

fn rates(config: &Config) -> CreditRates {
    CreditRates {
        average_credit: config.average_credit,
        revenue_rate: config.revenue_rate,
    }
}

async fn load_summary(
    pool: &MySqlPool,
    filter: &CreditFilter,
    rates: CreditRates,
) -> Result<CreditSummary, sqlx::Error> {
    let counts = queries::credits::summary(filter)
        .fetch_optional_as::<CreditCounts>(pool)
        .await?
        .unwrap_or_default();

    Ok(CreditSummary {
        counts,
        estimates: CreditEstimates::derive(counts.total_certs, counts.total_pending, rates),
    })
}

/// Label / value / description table of the `Summary` sheet.
fn summary_rows(summary: &CreditSummary, rates: CreditRates) -> Vec<Vec<Cell>> {
    let c = &summary.counts;
    let e = &summary.estimates;
    let row = |label: &str, value: Cell, description: &str| {
        vec![Cell::from(label), value, Cell::from(description)]
    };

    vec![
        row("Metric", Cell::from("Value"), "Description"),
        row("Number screened YTD", c.screened.into(), "based on hire dates for year"),
        row("Qualified", c.qualified.into(), "sum certs, denials, pending"),
        row("Non-qualified", c.non_qualified.into(), "screened less qualified"),
        row("Total certs", c.total_certs.into(), "based on year cert received"),
        row("Total denials", c.total_denials.into(), "based on year cert received"),
        row("Total pending", c.total_pending.into(), "based on current count"),
        Vec::new(),
        row("Pending credit", e.pending_credit.into(), "totalPending * 0.5 * average credit"),
        row("Pending revenue", e.pending_revenue.into(), "pending credit * revenue rate"),
        row("Certified credit", e.certified_credit.into(), "totalCerts * average credit"),
        row("Certified revenue", e.certified_revenue.into(), "certified credit * revenue rate"),
        row("Estimated total", e.estimated_total.into(), "pending revenue + certified revenue"),
        Vec::new(),
        vec![Cell::from("Average credit"), rates.average_credit.into(), Cell::Blank],
    ]
}

#[utoipa::path(
    get,
    path = "/api/credits/summary",
    params(CreditFilterQuery),
    responses(
        (status = 200, description = "Bucket counts and projected credit", body = CreditSummary),
        (status = 400, description = "Missing or malformed filter"),
        (status = 500, description = "Failed to compute credits summary")
    ),
    tag = "Credits",
    security(("session_cookie" = []))
)]
pub async fn credits_summary(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<CreditFilterQuery>,
) -> ApiResult<HttpResponse> {
    let filter = query.parse()?;
    let summary = load_summary(pool.get_ref(), &filter, rates(&config))
        .await
        .map_err(server_error(SUMMARY_FAILED))?;

    debug!(screened = summary.counts.screened, certs = summary.counts.total_certs, "Credits summary");
    Ok(HttpResponse::Ok().json(summary))
}

#[utoipa::path(
    get,
    path = "/api/credits/employees",
    params(CreditFilterQuery),
    responses(
        (status = 200, description = "Employees in the metric bucket, newest hire first", body = [CreditEmployee]),
        (status = 400, description = "Invalid metric or filter"),
        (status = 500, description = "Failed to load employees for metric")
    ),
    tag = "Credits",
    security(("session_cookie" = []))
)]
pub async fn credit_employees(
    pool: web::Data<MySqlPool>,
    query: web::Query<CreditFilterQuery>,
) -> ApiResult<HttpResponse> {
    let metric = Metric::parse(query.metric.as_deref())?;
    let filter = query.parse()?;
    let limit = clamp_limit(query.limit.as_deref(), EMPLOYEE_LIMIT);

    let rows = queries::credits::employees(&filter, metric, limit)
        .fetch_all_as::<CreditEmployee>(pool.get_ref())
        .await
        .map_err(server_error("Failed to load employees for metric"))?;

    debug!(metric = %metric, rows = rows.len(), "Credit employees");
    Ok(HttpResponse::Ok().json(rows))
}

#[utoipa::path(
    get,
    path = "/api/credits/export",
    params(CreditFilterQuery),
    responses(
        (status = 200, description = "credits_{from}_{to}.xlsx with Summary and CreditsRaw sheets"),
        (status = 400, description = "Missing or malformed filter"),
        (status = 500, description = "Failed to generate credits Excel")
    ),
    tag = "Credits",
    security(("session_cookie" = []))
)]
pub async fn export_credits(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<CreditFilterQuery>,
) -> ApiResult<HttpResponse> {
    let filter = query.parse()?;
    let rates = rates(&config);
    let pool = pool.get_ref();

    let summary = load_summary(pool, &filter, rates)
        .await
        .map_err(server_error(CREDITS_EXPORT_FAILED))?;
    let raw = queries::credits::raw_credits(&filter)
        .fetch_records(pool)
        .await
        .map_err(server_error(CREDITS_EXPORT_FAILED))?;

    let mut export = XlsxExport::new();
    export
        .table_sheet("Summary", &summary_rows(&summary, rates))
        .map_err(server_error(CREDITS_EXPORT_FAILED))?
        .records_sheet("CreditsRaw", &raw)
        .map_err(server_error(CREDITS_EXPORT_FAILED))?;

    let name = file_name(
        &["credits", &filter.range.from_param(), &filter.range.to_param()],
        None,
        None,
    );
    workbook_response(export, &name, CREDITS_EXPORT_FAILED)
}

#[utoipa::path(
    get,
    path = "/api/credits/companies/export",
    params(CreditFilterQuery),
    responses(
        (status = 200, description = "Active companies with a hire in range, as xlsx"),
        (status = 400, description = "Missing or malformed filter"),
        (status = 500, description = "Failed to generate companies Excel")
    ),
    tag = "Credits",
    security(("session_cookie" = []))
)]
pub async fn export_companies(
    pool: web::Data<MySqlPool>,
    query: web::Query<CreditFilterQuery>,
) -> ApiResult<HttpResponse> {
    let filter = query.parse()?;
    let rows = queries::credits::companies_export(&filter)
        .fetch_records(pool.get_ref())
        .await
        .map_err(server_error(COMPANIES_EXPORT_FAILED))?;

    let mut export = XlsxExport::new();
    export
        .records_sheet("Companies", &rows)
        .map_err(server_error(COMPANIES_EXPORT_FAILED))?;

    let name = file_name(
        &["companies", &filter.range.from_param(), &filter.range.to_param()],
        filter.customer_id,
        filter.location_id,
    );
    workbook_response(export, &name, COMPANIES_EXPORT_FAILED)
}

#[utoipa::path(
    get,
    path = "/api/credits/locations/export",
    params(CreditFilterQuery),
    responses(
        (status = 200, description = "Active locations with a hire in range, as xlsx"),
        (status = 400, description = "Missing or malformed filter"),
        (status = 500, description = "Failed to generate locations Excel")
    ),
    tag = "Credits",
    security(("session_cookie" = []))
)]
pub async fn export_locations(
    pool: web::Data<MySqlPool>,
    query: web::Query<CreditFilterQuery>,
) -> ApiResult<HttpResponse> {
    let filter = query.parse()?;
    let rows = queries::credits::locations_export(&filter)
        .fetch_records(pool.get_ref())
        .await
        .map_err(server_error(LOCATIONS_EXPORT_FAILED))?;

    let mut export = XlsxExport::new();
    export
        .records_sheet("Locations", &rows)
        .map_err(server_error(LOCATIONS_EXPORT_FAILED))?;

    let name = file_name(
        &["locations", &filter.range.from_param(), &filter.range.to_param()],
        filter.customer_id,
        filter.location_id,
    );
    workbook_response(export, &name, LOCATIONS_EXPORT_FAILED)
}

#[utoipa::path(
    get,
    path = "/api/credits/employees/export",
    params(CreditFilterQuery),
    responses(
        (status = 200, description = "Employees of the metric bucket (default screened), as xlsx"),
        (status = 400, description = "Invalid metric or filter"),
        (status = 500, description = "Failed to generate employees Excel")
    ),
    tag = "Credits",
    security(("session_cookie" = []))
)]
pub async fn export_credit_employees(
    pool: web::Data<MySqlPool>,
    query: web::Query<CreditFilterQuery>,
) -> ApiResult<HttpResponse> {
    let metric = Metric::parse_or_default(query.metric.as_deref())?;
    let filter = query.parse()?;

    let rows = queries::credits::employees_export(&filter, metric)
        .fetch_records(pool.get_ref())
        .await
        .map_err(server_error(EMPLOYEES_EXPORT_FAILED))?;

    let mut export = XlsxExport::new();
    export
        .records_sheet("Employees", &rows)
        .map_err(server_error(EMPLOYEES_EXPORT_FAILED))?;

    let name = file_name(
        &[
            "employees",
            metric.as_ref(),
            &filter.range.from_param(),
            &filter.range.to_param(),
        ],
        filter.customer_id,
        filter.location_id,
    );
    workbook_response(export, &name, EMPLOYEES_EXPORT_FAILED)
}
