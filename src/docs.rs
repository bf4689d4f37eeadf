use crate::auth::handlers::LoginRequest;
use crate::auth::session::SESSION_COOKIE;
use crate::model::company::{CompanyContact, CompanySummary};
use crate::model::credit::{CreditCounts, CreditEmployee, CreditSummary};
use crate::model::employee::LocationEmployee;
use crate::model::location::{LocationSearchResult, LocationSummary};
use crate::model::wage::Wage;
use crate::utils::credit_metrics::CreditEstimates;
use crate::utils::filters::Metric;
use crate::utils::zone_lookup::{Address, ZoneLookup};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

/// Registers the session cookie set by `POST /api/login`.
struct SessionCookie;

impl Modify for SessionCookie {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "WOTC Dashboard API",
        version = "1.0.0",
        description = r#"
## Work Opportunity Tax Credit dashboard

Read-only reporting over the WOTC screening database.

### Key Features
- **Credits**: screened / qualified / certified / denied / pending counts with
  projected credit and revenue, drill-down by bucket and Excel exports
- **Directory**: companies, locations, employees and pay periods
- **Employee zone**: empowerment-zone lookup for one address or a whole workbook

### Security
Every endpoint except login and logout needs the `wotc_session` cookie set by
`POST /api/login`. Requests without it are redirected to `/`.

### Response Format
- JSON, errors as `{"error": "..."}`
- Listings return a plain array, or `{items,total,page,pageSize}` when paged
- Exports return `.xlsx` attachments
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::logout,

        crate::api::credits::credits_summary,
        crate::api::credits::credit_employees,
        crate::api::credits::export_credits,
        crate::api::credits::export_companies,
        crate::api::credits::export_locations,
        crate::api::credits::export_credit_employees,

        crate::api::companies::list_companies,
        crate::api::companies::get_company,
        crate::api::companies::company_locations,
        crate::api::companies::company_contact,

        crate::api::locations::search_locations,
        crate::api::locations::location_employees,

        crate::api::employees::list_employees,
        crate::api::employees::export_employees,
        crate::api::employees::get_employee,
        crate::api::employees::employee_wages,

        crate::api::employee_zone::zone_batch,
        crate::api::employee_zone::zone_lookup
    ),
    components(
        schemas(
            LoginRequest,
            Metric,
            CreditCounts,
            CreditEstimates,
            CreditSummary,
            CreditEmployee,
            CompanySummary,
            CompanyContact,
            LocationSummary,
            LocationSearchResult,
            LocationEmployee,
            Wage,
            Address,
            ZoneLookup
        )
    ),
    modifiers(&SessionCookie),
    tags(
        (name = "Auth", description = "Session login and logout"),
        (name = "Credits", description = "Credit summary, drill-down and exports"),
        (name = "Companies", description = "Companies, their locations and contacts"),
        (name = "Locations", description = "Location search and employees"),
        (name = "Employees", description = "Employees and wages"),
        (name = "Employee zone", description = "Empowerment-zone lookups"),
    )
)]
pub struct ApiDoc;
