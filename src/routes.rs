use crate::{
    api::{companies, credits, employee_zone, employees, locations},
    auth::{handlers, middleware::session_gate},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

/// Per-peer-IP limiter allowing `requests_per_min` requests a minute, all of
/// them usable as a burst.
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default();
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));
    let prefix = config.api_prefix.as_str();

    // Public routes, registered ahead of the gated scope that shares the prefix
    cfg.service(
        web::resource(format!("{prefix}/login"))
            .wrap(login_limiter.clone())
            .route(web::post().to(handlers::login)),
    )
    .service(
        web::resource(format!("{prefix}/logout"))
            .wrap(login_limiter)
            .route(web::post().to(handlers::logout)),
    );

    // Protected routes
    cfg.service(
        web::scope(prefix)
            .wrap(from_fn(session_gate)) // session cookie
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/credits")
                    .route("/summary", web::get().to(credits::credits_summary))
                    .route("/employees", web::get().to(credits::credit_employees))
                    .route("/export", web::get().to(credits::export_credits))
                    .route("/companies/export", web::get().to(credits::export_companies))
                    .route("/locations/export", web::get().to(credits::export_locations))
                    .route(
                        "/employees/export",
                        web::get().to(credits::export_credit_employees),
                    ),
            )
            .service(
                web::scope("/companies")
                    .route("", web::get().to(companies::list_companies))
                    .route("/{customerId}", web::get().to(companies::get_company))
                    .route(
                        "/{customerId}/locations",
                        web::get().to(companies::company_locations),
                    )
                    .route(
                        "/{customerId}/contact",
                        web::get().to(companies::company_contact),
                    ),
            )
            .service(
                web::scope("/locations")
                    .route("", web::get().to(locations::search_locations))
                    .route(
                        "/{locationId}/employees",
                        web::get().to(locations::location_employees),
                    ),
            )
            .service(
                web::scope("/employees")
                    .route("", web::get().to(employees::list_employees))
                    // before /{employeeId}
                    .route("/export", web::get().to(employees::export_employees))
                    .route("/{employeeId}", web::get().to(employees::get_employee))
                    .route(
                        "/{employeeId}/wages",
                        web::get().to(employees::employee_wages),
                    ),
            )
            .service(
                web::scope("/employee-zone")
                    .route("", web::post().to(employee_zone::zone_batch))
                    .route("/lookup", web::post().to(employee_zone::zone_lookup)),
            ),
    );
}
