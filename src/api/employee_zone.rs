use actix_multipart::Multipart;
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::{HttpResponse, web};
use futures_util::TryStreamExt;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult, server_error};
use crate::utils::spreadsheet::{XlsxExport, attachment, read_first_sheet};
use crate::utils::zone_lookup::{Address, ZoneClient, ZoneLookup};

const FILE_REQUIRED: &str = "Excel file is required (field name: 'file').";
const BATCH_FAILED: &str = "Failed to process employee zone Excel.";
const ROWS_TOTAL: &str = "x-rows-total";
const ROWS_WITH_ADDRESS: &str = "x-rows-with-address";

/// Bytes of the first multipart field named `file`. Other fields are drained.
async fn read_file_field(payload: &mut Multipart) -> ApiResult<Vec<u8>> {
    let unreadable = |e: actix_multipart::MultipartError| {
        warn!(error = %e, "Unreadable multipart upload");
        ApiError::invalid(FILE_REQUIRED)
    };

    let mut file: Option<Vec<u8>> = None;
    while let Some(mut field) = payload.try_next().await.map_err(unreadable)? {
        let wanted = file.is_none() && field.content_disposition().get_name() == Some("file");
        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(unreadable)? {
            if wanted {
                bytes.extend_from_slice(&chunk);
            }
        }
        if wanted {
            file = Some(bytes);
        }
    }

    file.ok_or_else(|| ApiError::invalid(FILE_REQUIRED))
}

#[utoipa::path(
    post,
    path = "/api/employee-zone",
    request_body(content = Vec<u8>, content_type = "multipart/form-data", description = "Workbook in the `file` field"),
    responses(
        (status = 200, description = "employee-zones.xlsx with censusTract and zone columns; X-Rows-Total and X-Rows-With-Address headers"),
        (status = 400, description = "Missing, unreadable or empty workbook"),
        (status = 500, description = "Failed to process employee zone Excel.")
    ),
    tag = "Employee zone",
    security(("session_cookie" = []))
)]
pub async fn zone_batch(
    zones: web::Data<ZoneClient>,
    mut payload: Multipart,
) -> ApiResult<HttpResponse> {
    let bytes = read_file_field(&mut payload).await?;
    let rows = read_first_sheet(bytes).map_err(|e| ApiError::invalid(e.to_string()))?;
    let total = rows.len();

    let (enriched, with_address) = zones.enrich(rows).await;
    info!(rows = total, with_address, "Employee zone batch enriched");

    let mut export = XlsxExport::new();
    export
        .records_sheet("Employees", &enriched)
        .map_err(server_error(BATCH_FAILED))?;
    let bytes = export.into_bytes().map_err(server_error(BATCH_FAILED))?;

    let mut resp = attachment("employee-zones.xlsx", bytes);
    let headers = resp.headers_mut();
    headers.insert(HeaderName::from_static(ROWS_TOTAL), HeaderValue::from(total));
    headers.insert(
        HeaderName::from_static(ROWS_WITH_ADDRESS),
        HeaderValue::from(with_address),
    );
    Ok(resp)
}

#[utoipa::path(
    post,
    path = "/api/employee-zone/lookup",
    request_body = Address,
    responses(
        (status = 200, description = "Zone of the address; missingAddress when a field is blank", body = ZoneLookup)
    ),
    tag = "Employee zone",
    security(("session_cookie" = []))
)]
pub async fn zone_lookup(
    zones: web::Data<ZoneClient>,
    body: Option<web::Json<Address>>,
) -> HttpResponse {
    let lookup = match body {
        Some(address) => zones.lookup(&address.into_inner().trimmed()).await,
        None => ZoneLookup::unresolved(),
    };
    HttpResponse::Ok().json(lookup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rust_xlsxwriter::Workbook;
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BOUNDARY: &str = "----wotc-test-boundary";

    fn multipart_body(field: &str, bytes: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"employees.xlsx\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_workbook() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, header) in ["Name", "Address", "City", "ST", "Zip"].iter().enumerate() {
            sheet.write_string(0, col as u16, *header).unwrap();
        }
        for (col, value) in ["Ann", "100 Main St", "Dayton", "OH", "45402"].iter().enumerate() {
            sheet.write_string(1, col as u16, *value).unwrap();
        }
        for (col, value) in ["Bob", "5 Elm St", "Dayton", "OH", ""].iter().enumerate() {
            sheet.write_string(2, col as u16, *value).unwrap();
        }
        workbook.save_to_buffer().unwrap()
    }

    #[actix_web::test]
    async fn batch_enriches_rows_and_counts_addresses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("Zip", "45402"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "censusTract": "39113003500", "zone": "EZ-1" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let zones = ZoneClient::new(server.uri()).unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(zones))
                .route("/api/employee-zone", web::post().to(zone_batch)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/employee-zone")
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(multipart_body("file", &upload_workbook()))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get("x-rows-total").unwrap(), "2");
        assert_eq!(resp.headers().get("x-rows-with-address").unwrap(), "1");
        assert_eq!(
            resp.headers().get("content-disposition").unwrap(),
            "attachment; filename=\"employee-zones.xlsx\""
        );

        let bytes = test::read_body(resp).await.to_vec();
        let rows = read_first_sheet(bytes).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["censusTract"], json!("39113003500"));
        assert_eq!(rows[0]["zone"], json!("EZ-1"));
        assert_eq!(rows[1]["zone"], json!(""));
        assert_eq!(rows[1]["Name"], json!("Bob"));
    }

    #[actix_web::test]
    async fn batch_without_file_field_is_rejected() {
        let zones = ZoneClient::new("http://127.0.0.1:1").unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(zones))
                .route("/api/employee-zone", web::post().to(zone_batch)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/employee-zone")
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(multipart_body("upload", b"not used"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": FILE_REQUIRED }));

        let req = test::TestRequest::post()
            .uri("/api/employee-zone")
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(multipart_body("file", b"plain text, not a workbook"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn lookup_short_circuits_on_blank_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let zones = ZoneClient::new(server.uri()).unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(zones))
                .route("/api/employee-zone/lookup", web::post().to(zone_lookup)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/employee-zone/lookup")
            .set_json(json!({ "street": "100 Main St", "city": "Dayton", "state": "OH", "zip": "  " }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            json!({ "censusTract": "", "zone": "", "missingAddress": true })
        );

        let req = test::TestRequest::post()
            .uri("/api/employee-zone/lookup")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["missingAddress"], json!(false));
    }
}
