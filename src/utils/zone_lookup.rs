use derive_more::Display;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::utils::db_utils::Record;

const STREET_ALIASES: &[&str] = &["Street", "Address", "Address1", "Address 1"];
const CITY_ALIASES: &[&str] = &["City"];
const STATE_ALIASES: &[&str] = &["State", "ST"];
const ZIP_ALIASES: &[&str] = &[
    "Zip",
    "ZIP",
    "ZipCode",
    "Zip Code",
    "PostalCode",
    "Postal Code",
];

/// Address sent to the empowerment-zone API. Fields are trimmed on the way in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(default)]
pub struct Address {
    #[schema(example = "100 Main St")]
    pub street: String,
    #[schema(example = "Dayton")]
    pub city: String,
    #[schema(example = "OH")]
    pub state: String,
    #[schema(example = "45402")]
    pub zip: String,
}

impl Address {
    pub fn trimmed(self) -> Self {
        Self {
            street: self.street.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            zip: self.zip.trim().to_string(),
        }
    }

    /// Picks the address out of an uploaded row, matching column names
    /// case-insensitively against the known aliases.
    pub fn from_record(record: &Record) -> Self {
        Self {
            street: field(record, STREET_ALIASES),
            city: field(record, CITY_ALIASES),
            state: field(record, STATE_ALIASES),
            zip: field(record, ZIP_ALIASES),
        }
    }

    pub fn is_complete(&self) -> bool {
        [&self.street, &self.city, &self.state, &self.zip]
            .iter()
            .all(|f| !f.is_empty())
    }
}

/// First column (in row order) whose name matches one of `aliases`.
fn field(record: &Record, aliases: &[&str]) -> String {
    record
        .iter()
        .find(|(key, _)| aliases.iter().any(|a| a.eq_ignore_ascii_case(key)))
        .map(|(_, value)| match value {
            Value::Null => String::new(),
            Value::String(s) => s.trim().to_string(),
            other => other.to_string().trim().to_string(),
        })
        .unwrap_or_default()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ZoneLookup {
    pub census_tract: String,
    pub zone: String,
    /// True when the address was incomplete and no lookup was attempted
    pub missing_address: bool,
}

impl ZoneLookup {
    pub fn missing_address() -> Self {
        Self {
            missing_address: true,
            ..Self::default()
        }
    }

    /// Lookup attempted but nothing usable came back.
    pub fn unresolved() -> Self {
        Self::default()
    }
}

/// Why a lookup came back empty. Only ever logged.
#[derive(Debug, Display)]
pub enum ZoneLookupError {
    #[display(fmt = "zone API request failed: {}", _0)]
    Transport(reqwest::Error),
    #[display(fmt = "zone API returned {}", _0)]
    Status(StatusCode),
    #[display(fmt = "zone API response was not JSON: {}", _0)]
    Decode(reqwest::Error),
}

impl std::error::Error for ZoneLookupError {}

/// Client for the empowerment-zone API, shared through `web::Data`.
#[derive(Debug, Clone)]
pub struct ZoneClient {
    client: Client,
    base_url: String,
}

impl ZoneClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url: base_url.into(),
        })
    }

    /// Never fails: an incomplete address short-circuits, and any upstream
    /// error is logged and reported as an empty result.
    pub async fn lookup(&self, address: &Address) -> ZoneLookup {
        if !address.is_complete() {
            return ZoneLookup::missing_address();
        }

        match self.fetch(address).await {
            Ok(lookup) => lookup,
            Err(e) => {
                warn!(error = %e, zip = %address.zip, "Zone lookup failed");
                ZoneLookup::unresolved()
            }
        }
    }

    async fn fetch(&self, address: &Address) -> Result<ZoneLookup, ZoneLookupError> {
        debug!(street = %address.street, city = %address.city, zip = %address.zip, "Zone lookup");

        let resp = self
            .client
            .get(&self.base_url)
            .header(ACCEPT, "*/*")
            .query(&[
                ("Street", address.street.as_str()),
                ("City", address.city.as_str()),
                ("Zip", address.zip.as_str()),
                ("State", address.state.as_str()),
            ])
            .send()
            .await
            .map_err(ZoneLookupError::Transport)?;

        if !resp.status().is_success() {
            return Err(ZoneLookupError::Status(resp.status()));
        }

        let body: Value = resp.json().await.map_err(ZoneLookupError::Decode)?;
        Ok(ZoneLookup {
            census_tract: string_field(&body, "censusTract"),
            zone: string_field(&body, "zone"),
            missing_address: false,
        })
    }

    /// Enriches uploaded rows one at a time, in order. Returns the rows with
    /// `censusTract`/`zone` set and how many had a complete address.
    pub async fn enrich(&self, records: Vec<Record>) -> (Vec<Record>, usize) {
        let mut with_address = 0;
        let mut enriched = Vec::with_capacity(records.len());

        for mut record in records {
            let address = Address::from_record(&record);
            let lookup = self.lookup(&address).await;
            if !lookup.missing_address {
                with_address += 1;
            }
            record.insert("censusTract".to_string(), Value::String(lookup.census_tract));
            record.insert("zone".to_string(), Value::String(lookup.zone));
            enriched.push(record);
        }

        (enriched, with_address)
    }
}

fn string_field(body: &Value, key: &str) -> String {
    body.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ZONE_PATH: &str = "/api/v1/taxCredits/GetEmpowermentZone";

    fn address() -> Address {
        Address {
            street: "100 Main St".into(),
            city: "Dayton".into(),
            state: "OH".into(),
            zip: "45402".into(),
        }
    }

    fn client(server: &MockServer) -> ZoneClient {
        ZoneClient::new(format!("{}{}", server.uri(), ZONE_PATH)).unwrap()
    }

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn aliases_match_case_insensitively() {
        let row = record(json!({
            "Employee": "Ada",
            "ADDRESS 1": " 100 Main St ",
            "city": "Dayton",
            "st": "OH",
            "postal code": 45402
        }));
        assert_eq!(Address::from_record(&row), address());
    }

    #[test]
    fn first_matching_column_wins() {
        let row = record(json!({ "Zip": "", "ZipCode": "45402" }));
        assert_eq!(Address::from_record(&row).zip, "");
    }

    #[tokio::test]
    async fn empty_zip_short_circuits_without_a_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut addr = address();
        addr.zip = "   ".into();
        let lookup = client(&server).lookup(&addr.trimmed()).await;

        assert_eq!(lookup, ZoneLookup::missing_address());
        assert_eq!(
            serde_json::to_value(&lookup).unwrap(),
            json!({ "censusTract": "", "zone": "", "missingAddress": true })
        );
    }

    #[tokio::test]
    async fn successful_lookup_passes_address_as_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ZONE_PATH))
            .and(query_param("Street", "100 Main St"))
            .and(query_param("City", "Dayton"))
            .and(query_param("Zip", "45402"))
            .and(query_param("State", "OH"))
            .and(header("accept", "*/*"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "censusTract": "39113003400", "zone": "EZ-7" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let lookup = client(&server).lookup(&address()).await;
        assert_eq!(lookup.census_tract, "39113003400");
        assert_eq!(lookup.zone, "EZ-7");
        assert!(!lookup.missing_address);
    }

    #[tokio::test]
    async fn non_string_fields_become_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "censusTract": 12, "zone": null })),
            )
            .mount(&server)
            .await;

        assert_eq!(client(&server).lookup(&address()).await, ZoneLookup::unresolved());
    }

    #[tokio::test]
    async fn upstream_failure_is_absorbed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let lookup = client(&server).lookup(&address()).await;
        assert_eq!(lookup, ZoneLookup::unresolved());
    }

    #[tokio::test]
    async fn unreachable_api_is_absorbed() {
        let lookup = ZoneClient::new("http://127.0.0.1:1/zone")
            .unwrap()
            .lookup(&address())
            .await;
        assert_eq!(lookup, ZoneLookup::unresolved());
    }

    #[tokio::test]
    async fn batch_counts_complete_addresses_even_when_lookup_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("Zip", "45402"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "censusTract": "1", "zone": "A" })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("Zip", "99999"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let rows = vec![
            record(json!({ "Name": "Ada", "Street": "100 Main St", "City": "Dayton", "State": "OH", "Zip": "45402" })),
            record(json!({ "Name": "Bob", "Street": "", "City": "Dayton", "State": "OH", "Zip": "45402" })),
            record(json!({ "Name": "Cy", "Street": "1 Elm", "City": "Nowhere", "State": "OH", "Zip": "99999", "zone": "old" })),
        ];

        let (enriched, with_address) = client(&server).enrich(rows).await;

        assert_eq!(with_address, 2);
        assert_eq!(enriched.len(), 3);
        assert_eq!(enriched[0]["zone"], json!("A"));
        assert_eq!(enriched[1]["censusTract"], json!(""));
        assert_eq!(enriched[2]["zone"], json!(""));
        assert_eq!(enriched[2]["Name"], json!("Cy"));
    }
}
