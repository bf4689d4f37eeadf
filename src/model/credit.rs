use chrono::NaiveDate;
use serde::Serialize;
use sqlx::mysql::MySqlRow;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::utils::credit_metrics::CreditEstimates;
use crate::utils::db_utils::{get_opt_date, get_opt_i64, get_opt_string, get_i64};

/// Raw bucket counts of the credits summary query. `SUM` over an empty set is
/// NULL in MySQL, so every bucket decodes NULL as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreditCounts {
    #[schema(example = 120)]
    pub screened: i64,
    #[schema(example = 80)]
    pub qualified: i64,
    #[schema(example = 40)]
    pub non_qualified: i64,
    #[schema(example = 25)]
    pub total_certs: i64,
    #[schema(example = 5)]
    pub total_denials: i64,
    #[schema(example = 10)]
    pub total_pending: i64,
}

impl<'r> FromRow<'r, MySqlRow> for CreditCounts {
    fn from_row(row: &'r MySqlRow) -> Result<Self, sqlx::Error> {
        let count = |column: &str| get_opt_i64(row, column).map(|v| v.unwrap_or(0));
        Ok(Self {
            screened: count("screened")?,
            qualified: count("qualified")?,
            non_qualified: count("nonQualified")?,
            total_certs: count("totalCerts")?,
            total_denials: count("totalDenials")?,
            total_pending: count("totalPending")?,
        })
    }
}

/// Response of `GET /api/credits/summary`: the counts plus the projections
/// derived from them, in one flat object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct CreditSummary {
    #[serde(flatten)]
    pub counts: CreditCounts,
    #[serde(flatten)]
    pub estimates: CreditEstimates,
}

/// One row of `GET /api/credits/employees`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CreditEmployee {
    #[schema(example = 5012)]
    pub id: i64,
    #[serde(rename = "FirstName")]
    pub first_name: Option<String>,
    #[serde(rename = "LastName")]
    pub last_name: Option<String>,
    #[serde(rename = "SSN")]
    pub ssn: Option<String>,
    #[serde(rename = "datehired")]
    #[schema(value_type = Option<String>, format = Date, example = "2025-03-14")]
    pub date_hired: Option<NaiveDate>,
    #[serde(rename = "LocationID")]
    pub location_id: Option<i64>,
    #[serde(rename = "LocationName")]
    pub location_name: Option<String>,
    #[serde(rename = "City")]
    pub city: Option<String>,
    #[serde(rename = "State")]
    pub state: Option<String>,
    /// `null` when not certified
    #[serde(rename = "CertifiedDate")]
    #[schema(value_type = Option<String>, format = Date)]
    pub certified_date: Option<NaiveDate>,
    #[serde(rename = "DeniedDate")]
    #[schema(value_type = Option<String>, format = Date)]
    pub denied_date: Option<NaiveDate>,
    #[serde(rename = "PendingDate")]
    #[schema(value_type = Option<String>, format = Date)]
    pub pending_date: Option<NaiveDate>,
    pub sent: Option<i64>,
    #[serde(rename = "DPC")]
    pub dpc: Option<i64>,
}

impl<'r> FromRow<'r, MySqlRow> for CreditEmployee {
    fn from_row(row: &'r MySqlRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: get_i64(row, "id")?,
            first_name: get_opt_string(row, "FirstName")?,
            last_name: get_opt_string(row, "LastName")?,
            ssn: get_opt_string(row, "SSN")?,
            date_hired: get_opt_date(row, "datehired")?,
            location_id: get_opt_i64(row, "LocationID")?,
            location_name: get_opt_string(row, "LocationName")?,
            city: get_opt_string(row, "City")?,
            state: get_opt_string(row, "State")?,
            certified_date: get_opt_date(row, "CertifiedDate")?,
            denied_date: get_opt_date(row, "DeniedDate")?,
            pending_date: get_opt_date(row, "PendingDate")?,
            sent: get_opt_i64(row, "sent")?,
            dpc: get_opt_i64(row, "DPC")?,
        })
    }
}
