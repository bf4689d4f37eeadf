use chrono::NaiveDate;
use serde::Serialize;
use sqlx::mysql::MySqlRow;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::utils::db_utils::{get_f64, get_i64, get_opt_date, get_opt_i64, get_opt_string};

/// An employee of one location with wage totals and latest credit outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[schema(
    example = json!({
        "id": 5012,
        "FirstName": "John",
        "LastName": "Doe",
        "SSN": "123-45-6789",
        "datehired": "2025-01-06",
        "termdate": null,
        "Inactive": 0,
        "TotalWages": 10250.5,
        "TotalHours": 640.0,
        "LatestCertifiedDate": "2025-04-02",
        "LatestDeniedDate": null
    })
)]
pub struct LocationEmployee {
    pub id: i64,
    #[serde(rename = "FirstName")]
    pub first_name: Option<String>,
    #[serde(rename = "LastName")]
    pub last_name: Option<String>,
    #[serde(rename = "SSN")]
    pub ssn: Option<String>,
    #[serde(rename = "datehired")]
    #[schema(value_type = Option<String>, format = Date)]
    pub date_hired: Option<NaiveDate>,
    #[serde(rename = "termdate")]
    #[schema(value_type = Option<String>, format = Date)]
    pub term_date: Option<NaiveDate>,
    #[serde(rename = "Inactive")]
    pub inactive: Option<i64>,
    #[serde(rename = "TotalWages")]
    pub total_wages: f64,
    #[serde(rename = "TotalHours")]
    pub total_hours: f64,
    #[serde(rename = "LatestCertifiedDate")]
    #[schema(value_type = Option<String>, format = Date)]
    pub latest_certified_date: Option<NaiveDate>,
    #[serde(rename = "LatestDeniedDate")]
    #[schema(value_type = Option<String>, format = Date)]
    pub latest_denied_date: Option<NaiveDate>,
}

impl<'r> FromRow<'r, MySqlRow> for LocationEmployee {
    fn from_row(row: &'r MySqlRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: get_i64(row, "id")?,
            first_name: get_opt_string(row, "FirstName")?,
            last_name: get_opt_string(row, "LastName")?,
            ssn: get_opt_string(row, "SSN")?,
            date_hired: get_opt_date(row, "datehired")?,
            term_date: get_opt_date(row, "termdate")?,
            inactive: get_opt_i64(row, "Inactive")?,
            total_wages: get_f64(row, "TotalWages")?,
            total_hours: get_f64(row, "TotalHours")?,
            latest_certified_date: get_opt_date(row, "LatestCertifiedDate")?,
            latest_denied_date: get_opt_date(row, "LatestDeniedDate")?,
        })
    }
}
