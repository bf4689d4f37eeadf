use serde::Serialize;
use sqlx::mysql::MySqlRow;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::utils::db_utils::{get_f64, get_i64, get_opt_i64, get_opt_string};

/// A location of one company, with employee and wage totals.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LocationSummary {
    pub id: i64,
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "City")]
    pub city: Option<String>,
    #[serde(rename = "State")]
    pub state: Option<String>,
    #[serde(rename = "Zip")]
    pub zip: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    #[serde(rename = "EmployeeCount")]
    pub employee_count: i64,
    #[serde(rename = "TotalWages")]
    pub total_wages: f64,
    #[serde(rename = "TotalHours")]
    pub total_hours: f64,
}

impl<'r> FromRow<'r, MySqlRow> for LocationSummary {
    fn from_row(row: &'r MySqlRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: get_i64(row, "id")?,
            name: get_opt_string(row, "Name")?,
            city: get_opt_string(row, "City")?,
            state: get_opt_string(row, "State")?,
            zip: get_opt_string(row, "Zip")?,
            latitude: get_opt_string(row, "latitude")?,
            longitude: get_opt_string(row, "longitude")?,
            employee_count: get_opt_i64(row, "EmployeeCount")?.unwrap_or(0),
            total_wages: get_f64(row, "TotalWages")?,
            total_hours: get_f64(row, "TotalHours")?,
        })
    }
}

/// Cross-company location search hit.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LocationSearchResult {
    pub id: i64,
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "City")]
    pub city: Option<String>,
    #[serde(rename = "State")]
    pub state: Option<String>,
    #[serde(rename = "Zip")]
    pub zip: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    #[serde(rename = "CustomerID")]
    pub customer_id: i64,
    #[serde(rename = "CompanyName")]
    pub company_name: Option<String>,
    #[serde(rename = "EmployeeCount")]
    pub employee_count: i64,
}

impl<'r> FromRow<'r, MySqlRow> for LocationSearchResult {
    fn from_row(row: &'r MySqlRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: get_i64(row, "id")?,
            name: get_opt_string(row, "Name")?,
            city: get_opt_string(row, "City")?,
            state: get_opt_string(row, "State")?,
            zip: get_opt_string(row, "Zip")?,
            latitude: get_opt_string(row, "latitude")?,
            longitude: get_opt_string(row, "longitude")?,
            customer_id: get_i64(row, "CustomerID")?,
            company_name: get_opt_string(row, "CompanyName")?,
            employee_count: get_opt_i64(row, "EmployeeCount")?.unwrap_or(0),
        })
    }
}
