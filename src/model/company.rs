use serde::Serialize;
use sqlx::mysql::MySqlRow;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::utils::db_utils::{get_i64, get_opt_i64, get_opt_string};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[schema(
    example = json!({
        "CustomerID": 42,
        "Name": "Acme Staffing",
        "LocationCount": 3,
        "EmployeeCount": 118
    })
)]
pub struct CompanySummary {
    #[serde(rename = "CustomerID")]
    pub customer_id: i64,
    #[serde(rename = "Name")]
    pub name: Option<String>,
    /// Active locations
    #[serde(rename = "LocationCount")]
    pub location_count: i64,
    /// Active employees across active locations
    #[serde(rename = "EmployeeCount")]
    pub employee_count: i64,
}

impl<'r> FromRow<'r, MySqlRow> for CompanySummary {
    fn from_row(row: &'r MySqlRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            customer_id: get_i64(row, "CustomerID")?,
            name: get_opt_string(row, "Name")?,
            location_count: get_opt_i64(row, "LocationCount")?.unwrap_or(0),
            employee_count: get_opt_i64(row, "EmployeeCount")?.unwrap_or(0),
        })
    }
}

/// Main contact of a company, from `companycontactoverview`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CompanyContact {
    #[schema(example = "Jane Roe")]
    pub contactname: Option<String>,
    #[schema(example = "555-0100")]
    pub contactphone: Option<String>,
    #[schema(example = "jane@acme.example")]
    pub contactemail: Option<String>,
}

impl<'r> FromRow<'r, MySqlRow> for CompanyContact {
    fn from_row(row: &'r MySqlRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            contactname: get_opt_string(row, "contactname")?,
            contactphone: get_opt_string(row, "contactphone")?,
            contactemail: get_opt_string(row, "contactemail")?,
        })
    }
}
