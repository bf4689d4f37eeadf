use chrono::NaiveDate;
use serde::Serialize;
use sqlx::mysql::MySqlRow;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::utils::db_utils::{get_f64, get_i64, get_opt_date, get_opt_i64};

/// One pay period of an employee (`wotcwages`).
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Wage {
    #[schema(example = 88120)]
    pub id: i64,
    #[schema(value_type = Option<String>, format = Date, example = "2025-01-01")]
    pub fromdate: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date, example = "2025-01-15")]
    pub todate: Option<NaiveDate>,
    #[schema(example = 1520.75)]
    pub amount: f64,
    #[schema(example = 80.0)]
    pub hours: f64,
    pub conid: Option<i64>,
}

impl<'r> FromRow<'r, MySqlRow> for Wage {
    fn from_row(row: &'r MySqlRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: get_i64(row, "id")?,
            fromdate: get_opt_date(row, "fromdate")?,
            todate: get_opt_date(row, "todate")?,
            amount: get_f64(row, "amount")?,
            hours: get_f64(row, "hours")?,
            conid: get_opt_i64(row, "conid")?,
        })
    }
}
