use chrono::NaiveDate;
use serde::Deserialize;
use std::str::FromStr;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::{IntoParams, ToSchema};

use crate::error::{ApiError, ApiResult};

const MISSING_RANGE: &str =
    "Missing 'from' or 'to'. Pass both as query params (e.g. ?from=2025-01-01&to=2025-12-31).";
const INVALID_METRIC: &str =
    "Invalid 'metric'. Use one of: screened, qualified, nonQualified, certs, denials, pending.";

/// Raw query string of the credit endpoints; everything is validated by
/// [`CreditFilterQuery::parse`] so that bad input maps to our own 400 bodies.
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CreditFilterQuery {
    /// Start of the hire-date range, `YYYY-MM-DD`
    pub from: Option<String>,
    /// End of the hire-date range, `YYYY-MM-DD`
    pub to: Option<String>,
    #[serde(rename = "customerId")]
    pub customer_id: Option<String>,
    #[serde(rename = "locationId")]
    pub location_id: Option<String>,
    /// Free-text search
    pub q: Option<String>,
    /// screened | qualified | nonQualified | certs | denials | pending
    pub metric: Option<String>,
    pub limit: Option<String>,
}

/// Inclusive `[from, to]` date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// Both bounds are required; `from` may not be after `to`.
    pub fn parse(from: Option<&str>, to: Option<&str>) -> ApiResult<Self> {
        let (from, to) = match (non_blank(from), non_blank(to)) {
            (Some(from), Some(to)) => (from, to),
            _ => return Err(ApiError::missing(MISSING_RANGE)),
        };
        let from = parse_date("from", from)?;
        let to = parse_date("to", to)?;
        if from > to {
            return Err(ApiError::invalid("'from' must not be after 'to'"));
        }
        Ok(Self { from, to })
    }

    pub fn from_param(&self) -> String {
        self.from.format("%Y-%m-%d").to_string()
    }

    pub fn to_param(&self) -> String {
        self.to.format("%Y-%m-%d").to_string()
    }
}

/// Optional range used by the wage listing: each bound stands alone.
pub fn parse_optional_date(name: &str, raw: Option<&str>) -> ApiResult<Option<NaiveDate>> {
    non_blank(raw).map(|v| parse_date(name, v)).transpose()
}

fn parse_date(name: &str, raw: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ApiError::invalid(format!("'{name}' must be a date formatted YYYY-MM-DD")))
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|v| !v.is_empty())
}

/// `customerId` / `locationId`: absent or blank is `None`, anything else must
/// be a positive integer.
pub fn parse_optional_id(name: &str, raw: Option<&str>) -> ApiResult<Option<u64>> {
    match non_blank(raw) {
        None => Ok(None),
        Some(v) => match v.parse::<u64>() {
            Ok(id) if id > 0 => Ok(Some(id)),
            _ => Err(ApiError::invalid(format!("{name} must be a positive number"))),
        },
    }
}

/// Path ids (`/companies/{customerId}` ...).
pub fn parse_path_id(name: &str, raw: &str) -> ApiResult<u64> {
    match raw.trim().parse::<u64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::invalid(format!("Invalid {name}"))),
    }
}

/// Trimmed search term, `None` when blank.
pub fn search_term(raw: Option<&str>) -> Option<String> {
    non_blank(raw).map(str::to_string)
}

/// Which credit bucket a listing or export is restricted to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, AsRefStr, EnumString, EnumIter, ToSchema,
)]
pub enum Metric {
    #[default]
    #[strum(serialize = "screened")]
    Screened,
    #[strum(serialize = "qualified")]
    Qualified,
    #[strum(serialize = "nonQualified")]
    NonQualified,
    #[strum(serialize = "certs")]
    Certs,
    #[strum(serialize = "denials")]
    Denials,
    #[strum(serialize = "pending")]
    Pending,
}

impl Metric {
    /// `None` or blank is rejected; callers that default use [`Metric::parse_or_default`].
    pub fn parse(raw: Option<&str>) -> ApiResult<Self> {
        match non_blank(raw) {
            Some(v) => Metric::from_str(v).map_err(|_| ApiError::invalid(INVALID_METRIC)),
            None => Err(ApiError::invalid(INVALID_METRIC)),
        }
    }

    pub fn parse_or_default(raw: Option<&str>) -> ApiResult<Self> {
        match raw {
            None => Ok(Metric::default()),
            Some(_) => Metric::parse(raw),
        }
    }

    /// Predicate AND-ed onto the credit join, and whether it needs the date
    /// range bound once more.
    pub fn predicate(&self) -> Option<(&'static str, bool)> {
        match self {
            Metric::Screened => None,
            Metric::Qualified => Some(("ec.sent = 1", false)),
            Metric::NonQualified => Some(("ec.sent = 0", false)),
            Metric::Certs => Some(("ec.sent = 1 AND ec.CertifiedDate BETWEEN ? AND ?", true)),
            Metric::Denials => Some(("ec.sent = 1 AND ec.DeniedDate BETWEEN ? AND ?", true)),
            Metric::Pending => Some((
                "ec.sent = 1 AND ec.DPC = 2 AND ec.PendingDate BETWEEN ? AND ?",
                true,
            )),
        }
    }
}

/// Validated filters shared by the credit summary, listings and exports.
#[derive(Debug, Clone, PartialEq)]
pub struct CreditFilter {
    pub range: DateRange,
    pub customer_id: Option<u64>,
    pub location_id: Option<u64>,
    pub q: Option<String>,
}

impl CreditFilterQuery {
    pub fn parse(&self) -> ApiResult<CreditFilter> {
        let range = DateRange::parse(self.from.as_deref(), self.to.as_deref())?;
        let customer_id = parse_optional_id("customerId", self.customer_id.as_deref())?;
        let location_id = parse_optional_id("locationId", self.location_id.as_deref())?;

        Ok(CreditFilter {
            range,
            customer_id,
            location_id,
            q: search_term(self.q.as_deref()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn query(from: Option<&str>, to: Option<&str>) -> CreditFilterQuery {
        CreditFilterQuery {
            from: from.map(str::to_string),
            to: to.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn range_is_required() {
        let err = query(Some("2025-01-01"), None).parse().unwrap_err();
        assert!(matches!(err, ApiError::MissingParameter(_)));

        let err = query(Some("  "), Some("2025-12-31")).parse().unwrap_err();
        assert!(matches!(err, ApiError::MissingParameter(_)));
    }

    #[test]
    fn malformed_or_inverted_range_is_invalid() {
        let err = query(Some("2025-13-01"), Some("2025-12-31")).parse().unwrap_err();
        assert!(matches!(err, ApiError::InvalidParameter(_)));

        let err = query(Some("2025-06-01"), Some("2025-01-01")).parse().unwrap_err();
        assert_eq!(err, ApiError::invalid("'from' must not be after 'to'"));
    }

    #[test]
    fn ids_must_be_positive_integers() {
        let mut q = query(Some("2025-01-01"), Some("2025-12-31"));
        q.customer_id = Some("0".into());
        assert_eq!(
            q.parse().unwrap_err(),
            ApiError::invalid("customerId must be a positive number")
        );

        q.customer_id = Some("12".into());
        q.location_id = Some("abc".into());
        assert_eq!(
            q.parse().unwrap_err(),
            ApiError::invalid("locationId must be a positive number")
        );

        q.location_id = Some("".into());
        let filter = q.parse().unwrap();
        assert_eq!(filter.customer_id, Some(12));
        assert_eq!(filter.location_id, None);
    }

    #[test]
    fn search_term_is_trimmed() {
        let mut q = query(Some("2025-01-01"), Some("2025-12-31"));
        q.q = Some("  acme ".into());
        assert_eq!(q.parse().unwrap().q.as_deref(), Some("acme"));
        q.q = Some("   ".into());
        assert_eq!(q.parse().unwrap().q, None);
    }

    #[test]
    fn metric_names_round_trip_through_strum() {
        for metric in Metric::iter() {
            assert_eq!(Metric::parse(Some(metric.as_ref())).unwrap(), metric);
        }
        assert_eq!(Metric::NonQualified.to_string(), "nonQualified");
    }

    #[test]
    fn unknown_metric_is_invalid() {
        assert!(matches!(
            Metric::parse(Some("approved")),
            Err(ApiError::InvalidParameter(_))
        ));
        assert!(matches!(Metric::parse(None), Err(ApiError::InvalidParameter(_))));
        assert_eq!(Metric::parse_or_default(None).unwrap(), Metric::Screened);
    }

    #[test]
    fn path_ids() {
        assert_eq!(parse_path_id("customerId", "42").unwrap(), 42);
        assert_eq!(
            parse_path_id("customerId", "0").unwrap_err(),
            ApiError::invalid("Invalid customerId")
        );
        assert!(parse_path_id("employeeId", "x1").is_err());
    }

    #[test]
    fn optional_wage_dates() {
        assert_eq!(parse_optional_date("from", Some(" ")).unwrap(), None);
        assert_eq!(
            parse_optional_date("to", Some("2024-02-29")).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert!(parse_optional_date("to", Some("2023-02-29")).is_err());
    }
}
