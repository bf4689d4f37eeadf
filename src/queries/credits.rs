use crate::utils::db_utils::SqlValue;
use crate::utils::filters::{CreditFilter, DateRange, Metric};
use crate::utils::pagination::Window;
use crate::utils::query_builder::SqlQuery;

/// Every credit query starts from the credit row, joined to its employee and
/// (optionally) the employee's location, restricted to the hire-date range.
const CREDIT_JOIN: &str = r#"
    FROM wotcempcredits ec
    JOIN wotcemployee e
      ON e.id = ec.EmpID
    LEFT JOIN locations l
      ON e.LocationID = l.id
    WHERE e.datehired BETWEEN ? AND ?
"#;

pub(crate) fn range_values(range: &DateRange) -> [SqlValue; 2] {
    [SqlValue::Date(range.from), SqlValue::Date(range.to)]
}

/// `FROM ... WHERE e.datehired BETWEEN ? AND ?` with the hire range bound.
fn credit_join(select: &str, filter: &CreditFilter) -> SqlQuery {
    let mut query = SqlQuery::new(select);
    query.push(CREDIT_JOIN);
    for value in range_values(&filter.range) {
        query.bind(value);
    }
    query
}

fn metric_predicate(query: &mut SqlQuery, metric: Metric, range: &DateRange) {
    match metric.predicate() {
        Some((condition, true)) => {
            query.and(condition, range_values(range));
        }
        Some((condition, false)) => {
            query.and(condition, Vec::new());
        }
        None => {}
    }
}

/// Company and location scope shared by the summary and the listings.
fn credit_scope(query: &mut SqlQuery, filter: &CreditFilter) {
    if let Some(customer_id) = filter.customer_id {
        query.and("l.customerid = ?", [SqlValue::U64(customer_id)]);
    }
    if let Some(location_id) = filter.location_id {
        query.and("e.LocationID = ?", [SqlValue::U64(location_id)]);
    }
}

/// Conditional aggregation into the six buckets. The bucket ranges are bound
/// before the hire range because they appear first in the text.
pub fn summary(filter: &CreditFilter) -> SqlQuery {
    let mut query = SqlQuery::new(
        r#"
        SELECT
          COUNT(*) AS screened,
          SUM(CASE WHEN ec.sent = 1 THEN 1 ELSE 0 END) AS qualified,
          SUM(CASE WHEN ec.sent = 0 THEN 1 ELSE 0 END) AS nonQualified,
          SUM(CASE WHEN ec.sent = 1 AND ec.CertifiedDate BETWEEN ? AND ? THEN 1 ELSE 0 END) AS totalCerts,
          SUM(CASE WHEN ec.sent = 1 AND ec.DeniedDate BETWEEN ? AND ? THEN 1 ELSE 0 END) AS totalDenials,
          SUM(CASE WHEN ec.sent = 1 AND ec.DPC = 2 AND ec.PendingDate BETWEEN ? AND ? THEN 1 ELSE 0 END) AS totalPending
        "#,
    );
    // certified, denied, pending, then hired
    for _ in 0..4 {
        for value in range_values(&filter.range) {
            query.bind(value);
        }
    }
    query.push(CREDIT_JOIN);
    credit_scope(&mut query, filter);
    query
}

pub fn employees(filter: &CreditFilter, metric: Metric, limit: u64) -> SqlQuery {
    let mut query = credit_join(
        r#"
        SELECT
          e.id,
          e.FirstName,
          e.LastName,
          e.SSN,
          e.datehired,
          e.LocationID,
          l.Name AS LocationName,
          l.City,
          l.State,
          ec.CertifiedDate,
          ec.DeniedDate,
          ec.PendingDate,
          ec.sent,
          ec.DPC
        "#,
        filter,
    );
    metric_predicate(&mut query, metric, &filter.range);
    credit_scope(&mut query, filter);
    query
        .push("ORDER BY e.datehired DESC")
        .window(Window::Limit(limit));
    query
}

/// Raw credit rows behind the summary, newest hire first.
pub fn raw_credits(filter: &CreditFilter) -> SqlQuery {
    let mut query = credit_join("SELECT ec.*", filter);
    credit_scope(&mut query, filter);
    query.push("ORDER BY e.datehired DESC");
    query
}

pub fn employees_export(filter: &CreditFilter, metric: Metric) -> SqlQuery {
    let mut query = credit_join("SELECT DISTINCT e.*", filter);
    metric_predicate(&mut query, metric, &filter.range);
    credit_scope(&mut query, filter);
    query.push("ORDER BY e.datehired DESC");
    query
}

/// Active companies with at least one hire in range.
pub fn companies_export(filter: &CreditFilter) -> SqlQuery {
    let mut query = SqlQuery::new(
        r#"
        SELECT DISTINCT c.*
        FROM customers c
        JOIN locations l
          ON l.customerid = c.CustomerID
        JOIN wotcemployee e
          ON e.LocationID = l.id
        WHERE c.Inactive = 0
          AND e.datehired BETWEEN ? AND ?
        "#,
    );
    for value in range_values(&filter.range) {
        query.bind(value);
    }
    if let Some(customer_id) = filter.customer_id {
        query.and("c.CustomerID = ?", [SqlValue::U64(customer_id)]);
    }
    if let Some(location_id) = filter.location_id {
        query.and("l.id = ?", [SqlValue::U64(location_id)]);
    }
    if let Some(q) = &filter.q {
        query.and_like_any(&["c.Name"], q);
    }
    query.push("ORDER BY c.Name");
    query
}

/// Active locations with at least one hire in range.
pub fn locations_export(filter: &CreditFilter) -> SqlQuery {
    let mut query = SqlQuery::new(
        r#"
        SELECT DISTINCT l.*
        FROM locations l
        JOIN wotcemployee e
          ON e.LocationID = l.id
        JOIN customers c
          ON c.CustomerID = l.customerid
        WHERE l.inactive = 0
          AND e.datehired BETWEEN ? AND ?
        "#,
    );
    for value in range_values(&filter.range) {
        query.bind(value);
    }
    if let Some(customer_id) = filter.customer_id {
        query.and("c.CustomerID = ?", [SqlValue::U64(customer_id)]);
    }
    if let Some(location_id) = filter.location_id {
        query.and("l.id = ?", [SqlValue::U64(location_id)]);
    }
    if let Some(q) = &filter.q {
        query.and_like_any(&["l.Name", "l.City", "l.State", "l.Zip"], q);
    }
    query.push("ORDER BY l.Name");
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::query_builder::placeholders;
    use chrono::NaiveDate;
    use strum::IntoEnumIterator;

    fn filter(customer_id: Option<u64>, location_id: Option<u64>) -> CreditFilter {
        CreditFilter {
            range: DateRange {
                from: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                to: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            },
            customer_id,
            location_id,
            q: None,
        }
    }

    fn from() -> SqlValue {
        SqlValue::Date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
    }

    fn to() -> SqlValue {
        SqlValue::Date(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap())
    }

    #[test]
    fn summary_binds_bucket_ranges_then_hire_range_then_scope() {
        let query = summary(&filter(Some(7), Some(11)));

        let mut expected = Vec::new();
        for _ in 0..4 {
            expected.push(from());
            expected.push(to());
        }
        expected.push(SqlValue::U64(7));
        expected.push(SqlValue::U64(11));

        assert_eq!(query.values(), expected.as_slice());
        assert_eq!(placeholders(query.sql()), query.values().len());
        assert!(query
            .sql()
            .ends_with("AND l.customerid = ? AND e.LocationID = ?"));
    }

    #[test]
    fn summary_without_scope() {
        let query = summary(&filter(None, None));
        assert_eq!(query.values().len(), 8);
        assert!(!query.sql().contains("l.customerid"));
        assert!(query.sql().contains("COUNT(*) AS screened"));
    }

    #[test]
    fn every_metric_keeps_binds_aligned() {
        for metric in Metric::iter() {
            let query = employees(&filter(Some(3), None), metric, 200);
            assert_eq!(
                placeholders(query.sql()),
                query.values().len(),
                "{metric}"
            );
            assert!(query.sql().ends_with("ORDER BY e.datehired DESC LIMIT 200"));
        }
    }

    #[test]
    fn dated_metrics_rebind_the_range_before_scope() {
        let query = employees(&filter(Some(3), None), Metric::Pending, 50);
        assert!(query
            .sql()
            .contains("AND ec.sent = 1 AND ec.DPC = 2 AND ec.PendingDate BETWEEN ? AND ?"));
        assert_eq!(
            query.values(),
            &[from(), to(), from(), to(), SqlValue::U64(3)]
        );
    }

    #[test]
    fn undated_metrics_add_no_binds() {
        let query = employees(&filter(None, None), Metric::NonQualified, 10);
        assert!(query.sql().contains("AND ec.sent = 0"));
        assert_eq!(query.values(), &[from(), to()]);

        let query = employees(&filter(None, None), Metric::Screened, 10);
        assert!(!query.sql().contains("ec.sent ="));
    }

    #[test]
    fn raw_credits_ignore_metric_but_keep_scope() {
        let query = raw_credits(&filter(None, Some(4)));
        assert!(query.sql().starts_with("SELECT ec.*"));
        assert_eq!(query.values(), &[from(), to(), SqlValue::U64(4)]);
    }

    #[test]
    fn company_export_filters_by_company_and_location_ids() {
        let mut f = filter(Some(1), Some(2));
        f.q = Some("acme".into());
        let query = companies_export(&f);
        assert!(query.sql().contains("AND c.CustomerID = ? AND l.id = ? AND (c.Name LIKE ?)"));
        assert_eq!(
            query.values(),
            &[
                from(),
                to(),
                SqlValue::U64(1),
                SqlValue::U64(2),
                SqlValue::String("%acme%".into())
            ]
        );
        assert!(query.sql().ends_with("ORDER BY c.Name"));
    }

    #[test]
    fn location_export_searches_four_columns() {
        let mut f = filter(None, None);
        f.q = Some("44".into());
        let query = locations_export(&f);
        assert_eq!(query.values().len(), 6);
        assert_eq!(placeholders(query.sql()), 6);
    }

    #[test]
    fn employee_export_uses_distinct_employees() {
        let query = employees_export(&filter(None, None), Metric::Certs);
        assert!(query.sql().starts_with("SELECT DISTINCT e.*"));
        assert!(query.sql().contains("ec.CertifiedDate BETWEEN ? AND ?"));
        assert_eq!(query.values().len(), 4);
    }
}
