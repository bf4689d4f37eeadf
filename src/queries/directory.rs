//! Company, location, employee and wage lookups.

use chrono::NaiveDate;

use crate::utils::db_utils::SqlValue;
use crate::utils::filters::DateRange;
use crate::utils::pagination::Window;
use crate::utils::query_builder::SqlQuery;

use super::credits::range_values;

const LOCATION_SEARCH_COLUMNS: [&str; 4] = ["l.Name", "l.City", "l.State", "l.Zip"];

/// Active companies with active location/employee counts.
pub fn companies(q: Option<&str>, window: Window) -> SqlQuery {
    let mut query = SqlQuery::new(
        r#"
        SELECT
          c.CustomerID,
          c.Name,
          COUNT(DISTINCT l.id) AS LocationCount,
          COUNT(DISTINCT e.id) AS EmployeeCount
        FROM customers c
        LEFT JOIN locations l
          ON l.customerid = c.CustomerID
          AND l.inactive = 0
        LEFT JOIN wotcemployee e
          ON e.LocationID = l.id
          AND e.Inactive = 0
        WHERE c.Inactive = 0
        "#,
    );
    if let Some(q) = q {
        query.and_like_any(&["c.Name"], q);
    }
    query
        .push("GROUP BY c.CustomerID, c.Name")
        .push("ORDER BY c.Name")
        .window(window);
    query
}

/// Counting needs no joins.
pub fn companies_count(q: Option<&str>) -> SqlQuery {
    let mut query = SqlQuery::new("SELECT COUNT(*) AS total FROM customers c WHERE c.Inactive = 0");
    if let Some(q) = q {
        query.and_like_any(&["c.Name"], q);
    }
    query
}

pub fn company(customer_id: u64) -> SqlQuery {
    let mut query = SqlQuery::new("SELECT * FROM customers WHERE CustomerID = ? LIMIT 1");
    query.bind(customer_id);
    query
}

pub fn company_contact(customer_id: u64) -> SqlQuery {
    let mut query = SqlQuery::new(
        r#"
        SELECT
          contactname,
          contactphone,
          contactemail
        FROM companycontactoverview
        WHERE customerid = ?
          AND maincontact = 1
        LIMIT 1
        "#,
    );
    query.bind(customer_id);
    query
}

pub fn company_locations(customer_id: u64, q: Option<&str>, window: Window) -> SqlQuery {
    let mut query = SqlQuery::new(
        r#"
        SELECT
          l.id,
          l.Name,
          l.City,
          l.State,
          l.Zip,
          l.latitude,
          l.longitude,
          COUNT(DISTINCT e.id) AS EmployeeCount,
          COALESCE(SUM(w.amount), 0) AS TotalWages,
          COALESCE(SUM(w.hours), 0) AS TotalHours
        FROM locations l
        LEFT JOIN wotcemployee e
          ON e.LocationID = l.id
          AND e.Inactive = 0
        LEFT JOIN wotcwages w
          ON w.employeeid = e.id
        WHERE l.customerid = ?
          AND l.inactive = 0
        "#,
    );
    query.bind(customer_id);
    if let Some(q) = q {
        query.and_like_any(&LOCATION_SEARCH_COLUMNS, q);
    }
    query.push("GROUP BY l.id").push("ORDER BY l.Name").window(window);
    query
}

pub fn company_locations_count(customer_id: u64, q: Option<&str>) -> SqlQuery {
    let mut query = SqlQuery::new(
        "SELECT COUNT(*) AS total FROM locations l WHERE l.customerid = ? AND l.inactive = 0",
    );
    query.bind(customer_id);
    if let Some(q) = q {
        query.and_like_any(&LOCATION_SEARCH_COLUMNS, q);
    }
    query
}

/// Location search across all companies (name, city, zip).
pub fn location_search(q: &str, window: Window) -> SqlQuery {
    let mut query = SqlQuery::new(
        r#"
        SELECT
          l.id,
          l.Name,
          l.City,
          l.State,
          l.Zip,
          l.latitude,
          l.longitude,
          c.CustomerID,
          c.Name AS CompanyName,
          COUNT(DISTINCT e.id) AS EmployeeCount
        FROM locations l
        JOIN customers c
          ON c.CustomerID = l.customerid
        LEFT JOIN wotcemployee e
          ON e.LocationID = l.id
          AND e.Inactive = 0
        WHERE l.inactive = 0
        "#,
    );
    query
        .and_like_any(&["l.Name", "l.City", "l.Zip"], q)
        .push("GROUP BY l.id, c.CustomerID")
        .push("ORDER BY l.Name")
        .window(window);
    query
}

pub fn location_search_count(q: &str) -> SqlQuery {
    let mut query = SqlQuery::new(
        r#"
        SELECT COUNT(*) AS total
        FROM locations l
        JOIN customers c
          ON c.CustomerID = l.customerid
        WHERE l.inactive = 0
        "#,
    );
    query.and_like_any(&["l.Name", "l.City", "l.Zip"], q);
    query
}

/// Employees of a location with wage totals and latest credit outcomes.
pub fn location_employees(location_id: u64, q: Option<&str>, limit: u64) -> SqlQuery {
    let mut query = SqlQuery::new(
        r#"
        SELECT
          e.id,
          e.FirstName,
          e.LastName,
          e.SSN,
          e.datehired,
          e.termdate,
          e.Inactive,
          COALESCE(SUM(w.amount), 0) AS TotalWages,
          COALESCE(SUM(w.hours), 0) AS TotalHours,
          MAX(cr.CertifiedDate) AS LatestCertifiedDate,
          MAX(cr.DeniedDate) AS LatestDeniedDate
        FROM wotcemployee e
        LEFT JOIN wotcwages w
          ON w.employeeid = e.id
        LEFT JOIN wotcempcredits cr
          ON cr.EmpID = e.id
        WHERE e.LocationID = ?
        "#,
    );
    query.bind(location_id);
    if let Some(q) = q {
        query.and_like_any(&["CONCAT(e.FirstName, ' ', e.LastName)", "e.SSN"], q);
    }
    query
        .push("GROUP BY e.id")
        .push("ORDER BY e.LastName, e.FirstName")
        .window(Window::Limit(limit));
    query
}

pub fn employees(range: &DateRange, window: Window) -> SqlQuery {
    let mut query = SqlQuery::new("SELECT * FROM wotcemployee WHERE datehired BETWEEN ? AND ?");
    for value in range_values(range) {
        query.bind(value);
    }
    query.push("ORDER BY datehired").window(window);
    query
}

pub fn employees_count(range: &DateRange) -> SqlQuery {
    let mut query =
        SqlQuery::new("SELECT COUNT(*) AS total FROM wotcemployee WHERE datehired BETWEEN ? AND ?");
    for value in range_values(range) {
        query.bind(value);
    }
    query
}

pub fn employee(employee_id: u64) -> SqlQuery {
    let mut query = SqlQuery::new("SELECT * FROM wotcemployee WHERE id = ? LIMIT 1");
    query.bind(employee_id);
    query
}

/// Pay periods of one employee; `from` bounds the period start and `to` its end.
pub fn wages(
    employee_id: u64,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    limit: u64,
) -> SqlQuery {
    let mut query = SqlQuery::new(
        r#"
        SELECT
          id,
          fromdate,
          todate,
          amount,
          hours,
          conid
        FROM wotcwages
        WHERE employeeid = ?
        "#,
    );
    query.bind(employee_id);
    if let Some(from) = from {
        query.and("fromdate >= ?", [SqlValue::Date(from)]);
    }
    if let Some(to) = to {
        query.and("todate <= ?", [SqlValue::Date(to)]);
    }
    query.push("ORDER BY fromdate").window(Window::Limit(limit));
    query
}
