use serde::Serialize;
use utoipa::ToSchema;

/// Average WOTC credit per certified employee, in dollars.
pub const AVERAGE_CREDIT: f64 = 1469.21;

/// Share of the credit billed as revenue.
pub const REVENUE_RATE: f64 = 0.2;

/// Expected share of pending determinations that end up certified.
pub const PENDING_CONVERSION: f64 = 0.5;

/// Inputs of the projection, overridable through configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreditRates {
    pub average_credit: f64,
    pub revenue_rate: f64,
}

impl Default for CreditRates {
    fn default() -> Self {
        Self {
            average_credit: AVERAGE_CREDIT,
            revenue_rate: REVENUE_RATE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreditEstimates {
    pub pending_credit: f64,
    pub pending_revenue: f64,
    pub certified_credit: f64,
    pub certified_revenue: f64,
    pub estimated_total: f64,
}

impl CreditEstimates {
    /// Projects dollar amounts from the certified and pending counts.
    pub fn derive(total_certs: i64, total_pending: i64, rates: CreditRates) -> Self {
        let pending_credit = total_pending as f64 * PENDING_CONVERSION * rates.average_credit;
        let pending_revenue = pending_credit * rates.revenue_rate;
        let certified_credit = total_certs as f64 * rates.average_credit;
        let certified_revenue = certified_credit * rates.revenue_rate;

        Self {
            pending_credit,
            pending_revenue,
            certified_credit,
            certified_revenue,
            estimated_total: pending_revenue + certified_revenue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ten_pending_is_half_of_ten_credits() {
        let e = CreditEstimates::derive(0, 10, CreditRates::default());
        assert_eq!(e.pending_credit, 7346.05);
        assert_eq!(e.pending_revenue, 1469.21);
        assert_eq!(e.certified_credit, 0.0);
        assert_eq!(e.estimated_total, e.pending_revenue);
    }

    #[test]
    fn certified_projection() {
        let e = CreditEstimates::derive(3, 0, CreditRates::default());
        assert_eq!(e.certified_credit, 3.0 * AVERAGE_CREDIT);
        assert_eq!(e.certified_revenue, 3.0 * AVERAGE_CREDIT * REVENUE_RATE);
    }

    #[test]
    fn rates_are_configurable() {
        let rates = CreditRates {
            average_credit: 2000.0,
            revenue_rate: 0.25,
        };
        let e = CreditEstimates::derive(2, 4, rates);
        assert_eq!(e.pending_credit, 4000.0);
        assert_eq!(e.pending_revenue, 1000.0);
        assert_eq!(e.certified_credit, 4000.0);
        assert_eq!(e.estimated_total, 2000.0);
    }

    #[test]
    fn serializes_camel_case() {
        let value = serde_json::to_value(CreditEstimates::derive(0, 0, CreditRates::default()))
            .unwrap();
        for key in [
            "pendingCredit",
            "pendingRevenue",
            "certifiedCredit",
            "certifiedRevenue",
            "estimatedTotal",
        ] {
            assert_eq!(value[key], 0.0, "{key}");
        }
    }

    proptest! {
        #[test]
        fn total_is_sum_of_revenues(certs in 0i64..1_000_000, pending in 0i64..1_000_000) {
            let e = CreditEstimates::derive(certs, pending, CreditRates::default());
            prop_assert_eq!(e.estimated_total, e.pending_revenue + e.certified_revenue);
            prop_assert!(e.estimated_total >= 0.0);
        }
    }
}
