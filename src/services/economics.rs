use serde::Serialize;

use crate::domain::numeric::{sanitize, Bounded};
use crate::domain::scenario::{weeks_in, Cash, Commercial, DAYS_PER_WEEK};

const DAYS_PER_MONTH: f64 = 30.0;
const MONTHS_PER_YEAR: f64 = 12.0;

/// Time-windowed economics of an achievable weekly flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Economics {
    pub units_window: f64,
    pub revenue_window: f64,
    pub gross_profit_window: f64,
    pub gross_profit_per_30_days: f64,
    pub revenue_per_headcount_ceiling: f64,
    /// GP30 / CAC.
    pub cash_efficiency_ratio: Bounded,
    pub cash_constrained: bool,
    /// `flow × ASP / sales cycle in weeks`.
    pub sales_velocity_per_week: f64,
    pub lifetime_value: Bounded,
    pub ltv_to_cac: Bounded,
    pub payback_months: Bounded,
}

/// Difference of two rollups; ratio deltas are `None` when either side is unbounded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EconomicsDelta {
    pub units_window: f64,
    pub revenue_window: f64,
    pub gross_profit_window: f64,
    pub revenue_per_headcount_ceiling: f64,
    pub sales_velocity_per_week: f64,
    pub cash_efficiency_ratio: Option<f64>,
    pub ltv_to_cac: Option<f64>,
}

impl Economics {
    /// `self − baseline`, field by field.
    pub fn delta_from(&self, baseline: &Economics) -> EconomicsDelta {
        EconomicsDelta {
            units_window: self.units_window - baseline.units_window,
            revenue_window: self.revenue_window - baseline.revenue_window,
            gross_profit_window: self.gross_profit_window - baseline.gross_profit_window,
            revenue_per_headcount_ceiling: self.revenue_per_headcount_ceiling
                - baseline.revenue_per_headcount_ceiling,
            sales_velocity_per_week: self.sales_velocity_per_week
                - baseline.sales_velocity_per_week,
            cash_efficiency_ratio: bounded_delta(
                self.cash_efficiency_ratio,
                baseline.cash_efficiency_ratio,
            ),
            ltv_to_cac: bounded_delta(self.ltv_to_cac, baseline.ltv_to_cac),
        }
    }
}

fn bounded_delta(current: Bounded, baseline: Bounded) -> Option<f64> {
    Some(current.finite()? - baseline.finite()?)
}

/// Rolls a weekly system flow up into window economics.
///
/// Every division is guarded: zero headcount gives a zero ceiling, zero CAC
/// or churn gives an unbounded ratio. Nothing here fails.
pub fn rollup(
    system_flow_per_week: f64,
    window_days: f64,
    commercial: &Commercial,
    headcount: f64,
    cash: &Cash,
    cash_efficiency_threshold: f64,
) -> Economics {
    let flow = sanitize(system_flow_per_week);
    let window_days = sanitize(window_days);
    let price = sanitize(commercial.average_selling_price);
    let margin = sanitize(commercial.gross_margin);
    let headcount = sanitize(headcount);
    let cac = sanitize(cash.cac);

    let units_window = flow * weeks_in(window_days);
    let revenue_window = units_window * price;
    let gross_profit_window = revenue_window * margin;
    let revenue_per_headcount_ceiling = if headcount > 0.0 {
        gross_profit_window / headcount
    } else {
        0.0
    };

    let gross_profit_per_30_days = if window_days > 0.0 {
        gross_profit_window / window_days * DAYS_PER_MONTH
    } else {
        0.0
    };
    let cash_efficiency_ratio = Bounded::ratio(gross_profit_per_30_days, cac);
    let cash_constrained = match cash_efficiency_ratio {
        Bounded::Finite(ratio) => ratio > 0.0 && ratio < cash_efficiency_threshold,
        Bounded::Unbounded => false,
    };

    let cycle_weeks = sanitize(commercial.sales_cycle_days) / DAYS_PER_WEEK;
    let sales_velocity_per_week = flow * price / if cycle_weeks > 0.0 { cycle_weeks } else { 1.0 };

    let gross_margin_per_customer = price * margin;
    let lifetime_value = Bounded::ratio(gross_margin_per_customer, commercial.churn_monthly);
    let ltv_to_cac = lifetime_value.divide_by(cac);
    let payback_months = Bounded::ratio(cac, gross_margin_per_customer / MONTHS_PER_YEAR);

    Economics {
        units_window,
        revenue_window,
        gross_profit_window,
        gross_profit_per_30_days,
        revenue_per_headcount_ceiling,
        cash_efficiency_ratio,
        cash_constrained,
        sales_velocity_per_week,
        lifetime_value,
        ltv_to_cac,
        payback_months,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commercial() -> Commercial {
        Commercial::new(1000.0, 0.8, 14.0)
    }

    fn cash(cac: f64) -> Cash {
        Cash {
            cac,
            ..Cash::default()
        }
    }

    #[test]
    fn rollup_matches_worked_delivery_example() {
        let economics = rollup(8.0, 90.0, &commercial(), 10.0, &cash(2000.0), 3.0);

        assert!((economics.units_window - 102.857_142_857).abs() < 1e-6);
        assert!((economics.revenue_window - 102_857.142_857).abs() < 1e-3);
        assert!((economics.gross_profit_window - 82_285.714_286).abs() < 1e-3);
        assert!((economics.revenue_per_headcount_ceiling - 8_228.571_428).abs() < 1e-3);
    }

    #[test]
    fn cash_efficiency_uses_gross_profit_per_thirty_days() {
        let economics = rollup(8.0, 90.0, &commercial(), 10.0, &cash(2000.0), 3.0);
        let gp30 = economics.gross_profit_window / 90.0 * 30.0;

        assert!((economics.gross_profit_per_30_days - gp30).abs() < 1e-9);
        let ratio = economics.cash_efficiency_ratio.finite().unwrap();
        assert!((ratio - gp30 / 2000.0).abs() < 1e-9);
        assert!(!economics.cash_constrained);
    }

    #[test]
    fn low_cash_efficiency_flags_cash_constraint() {
        let economics = rollup(8.0, 90.0, &commercial(), 10.0, &cash(20_000.0), 3.0);
        let ratio = economics.cash_efficiency_ratio.finite().unwrap();
        assert!(ratio > 0.0 && ratio < 3.0);
        assert!(economics.cash_constrained);
    }

    #[test]
    fn zero_denominators_yield_zero_ceiling_or_unbounded_ratio() {
        let economics = rollup(8.0, 90.0, &commercial(), 0.0, &cash(0.0), 3.0);

        assert_eq!(economics.revenue_per_headcount_ceiling, 0.0);
        assert_eq!(economics.cash_efficiency_ratio, Bounded::Unbounded);
        assert!(!economics.cash_constrained);
        assert_eq!(economics.ltv_to_cac, Bounded::Unbounded);
    }

    #[test]
    fn zero_window_produces_zero_economics() {
        let economics = rollup(8.0, 0.0, &commercial(), 10.0, &cash(2000.0), 3.0);
        assert_eq!(economics.revenue_window, 0.0);
        assert_eq!(economics.gross_profit_per_30_days, 0.0);
        assert_eq!(economics.cash_efficiency_ratio, Bounded::Finite(0.0));
        assert!(!economics.cash_constrained);
    }

    #[test]
    fn sales_velocity_divides_by_cycle_weeks() {
        let economics = rollup(8.0, 90.0, &commercial(), 10.0, &cash(2000.0), 3.0);
        assert_eq!(economics.sales_velocity_per_week, 4000.0);

        let no_cycle = Commercial::new(1000.0, 0.8, 0.0);
        let economics = rollup(8.0, 90.0, &no_cycle, 10.0, &cash(2000.0), 3.0);
        assert_eq!(economics.sales_velocity_per_week, 8000.0);
    }

    #[test]
    fn lifetime_value_and_payback_follow_unit_economics() {
        let mut commercial = Commercial::new(12_000.0, 0.8, 42.0);
        commercial.churn_monthly = 0.02;
        let economics = rollup(1.0, 90.0, &commercial, 10.0, &cash(2400.0), 3.0);

        assert_eq!(economics.lifetime_value, Bounded::Finite(480_000.0));
        assert_eq!(economics.ltv_to_cac, Bounded::Finite(200.0));
        assert_eq!(economics.payback_months, Bounded::Finite(3.0));

        commercial.churn_monthly = 0.0;
        let economics = rollup(1.0, 90.0, &commercial, 10.0, &cash(2400.0), 3.0);
        assert_eq!(economics.lifetime_value, Bounded::Unbounded);
        assert_eq!(economics.ltv_to_cac, Bounded::Unbounded);
    }

    #[test]
    fn payback_is_unbounded_without_margin() {
        let commercial = Commercial::new(0.0, 0.8, 42.0);
        let economics = rollup(1.0, 90.0, &commercial, 10.0, &cash(2400.0), 3.0);
        assert_eq!(economics.payback_months, Bounded::Unbounded);
    }

    #[test]
    fn delta_reports_none_for_unbounded_ratios() {
        let base = rollup(8.0, 90.0, &commercial(), 10.0, &cash(0.0), 3.0);
        let better = rollup(10.0, 90.0, &commercial(), 10.0, &cash(0.0), 3.0);
        let delta = better.delta_from(&base);

        assert!(delta.gross_profit_window > 0.0);
        assert_eq!(delta.cash_efficiency_ratio, None);

        let unchanged = base.delta_from(&base);
        assert_eq!(unchanged.gross_profit_window, 0.0);
        assert_eq!(unchanged.ltv_to_cac, None);
    }
}
