use serde::Serialize;

use crate::domain::funnel::ConversionRates;
use crate::domain::numeric::sanitize;
use crate::domain::stage::{BacklogItem, Stage};

pub const DAYS_PER_WEEK: f64 = 7.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Offer {
    pub name: String,
    pub average_selling_price: f64,
    pub gross_margin: f64,
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Commercial {
    pub average_selling_price: f64,
    pub gross_margin: f64,
    pub sales_cycle_days: f64,
    pub churn_monthly: f64,
    /// Offer mix the price and margin were weighted from, if any.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub offers: Vec<Offer>,
}

impl Commercial {
    pub fn new(average_selling_price: f64, gross_margin: f64, sales_cycle_days: f64) -> Self {
        Self {
            average_selling_price,
            gross_margin,
            sales_cycle_days,
            churn_monthly: 0.0,
            offers: Vec::new(),
        }
    }

    /// Weighted ASP is `Σ asp × share`; weighted margin is `Σ gm × share / Σ share`.
    pub fn from_offers(offers: Vec<Offer>, sales_cycle_days: f64, churn_monthly: f64) -> Self {
        let average_selling_price: f64 = offers
            .iter()
            .map(|offer| sanitize(offer.average_selling_price) * sanitize(offer.share))
            .sum();
        let share_total: f64 = offers.iter().map(|offer| sanitize(offer.share)).sum();
        let margin_total: f64 = offers
            .iter()
            .map(|offer| sanitize(offer.gross_margin) * sanitize(offer.share))
            .sum();
        let gross_margin = if share_total > 0.0 {
            margin_total / share_total
        } else {
            margin_total
        };

        Self {
            average_selling_price,
            gross_margin,
            sales_cycle_days,
            churn_monthly,
            offers,
        }
    }
}

/// Post-sale capacity. An explicit weekly capacity wins over the stage roster.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Delivery {
    pub capacity_per_week: Option<f64>,
    pub onboarding_days: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stages: Vec<Stage>,
}

impl Delivery {
    pub fn with_capacity(capacity_per_week: f64) -> Self {
        Self {
            capacity_per_week: Some(capacity_per_week),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Cash {
    pub cac: f64,
    pub payback_days: f64,
    pub dso: f64,
    pub prepay_share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadcountRow {
    pub role: String,
    pub fte: f64,
    pub contractors: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Headcount {
    pub total: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roster: Vec<HeadcountRow>,
}

impl Headcount {
    pub fn from_total(total: f64) -> Self {
        Self {
            total,
            roster: Vec::new(),
        }
    }

    /// Total is `Σ (fte + contractors)`.
    pub fn from_roster(roster: Vec<HeadcountRow>) -> Self {
        let total = roster
            .iter()
            .map(|row| sanitize(row.fte) + sanitize(row.contractors))
            .sum();
        Self { total, roster }
    }
}

/// One immutable bundle of pipeline inputs.
///
/// `stages` runs from the top of the funnel to the terminal "won" stage;
/// `conversion_rates[i]` converts stage `i` into stage `i + 1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    pub name: String,
    pub window_days: f64,
    pub stages: Vec<Stage>,
    pub conversion_rates: ConversionRates,
    /// Units entering the first stage during the window, when known.
    pub inbound_volume: Option<f64>,
    pub commercial: Commercial,
    pub delivery: Delivery,
    pub cash: Cash,
    pub headcount: Headcount,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub backlog: Vec<BacklogItem>,
    pub no_show_rate: Option<f64>,
}

impl Scenario {
    pub fn weeks_in_window(&self) -> f64 {
        weeks_in(self.window_days)
    }

    pub fn queued_units(&self, stage_id: &str) -> f64 {
        self.backlog
            .iter()
            .filter(|item| item.stage_id == stage_id)
            .map(|item| sanitize(item.queued_units))
            .sum()
    }
}

/// `window_days / 7`, or `0` for a non-positive window.
pub fn weeks_in(window_days: f64) -> f64 {
    sanitize(window_days) / DAYS_PER_WEEK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offer_mix_weights_price_and_margin_by_share() {
        let commercial = Commercial::from_offers(
            vec![
                Offer {
                    name: "Marketplace SaaS".to_string(),
                    average_selling_price: 6500.0,
                    gross_margin: 0.78,
                    share: 0.7,
                },
                Offer {
                    name: "Enterprise Add-on".to_string(),
                    average_selling_price: 18000.0,
                    gross_margin: 0.72,
                    share: 0.3,
                },
            ],
            42.0,
            0.02,
        );

        assert!((commercial.average_selling_price - 9950.0).abs() < 1e-9);
        assert!((commercial.gross_margin - 0.762).abs() < 1e-9);
        assert_eq!(commercial.offers.len(), 2);
    }

    #[test]
    fn offer_mix_without_shares_keeps_margin_finite() {
        let commercial = Commercial::from_offers(
            vec![Offer {
                name: "Pilot".to_string(),
                average_selling_price: 1000.0,
                gross_margin: 0.5,
                share: 0.0,
            }],
            0.0,
            0.0,
        );
        assert_eq!(commercial.average_selling_price, 0.0);
        assert_eq!(commercial.gross_margin, 0.0);
    }

    #[test]
    fn roster_total_counts_contractors() {
        let headcount = Headcount::from_roster(vec![
            HeadcountRow {
                role: "Marketing".to_string(),
                fte: 2.0,
                contractors: 0.5,
            },
            HeadcountRow {
                role: "Delivery".to_string(),
                fte: 2.0,
                contractors: 0.5,
            },
        ]);
        assert_eq!(headcount.total, 5.0);
    }

    #[test]
    fn weeks_in_window_guards_non_positive_window() {
        assert!((weeks_in(90.0) - 90.0 / 7.0).abs() < 1e-12);
        assert_eq!(weeks_in(0.0), 0.0);
        assert_eq!(weeks_in(-14.0), 0.0);
    }
}
