use serde::Serialize;

use crate::domain::numeric::sanitize;

/// Raw stage counts observed over one window, top of funnel first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunnelCounts(pub Vec<f64>);

impl FunnelCounts {
    /// `rate[i] = count[i + 1] / count[i]`, or `0` when `count[i]` is not positive.
    pub fn to_rates(&self) -> ConversionRates {
        let rates = self
            .0
            .windows(2)
            .map(|pair| {
                let from = sanitize(pair[0]);
                if from > 0.0 {
                    sanitize(sanitize(pair[1]) / from)
                } else {
                    0.0
                }
            })
            .collect();
        ConversionRates(rates)
    }
}

/// Stage-to-stage conversion rates; `rates[i]` converts stage `i` into `i + 1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionRates(pub Vec<f64>);

impl ConversionRates {
    /// Rebuilds stage counts from a top-of-funnel count.
    pub fn to_counts(&self, top_of_funnel: f64) -> FunnelCounts {
        let mut counts = Vec::with_capacity(self.0.len() + 1);
        let mut current = sanitize(top_of_funnel);
        counts.push(current);
        for rate in &self.0 {
            current *= sanitize(*rate);
            counts.push(current);
        }
        FunnelCounts(counts)
    }

    /// Sanitized rate out of `stage`; missing entries read as `0`.
    pub fn rate(&self, stage: usize) -> f64 {
        self.0.get(stage).copied().map(sanitize).unwrap_or(0.0)
    }

    /// Sanitized rates padded or truncated to fit a funnel of `stage_count` stages.
    pub fn aligned(&self, stage_count: usize) -> Vec<f64> {
        (0..stage_count.saturating_sub(1))
            .map(|stage| self.rate(stage))
            .collect()
    }

    pub fn with_rate(&self, stage: usize, rate: f64) -> Self {
        let mut rates = self.0.clone();
        if stage >= rates.len() {
            rates.resize(stage + 1, 0.0);
        }
        rates[stage] = rate;
        ConversionRates(rates)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
