use serde::Serialize;

/// Coerces NaN, infinities and negative values to `0.0`.
pub fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Multiplies non-negative factors without producing NaN or infinity.
///
/// Any zero factor yields `0.0`; an overflowing product saturates at
/// `f64::MAX` so the result stays monotone in every factor.
pub fn saturating_product<I>(factors: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let factors: Vec<f64> = factors.into_iter().map(sanitize).collect();
    if factors.iter().any(|factor| *factor == 0.0) {
        return 0.0;
    }
    let product: f64 = factors.iter().product();
    if product.is_finite() { product } else { f64::MAX }
}

/// Percentage change of `current` against `previous`.
///
/// `None` when the previous value is zero or either side is not finite.
pub fn delta_pct(current: f64, previous: f64) -> Option<f64> {
    if !current.is_finite() || !previous.is_finite() || previous == 0.0 {
        return None;
    }
    Some((current - previous) / previous.abs())
}

/// A "higher is better" ratio whose denominator may be zero.
///
/// `Unbounded` means the quantity is not materially constrained; it is never
/// an error and must not be read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bounded {
    Finite(f64),
    Unbounded,
}

impl Bounded {
    /// `numerator / denominator` when the denominator is positive and the
    /// quotient is finite, `Unbounded` otherwise.
    pub fn ratio(numerator: f64, denominator: f64) -> Self {
        let denominator = sanitize(denominator);
        if denominator > 0.0 {
            let value = sanitize(numerator) / denominator;
            if value.is_finite() {
                return Bounded::Finite(value);
            }
        }
        Bounded::Unbounded
    }

    pub fn divide_by(self, denominator: f64) -> Self {
        match self {
            Bounded::Finite(value) => Bounded::ratio(value, denominator),
            Bounded::Unbounded => Bounded::Unbounded,
        }
    }

    pub fn finite(self) -> Option<f64> {
        match self {
            Bounded::Finite(value) => Some(value),
            Bounded::Unbounded => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_zeroes_malformed_values() {
        assert_eq!(sanitize(f64::NAN), 0.0);
        assert_eq!(sanitize(f64::INFINITY), 0.0);
        assert_eq!(sanitize(f64::NEG_INFINITY), 0.0);
        assert_eq!(sanitize(-3.5), 0.0);
        assert_eq!(sanitize(2.5), 2.5);
    }

    #[test]
    fn saturating_product_handles_zero_and_overflow() {
        assert_eq!(saturating_product([2.0, 3.0, 0.5]), 3.0);
        assert_eq!(saturating_product([1e300, 1e300, 0.0]), 0.0);
        assert_eq!(saturating_product([1e300, 1e300]), f64::MAX);
        assert_eq!(saturating_product([f64::NAN, 4.0]), 0.0);
    }

    #[test]
    fn bounded_ratio_uses_sentinel_for_zero_denominator() {
        assert_eq!(Bounded::ratio(10.0, 4.0), Bounded::Finite(2.5));
        assert_eq!(Bounded::ratio(10.0, 0.0), Bounded::Unbounded);
        assert_eq!(Bounded::ratio(0.0, 0.0), Bounded::Unbounded);
        assert_eq!(Bounded::Unbounded.divide_by(5.0), Bounded::Unbounded);
        assert_eq!(Bounded::Finite(9.0).divide_by(3.0).finite(), Some(3.0));
    }

    #[test]
    fn delta_pct_is_undefined_without_previous_value() {
        assert_eq!(delta_pct(12.0, 0.0), None);
        assert_eq!(delta_pct(12.0, f64::NAN), None);
        assert_eq!(delta_pct(12.0, 10.0), Some(0.2));
        assert_eq!(delta_pct(-5.0, -10.0), Some(0.5));
    }
}
