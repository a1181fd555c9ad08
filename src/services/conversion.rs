/// Downstream products `D_i = r_i × r_{i+1} × … × r_{n-1}` for a funnel of
/// `rates.len() + 1` stages; the terminal stage has `D = 1`.
///
/// A zero rate at `k` zeroes every `D_i` with `i <= k`. Rates are composed as
/// given; range checks belong to the caller.
pub fn downstream_products(rates: &[f64]) -> Vec<f64> {
    let mut products = vec![1.0; rates.len() + 1];
    for stage in (0..rates.len()).rev() {
        products[stage] = rates[stage] * products[stage + 1];
    }
    products
}
