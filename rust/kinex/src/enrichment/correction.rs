use crate::errors::StatsError;

/// Benjamini-Hochberg adjusted p-values, in input order.
///
/// Each adjusted value is `min(1, p * n / rank)`, made monotone from the
/// largest p-value down.
pub fn benjamini_hochberg(p_values: &[f64]) -> Result<Vec<f64>, StatsError> {
    for (index, &value) in p_values.iter().enumerate() {
        if !(0.0..=1.0).contains(&value) {
            return Err(StatsError::InvalidPValue { index, value });
        }
    }
    let n = p_values.len();
    if n == 0 {
        return Ok(Vec::new());
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| p_values[a].total_cmp(&p_values[b]));

    let n_f = n as f64;
    let mut adjusted = vec![0.0; n];
    let mut prev = f64::INFINITY;
    for (i, &idx) in order.iter().enumerate().rev() {
        let rank = (i + 1) as f64;
        let adj = (p_values[idx] * n_f / rank).min(1.0).min(prev);
        adjusted[idx] = adj;
        prev = adj;
    }

    Ok(adjusted)
}
