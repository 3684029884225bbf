//! Null-propagating numeric series operations.
//!
//! A series is a slice of `Option<f64>` in chronological order, `None`
//! being a missing price. Every function returns a series of the same
//! length.

/// `out[i] = values[i] - values[i - 1]`; `out[0]` is `None`.
pub fn diff(values: &[Option<f64>]) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| match i.checked_sub(1) {
            Some(prev) => sub(values[i], values[prev]),
            None => None,
        })
        .collect()
}

/// Mean over the trailing `window` values, defined only when every value
/// in the window is present.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if window == 0 || i + 1 < window {
                return None;
            }
            let slice = &values[i + 1 - window..=i];
            let sum = slice.iter().copied().sum::<Option<f64>>()?;
            Some(sum / window as f64)
        })
        .collect()
}

/// `out[i] = values[i] - values[0]`. An empty series has no baseline.
pub fn change_from_first(values: &[Option<f64>]) -> Option<Vec<Option<f64>>> {
    let baseline = *values.first()?;
    Some(values.iter().map(|&v| sub(v, baseline)).collect())
}

/// 1 where the difference is strictly positive, 0 otherwise, including
/// missing differences.
pub fn increase_flags(diffs: &[Option<f64>]) -> Vec<i64> {
    diffs
        .iter()
        .map(|d| match d {
            Some(v) if *v > 0.0 => 1,
            _ => 0,
        })
        .collect()
}

/// Percentage change from the previous value. `None` when either value
/// is missing or the previous value is zero.
pub fn pct_change(values: &[Option<f64>]) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            let prev = values[i.checked_sub(1)?]?;
            let current = values[i]?;
            if prev == 0.0 {
                return None;
            }
            Some((current - prev) / prev * 100.0)
        })
        .collect()
}

fn sub(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    Some(a? - b?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(actual: &[Option<f64>], expected: &[Option<f64>]) {
        assert_eq!(actual.len(), expected.len(), "length mismatch");
        for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
            match (a, e) {
                (Some(a), Some(e)) => assert!((a - e).abs() < 1e-9, "index {}: {} != {}", i, a, e),
                (None, None) => {}
                _ => panic!("index {}: {:?} != {:?}", i, a, e),
            }
        }
    }

    #[test]
    fn test_diff_propagates_nulls() {
        let values = [Some(2.0), Some(2.05), None, Some(2.10)];
        approx(&diff(&values), &[None, Some(0.05), None, None]);
    }

    #[test]
    fn test_rolling_mean_requires_full_window() {
        let values = [Some(1.0), Some(2.0), Some(3.0), Some(4.0), None, Some(6.0)];
        approx(
            &rolling_mean(&values, 4),
            &[None, None, None, Some(2.5), None, None],
        );
        assert!(rolling_mean(&values[..3], 4).iter().all(Option::is_none));
    }

    #[test]
    fn test_change_from_first() {
        let values = [Some(2.0), None, Some(2.5)];
        approx(&change_from_first(&values).unwrap(), &[Some(0.0), None, Some(0.5)]);
        assert!(change_from_first(&[]).is_none());

        let null_baseline = [None, Some(1.0)];
        approx(&change_from_first(&null_baseline).unwrap(), &[None, None]);
    }

    #[test]
    fn test_increase_flags_treat_null_as_no_increase() {
        let diffs = [None, Some(0.05), Some(0.0), Some(-0.1), None];
        assert_eq!(increase_flags(&diffs), vec![0, 1, 0, 0, 0]);
    }

    #[test]
    fn test_pct_change_zero_and_null_base() {
        let values = [Some(2.0), Some(2.05), Some(0.0), Some(1.0), None, Some(1.0)];
        approx(
            &pct_change(&values),
            &[None, Some(2.5), Some(-100.0), None, None, None],
        );
    }
}
