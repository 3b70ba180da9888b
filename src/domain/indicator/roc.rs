//! Percentage change.
//!
//! PCT(n)[i] = V[i] / V[i-n] - 1
//! Undefined for the first n values and where V[i-n] == 0.

pub fn percent_change(values: &[f64], periods: usize) -> Vec<Option<f64>> {
    values
        .iter()
        .enumerate()
        .map(|(i, &curr)| {
            if periods == 0 || i < periods {
                return None;
            }
            let prev = values[i - periods];
            if prev == 0.0 {
                None
            } else {
                Some(curr / prev - 1.0)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn pct_warmup() {
        let pct = percent_change(&[100.0, 105.0, 110.0, 115.0], 2);
        assert!(pct[0].is_none());
        assert!(pct[1].is_none());
        assert!(pct[2].is_some());
    }

    #[test]
    fn pct_one_period() {
        let pct = percent_change(&[1.0, 1.05, 1.0], 1);
        assert_relative_eq!(pct[1].unwrap(), 0.05, epsilon = 1e-12);
        assert_relative_eq!(pct[2].unwrap(), 1.0 / 1.05 - 1.0);
    }

    #[test]
    fn pct_multi_period() {
        let pct = percent_change(&[100.0, 90.0, 80.0], 2);
        assert_relative_eq!(pct[2].unwrap(), -0.2, epsilon = 1e-12);
    }

    #[test]
    fn zero_base_is_undefined() {
        let pct = percent_change(&[0.0, 100.0, 110.0], 2);
        assert_eq!(pct[2], None);
    }

    #[test]
    fn zero_periods_is_undefined() {
        assert_eq!(percent_change(&[1.0, 2.0], 0), vec![None, None]);
    }
}
