//! Simple rolling mean.
//!
//! SMA[i] = mean(V[i-n+1..=i]); the first (n-1) values are undefined.

pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    values
        .iter()
        .enumerate()
        .map(|(i, _)| {
            if i + 1 < window {
                None
            } else {
                let slice = &values[i + 1 - window..=i];
                Some(slice.iter().sum::<f64>() / window as f64)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sma_warmup() {
        let sma = rolling_mean(&[10.0, 11.0, 12.0, 13.0, 9.0], 3);
        assert!(sma[0].is_none());
        assert!(sma[1].is_none());
        assert!(sma[2].is_some());
    }

    #[test]
    fn sma_values() {
        let sma = rolling_mean(&[10.0, 11.0, 12.0, 13.0, 9.0], 3);
        assert_relative_eq!(sma[2].unwrap(), 11.0);
        assert_relative_eq!(sma[3].unwrap(), 12.0);
        assert_relative_eq!(sma[4].unwrap(), 34.0 / 3.0);
    }

    #[test]
    fn window_one_is_identity() {
        let values = [1.0, 2.5, 3.0];
        let sma = rolling_mean(&values, 1);
        for (v, s) in values.iter().zip(&sma) {
            assert_relative_eq!(*v, s.unwrap());
        }
    }

    #[test]
    fn window_longer_than_series() {
        let sma = rolling_mean(&[1.0, 2.0], 5);
        assert_eq!(sma, vec![None, None]);
    }

    #[test]
    fn zero_window() {
        assert_eq!(rolling_mean(&[1.0, 2.0], 0), vec![None, None]);
    }

    #[test]
    fn empty_input() {
        assert!(rolling_mean(&[], 3).is_empty());
    }
}
