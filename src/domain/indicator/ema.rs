//! Recursive exponential average with a simple-mean seed.
//!
//! Leading undefined values are skipped. Once `warmup` defined values have
//! been seen the average is seeded with their simple mean, then
//! EMA[i] = V[i]*alpha + EMA[i-1]*(1-alpha).
//! With `Smoothing::Wilder(n)` and `warmup = n` this is Wilder's smoothing.

use super::Smoothing;

pub fn exponential_average(
    values: &[Option<f64>],
    smoothing: Smoothing,
    warmup: usize,
) -> Vec<Option<f64>> {
    let warmup = warmup.max(1);
    let alpha = smoothing.alpha();

    let mut out = Vec::with_capacity(values.len());
    let mut seen = 0usize;
    let mut sum = 0.0;
    let mut avg: Option<f64> = None;

    for value in values {
        let Some(v) = *value else {
            // A gap after seeding holds the state without emitting a value.
            out.push(None);
            continue;
        };

        match avg {
            Some(prev) => {
                let next = v * alpha + prev * (1.0 - alpha);
                avg = Some(next);
                out.push(Some(next));
            }
            None => {
                seen += 1;
                sum += v;
                if seen == warmup {
                    let seed = sum / warmup as f64;
                    avg = Some(seed);
                    out.push(Some(seed));
                } else {
                    out.push(None);
                }
            }
        }
    }

    out
}
