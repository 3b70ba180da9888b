//! Dense rank of values within groups.
//!
//! Ranks start at 1. Equal values share a rank and the next distinct value
//! takes the following integer. Undefined values are not ranked.

use std::collections::BTreeMap;

pub fn rank_within_group<K: Ord>(
    values: &[Option<f64>],
    groups: &[K],
    descending: bool,
) -> Vec<Option<usize>> {
    debug_assert_eq!(values.len(), groups.len());

    let mut members: BTreeMap<&K, Vec<(usize, f64)>> = BTreeMap::new();
    for (i, (value, key)) in values.iter().zip(groups).enumerate() {
        if let Some(v) = value {
            members.entry(key).or_default().push((i, *v));
        }
    }

    let mut ranks = vec![None; values.len()];
    for (_, mut entries) in members {
        entries.sort_by(|a, b| {
            if descending {
                b.1.total_cmp(&a.1)
            } else {
                a.1.total_cmp(&b.1)
            }
        });

        let mut rank = 0usize;
        let mut last: Option<f64> = None;
        for (idx, v) in entries {
            if last != Some(v) {
                rank += 1;
                last = Some(v);
            }
            ranks[idx] = Some(rank);
        }
    }

    ranks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_descending_per_group() {
        let values = [Some(0.1), Some(0.3), Some(0.2), Some(-0.5), Some(0.4)];
        let groups = [1, 1, 1, 2, 2];
        let ranks = rank_within_group(&values, &groups, true);
        assert_eq!(ranks, vec![Some(3), Some(1), Some(2), Some(2), Some(1)]);
    }

    #[test]
    fn ranks_ascending() {
        let values = [Some(3.0), Some(1.0), Some(2.0)];
        let ranks = rank_within_group(&values, &["a", "a", "a"], false);
        assert_eq!(ranks, vec![Some(3), Some(1), Some(2)]);
    }

    #[test]
    fn ties_share_dense_rank() {
        let values = [Some(5.0), Some(5.0), Some(1.0)];
        let ranks = rank_within_group(&values, &[0, 0, 0], true);
        assert_eq!(ranks, vec![Some(1), Some(1), Some(2)]);
    }

    #[test]
    fn undefined_values_have_no_rank() {
        let values = [None, Some(1.0), None];
        let ranks = rank_within_group(&values, &[0, 0, 0], true);
        assert_eq!(ranks, vec![None, Some(1), None]);
    }
}
