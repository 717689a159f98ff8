// Priority assignment and leaderboard ordering.
//
// Both orderings use stable sorts so exact ties reproduce input order across
// runs.
use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

/// Assign a 1-based priority to every item within its partition.
///
/// Partitions are independent: an item's priority is determined only by the
/// other members of its own partition. Within a partition, items are ordered
/// ascending by `attainment` (worst served first) and ties broken descending
/// by `expected` size. The returned vector is parallel to `items` and each
/// partition's priorities are exactly 1..=N.
pub fn partition_priorities<T, K, FK, FA, FE>(
    items: &[T],
    partition: FK,
    attainment: FA,
    expected: FE,
) -> Vec<usize>
where
    K: Eq + Hash,
    FK: Fn(&T) -> K,
    FA: Fn(&T) -> f64,
    FE: Fn(&T) -> f64,
{
    let mut by_partition: HashMap<K, Vec<usize>> = HashMap::new();
    for (i, item) in items.iter().enumerate() {
        by_partition.entry(partition(item)).or_default().push(i);
    }

    let mut priorities = vec![0usize; items.len()];
    for indices in by_partition.values_mut() {
        indices.sort_by(|&a, &b| {
            attainment(&items[a])
                .partial_cmp(&attainment(&items[b]))
                .unwrap_or(Ordering::Equal)
                .then_with(|| {
                    expected(&items[b])
                        .partial_cmp(&expected(&items[a]))
                        .unwrap_or(Ordering::Equal)
                })
        });
        for (rank, &i) in indices.iter().enumerate() {
            priorities[i] = rank + 1;
        }
    }
    priorities
}

/// Top-k leaderboard by a rate metric, descending. Stable sort: groups with
/// equal rates keep their input (first-occurrence) order.
pub fn top_by_rate<T: Clone, F>(items: &[T], rate: F, k: usize) -> Vec<T>
where
    F: Fn(&T) -> f64,
{
    let mut sorted: Vec<T> = items.to_vec();
    sorted.sort_by(|a, b| rate(b).partial_cmp(&rate(a)).unwrap_or(Ordering::Equal));
    sorted.truncate(k);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Group {
        station: &'static str,
        attainment: f64,
        expected: f64,
    }

    fn group(station: &'static str, attainment: f64, expected: f64) -> Group {
        Group {
            station,
            attainment,
            expected,
        }
    }

    #[test]
    fn worst_attainment_ranks_first() {
        let groups = [
            group("DSP2", 0.5, 10.0),
            group("DSP2", 0.2, 10.0),
            group("DSP2", 0.9, 10.0),
        ];
        let priorities =
            partition_priorities(&groups, |g| g.station, |g| g.attainment, |g| g.expected);
        assert_eq!(priorities, [2, 1, 3]);
    }

    #[test]
    fn priorities_are_contiguous_per_partition() {
        let groups = [
            group("DSP2", 0.5, 10.0),
            group("DSP3", 0.1, 5.0),
            group("DSP2", 0.5, 20.0),
            group("DSP3", 0.9, 5.0),
            group("DSP2", 0.0, 1.0),
        ];
        let priorities =
            partition_priorities(&groups, |g| g.station, |g| g.attainment, |g| g.expected);

        for station in ["DSP2", "DSP3"] {
            let mut got: Vec<usize> = groups
                .iter()
                .zip(&priorities)
                .filter(|(g, _)| g.station == station)
                .map(|(_, &p)| p)
                .collect();
            got.sort_unstable();
            let want: Vec<usize> = (1..=got.len()).collect();
            assert_eq!(got, want, "station {station}");
        }
    }

    #[test]
    fn attainment_tie_breaks_on_larger_expected() {
        let groups = [group("DSP2", 0.5, 10.0), group("DSP2", 0.5, 20.0)];
        let priorities =
            partition_priorities(&groups, |g| g.station, |g| g.attainment, |g| g.expected);
        // Same attainment: the bigger region is the bigger gap, so it ranks
        // ahead.
        assert_eq!(priorities, [2, 1]);
    }

    #[test]
    fn partitions_do_not_influence_each_other() {
        let mixed = [
            group("DSP2", 0.5, 10.0),
            group("DSP3", 0.1, 10.0),
            group("DSP2", 0.2, 10.0),
        ];
        let priorities =
            partition_priorities(&mixed, |g| g.station, |g| g.attainment, |g| g.expected);
        // DSP3's very low attainment must not push DSP2 groups down.
        assert_eq!(priorities, [2, 1, 1]);
    }

    #[test]
    fn leaderboard_truncates_and_keeps_tie_order() {
        let items = [("a", 0.5), ("b", 0.9), ("c", 0.5), ("d", 0.1)];
        let top = top_by_rate(&items, |i| i.1, 3);
        let names: Vec<&str> = top.iter().map(|i| i.0).collect();
        assert_eq!(names, ["b", "a", "c"]);
    }

    #[test]
    fn leaderboard_handles_short_input() {
        let items = [("a", 0.5)];
        assert_eq!(top_by_rate(&items, |i| i.1, 3).len(), 1);
    }
}
