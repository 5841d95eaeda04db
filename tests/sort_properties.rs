use proptest::prelude::*;

use podperf::sort::{sort_sequential, ForkPolicy, ForkStats, SortEngine};

fn sorted_copy(values: &[u32]) -> Vec<u32> {
    let mut expected = values.to_vec();
    expected.sort_unstable();
    expected
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn sort_is_ordered_permutation(values in prop::collection::vec(0u32..20_000, 0..2_000), threshold in 1usize..300) {
        let outcome = SortEngine::new(ForkPolicy::new(threshold)).sort(values.clone());
        prop_assert_eq!(outcome.sorted, sorted_copy(&values));
    }

    #[test]
    fn sequential_and_parallel_agree(values in prop::collection::vec(any::<u32>(), 0..3_000)) {
        let sequential = SortEngine::new(ForkPolicy::sequential()).sort(values.clone());
        let parallel = SortEngine::new(ForkPolicy::new(1)).sort(values.clone());

        prop_assert_eq!(sequential.stats.forks, 0);
        prop_assert_eq!(&sequential.sorted, &parallel.sorted);
        prop_assert_eq!(parallel.sorted, sort_sequential(values));
    }

    #[test]
    fn fork_stats_match_recursive_split(len in 0usize..20_000, threshold in 50usize..2_000) {
        let outcome = SortEngine::new(ForkPolicy::new(threshold)).sort(vec![7u32; len]);
        prop_assert_eq!(outcome.stats, expected_stats(len, threshold));
        prop_assert_eq!(outcome.stats.forks == 0, len <= threshold);
    }
}

/// Fan-out of splitting every task longer than `threshold` at its midpoint.
fn expected_stats(len: usize, threshold: usize) -> ForkStats {
    if len <= threshold {
        return ForkStats { forks: 0, fanout_levels: 0, sequential_leaves: 1 };
    }
    let left = expected_stats(len / 2, threshold);
    let right = expected_stats(len - len / 2, threshold);
    ForkStats {
        forks: 1 + left.forks + right.forks,
        fanout_levels: 1 + left.fanout_levels.max(right.fanout_levels),
        sequential_leaves: left.sequential_leaves + right.sequential_leaves,
    }
}

#[test]
fn test_scenario_two_forks_down_to_quarters() {
    let values: Vec<u32> = (0..250_000u32).rev().collect();
    let outcome = SortEngine::new(ForkPolicy::new(100_000)).sort(values);

    assert_eq!(outcome.stats.fanout_levels, 2);
    assert_eq!(outcome.stats.forks, 3);
    assert_eq!(outcome.stats.sequential_leaves, 4);
    assert_eq!(outcome.sorted.first(), Some(&0));
    assert_eq!(outcome.sorted.last(), Some(&249_999));
}

#[test]
fn test_between_threshold_and_double_forks() {
    let values: Vec<u32> = (0..150_000u32).rev().collect();
    let outcome = SortEngine::new(ForkPolicy::new(100_000)).sort(values);

    assert_eq!(outcome.stats.forks, 1);
    assert_eq!(outcome.stats.sequential_leaves, 2);
    assert!(outcome.sorted.windows(2).all(|w| w[0] <= w[1]));
}
