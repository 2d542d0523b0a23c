use std::iter;

use gonogo_core::{StimulusKind, TrialSpec};
use rand::Rng;

use crate::config::check_design;
use crate::error::ConfigError;

/// Number of go trials in a block of `count` trials.
pub fn go_count(count: usize, go_ratio: f64) -> usize {
    (count as f64 * go_ratio).floor() as usize
}

/// Builds a shuffled block with exactly `go_count(count, go_ratio)` go trials
/// and the rest nogo. Ordinals follow the shuffled order, starting at 1.
pub fn generate_trials<R: Rng + ?Sized>(
    count: usize,
    go_ratio: f64,
    rng: &mut R,
) -> Result<Vec<TrialSpec>, ConfigError> {
    check_design(count, go_ratio)?;
    let go = go_count(count, go_ratio).min(count);

    let mut kinds: Vec<StimulusKind> = iter::repeat_n(StimulusKind::Go, go)
        .chain(iter::repeat_n(StimulusKind::NoGo, count - go))
        .collect();

    // Fisher-Yates
    for i in (1..kinds.len()).rev() {
        let j = rng.random_range(0..=i);
        kinds.swap(i, j);
    }

    Ok(kinds
        .into_iter()
        .enumerate()
        .map(|(i, kind)| TrialSpec {
            ordinal: i as u32 + 1,
            kind,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn kinds(trials: &[TrialSpec]) -> Vec<StimulusKind> {
        trials.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn counts_match_ratio() {
        let mut rng = StdRng::seed_from_u64(7);
        for count in 1..=40 {
            for ratio in [0.0, 0.25, 0.29, 0.5, 0.7, 0.99, 1.0] {
                let trials = generate_trials(count, ratio, &mut rng).unwrap();
                assert_eq!(trials.len(), count);
                let go = trials.iter().filter(|t| t.kind.is_go()).count();
                assert_eq!(go, go_count(count, ratio), "count={count} ratio={ratio}");
            }
        }
    }

    #[test]
    fn ten_at_seventy_percent_is_seven_go() {
        let mut rng = StdRng::seed_from_u64(1);
        let trials = generate_trials(10, 0.7, &mut rng).unwrap();
        let go = trials.iter().filter(|t| t.kind == StimulusKind::Go).count();
        assert_eq!(go, 7);
        assert_eq!(trials.len() - go, 3);
    }

    #[test]
    fn ordinals_are_contiguous() {
        let mut rng = StdRng::seed_from_u64(3);
        let trials = generate_trials(12, 0.5, &mut rng).unwrap();
        let ordinals: Vec<u32> = trials.iter().map(|t| t.ordinal).collect();
        assert_eq!(ordinals, (1..=12).collect::<Vec<u32>>());
    }

    #[test]
    fn same_seed_same_order() {
        let a = generate_trials(20, 0.7, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = generate_trials(20, 0.7, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn every_arrangement_is_reachable() {
        // 2 go + 2 nogo has 6 distinct arrangements
        let mut rng = StdRng::seed_from_u64(99);
        let mut seen = HashSet::new();
        for _ in 0..500 {
            seen.insert(kinds(&generate_trials(4, 0.5, &mut rng).unwrap()));
        }
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn invalid_design_is_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            generate_trials(0, 0.5, &mut rng),
            Err(ConfigError::NoTrials)
        );
        assert!(generate_trials(5, 1.5, &mut rng).is_err());
    }
}
