use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, warn};

use crate::core::pairing::AssetPair;

/// Fixed shuffle seed so repeated runs produce the same assignment.
pub const SHUFFLE_SEED: u64 = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetSplit {
    Train,
    Val,
    Test,
}

impl DatasetSplit {
    pub fn as_str(&self) -> &str {
        match self {
            DatasetSplit::Train => "train",
            DatasetSplit::Val => "val",
            DatasetSplit::Test => "test",
        }
    }

    pub fn all() -> [DatasetSplit; 3] {
        [DatasetSplit::Train, DatasetSplit::Val, DatasetSplit::Test]
    }
}

/// Fractions of the pool assigned to each split, each in [0, 1].
#[derive(Debug, Clone, Copy)]
pub struct SplitRatios {
    pub train: f64,
    pub val: f64,
    pub test: f64,
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self {
            train: 0.6,
            val: 0.2,
            test: 0.2,
        }
    }
}

impl SplitRatios {
    pub fn sum(&self) -> f64 {
        self.train + self.val + self.test
    }
}

/// The partitioned pool after splitting.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SplitAssignment {
    pub train: Vec<AssetPair>,
    pub val: Vec<AssetPair>,
    pub test: Vec<AssetPair>,
}

impl SplitAssignment {
    pub fn get(&self, split: DatasetSplit) -> &Vec<AssetPair> {
        match split {
            DatasetSplit::Train => &self.train,
            DatasetSplit::Val => &self.val,
            DatasetSplit::Test => &self.test,
        }
    }

    pub fn total(&self) -> usize {
        self.train.len() + self.val.len() + self.test.len()
    }
}

/// Deterministically partition the pair pool into train/val/test.
///
/// The pool is shuffled with a fixed-seed RNG, then cut at
/// `floor(N * train)` and `floor(N * val)`. Everything past the second cut
/// goes to test, so the test split absorbs any rounding remainder. That is
/// the intended tie-break, not an accident.
///
/// Ratios are not required to sum to 1.0. A sum that drifts from 1.0 shrinks
/// train and val while test silently grows with the leftover; this is only
/// warned about, never rejected.
pub fn split_pairs(mut pairs: Vec<AssetPair>, ratios: &SplitRatios) -> SplitAssignment {
    if (ratios.sum() - 1.0).abs() > 1e-6 {
        warn!(
            "Split ratios sum to {:.3}, not 1.0; the test split absorbs the difference",
            ratios.sum()
        );
    }

    let mut rng = StdRng::seed_from_u64(SHUFFLE_SEED);
    pairs.shuffle(&mut rng);

    let total = pairs.len();
    let n_train = ((total as f64) * ratios.train) as usize;
    let n_val = ((total as f64) * ratios.val) as usize;

    let mut rest = pairs.split_off(n_train.min(total));
    let test = rest.split_off(n_val.min(rest.len()));

    debug!(
        "Split {} pair(s): {} train, {} val, {} test",
        total,
        pairs.len(),
        rest.len(),
        test.len()
    );

    SplitAssignment {
        train: pairs,
        val: rest,
        test,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_pairs(count: usize) -> Vec<AssetPair> {
        (0..count)
            .map(|i| AssetPair {
                image: format!("img_{:03}.jpg", i),
                label: format!("img_{:03}.txt", i),
            })
            .collect()
    }

    #[test]
    fn test_ten_pairs_split_six_two_two() {
        let ratios = SplitRatios {
            train: 0.6,
            val: 0.2,
            test: 0.2,
        };

        let assignment = split_pairs(make_pairs(10), &ratios);

        assert_eq!(assignment.train.len(), 6);
        assert_eq!(assignment.val.len(), 2);
        assert_eq!(assignment.test.len(), 2);
    }

    #[test]
    fn test_seven_pairs_test_absorbs_remainder() {
        let ratios = SplitRatios {
            train: 0.6,
            val: 0.2,
            test: 0.2,
        };

        // floor(7 * 0.6) = 4, floor(7 * 0.2) = 1, test takes the last 2
        let assignment = split_pairs(make_pairs(7), &ratios);

        assert_eq!(assignment.train.len(), 4);
        assert_eq!(assignment.val.len(), 1);
        assert_eq!(assignment.test.len(), 2);
    }

    #[test]
    fn test_no_pair_is_lost_or_duplicated() {
        let ratios = SplitRatios::default();

        let assignment = split_pairs(make_pairs(101), &ratios);

        assert_eq!(assignment.total(), 101);
        let mut all: Vec<String> = assignment
            .train
            .iter()
            .chain(&assignment.val)
            .chain(&assignment.test)
            .map(|p| p.image.clone())
            .collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 101);
    }

    #[test]
    fn test_fixed_seed_is_deterministic() {
        let ratios = SplitRatios::default();

        let first = split_pairs(make_pairs(50), &ratios);
        let second = split_pairs(make_pairs(50), &ratios);

        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_pool_yields_empty_splits() {
        let assignment = split_pairs(Vec::new(), &SplitRatios::default());

        assert!(assignment.train.is_empty());
        assert!(assignment.val.is_empty());
        assert!(assignment.test.is_empty());
    }

    #[test]
    fn test_short_ratios_grow_the_test_split() {
        let ratios = SplitRatios {
            train: 0.4,
            val: 0.1,
            test: 0.2,
        };

        // floor(10 * 0.4) = 4, floor(10 * 0.1) = 1, everything else lands in test
        let assignment = split_pairs(make_pairs(10), &ratios);

        assert_eq!(assignment.train.len(), 4);
        assert_eq!(assignment.val.len(), 1);
        assert_eq!(assignment.test.len(), 5);
    }
}
