//! Randomized access plans
//!
//! An access plan is the order in which operation indices are submitted to an
//! engine: a uniformly random permutation of `[0, operations)` generated once
//! per workload instance. Both the sync and the callback phase of an instance
//! replay the same plan, so the two execution models see an identical access
//! pattern. No seed control is exposed; every run shuffles from fresh entropy
//! so repeated runs do not inherit a favorable cache layout.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// A random permutation of operation indices
///
/// Invariant: every index in `[0, len)` appears exactly once. Engines rely on
/// this for buffer ownership - one in-flight unit per buffer.
#[derive(Debug, Clone)]
pub struct AccessPlan {
    order: Vec<usize>,
}

impl AccessPlan {
    /// Generate a shuffled plan over `operations` indices
    pub fn shuffled(operations: usize) -> Self {
        let mut order: Vec<usize> = (0..operations).collect();
        let mut rng = Xoshiro256PlusPlus::from_entropy();
        order.shuffle(&mut rng);
        Self { order }
    }

    /// Number of operations in the plan
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True if the plan contains no operations
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate the operation indices in submission order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.order.iter().copied()
    }

    /// The full submission order as a slice
    pub fn as_slice(&self) -> &[usize] {
        &self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_is_permutation() {
        for n in [1, 2, 64, 1000] {
            let plan = AccessPlan::shuffled(n);
            assert_eq!(plan.len(), n);

            let mut seen = vec![false; n];
            for i in plan.iter() {
                assert!(i < n, "index {} out of range", i);
                assert!(!seen[i], "index {} appears twice", i);
                seen[i] = true;
            }
            assert!(seen.iter().all(|&s| s));
        }
    }

    #[test]
    fn test_empty_plan() {
        let plan = AccessPlan::shuffled(0);
        assert!(plan.is_empty());
        assert_eq!(plan.as_slice(), &[] as &[usize]);
    }

    #[test]
    fn test_single_entry_plan() {
        let plan = AccessPlan::shuffled(1);
        assert_eq!(plan.as_slice(), &[0]);
    }
}
