//! Permutation operators.
//!
//! These work on plain `&[usize]` index vectors so any permutation-encoded
//! problem can reuse them.
//!
//! # References
//!
//! - Davis (1985), "Applying Adaptive Algorithms to Epistatic Domains"
//! - Croes (1958), "A Method for Solving Traveling-Salesman Problems"

use rand::Rng;

/// Order Crossover (OX), single child.
///
/// 1. Copy a random contiguous slice `[start, end]` of `parent_a` into the
///    child at the same positions.
/// 2. Fill the remaining positions left to right with the nodes of
///    `parent_b` in their relative order, skipping nodes already placed.
///
/// The child is always a permutation of the parents' node set.
///
/// # Panics
/// Panics if the parents have different lengths.
pub fn order_crossover<R: Rng>(parent_a: &[usize], parent_b: &[usize], rng: &mut R) -> Vec<usize> {
    let n = parent_a.len();
    assert_eq!(n, parent_b.len(), "parents must have equal length");
    if n < 2 {
        return parent_a.to_vec();
    }
    let (start, end) = random_segment(n, rng);
    ox_child(parent_a, parent_b, start, end)
}

/// Builds one OX child from a fixed slice.
pub(crate) fn ox_child(parent_a: &[usize], parent_b: &[usize], start: usize, end: usize) -> Vec<usize> {
    let n = parent_a.len();
    let slice = &parent_a[start..=end];

    // node labels are not required to be 0..n
    let mut donors = parent_b.iter().copied().filter(|node| !slice.contains(node));

    let mut child = Vec::with_capacity(n);
    for pos in 0..n {
        if (start..=end).contains(&pos) {
            child.push(parent_a[pos]);
        } else if let Some(node) = donors.next() {
            child.push(node);
        }
    }
    child
}

/// Exchanges two random positions. The positions may coincide.
pub fn swap_mutation<R: Rng>(perm: &mut [usize], rng: &mut R) {
    let n = perm.len();
    if n < 2 {
        return;
    }
    let i = rng.random_range(0..n);
    let j = rng.random_range(0..n);
    perm.swap(i, j);
}

/// Random inclusive segment `[start, end]` with `start <= end < n`.
pub(crate) fn random_segment<R: Rng>(n: usize, rng: &mut R) -> (usize, usize) {
    let a = rng.random_range(0..n);
    let b = rng.random_range(0..n);
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn sorted(mut v: Vec<usize>) -> Vec<usize> {
        v.sort_unstable();
        v
    }

    #[test]
    fn test_ox_fills_left_to_right_in_donor_order() {
        let a = [0, 1, 2, 3, 4, 5, 6, 7];
        let b = [7, 6, 5, 4, 3, 2, 1, 0];
        let child = ox_child(&a, &b, 2, 4);
        // slice 2,3,4 stays in place; 7,6,5,1,0 fill the gaps in order
        assert_eq!(child, vec![7, 6, 2, 3, 4, 5, 1, 0]);
    }

    #[test]
    fn test_ox_full_slice_copies_parent_a() {
        let a = [3, 1, 2, 0];
        let b = [0, 1, 2, 3];
        assert_eq!(ox_child(&a, &b, 0, 3), a.to_vec());
    }

    #[test]
    fn test_ox_single_node() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(order_crossover(&[4], &[4], &mut rng), vec![4]);
    }

    #[test]
    fn test_swap_mutation_keeps_nodes() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut perm: Vec<usize> = (0..10).collect();
        for _ in 0..50 {
            swap_mutation(&mut perm, &mut rng);
        }
        assert_eq!(sorted(perm), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_random_segment_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let (s, e) = random_segment(6, &mut rng);
            assert!(s <= e && e < 6);
        }
    }

    proptest! {
        #[test]
        fn prop_ox_child_is_permutation(n in 1usize..40, seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut a: Vec<usize> = (0..n).collect();
            let mut b = a.clone();
            a.shuffle(&mut rng);
            b.shuffle(&mut rng);
            let child = order_crossover(&a, &b, &mut rng);
            prop_assert_eq!(sorted(child), (0..n).collect::<Vec<_>>());
        }
    }
}
