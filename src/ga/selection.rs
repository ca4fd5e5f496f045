//! Parent selection strategies.
//!
//! All strategies assume minimization and a population sorted best-first
//! where noted.

use rand::Rng;

use super::types::Individual;
use crate::error::{PlanError, Result};

/// Selection strategy for choosing parents.
///
/// # Examples
///
/// ```
/// use u_routeplan::ga::Selection;
///
/// // uniform among the 10 fittest individuals
/// let sel = Selection::Truncation(10);
/// assert_eq!(sel, Selection::default());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection {
    /// Uniform draw among the best `k` individuals.
    ///
    /// Requires the population sorted ascending by fitness, which the runner
    /// guarantees. When the population is smaller than `k` the whole
    /// population is the pool.
    Truncation(usize),

    /// Pick `k` individuals uniformly, keep the fittest.
    Tournament(usize),
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Truncation(10)
    }
}

impl Selection {
    /// Selects a parent index from a population sorted best-first.
    ///
    /// # Panics
    /// Panics if `population` is empty.
    pub fn select<I: Individual, R: Rng>(&self, population: &[I], rng: &mut R) -> usize {
        assert!(!population.is_empty(), "cannot select from empty population");

        match *self {
            Selection::Truncation(k) => rng.random_range(0..k.clamp(1, population.len())),
            Selection::Tournament(k) => tournament(population, k, None, rng),
        }
    }

    /// Selects two parent indices, distinct whenever the candidate pool
    /// holds at least two individuals.
    ///
    /// # Panics
    /// Panics if `population` is empty.
    pub fn select_pair<I: Individual, R: Rng>(&self, population: &[I], rng: &mut R) -> (usize, usize) {
        assert!(!population.is_empty(), "cannot select from empty population");

        let a = self.select(population, rng);
        let b = match *self {
            Selection::Truncation(k) => {
                let pool = k.clamp(1, population.len());
                if pool < 2 {
                    return (a, a);
                }
                skip(rng.random_range(0..pool - 1), a)
            }
            Selection::Tournament(k) => {
                if population.len() < 2 {
                    return (a, a);
                }
                tournament(population, k, Some(a), rng)
            }
        };
        (a, b)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match *self {
            Selection::Truncation(0) | Selection::Tournament(0) => Err(PlanError::InvalidConfig(
                "selection pool size must be at least 1".into(),
            )),
            _ => Ok(()),
        }
    }
}

/// Maps a draw from `0..n-1` onto `0..n` without `excluded`.
fn skip(draw: usize, excluded: usize) -> usize {
    if draw >= excluded {
        draw + 1
    } else {
        draw
    }
}

/// Tournament of size `k`; `excluded` never takes part. The caller keeps at
/// least one other candidate available.
fn tournament<I: Individual, R: Rng>(
    population: &[I],
    k: usize,
    excluded: Option<usize>,
    rng: &mut R,
) -> usize {
    let n = population.len();
    let mut draw = || match excluded {
        Some(e) => skip(rng.random_range(0..n - 1), e),
        None => rng.random_range(0..n),
    };
    let mut best = draw();
    for _ in 1..k.max(1) {
        let idx = draw();
        if population[idx].fitness() < population[best].fitness() {
            best = idx;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[derive(Clone)]
    struct Scored(f64);

    impl Individual for Scored {
        type Fitness = f64;
        fn fitness(&self) -> f64 {
            self.0
        }
        fn set_fitness(&mut self, f: f64) {
            self.0 = f;
        }
    }

    #[test]
    fn test_truncation_stays_in_pool() {
        let mut rng = StdRng::seed_from_u64(42);
        let population: Vec<Scored> = (0..50).map(|i| Scored(i as f64)).collect();
        for _ in 0..1000 {
            assert!(Selection::Truncation(10).select(&population, &mut rng) < 10);
        }
    }

    #[test]
    fn test_truncation_small_population() {
        let mut rng = StdRng::seed_from_u64(1);
        let population = vec![Scored(1.0), Scored(2.0), Scored(3.0)];
        for _ in 0..100 {
            assert!(Selection::Truncation(10).select(&population, &mut rng) < 3);
        }
    }

    #[test]
    fn test_tournament_prefers_fitter() {
        let mut rng = StdRng::seed_from_u64(7);
        let population: Vec<Scored> = (0..20).map(|i| Scored(i as f64)).collect();
        let picks: usize = (0..500)
            .map(|_| Selection::Tournament(5).select(&population, &mut rng))
            .sum();
        // the mean of uniform picks would be ~9.5
        assert!((picks as f64 / 500.0) < 7.0);
    }

    #[test]
    fn test_pair_parents_are_distinct() {
        let mut rng = StdRng::seed_from_u64(42);
        let population: Vec<Scored> = (0..100).map(|i| Scored(i as f64)).collect();
        for sel in [Selection::Truncation(10), Selection::Tournament(3)] {
            for _ in 0..1000 {
                let (a, b) = sel.select_pair(&population, &mut rng);
                assert_ne!(a, b);
                if let Selection::Truncation(k) = sel {
                    assert!(a < k && b < k);
                }
            }
        }
    }

    #[test]
    fn test_pair_covers_whole_pool() {
        let mut rng = StdRng::seed_from_u64(3);
        let population: Vec<Scored> = (0..10).map(|i| Scored(i as f64)).collect();
        let mut seen = [false; 3];
        for _ in 0..300 {
            let (a, b) = Selection::Truncation(3).select_pair(&population, &mut rng);
            seen[a] = true;
            seen[b] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_pair_from_single_individual() {
        let mut rng = StdRng::seed_from_u64(0);
        let population = vec![Scored(1.0)];
        assert_eq!(Selection::Truncation(10).select_pair(&population, &mut rng), (0, 0));
        assert_eq!(Selection::Tournament(2).select_pair(&population, &mut rng), (0, 0));
    }

    #[test]
    fn test_zero_pool_invalid() {
        assert!(Selection::Truncation(0).validate().is_err());
        assert!(Selection::Tournament(3).validate().is_ok());
    }
}
