//! GA evolutionary loop execution.
//!
//! [`GaRunner`] drives initialization → evaluation → elitism → selection →
//! crossover → mutation, one generation at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, trace};

use super::config::GaConfig;
use super::types::{Fitness, GaProblem, Individual};
use crate::error::Result;

/// Result of a GA run.
#[derive(Debug, Clone)]
pub struct GaResult<I: Individual> {
    /// Best individual seen during the run.
    pub best: I,

    /// Same as `best.fitness()`.
    pub best_fitness: I::Fitness,

    /// Generations actually executed.
    pub generations: usize,

    /// The run stopped early on the cancellation flag.
    pub cancelled: bool,

    /// The run stopped early on the time limit.
    pub timed_out: bool,

    /// Best fitness after initialization, then after each generation.
    /// Non-increasing.
    pub fitness_history: Vec<f64>,
}

/// Executes the GA evolutionary loop.
///
/// The caller owns the random source, so two runs with identically seeded
/// generators produce identical results (when `parallel` evaluation is off
/// or the fitness is deterministic, which it always is here).
///
/// ```
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
/// use u_routeplan::ga::{GaConfig, GaRunner};
/// use u_routeplan::sequence::TourProblem;
/// use u_routeplan::distance::DistanceMatrix;
///
/// let matrix = DistanceMatrix::from_raw(3, vec![0.0, 1.0, 2.0, 1.0, 0.0, 1.5, 2.0, 1.5, 0.0]).unwrap();
/// let problem = TourProblem::new(&matrix);
/// let config = GaConfig::default().with_population_size(10).with_max_generations(5);
/// let mut rng = StdRng::seed_from_u64(42);
/// let result = GaRunner::run(&problem, &config, &mut rng).unwrap();
/// assert_eq!(result.generations, 5);
/// ```
pub struct GaRunner;

impl GaRunner {
    /// Runs the GA without a cancellation flag.
    ///
    /// # Errors
    /// [`PlanError::InvalidConfig`](crate::error::PlanError::InvalidConfig)
    /// if `config` does not validate.
    pub fn run<P: GaProblem, R: Rng>(
        problem: &P,
        config: &GaConfig,
        rng: &mut R,
    ) -> Result<GaResult<P::Individual>> {
        Self::run_with_cancel(problem, config, rng, None)
    }

    /// Runs the GA with an optional cancellation flag.
    ///
    /// The flag and the time limit are checked between generations; on
    /// either, the best individual found so far is returned.
    pub fn run_with_cancel<P: GaProblem, R: Rng>(
        problem: &P,
        config: &GaConfig,
        rng: &mut R,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<GaResult<P::Individual>> {
        config.validate()?;
        let started = Instant::now();

        let mut population: Vec<P::Individual> = (0..config.population_size)
            .map(|_| problem.create_individual(rng))
            .collect();
        evaluate(problem, &mut population, config.parallel);
        sort_by_fitness(&mut population);

        let mut best = population[0].clone();
        let mut fitness_history = Vec::with_capacity(config.max_generations + 1);
        fitness_history.push(best.fitness().to_f64());

        let mut generations = 0;
        let mut cancelled = false;
        let mut timed_out = false;

        while generations < config.max_generations {
            if cancel.as_ref().is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                cancelled = true;
                break;
            }
            if let Some(limit) = config.time_limit_ms {
                if started.elapsed().as_millis() >= u128::from(limit) {
                    timed_out = true;
                    break;
                }
            }

            let elites = config.elite_count.min(population.len());
            let mut next: Vec<P::Individual> = population[..elites].to_vec();

            while next.len() < config.population_size {
                let (a, b) = config.selection.select_pair(&population, rng);
                let mut child = problem.crossover(&population[a], &population[b], rng);
                if rng.random_bool(config.mutation_rate) {
                    problem.mutate(&mut child, rng);
                }
                next.push(child);
            }

            // elites keep their fitness
            evaluate(problem, &mut next[elites..], config.parallel);
            sort_by_fitness(&mut next);
            population = next;
            generations += 1;

            if population[0].fitness() < best.fitness() {
                best = population[0].clone();
                trace!(generation = generations, fitness = best.fitness().to_f64(), "improved");
            }
            fitness_history.push(best.fitness().to_f64());
        }

        debug!(
            generations,
            cancelled,
            timed_out,
            best = best.fitness().to_f64(),
            "ga run finished"
        );

        Ok(GaResult {
            best_fitness: best.fitness(),
            best,
            generations,
            cancelled,
            timed_out,
            fitness_history,
        })
    }
}

fn sort_by_fitness<I: Individual>(population: &mut [I]) {
    population.sort_by(|a, b| {
        a.fitness()
            .partial_cmp(&b.fitness())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

#[cfg(feature = "parallel")]
fn evaluate<P: GaProblem>(problem: &P, individuals: &mut [P::Individual], parallel: bool) {
    if parallel {
        individuals.par_iter_mut().for_each(|ind| {
            let f = problem.evaluate(ind);
            ind.set_fitness(f);
        });
    } else {
        for ind in individuals {
            let f = problem.evaluate(ind);
            ind.set_fitness(f);
        }
    }
}

#[cfg(not(feature = "parallel"))]
fn evaluate<P: GaProblem>(problem: &P, individuals: &mut [P::Individual], _parallel: bool) {
    for ind in individuals {
        let f = problem.evaluate(ind);
        ind.set_fitness(f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlanError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Minimize the sum of squares of a fixed-length integer vector.
    #[derive(Clone, Debug)]
    struct Genome {
        genes: Vec<i64>,
        fitness: f64,
    }

    impl Individual for Genome {
        type Fitness = f64;
        fn fitness(&self) -> f64 {
            self.fitness
        }
        fn set_fitness(&mut self, f: f64) {
            self.fitness = f;
        }
    }

    struct SumOfSquares;

    impl GaProblem for SumOfSquares {
        type Individual = Genome;

        fn create_individual<R: Rng>(&self, rng: &mut R) -> Genome {
            Genome {
                genes: (0..6).map(|_| rng.random_range(-50..=50)).collect(),
                fitness: f64::worst(),
            }
        }

        fn evaluate(&self, g: &Genome) -> f64 {
            g.genes.iter().map(|x| (x * x) as f64).sum()
        }

        fn crossover<R: Rng>(&self, a: &Genome, b: &Genome, rng: &mut R) -> Genome {
            let cut = rng.random_range(0..a.genes.len());
            let genes = a.genes[..cut].iter().chain(&b.genes[cut..]).copied().collect();
            Genome { genes, fitness: f64::worst() }
        }

        fn mutate<R: Rng>(&self, g: &mut Genome, rng: &mut R) {
            let i = rng.random_range(0..g.genes.len());
            g.genes[i] += rng.random_range(-3..=3);
        }
    }

    fn config() -> GaConfig {
        GaConfig::default()
            .with_population_size(40)
            .with_max_generations(60)
            .with_mutation_rate(0.5)
    }

    #[test]
    fn test_history_is_non_increasing() {
        let mut rng = StdRng::seed_from_u64(42);
        let result = GaRunner::run(&SumOfSquares, &config(), &mut rng).unwrap();
        assert_eq!(result.fitness_history.len(), 61);
        for pair in result.fitness_history.windows(2) {
            assert!(pair[1] <= pair[0]);
        }
        assert_eq!(result.best_fitness, SumOfSquares.evaluate(&result.best));
    }

    #[test]
    fn test_same_seed_same_result() {
        let a = GaRunner::run(&SumOfSquares, &config(), &mut StdRng::seed_from_u64(7)).unwrap();
        let b = GaRunner::run(&SumOfSquares, &config(), &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a.best.genes, b.best.genes);
        assert_eq!(a.fitness_history, b.fitness_history);
    }

    #[test]
    fn test_improves_over_initial_population() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = GaRunner::run(&SumOfSquares, &config(), &mut rng).unwrap();
        let first = result.fitness_history[0];
        assert!(result.best_fitness < first || first == 0.0);
    }

    #[test]
    fn test_cancel_before_first_generation() {
        let flag = Arc::new(AtomicBool::new(true));
        let mut rng = StdRng::seed_from_u64(3);
        let result =
            GaRunner::run_with_cancel(&SumOfSquares, &config(), &mut rng, Some(flag)).unwrap();
        assert!(result.cancelled);
        assert_eq!(result.generations, 0);
        assert_eq!(result.fitness_history.len(), 1);
    }

    #[test]
    fn test_invalid_config_is_error() {
        let bad = config().with_population_size(0);
        let err = GaRunner::run(&SumOfSquares, &bad, &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(err, PlanError::InvalidConfig(_)));
    }
}
