//! Closed-tour problem for the GA engine.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::distance::DistanceMatrix;
use crate::ga::operators::{order_crossover, swap_mutation};
use crate::ga::{Fitness, GaProblem, Individual};

/// A permutation of every node of a [`DistanceMatrix`].
#[derive(Debug, Clone, PartialEq)]
pub struct Tour {
    pub nodes: Vec<usize>,
    length: f64,
}

impl Tour {
    pub fn new(nodes: Vec<usize>) -> Self {
        Self {
            nodes,
            length: f64::worst(),
        }
    }

    /// Closed-tour length as last evaluated.
    pub fn length(&self) -> f64 {
        self.length
    }
}

impl Individual for Tour {
    type Fitness = f64;

    fn fitness(&self) -> f64 {
        self.length
    }

    fn set_fitness(&mut self, fitness: f64) {
        self.length = fitness;
    }
}

/// Minimize the closed-tour length over all nodes of a matrix.
///
/// Tours are random permutations, recombined with order crossover and
/// mutated by swapping two positions.
pub struct TourProblem<'a> {
    matrix: &'a DistanceMatrix,
}

impl<'a> TourProblem<'a> {
    pub fn new(matrix: &'a DistanceMatrix) -> Self {
        Self { matrix }
    }
}

impl GaProblem for TourProblem<'_> {
    type Individual = Tour;

    fn create_individual<R: Rng>(&self, rng: &mut R) -> Tour {
        let mut nodes: Vec<usize> = (0..self.matrix.len()).collect();
        nodes.shuffle(rng);
        Tour::new(nodes)
    }

    fn evaluate(&self, tour: &Tour) -> f64 {
        self.matrix.tour_length(&tour.nodes)
    }

    fn crossover<R: Rng>(&self, a: &Tour, b: &Tour, rng: &mut R) -> Tour {
        Tour::new(order_crossover(&a.nodes, &b.nodes, rng))
    }

    fn mutate<R: Rng>(&self, tour: &mut Tour, rng: &mut R) {
        swap_mutation(&mut tour.nodes, rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn line() -> DistanceMatrix {
        // nodes on a line at 0, 1, 3
        DistanceMatrix::from_raw(3, vec![0.0, 1.0, 3.0, 1.0, 0.0, 2.0, 3.0, 2.0, 0.0]).unwrap()
    }

    #[test]
    fn test_evaluate_is_closed_tour() {
        let matrix = line();
        let problem = TourProblem::new(&matrix);
        assert_eq!(problem.evaluate(&Tour::new(vec![0, 1, 2])), 6.0);
    }

    #[test]
    fn test_random_tour_covers_all_nodes() {
        let matrix = line();
        let problem = TourProblem::new(&matrix);
        let mut tour = problem.create_individual(&mut StdRng::seed_from_u64(5));
        tour.nodes.sort_unstable();
        assert_eq!(tour.nodes, vec![0, 1, 2]);
        assert_eq!(tour.length(), f64::INFINITY);
    }
}
