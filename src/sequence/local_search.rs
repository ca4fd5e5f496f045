//! Construction and improvement heuristics for single tours.

use crate::distance::DistanceMatrix;

const IMPROVEMENT_EPS: f64 = 1e-9;

/// Greedy tour over every node of `matrix`, starting at `start` and always
/// moving to the closest unvisited node. Ties go to the lower index.
pub fn nearest_neighbor(matrix: &DistanceMatrix, start: usize) -> Vec<usize> {
    let n = matrix.len();
    if n == 0 {
        return Vec::new();
    }
    let mut visited = vec![false; n];
    let mut tour = Vec::with_capacity(n);
    let mut current = start;
    visited[current] = true;
    tour.push(current);

    while tour.len() < n {
        let next = (0..n)
            .filter(|&j| !visited[j])
            .min_by(|&a, &b| matrix.get(current, a).total_cmp(&matrix.get(current, b)));
        let Some(next) = next else { break };
        visited[next] = true;
        tour.push(next);
        current = next;
    }
    tour
}

/// First-improvement 2-opt on a closed tour.
///
/// Position 0 never moves, so a tour that starts at the depot still starts
/// there afterwards. Returns the number of improving moves applied.
pub fn two_opt(matrix: &DistanceMatrix, tour: &mut [usize]) -> usize {
    two_opt_until(matrix, tour, || false)
}

/// [`two_opt`] that asks `stop` before every sweep and returns early once it
/// answers `true`. The tour is always left valid.
pub fn two_opt_until(matrix: &DistanceMatrix, tour: &mut [usize], mut stop: impl FnMut() -> bool) -> usize {
    let n = tour.len();
    if n < 4 {
        return 0;
    }
    let mut moves = 0;
    let mut improved = true;
    while improved {
        if stop() {
            break;
        }
        improved = false;
        for i in 1..n - 1 {
            for j in i + 1..n {
                let (a, b) = (tour[i - 1], tour[i]);
                let (c, d) = (tour[j], tour[(j + 1) % n]);
                let delta = matrix.get(a, c) + matrix.get(b, d) - matrix.get(a, b) - matrix.get(c, d);
                if delta < -IMPROVEMENT_EPS {
                    tour[i..=j].reverse();
                    moves += 1;
                    improved = true;
                }
            }
        }
    }
    moves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinate;

    fn square_with_center() -> DistanceMatrix {
        let c = |lat, lon| Coordinate::new(lat, lon).unwrap();
        DistanceMatrix::with_depot(
            c(0.005, 0.005),
            &[c(0.0, 0.0), c(0.01, 0.01), c(0.0, 0.01), c(0.01, 0.0)],
        )
    }

    #[test]
    fn test_nearest_neighbor_visits_everything_once() {
        let matrix = square_with_center();
        let mut tour = nearest_neighbor(&matrix, 0);
        assert_eq!(tour[0], 0);
        tour.sort_unstable();
        assert_eq!(tour, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_two_opt_removes_crossing() {
        let matrix = square_with_center();
        // 1 → 2 and 3 → 4 are both diagonals of the square
        let mut tour = vec![0, 1, 2, 3, 4];
        let before = matrix.tour_length(&tour);
        let moves = two_opt(&matrix, &mut tour);
        assert!(moves > 0);
        assert_eq!(tour[0], 0);
        assert!(matrix.tour_length(&tour) < before);
    }

    #[test]
    fn test_two_opt_until_stops_before_first_sweep() {
        let matrix = square_with_center();
        let mut tour = vec![0, 1, 2, 3, 4];
        let mut asked = 0;
        let moves = two_opt_until(&matrix, &mut tour, || {
            asked += 1;
            true
        });
        assert_eq!(moves, 0);
        assert_eq!(asked, 1);
        assert_eq!(tour, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_two_opt_short_tour_untouched() {
        let matrix = square_with_center();
        let mut tour = vec![0, 2, 1];
        assert_eq!(two_opt(&matrix, &mut tour), 0);
        assert_eq!(tour, vec![0, 2, 1]);
    }
}
