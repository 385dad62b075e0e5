use crate::{DistanceMatrix, RouteShape};

const DEFAULT_MAX_ITERATIONS: usize = 200;
const DEFAULT_IMPROVEMENT_THRESHOLD_KM: f64 = 0.01;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TwoOptConfig {
    /// Maximum number of full passes over all edge pairs.
    pub max_iterations: usize,
    /// A swap is applied only when it shortens the tour by more than this.
    pub improvement_threshold_km: f64,
}

impl Default for TwoOptConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            improvement_threshold_km: DEFAULT_IMPROVEMENT_THRESHOLD_KM,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TwoOptOutcome {
    pub iterations: usize,
    pub swaps: usize,
    /// False when the iteration cap stopped the search before a clean pass.
    pub converged: bool,
}

/// First-improvement 2-opt over `tour`, in place. Position 0 never moves.
///
/// Each pass tries every pair of non-adjacent edges `(i, i+1)` and
/// `(j, j+1)` and reverses `tour[i+1..=j]` whenever that shortens the route
/// by more than the configured threshold. For an open route the last stop has
/// no outgoing edge; for a closed route it connects back to the first.
#[route_opt_derive::timer("two_opt")]
pub fn two_opt(
    matrix: &DistanceMatrix,
    tour: &mut [usize],
    shape: RouteShape,
    config: TwoOptConfig,
) -> TwoOptOutcome {
    let n = tour.len();
    let min_len = match shape {
        RouteShape::Open => 3,
        RouteShape::Closed => 4,
    };
    if n < min_len {
        log::trace!("two_opt: skip n={n} shape={shape} reason=insufficient_size");
        return TwoOptOutcome {
            converged: true,
            ..TwoOptOutcome::default()
        };
    }

    let threshold = config.improvement_threshold_km;
    let mut outcome = TwoOptOutcome::default();
    while outcome.iterations < config.max_iterations {
        outcome.iterations += 1;
        let mut pass_swaps = 0usize;

        for i in 0..(n - 2) {
            for j in (i + 2)..n {
                let Some(delta) = swap_delta(matrix, tour, shape, i, j) else {
                    continue;
                };
                if delta < -threshold {
                    tour[(i + 1)..=j].reverse();
                    pass_swaps += 1;
                }
            }
        }

        outcome.swaps += pass_swaps;
        log::trace!("two_opt: pass={} swaps={pass_swaps}", outcome.iterations);
        if pass_swaps == 0 {
            outcome.converged = true;
            break;
        }
    }

    if !outcome.converged {
        log::debug!(
            "two_opt: iteration cap reached n={n} iterations={} swaps={}",
            outcome.iterations,
            outcome.swaps
        );
    }
    outcome
}

/// Length change from reversing `tour[i+1..=j]`, or `None` when the move is a no-op.
fn swap_delta(
    matrix: &DistanceMatrix,
    tour: &[usize],
    shape: RouteShape,
    i: usize,
    j: usize,
) -> Option<f64> {
    let n = tour.len();
    let a = tour[i];
    let b = tour[i + 1];
    let c = tour[j];

    let d = if j + 1 < n {
        Some(tour[j + 1])
    } else {
        match shape {
            RouteShape::Open => None,
            // reversing everything after the start only flips the direction of the cycle
            RouteShape::Closed if i == 0 => return None,
            RouteShape::Closed => Some(tour[0]),
        }
    };

    Some(match d {
        Some(d) => {
            matrix.get(a, c) + matrix.get(b, d) - matrix.get(a, b) - matrix.get(c, d)
        }
        None => matrix.get(a, c) - matrix.get(a, b),
    })
}

#[cfg(test)]
mod tests {
    use super::{TwoOptConfig, two_opt};
    use crate::{DistanceMatrix, GeoPoint, RouteShape, nearest_neighbor_tour};

    fn square() -> DistanceMatrix {
        DistanceMatrix::from_points(&[
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 1.0),
            GeoPoint::new(1.0, 1.0),
            GeoPoint::new(1.0, 0.0),
        ])
    }

    fn scattered() -> DistanceMatrix {
        DistanceMatrix::from_points(&[
            GeoPoint::new(31.20, 121.40),
            GeoPoint::new(31.35, 121.62),
            GeoPoint::new(31.05, 121.25),
            GeoPoint::new(31.28, 121.31),
            GeoPoint::new(31.11, 121.58),
            GeoPoint::new(31.42, 121.45),
            GeoPoint::new(31.02, 121.47),
            GeoPoint::new(31.31, 121.19),
            GeoPoint::new(31.16, 121.71),
            GeoPoint::new(31.24, 121.52),
            GeoPoint::new(31.38, 121.28),
            GeoPoint::new(31.07, 121.36),
        ])
    }

    fn sorted(mut values: Vec<usize>) -> Vec<usize> {
        values.sort_unstable();
        values
    }

    #[test]
    fn uncrosses_an_open_path_along_the_equator() {
        let matrix = DistanceMatrix::from_points(&[
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 3.0),
            GeoPoint::new(0.0, 1.0),
            GeoPoint::new(0.0, 2.0),
        ]);
        let mut tour = vec![0, 1, 2, 3];

        let outcome = two_opt(&matrix, &mut tour, RouteShape::Open, TwoOptConfig::default());

        assert_eq!(tour, vec![0, 2, 3, 1]);
        assert!(outcome.converged);
        assert_eq!(outcome.swaps, 2);
    }

    #[test]
    fn uncrosses_a_closed_loop() {
        let matrix = square();
        let mut tour = vec![0, 2, 1, 3];
        let before = matrix.path_length(&tour, RouteShape::Closed);

        let outcome = two_opt(&matrix, &mut tour, RouteShape::Closed, TwoOptConfig::default());
        let after = matrix.path_length(&tour, RouteShape::Closed);

        assert!(after < before);
        assert_eq!(tour[0], 0);
        assert!(tour == vec![0, 1, 2, 3] || tour == vec![0, 3, 2, 1]);
        assert!(outcome.converged);
    }

    #[test]
    fn optimal_square_is_left_untouched() {
        let matrix = square();
        for shape in [RouteShape::Open, RouteShape::Closed] {
            let mut tour = nearest_neighbor_tour(&matrix, 0).expect("tour");
            assert_eq!(tour, vec![0, 1, 2, 3]);

            let outcome = two_opt(&matrix, &mut tour, shape, TwoOptConfig::default());

            assert_eq!(tour, vec![0, 1, 2, 3]);
            assert_eq!(outcome.swaps, 0);
            assert_eq!(outcome.iterations, 1);
            assert!(outcome.converged);
        }
    }

    #[test]
    fn never_lengthens_and_keeps_a_permutation() {
        let matrix = scattered();
        for shape in [RouteShape::Open, RouteShape::Closed] {
            for start in 0..matrix.len() {
                let mut tour = nearest_neighbor_tour(&matrix, start).expect("tour");
                let before = matrix.path_length(&tour, shape);

                two_opt(&matrix, &mut tour, shape, TwoOptConfig::default());

                let after = matrix.path_length(&tour, shape);
                assert!(after <= before, "shape={shape} start={start}");
                assert_eq!(tour[0], start);
                assert_eq!(sorted(tour), (0..matrix.len()).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn second_run_on_converged_tour_is_a_fixed_point() {
        let matrix = scattered();
        for shape in [RouteShape::Open, RouteShape::Closed] {
            let mut tour = nearest_neighbor_tour(&matrix, 3).expect("tour");
            let first = two_opt(&matrix, &mut tour, shape, TwoOptConfig::default());
            assert!(first.converged);
            let once = tour.clone();
            let once_len = matrix.path_length(&once, shape);

            let second = two_opt(&matrix, &mut tour, shape, TwoOptConfig::default());

            assert_eq!(tour, once);
            assert_eq!(matrix.path_length(&tour, shape), once_len);
            assert_eq!(second.swaps, 0);
        }
    }

    #[test]
    fn two_points_is_a_no_op() {
        let matrix =
            DistanceMatrix::from_points(&[GeoPoint::new(30.0, 120.0), GeoPoint::new(30.5, 120.5)]);
        let mut tour = vec![0, 1];

        let outcome = two_opt(&matrix, &mut tour, RouteShape::Open, TwoOptConfig::default());

        assert_eq!(tour, vec![0, 1]);
        assert_eq!(outcome.iterations, 0);
        assert!(outcome.converged);
    }

    #[test]
    fn iteration_cap_stops_early_without_error() {
        let matrix = DistanceMatrix::from_points(&[
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 3.0),
            GeoPoint::new(0.0, 1.0),
            GeoPoint::new(0.0, 2.0),
        ]);
        let mut tour = vec![0, 1, 2, 3];
        let config = TwoOptConfig {
            max_iterations: 1,
            ..TwoOptConfig::default()
        };

        let outcome = two_opt(&matrix, &mut tour, RouteShape::Open, config);

        assert_eq!(outcome.iterations, 1);
        assert!(outcome.swaps > 0);
        assert!(!outcome.converged);
    }

    #[test]
    fn threshold_suppresses_tiny_gains() {
        let matrix = DistanceMatrix::from_points(&[
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 3.0),
            GeoPoint::new(0.0, 1.0),
            GeoPoint::new(0.0, 2.0),
        ]);
        let mut tour = vec![0, 1, 2, 3];
        let config = TwoOptConfig {
            improvement_threshold_km: 10_000.0,
            ..TwoOptConfig::default()
        };

        let outcome = two_opt(&matrix, &mut tour, RouteShape::Open, config);

        assert_eq!(tour, vec![0, 1, 2, 3]);
        assert_eq!(outcome.swaps, 0);
    }
}
