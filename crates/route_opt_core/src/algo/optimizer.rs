use crate::{
    DistanceMatrix, Error, GeoPoint, Result, RouteShape, StartSampler, TwoOptConfig,
    nearest_neighbor_tour, two_opt,
};

const ERR_INVALID_MAX_CANDIDATES: &str = "max_candidates must be > 0";
const ERR_INVALID_THRESHOLD: &str = "improvement_threshold must be finite and >= 0";
const ERR_NO_RESULTS: &str = "No candidate start produced a tour";

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OptimizerConfig {
    pub shape: RouteShape,
    pub two_opt: TwoOptConfig,
    pub sampler: StartSampler,
    /// Skip start sampling and always begin at this stop.
    pub fixed_start: Option<usize>,
}

/// Outcome of one tried start. The tour itself is kept only for the winner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CandidateResult {
    pub start: usize,
    pub length_km: f64,
    pub iterations: usize,
    pub converged: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RoutePlan {
    /// Visiting order as indices into the input.
    pub order: Vec<usize>,
    pub length_km: f64,
    pub best_start: Option<usize>,
    /// Length of the input order under the same shape.
    pub baseline_km: f64,
    pub shape: RouteShape,
    /// Every tried start, in trial order.
    pub candidates: Vec<CandidateResult>,
}

impl RoutePlan {
    fn empty(shape: RouteShape) -> Self {
        Self {
            order: Vec::new(),
            length_km: 0.0,
            best_start: None,
            baseline_km: 0.0,
            shape,
            candidates: Vec::new(),
        }
    }

    pub fn savings_km(&self) -> f64 {
        self.baseline_km - self.length_km
    }

    pub fn savings_percent(&self) -> f64 {
        if self.baseline_km > 0.0 {
            self.savings_km() / self.baseline_km * 100.0
        } else {
            0.0
        }
    }

    /// Candidates sorted by length, each with its gap to the best tour.
    pub fn comparison(&self) -> Vec<(CandidateResult, f64)> {
        let mut rows: Vec<(CandidateResult, f64)> = self
            .candidates
            .iter()
            .map(|c| (*c, c.length_km - self.length_km))
            .collect();
        rows.sort_by(|lhs, rhs| {
            lhs.0
                .length_km
                .total_cmp(&rhs.0.length_km)
                .then(lhs.0.start.cmp(&rhs.0.start))
        });
        rows
    }

    /// Input items rearranged into visiting order.
    pub fn ordered<'a, T>(&self, items: &'a [T]) -> Vec<&'a T> {
        self.order.iter().map(|&idx| &items[idx]).collect()
    }
}

/// Runs nearest-neighbor construction and 2-opt from each candidate start and
/// keeps the shortest tour.
///
/// Phases per run: validate, build the matrix, then for every start
/// construct, improve and score, and finally select the best.
#[derive(Clone, Debug, Default)]
pub struct RouteOptimizer {
    config: OptimizerConfig,
}

impl RouteOptimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    #[route_opt_derive::timer("optimizer")]
    pub fn optimize(&self, points: &[GeoPoint]) -> Result<RoutePlan> {
        self.validate(points)?;
        let shape = self.config.shape;
        let n = points.len();
        if n == 0 {
            log::info!("optimizer.run: skip n=0 reason=empty_input");
            return Ok(RoutePlan::empty(shape));
        }

        let matrix = DistanceMatrix::from_points(points);
        let input_order: Vec<usize> = (0..n).collect();
        let baseline_km = matrix.path_length(&input_order, shape);

        let starts = match self.config.fixed_start {
            Some(start) => vec![start],
            None => self.config.sampler.candidates(points),
        };
        log::info!(
            "optimizer.run: start n={n} shape={shape} starts={} fixed_start={} baseline_km={baseline_km:.2}",
            starts.len(),
            self.config.fixed_start.is_some()
        );

        let mut candidates = Vec::with_capacity(starts.len());
        let mut best: Option<(Vec<usize>, f64, usize)> = None;
        for &start in &starts {
            let mut tour = nearest_neighbor_tour(&matrix, start)?;
            let outcome = two_opt(&matrix, &mut tour, shape, self.config.two_opt);
            let length_km = matrix.path_length(&tour, shape);

            log::debug!(
                "optimizer.candidate: start={start} length_km={length_km:.3} iterations={} swaps={} converged={}",
                outcome.iterations,
                outcome.swaps,
                outcome.converged
            );
            candidates.push(CandidateResult {
                start,
                length_km,
                iterations: outcome.iterations,
                converged: outcome.converged,
            });

            let improves = match &best {
                None => true,
                Some((_, best_len, _)) => length_km < *best_len,
            };
            if improves {
                best = Some((tour, length_km, start));
            }
        }

        let Some((order, length_km, best_start)) = best else {
            return Err(Error::other(ERR_NO_RESULTS));
        };

        let plan = RoutePlan {
            order,
            length_km,
            best_start: Some(best_start),
            baseline_km,
            shape,
            candidates,
        };
        log::info!(
            "optimizer.run: complete best_start={best_start} length_km={length_km:.2} savings_km={:.2} savings_pct={:.1}",
            plan.savings_km(),
            plan.savings_percent()
        );
        Ok(plan)
    }

    fn validate(&self, points: &[GeoPoint]) -> Result<()> {
        if self.config.sampler.max_candidates == 0 {
            return Err(Error::invalid_input(ERR_INVALID_MAX_CANDIDATES));
        }
        let threshold = self.config.two_opt.improvement_threshold_km;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(Error::invalid_input(ERR_INVALID_THRESHOLD));
        }
        if let Some((idx, point)) = points.iter().enumerate().find(|(_, p)| !p.is_valid()) {
            return Err(Error::invalid_input(format!(
                "stop {idx} has invalid lat/lng values: {point}"
            )));
        }
        if let Some(start) = self.config.fixed_start
            && !points.is_empty()
            && start >= points.len()
        {
            return Err(Error::invalid_input(format!(
                "fixed start {start} out of range for {} stops",
                points.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{OptimizerConfig, RouteOptimizer};
    use crate::{DistanceMatrix, GeoPoint, RouteShape, StartSampler, haversine_km};

    fn pharmacies() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(31.2304, 121.4737),
            GeoPoint::new(31.2989, 121.5015),
            GeoPoint::new(31.1880, 121.4365),
            GeoPoint::new(31.2660, 121.4190),
            GeoPoint::new(31.2200, 121.5440),
            GeoPoint::new(31.3120, 121.4480),
            GeoPoint::new(31.1700, 121.4950),
            GeoPoint::new(31.2450, 121.3860),
        ]
    }

    fn many_stops(n: usize) -> Vec<GeoPoint> {
        (0..n)
            .map(|i| {
                let t = i as f64;
                GeoPoint::new(
                    31.0 + (t * 0.618).fract() * 0.4,
                    121.2 + (t * 0.414).fract() * 0.5,
                )
            })
            .collect()
    }

    fn sorted(mut values: Vec<usize>) -> Vec<usize> {
        values.sort_unstable();
        values
    }

    #[test]
    fn empty_input_short_circuits() {
        let plan = RouteOptimizer::default().optimize(&[]).expect("plan");
        assert!(plan.order.is_empty());
        assert_eq!(plan.length_km, 0.0);
        assert_eq!(plan.best_start, None);
        assert!(plan.candidates.is_empty());
    }

    #[test]
    fn single_point_gives_zero_length() {
        let plan = RouteOptimizer::default()
            .optimize(&[GeoPoint::new(31.0, 121.0)])
            .expect("plan");
        assert_eq!(plan.order, vec![0]);
        assert_eq!(plan.length_km, 0.0);
        assert_eq!(plan.best_start, Some(0));
    }

    #[test]
    fn two_points_keep_the_first_start_on_ties() {
        let points = [GeoPoint::new(31.0, 121.0), GeoPoint::new(31.1, 121.2)];
        let plan = RouteOptimizer::default().optimize(&points).expect("plan");

        assert_eq!(plan.order, vec![0, 1]);
        assert_eq!(plan.length_km, haversine_km(points[0], points[1]));
        assert_eq!(plan.candidates.len(), 2);
    }

    #[test]
    fn best_plan_is_a_permutation_and_the_minimum_candidate() {
        let points = pharmacies();
        for shape in [RouteShape::Open, RouteShape::Closed] {
            let optimizer = RouteOptimizer::new(OptimizerConfig {
                shape,
                ..OptimizerConfig::default()
            });
            let plan = optimizer.optimize(&points).expect("plan");

            assert_eq!(sorted(plan.order.clone()), (0..points.len()).collect::<Vec<_>>());
            assert_eq!(plan.candidates.len(), points.len());
            let min = plan
                .candidates
                .iter()
                .map(|c| c.length_km)
                .fold(f64::INFINITY, f64::min);
            assert_eq!(plan.length_km, min);
            assert_eq!(plan.order[0], plan.best_start.expect("best start"));

            let matrix = DistanceMatrix::from_points(&points);
            assert!((matrix.path_length(&plan.order, shape) - plan.length_km).abs() < 1e-9);
            assert_eq!(plan.baseline_km, matrix.path_length(&[0, 1, 2, 3, 4, 5, 6, 7], shape));
        }
    }

    #[test]
    fn fixed_start_skips_sampling() {
        let points = pharmacies();
        let optimizer = RouteOptimizer::new(OptimizerConfig {
            fixed_start: Some(3),
            ..OptimizerConfig::default()
        });
        let plan = optimizer.optimize(&points).expect("plan");

        assert_eq!(plan.candidates.len(), 1);
        assert_eq!(plan.order[0], 3);
        assert_eq!(plan.best_start, Some(3));
    }

    #[test]
    fn fixed_start_out_of_range_is_rejected() {
        let optimizer = RouteOptimizer::new(OptimizerConfig {
            fixed_start: Some(8),
            ..OptimizerConfig::default()
        });
        let err = optimizer.optimize(&pharmacies()).expect_err("start 8 should fail");
        assert!(err.to_string().contains("fixed start 8 out of range"));
    }

    #[test]
    fn invalid_coordinates_are_rejected_before_any_work() {
        let mut points = pharmacies();
        points[5] = GeoPoint::new(f64::NAN, 121.0);
        let err = RouteOptimizer::default()
            .optimize(&points)
            .expect_err("NaN latitude should fail");
        assert!(err.to_string().contains("stop 5 has invalid lat/lng"));
    }

    #[test]
    fn zero_candidate_budget_is_rejected() {
        let optimizer = RouteOptimizer::new(OptimizerConfig {
            sampler: StartSampler {
                max_candidates: 0,
                ..StartSampler::default()
            },
            ..OptimizerConfig::default()
        });
        let err = optimizer
            .optimize(&pharmacies())
            .expect_err("zero budget should fail");
        assert!(err.to_string().contains("max_candidates must be > 0"));
    }

    #[test]
    fn large_inputs_use_sampled_starts() {
        let points = many_stops(45);
        let plan = RouteOptimizer::default().optimize(&points).expect("plan");

        assert_eq!(plan.candidates.len(), 20);
        assert_eq!(sorted(plan.order.clone()), (0..45).collect::<Vec<_>>());
        assert!(plan.baseline_km > 0.0);
        assert!((plan.savings_km() - (plan.baseline_km - plan.length_km)).abs() < 1e-12);
    }

    #[test]
    fn comparison_is_sorted_with_gap_to_best() {
        let plan = RouteOptimizer::default()
            .optimize(&pharmacies())
            .expect("plan");
        let rows = plan.comparison();

        assert_eq!(rows.len(), plan.candidates.len());
        assert_eq!(rows[0].1, 0.0);
        assert!(rows.windows(2).all(|w| w[0].0.length_km <= w[1].0.length_km));
        assert!(rows.iter().all(|(_, gap)| *gap >= 0.0));
    }

    #[test]
    fn ordered_rearranges_caller_records() {
        let names = ["a", "b", "c", "d", "e", "f", "g", "h"];
        let plan = RouteOptimizer::default()
            .optimize(&pharmacies())
            .expect("plan");
        let ordered = plan.ordered(&names);

        assert_eq!(ordered.len(), names.len());
        assert_eq!(*ordered[0], names[plan.order[0]]);
    }

    #[test]
    fn savings_percent_is_zero_without_baseline() {
        let plan = RouteOptimizer::default()
            .optimize(&[GeoPoint::new(1.0, 1.0)])
            .expect("plan");
        assert_eq!(plan.savings_percent(), 0.0);
    }
}
