use rand::{SeedableRng, rngs::StdRng, seq::index};

use crate::GeoPoint;

const DEFAULT_EXHAUSTIVE_LIMIT: usize = 15;
const DEFAULT_MAX_CANDIDATES: usize = 20;
const DEFAULT_SEED: u64 = 12_345;

/// Chooses which stops to try as tour starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StartSampler {
    /// Up to this many stops, every stop is tried.
    pub exhaustive_limit: usize,
    /// Hard cap on the number of starts tried above `exhaustive_limit`.
    pub max_candidates: usize,
    pub seed: u64,
}

impl Default for StartSampler {
    fn default() -> Self {
        Self {
            exhaustive_limit: DEFAULT_EXHAUSTIVE_LIMIT,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            seed: DEFAULT_SEED,
        }
    }
}

impl StartSampler {
    /// Candidate start indices, ascending and unique.
    ///
    /// Small inputs get every index. Larger ones get the four lat/lng extremes
    /// and the stop nearest the centroid, topped up with seeded uniform samples
    /// from the rest until `max_candidates` is reached.
    pub fn candidates(&self, points: &[GeoPoint]) -> Vec<usize> {
        let n = points.len();
        if n <= self.exhaustive_limit {
            return (0..n).collect();
        }

        let budget = self.max_candidates.min(n);
        let mut chosen: Vec<usize> = Vec::with_capacity(budget);
        for idx in Self::anchor_indices(points) {
            if chosen.len() == budget {
                break;
            }
            if !chosen.contains(&idx) {
                chosen.push(idx);
            }
        }

        let remaining = budget - chosen.len();
        if remaining > 0 {
            let pool: Vec<usize> = (0..n).filter(|idx| !chosen.contains(idx)).collect();
            let mut rng = StdRng::seed_from_u64(self.seed);
            let picks = index::sample(&mut rng, pool.len(), remaining.min(pool.len()));
            chosen.extend(picks.iter().map(|k| pool[k]));
        }

        chosen.sort_unstable();
        log::debug!(
            "sampler: n={n} budget={budget} anchors={} sampled={remaining} seed={}",
            budget - remaining,
            self.seed
        );
        chosen
    }

    /// Southmost, northmost, westmost, eastmost, then closest to the centroid.
    fn anchor_indices(points: &[GeoPoint]) -> Vec<usize> {
        let mut anchors = vec![
            arg_best(points, |p| p.lat, |cand, best| cand < best),
            arg_best(points, |p| p.lat, |cand, best| cand > best),
            arg_best(points, |p| p.lng, |cand, best| cand < best),
            arg_best(points, |p| p.lng, |cand, best| cand > best),
        ];

        let n = points.len() as f64;
        let center_lat = points.iter().map(|p| p.lat).sum::<f64>() / n;
        let center_lng = points.iter().map(|p| p.lng).sum::<f64>() / n;
        anchors.push(arg_best(
            points,
            |p| {
                let dlat = p.lat - center_lat;
                let dlng = p.lng - center_lng;
                dlat * dlat + dlng * dlng
            },
            |cand, best| cand < best,
        ));
        anchors
    }
}

/// Index of the first point whose key beats every earlier one.
fn arg_best(
    points: &[GeoPoint],
    key: impl Fn(&GeoPoint) -> f64,
    better: impl Fn(f64, f64) -> bool,
) -> usize {
    let mut best_idx = 0;
    let mut best = key(&points[0]);
    for (idx, point) in points.iter().enumerate().skip(1) {
        let value = key(point);
        if better(value, best) {
            best = value;
            best_idx = idx;
        }
    }
    best_idx
}
