use crate::{GeoPoint, RouteShape};

/// Edge statistics of an ordered route, in kilometers.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TourMetrics {
    pub stops: usize,
    pub total_km: f64,
    pub longest_km: f64,
    pub average_km: f64,
    pub threshold_km: f64,
    /// Edges longer than `average_km * outlier_factor`.
    pub outliers: usize,
}

impl TourMetrics {
    pub fn from_points(points: &[GeoPoint], shape: RouteShape, outlier_factor: f64) -> Self {
        let n = points.len();
        if n < 2 {
            log::info!("metrics: n={n} nothing to report");
            return Self {
                stops: n,
                ..Self::default()
            };
        }

        let edges = match shape {
            RouteShape::Open => n - 1,
            RouteShape::Closed => n,
        };
        let distances: Vec<f64> = (0..edges)
            .map(|i| points[i].dist_km(&points[(i + 1) % n]))
            .collect();
        let total_km: f64 = distances.iter().sum();
        let average_km = total_km / edges as f64;
        let threshold_km = average_km * outlier_factor;
        let outliers = distances.iter().filter(|d| **d > threshold_km).count();
        let longest_km = distances.iter().copied().fold(0.0_f64, f64::max);

        log::info!(
            "metrics: n={n} shape={shape} total_km={total_km:.2} longest_km={longest_km:.2} avg_km={average_km:.2} outlier_threshold_km={threshold_km:.2} outliers={outliers}"
        );

        Self {
            stops: n,
            total_km,
            longest_km,
            average_km,
            threshold_km,
            outliers,
        }
    }
}
