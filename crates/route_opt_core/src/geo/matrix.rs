use crate::{Error, GeoPoint, Result, RouteShape, distance};

/// Dense, symmetric haversine distance matrix in kilometers, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    n: usize,
}

impl DistanceMatrix {
    pub fn from_points(points: &[GeoPoint]) -> Self {
        let n = points.len();
        let mut data = vec![0.0; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = distance::haversine_km(points[i], points[j]);
                data[i * n + j] = d;
                data[j * n + i] = d;
            }
        }
        Self { data, n }
    }

    /// Builds the matrix from parallel latitude/longitude arrays in degrees.
    pub fn from_lat_lng(lats: &[f64], lngs: &[f64]) -> Result<Self> {
        if lats.len() != lngs.len() {
            return Err(Error::invalid_input(format!(
                "latitude/longitude length mismatch: lats={} lngs={}",
                lats.len(),
                lngs.len()
            )));
        }
        let points: Vec<GeoPoint> = lats
            .iter()
            .zip(lngs)
            .map(|(&lat, &lng)| GeoPoint::new(lat, lng))
            .collect();
        Ok(Self::from_points(&points))
    }

    #[inline]
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.n + to]
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn row(&self, from: usize) -> &[f64] {
        &self.data[from * self.n..(from + 1) * self.n]
    }

    pub fn is_symmetric(&self, tol: f64) -> bool {
        (0..self.n).all(|i| {
            ((i + 1)..self.n).all(|j| (self.get(i, j) - self.get(j, i)).abs() <= tol)
        })
    }

    /// Length of `tour`; `Closed` adds the leg from the last stop back to the first.
    pub fn path_length(&self, tour: &[usize], shape: RouteShape) -> f64 {
        if tour.len() < 2 {
            return 0.0;
        }
        let open: f64 = tour.windows(2).map(|w| self.get(w[0], w[1])).sum();
        match shape {
            RouteShape::Open => open,
            RouteShape::Closed => open + self.get(tour[tour.len() - 1], tour[0]),
        }
    }
}
