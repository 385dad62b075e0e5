//! Visit-order optimization for small sets of geographic stops.
//! Builds a haversine distance matrix, constructs nearest-neighbor tours from
//! sampled start points, improves each with 2-opt and keeps the shortest.

mod algo;
mod error;
mod geo;
mod io;
pub mod logging;
mod node;
mod tour;

pub(crate) use geo::distance;
pub(crate) use io::options;

pub use algo::nearest_neighbor::nearest_neighbor_tour;
pub use algo::optimizer::{CandidateResult, OptimizerConfig, RouteOptimizer, RoutePlan};
pub use algo::start_sampler::StartSampler;
pub use algo::two_opt::{TwoOptConfig, TwoOptOutcome, two_opt};
pub use error::{Error, Result};
pub use geo::distance::{EARTH_RADIUS_KM, haversine_km};
pub use geo::matrix::DistanceMatrix;
pub use io::input::{RouteInput, Stop};
pub use io::options::{LogFormat, LogLevel, OptimizerOptions, RouteShape};
pub use io::output;
pub use node::GeoPoint;
pub use tour::TourMetrics;
