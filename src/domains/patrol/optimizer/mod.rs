//! Patrol path optimizer: geometry primitives plus the transformation stages
//! that the [`PathOptimizer`] chains together.

pub mod battery;
pub mod coverage;
pub mod geometry;
pub mod historical;
pub mod obstacles;
pub mod pipeline;
pub mod sequencer;
pub mod stats;

pub use battery::reduce_for_battery;
pub use coverage::densify_coverage;
pub use geometry::{distance, total_distance, CoverageGrid, DistanceMetric, Geodesic, MetricKind, Planar};
pub use historical::weight_by_history;
pub use obstacles::deflect_obstacles;
pub use pipeline::*;
pub use sequencer::sequence_nearest_neighbor;
pub use stats::StatsAccumulator;
