//! Distance and coverage primitives shared by every optimizer stage.

use serde::{Deserialize, Serialize};

use crate::common::{DomainError, DomainResult};
use crate::domains::patrol::aggregate::{AreaBounds, Waypoint};

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Distance function the optimizer evaluates all costs with.
pub trait DistanceMetric: Send + Sync {
    fn distance(&self, a: &Waypoint, b: &Waypoint) -> f64;
}

/// Euclidean distance on raw coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct Planar;

impl DistanceMetric for Planar {
    fn distance(&self, a: &Waypoint, b: &Waypoint) -> f64 {
        distance(a, b)
    }
}

/// Great-circle distance in metres, reading `x` as latitude and `y` as
/// longitude in degrees.
#[derive(Debug, Clone, Copy, Default)]
pub struct Geodesic;

impl DistanceMetric for Geodesic {
    fn distance(&self, a: &Waypoint, b: &Waypoint) -> f64 {
        let (lat1, lat2) = (a.x.to_radians(), b.x.to_radians());
        let d_lat = lat2 - lat1;
        let d_lon = (b.y - a.y).to_radians();
        let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    #[default]
    Planar,
    Geodesic,
}

impl MetricKind {
    pub fn metric(&self) -> &'static dyn DistanceMetric {
        match self {
            MetricKind::Planar => &Planar,
            MetricKind::Geodesic => &Geodesic,
        }
    }
}

pub fn distance(a: &Waypoint, b: &Waypoint) -> f64 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

/// Sum of consecutive legs; zero for paths with fewer than two points.
pub fn total_distance(path: &[Waypoint], metric: &dyn DistanceMetric) -> f64 {
    path.windows(2).map(|w| metric.distance(&w[0], &w[1])).sum()
}

/// Square grid laid over an area, used to measure and fill coverage.
#[derive(Debug, Clone, Copy)]
pub struct CoverageGrid {
    bounds: AreaBounds,
    size: usize,
}

impl CoverageGrid {
    pub fn new(bounds: AreaBounds, size: usize) -> DomainResult<Self> {
        bounds.validate()?;
        if size < 2 {
            return Err(DomainError::invalid(format!(
                "coverage grid needs at least 2 cells per axis, got {}",
                size
            )));
        }
        Ok(Self { bounds, size })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cell_count(&self) -> usize {
        self.size * self.size
    }

    /// Cell containing `point`, clamped into the grid.
    pub fn cell_of(&self, point: &Waypoint) -> (usize, usize) {
        let span = (self.size - 1) as f64;
        let ix = Self::clamp_index(((point.x - self.bounds.min_x) / self.bounds.width() * span).floor(), span);
        let iy = Self::clamp_index(((point.y - self.bounds.min_y) / self.bounds.height() * span).floor(), span);
        (ix, iy)
    }

    pub fn cell_center(&self, ix: usize, iy: usize) -> Waypoint {
        let span = (self.size - 1) as f64;
        Waypoint::new(
            self.bounds.min_x + self.bounds.width() * ix as f64 / span,
            self.bounds.min_y + self.bounds.height() * iy as f64 / span,
        )
    }

    /// Occupancy indexed `[ix * size + iy]`.
    pub fn occupancy(&self, path: &[Waypoint]) -> Vec<bool> {
        let mut covered = vec![false; self.cell_count()];
        for point in path {
            let (ix, iy) = self.cell_of(point);
            covered[ix * self.size + iy] = true;
        }
        covered
    }

    pub fn coverage_ratio(&self, path: &[Waypoint]) -> f64 {
        let covered = self.occupancy(path).iter().filter(|c| **c).count();
        covered as f64 / self.cell_count() as f64
    }

    fn clamp_index(raw: f64, span: f64) -> usize {
        // NaN coordinates land in cell 0
        if raw.is_nan() {
            return 0;
        }
        raw.clamp(0.0, span) as usize
    }
}
