use crate::common::{DomainError, DomainResult};
use crate::domains::patrol::aggregate::{Obstacle, Waypoint};

use super::geometry::DistanceMetric;

pub const DEFAULT_SAFE_DISTANCE: f64 = 2.0;

/// Replace every waypoint that sits closer than `safe_distance` to an
/// obstacle by a point shifted diagonally by `safe_distance` on both axes.
///
/// Only the first offending obstacle is considered, and the shifted point is
/// not checked again, so it may still be unsafe.
pub fn deflect_obstacles(
    path: &[Waypoint],
    obstacles: &[Obstacle],
    safe_distance: f64,
    metric: &dyn DistanceMetric,
) -> DomainResult<Vec<Waypoint>> {
    if !(safe_distance > 0.0) {
        return Err(DomainError::invalid(format!(
            "safe distance must be positive, got {}",
            safe_distance
        )));
    }

    let deflected = path
        .iter()
        .map(|point| {
            let unsafe_hit = obstacles
                .iter()
                .any(|obstacle| metric.distance(point, &obstacle.position()) < safe_distance);
            if unsafe_hit {
                Waypoint {
                    x: point.x + safe_distance,
                    y: point.y + safe_distance,
                    ..point.clone()
                }
            } else {
                point.clone()
            }
        })
        .collect();
    Ok(deflected)
}
