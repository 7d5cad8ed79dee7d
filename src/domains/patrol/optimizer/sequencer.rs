use crate::common::{DomainError, DomainResult};
use crate::domains::patrol::aggregate::Waypoint;

use super::geometry::DistanceMetric;

/// Reorder waypoints into a greedy nearest-neighbour tour.
///
/// The tour starts at the first input waypoint and always moves to the
/// closest remaining one; ties go to the waypoint that appeared first in the
/// input. The result is a permutation of the input.
///
/// Runs in O(n²) time since no spatial index is used, which is fine for
/// patrol paths of a few dozen points.
pub fn sequence_nearest_neighbor(
    path: &[Waypoint],
    metric: &dyn DistanceMetric,
) -> DomainResult<Vec<Waypoint>> {
    let Some(first) = path.first() else {
        return Err(DomainError::invalid("route sequencing needs at least one waypoint"));
    };

    let mut remaining: Vec<&Waypoint> = path[1..].iter().collect();
    let mut tour = Vec::with_capacity(path.len());
    tour.push(first.clone());

    while !remaining.is_empty() {
        let current = &tour[tour.len() - 1];
        let mut best_idx = 0;
        let mut best_dist = f64::INFINITY;
        for (idx, candidate) in remaining.iter().enumerate() {
            let d = metric.distance(current, candidate);
            // strict comparison keeps the earliest candidate on ties
            if d < best_dist {
                best_dist = d;
                best_idx = idx;
            }
        }
        // Vec::remove keeps the remaining candidates in input order
        tour.push(remaining.remove(best_idx).clone());
    }

    Ok(tour)
}
