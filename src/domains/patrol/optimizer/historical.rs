use ordered_float::OrderedFloat;
use std::cmp::Reverse;

use crate::domains::patrol::aggregate::{HistoricalRecord, Waypoint};

use super::geometry::DistanceMetric;

pub const DEFAULT_HISTORY_RADIUS: f64 = 1.0;
pub const MIN_WEIGHT: f64 = 0.1;
pub const MAX_WEIGHT: f64 = 2.0;

const WEIGHT_STEP: f64 = 0.2;
const HIGH_SUCCESS: f64 = 0.8;
const LOW_SUCCESS: f64 = 0.4;

/// Weight each waypoint by nearby historical outcomes and rank the path by
/// weight, highest first. Equal weights keep their relative order.
pub fn weight_by_history(
    path: &[Waypoint],
    history: &[HistoricalRecord],
    radius: f64,
    metric: &dyn DistanceMetric,
) -> Vec<Waypoint> {
    let mut weighted: Vec<Waypoint> = path
        .iter()
        .map(|point| {
            let raw = history
                .iter()
                .filter(|record| metric.distance(point, &record.location) < radius)
                .fold(1.0, |weight, record| {
                    if record.success_rate > HIGH_SUCCESS {
                        weight + WEIGHT_STEP
                    } else if record.success_rate < LOW_SUCCESS {
                        weight - WEIGHT_STEP
                    } else {
                        weight
                    }
                });
            point.with_weight(raw.clamp(MIN_WEIGHT, MAX_WEIGHT))
        })
        .collect();

    weighted.sort_by_key(|w| Reverse(OrderedFloat(w.weight.unwrap_or(MIN_WEIGHT))));
    weighted
}
