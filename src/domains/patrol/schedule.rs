use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{DomainError, DomainResult};
use crate::domains::patrol::aggregate::Waypoint;
use crate::domains::patrol::optimizer::geometry::{total_distance, DistanceMetric};

/// Travel estimate attached to a path's metadata.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathEstimate {
    pub total_distance: f64,
    pub estimated_duration_secs: f64,
    pub estimated_battery_usage: f64,
}

fn check_speed(speed_limit: f64) -> DomainResult<()> {
    if !(speed_limit > 0.0) || !speed_limit.is_finite() {
        return Err(DomainError::invalid(format!(
            "speed limit must be a positive number, got {}",
            speed_limit
        )));
    }
    Ok(())
}

pub fn estimate_path(
    path: &[Waypoint],
    speed_limit: f64,
    metric: &dyn DistanceMetric,
    battery_per_unit: f64,
) -> DomainResult<PathEstimate> {
    check_speed(speed_limit)?;
    let total = total_distance(path, metric);
    Ok(PathEstimate {
        total_distance: total,
        estimated_duration_secs: total / speed_limit,
        estimated_battery_usage: total * battery_per_unit,
    })
}

/// Stamp every waypoint with its expected arrival time when the robot leaves
/// the first waypoint at `start` and travels at `speed_limit` units per second.
pub fn schedule_waypoints(
    path: &[Waypoint],
    start: DateTime<Utc>,
    speed_limit: f64,
    metric: &dyn DistanceMetric,
) -> DomainResult<Vec<Waypoint>> {
    check_speed(speed_limit)?;

    let mut travelled: f64 = 0.0;
    let mut previous: Option<&Waypoint> = None;
    let mut scheduled = Vec::with_capacity(path.len());
    for point in path {
        if let Some(prev) = previous {
            travelled += metric.distance(prev, point);
        }
        let offset_ms = (travelled / speed_limit * 1000.0).round();
        let arrival = Some(offset_ms)
            .filter(|ms| ms.is_finite() && *ms < i64::MAX as f64)
            .and_then(|ms| TimeDelta::try_milliseconds(ms as i64))
            .and_then(|offset| start.checked_add_signed(offset))
            .ok_or_else(|| {
                DomainError::invalid(format!(
                    "schedule offset out of range after {} distance units at speed {}",
                    travelled, speed_limit
                ))
            })?;
        scheduled.push(point.with_timestamp(arrival));
        previous = Some(point);
    }
    Ok(scheduled)
}
