use crate::common::DomainEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::aggregate::{Criterion, OptimizationStats, PatrolSchedule, Waypoint};
use super::schedule::PathEstimate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PatrolPathEvent {
    PathCreated {
        path_id: String,
        robot_id: u64,
        staff_id: u64,
        waypoints: Vec<Waypoint>,
        schedule: PatrolSchedule,
        battery_level: u8,
        timestamp: DateTime<Utc>,
    },
    PathOptimized {
        path_id: String,
        waypoints: Vec<Waypoint>,
        criteria: Vec<Criterion>,
        stats: OptimizationStats,
        estimate: Option<PathEstimate>,
        timestamp: DateTime<Utc>,
    },
    PathDeleted {
        path_id: String,
        timestamp: DateTime<Utc>,
    },
}

impl DomainEvent for PatrolPathEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PatrolPathEvent::PathCreated { .. } => "PathCreated",
            PatrolPathEvent::PathOptimized { .. } => "PathOptimized",
            PatrolPathEvent::PathDeleted { .. } => "PathDeleted",
        }
    }

    fn aggregate_id(&self) -> &str {
        match self {
            PatrolPathEvent::PathCreated { path_id, .. } => path_id,
            PatrolPathEvent::PathOptimized { path_id, .. } => path_id,
            PatrolPathEvent::PathDeleted { path_id, .. } => path_id,
        }
    }

    fn event_version(&self) -> u64 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            PatrolPathEvent::PathCreated { timestamp, .. } => *timestamp,
            PatrolPathEvent::PathOptimized { timestamp, .. } => *timestamp,
            PatrolPathEvent::PathDeleted { timestamp, .. } => *timestamp,
        }
    }
}
