use crate::common::aggregate::AggregateRoot;
use crate::common::{DomainError, DomainResult};
use crate::domains::patrol::events::PatrolPathEvent;
use crate::domains::patrol::schedule::PathEstimate;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::path::{OptimizationRecord, PathMetadata, PathStatus, PatrolSchedule};
use super::types::{Criterion, OptimizationStats, Waypoint};

/// Robots below this charge may not be given a new patrol path.
pub const MIN_CREATION_BATTERY: u8 = 20;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatrolPath {
    pub id: String,
    pub robot_id: u64,
    pub staff_id: u64,
    pub waypoints: Vec<Waypoint>,
    pub schedule: Option<PatrolSchedule>,
    pub status: PathStatus,
    pub metadata: PathMetadata,
    pub optimization_history: Vec<OptimizationRecord>,
    pub created_at: chrono::DateTime<Utc>,
    pub version: u64,
    #[serde(skip)]
    uncommitted_events: Vec<PatrolPathEvent>,
}

impl PatrolPath {
    /// Blank aggregate used as the starting point for event replay.
    pub fn empty(id: &str) -> Self {
        Self {
            id: id.to_string(),
            robot_id: 0,
            staff_id: 0,
            waypoints: Vec::new(),
            schedule: None,
            status: PathStatus::Pending,
            metadata: PathMetadata::default(),
            optimization_history: Vec::new(),
            created_at: Utc::now(),
            version: 0,
            uncommitted_events: Vec::new(),
        }
    }

    pub fn create(
        robot_id: u64,
        staff_id: u64,
        waypoints: Vec<Waypoint>,
        schedule: PatrolSchedule,
        battery_level: u8,
    ) -> DomainResult<Self> {
        if waypoints.is_empty() {
            return Err(DomainError::invalid("a patrol path needs at least one waypoint"));
        }
        if battery_level > 100 {
            return Err(DomainError::invalid(format!(
                "battery level {} is outside 0..=100",
                battery_level
            )));
        }
        if battery_level < MIN_CREATION_BATTERY {
            return Err(DomainError::invalid(format!(
                "Robot battery level too low ({}%). Minimum {}% required.",
                battery_level, MIN_CREATION_BATTERY
            )));
        }
        if schedule.end_time <= schedule.start_time {
            return Err(DomainError::invalid("schedule end_time must be after start_time"));
        }

        let path_id = Uuid::new_v4().to_string();
        let mut path = Self::empty(&path_id);
        path.raise(PatrolPathEvent::PathCreated {
            path_id,
            robot_id,
            staff_id,
            waypoints,
            schedule,
            battery_level,
            timestamp: Utc::now(),
        })?;
        Ok(path)
    }

    /// Rebuild an aggregate from its stored event history.
    pub fn from_history(id: &str, events: &[PatrolPathEvent]) -> DomainResult<Self> {
        let mut path = Self::empty(id);
        for event in events {
            path.apply(event)?;
        }
        Ok(path)
    }

    /// Supersede the waypoint sequence with an optimizer result.
    pub fn record_optimization(
        &mut self,
        waypoints: Vec<Waypoint>,
        criteria: Vec<Criterion>,
        stats: OptimizationStats,
        estimate: Option<PathEstimate>,
    ) -> DomainResult<()> {
        self.ensure_active()?;
        self.raise(PatrolPathEvent::PathOptimized {
            path_id: self.id.clone(),
            waypoints,
            criteria,
            stats,
            estimate,
            timestamp: Utc::now(),
        })
    }

    pub fn delete(&mut self) -> DomainResult<()> {
        self.ensure_active()?;
        self.raise(PatrolPathEvent::PathDeleted {
            path_id: self.id.clone(),
            timestamp: Utc::now(),
        })
    }

    pub fn is_deleted(&self) -> bool {
        self.status == PathStatus::Deleted
    }

    pub fn last_optimization(&self) -> Option<&OptimizationRecord> {
        self.optimization_history.last()
    }

    fn ensure_active(&self) -> DomainResult<()> {
        if self.is_deleted() {
            return Err(DomainError::not_found(self.id.clone()));
        }
        Ok(())
    }
}

impl AggregateRoot for PatrolPath {
    type Event = PatrolPathEvent;

    fn aggregate_id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) -> DomainResult<()> {
        match event {
            PatrolPathEvent::PathCreated {
                path_id,
                robot_id,
                staff_id,
                waypoints,
                schedule,
                battery_level,
                timestamp,
            } => {
                self.id = path_id.clone();
                self.robot_id = *robot_id;
                self.staff_id = *staff_id;
                self.waypoints = waypoints.clone();
                self.schedule = Some(schedule.clone());
                self.status = PathStatus::Pending;
                self.metadata = PathMetadata {
                    battery_level_at_creation: *battery_level,
                    total_waypoints: waypoints.len(),
                    ..PathMetadata::default()
                };
                self.created_at = *timestamp;
            }
            PatrolPathEvent::PathOptimized {
                waypoints,
                criteria,
                stats,
                estimate,
                timestamp,
                ..
            } => {
                if self.is_deleted() {
                    return Err(DomainError::InternalError {
                        stage: "apply".to_string(),
                        reason: format!("path {} was optimized after deletion", self.id),
                    });
                }
                self.waypoints = waypoints.clone();
                self.status = PathStatus::Optimized;
                self.metadata.total_waypoints = waypoints.len();
                if let Some(estimate) = estimate {
                    self.metadata.total_distance = Some(estimate.total_distance);
                    self.metadata.estimated_completion_secs = Some(estimate.estimated_duration_secs);
                    self.metadata.estimated_battery_usage = Some(estimate.estimated_battery_usage);
                }
                self.optimization_history.push(OptimizationRecord {
                    timestamp: *timestamp,
                    criteria: criteria.clone(),
                    stats: *stats,
                });
            }
            PatrolPathEvent::PathDeleted { .. } => {
                self.status = PathStatus::Deleted;
            }
        }
        self.version += 1;
        Ok(())
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn mark_events_as_committed(&mut self) {
        self.uncommitted_events.clear();
    }

    fn add_event(&mut self, event: Self::Event) {
        self.uncommitted_events.push(event);
    }
}
