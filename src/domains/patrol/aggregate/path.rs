use super::types::{Criterion, OptimizationStats};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PathStatus {
    Pending,   // Created, never optimized
    Optimized, // At least one optimization applied
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Once,
    Daily,
    Weekly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatrolSchedule {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub repeat: bool,
    #[serde(default = "default_frequency")]
    pub frequency: Frequency,
}

fn default_frequency() -> Frequency {
    Frequency::Once
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathMetadata {
    pub battery_level_at_creation: u8,
    pub total_waypoints: usize,
    pub total_distance: Option<f64>,
    pub estimated_completion_secs: Option<f64>,
    pub estimated_battery_usage: Option<f64>,
}

/// One entry of a path's optimization history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRecord {
    pub timestamp: DateTime<Utc>,
    pub criteria: Vec<Criterion>,
    pub stats: OptimizationStats,
}
