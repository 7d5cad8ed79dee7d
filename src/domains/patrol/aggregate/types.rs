use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::common::{DomainError, DomainResult};

/// A single point of a patrol path.
///
/// Records arriving from the path-creation boundary use `latitude`/`longitude`;
/// they are read as `x`/`y` without any reprojection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    #[serde(alias = "latitude")]
    pub x: f64,
    #[serde(alias = "longitude")]
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Waypoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            weight: None,
            timestamp: None,
        }
    }

    pub fn from_lat_lon(latitude: f64, longitude: f64) -> Self {
        Self::new(latitude, longitude)
    }

    pub fn with_weight(&self, weight: f64) -> Self {
        Self {
            weight: Some(weight),
            ..self.clone()
        }
    }

    pub fn with_timestamp(&self, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp: Some(timestamp),
            ..self.clone()
        }
    }

    /// Compare coordinates only, ignoring weight and timestamp.
    pub fn same_position(&self, other: &Waypoint) -> bool {
        self.x == other.x && self.y == other.y
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl AreaBounds {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Rejects degenerate, inverted or NaN extents.
    pub fn validate(&self) -> DomainResult<()> {
        if !(self.min_x < self.max_x) || !(self.min_y < self.max_y) {
            return Err(DomainError::invalid(format!(
                "area bounds must satisfy min < max on both axes, got x=[{}, {}] y=[{}, {}]",
                self.min_x, self.max_x, self.min_y, self.max_y
            )));
        }
        Ok(())
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    #[serde(alias = "latitude")]
    pub x: f64,
    #[serde(alias = "longitude")]
    pub y: f64,
}

impl Obstacle {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn position(&self) -> Waypoint {
        Waypoint::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    pub location: Waypoint,
    pub success_rate: f64,
}

impl HistoricalRecord {
    pub fn new(location: Waypoint, success_rate: f64) -> Self {
        Self {
            location,
            success_rate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    Battery,
    Coverage,
    Time,
    Obstacles,
    Historical,
}

impl Criterion {
    pub const ALL: [Criterion; 5] = [
        Criterion::Battery,
        Criterion::Coverage,
        Criterion::Time,
        Criterion::Obstacles,
        Criterion::Historical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Criterion::Battery => "battery",
            Criterion::Coverage => "coverage",
            Criterion::Time => "time",
            Criterion::Obstacles => "obstacles",
            Criterion::Historical => "historical",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Criterion {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Criterion::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::invalid(format!("unknown optimization criterion '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizationStats {
    pub original_distance: f64,
    pub optimized_distance: f64,
    pub battery_saved: f64,
    pub time_saved: f64,
    pub coverage_improved: f64,
}
