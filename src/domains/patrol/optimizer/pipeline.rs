use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, instrument};

use crate::common::{DomainError, DomainResult};
use crate::domains::patrol::aggregate::{
    AreaBounds, Criterion, HistoricalRecord, Obstacle, OptimizationStats, Waypoint,
};

use super::battery::reduce_for_battery;
use super::coverage::{densify_coverage, DEFAULT_GRID_SIZE};
use super::geometry::{DistanceMetric, MetricKind};
use super::historical::{weight_by_history, DEFAULT_HISTORY_RADIUS};
use super::obstacles::{deflect_obstacles, DEFAULT_SAFE_DISTANCE};
use super::sequencer::sequence_nearest_neighbor;
use super::stats::StatsAccumulator;

/// Tunables of the optimizer pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerSettings {
    pub grid_size: usize,
    pub safe_distance: f64,
    pub history_radius: f64,
    /// Percent of battery charge spent per unit of travelled distance. The
    /// unit follows `metric`: coordinate units for planar, metres for
    /// geodesic, so geodesic setups need a much smaller value.
    pub battery_per_unit: f64,
    pub metric: MetricKind,
    /// Execution order of the stages; a stage missing here never runs.
    pub stage_order: Vec<Criterion>,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            safe_distance: DEFAULT_SAFE_DISTANCE,
            history_radius: DEFAULT_HISTORY_RADIUS,
            battery_per_unit: 0.05,
            metric: MetricKind::Planar,
            stage_order: Criterion::ALL.to_vec(),
        }
    }
}

impl OptimizerSettings {
    pub fn validate(&self) -> DomainResult<()> {
        if self.grid_size < 2 {
            return Err(DomainError::invalid("optimizer grid_size must be at least 2"));
        }
        if !(self.safe_distance > 0.0) || !(self.history_radius > 0.0) {
            return Err(DomainError::invalid(
                "optimizer safe_distance and history_radius must be positive",
            ));
        }
        if !(self.battery_per_unit >= 0.0) {
            return Err(DomainError::invalid("optimizer battery_per_unit must not be negative"));
        }
        let unique: BTreeSet<_> = self.stage_order.iter().collect();
        if unique.len() != self.stage_order.len() {
            return Err(DomainError::invalid("optimizer stage_order lists a stage twice"));
        }
        Ok(())
    }
}

/// Everything the stages may need besides the path itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationConstraints {
    pub battery_level: Option<u8>,
    pub area_bounds: Option<AreaBounds>,
    pub speed_limit: Option<f64>,
    pub obstacles: Vec<Obstacle>,
    pub historical_data: Vec<HistoricalRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationOutcome {
    pub waypoints: Vec<Waypoint>,
    pub stats: OptimizationStats,
    /// Stages that ran, in execution order.
    pub applied: Vec<Criterion>,
}

/// Runs the selected stages over a path in the configured order.
#[derive(Debug, Clone)]
pub struct PathOptimizer {
    settings: OptimizerSettings,
}

impl PathOptimizer {
    pub fn new(settings: OptimizerSettings) -> DomainResult<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &OptimizerSettings {
        &self.settings
    }

    pub fn metric(&self) -> &'static dyn DistanceMetric {
        self.settings.metric.metric()
    }

    #[instrument(skip_all, fields(waypoints = path.len(), criteria = criteria.len()))]
    pub fn optimize(
        &self,
        path: &[Waypoint],
        criteria: &BTreeSet<Criterion>,
        constraints: &OptimizationConstraints,
    ) -> DomainResult<OptimizationOutcome> {
        self.check_request(criteria, constraints)?;

        let metric = self.metric();
        // Bounds only feed the coverage statistic when they are usable.
        let stats_bounds = constraints
            .area_bounds
            .as_ref()
            .filter(|bounds| bounds.validate().is_ok());
        let accumulator = StatsAccumulator::begin(
            path,
            metric,
            self.settings.battery_per_unit,
            stats_bounds,
            self.settings.grid_size,
            constraints.speed_limit,
        )?;

        let mut current = path.to_vec();
        let mut applied = Vec::new();
        for stage in self.settings.stage_order.iter().filter(|s| criteria.contains(*s)) {
            let before = current.len();
            current = self
                .run_stage(*stage, &current, constraints, metric)
                .map_err(|e| wrap_stage_error(*stage, e))?;
            debug!(stage = %stage, before, after = current.len(), "optimizer stage applied");
            applied.push(*stage);
        }

        Ok(OptimizationOutcome {
            stats: accumulator.finish(&current),
            waypoints: current,
            applied,
        })
    }

    fn check_request(
        &self,
        criteria: &BTreeSet<Criterion>,
        constraints: &OptimizationConstraints,
    ) -> DomainResult<()> {
        if let Some(missing) = criteria.iter().find(|c| !self.settings.stage_order.contains(c)) {
            return Err(DomainError::invalid(format!(
                "criterion '{}' is not part of the configured stage order",
                missing
            )));
        }
        if let Some(speed) = constraints.speed_limit {
            if !(speed > 0.0) || !speed.is_finite() {
                return Err(DomainError::invalid(format!(
                    "speed limit must be a positive number, got {}",
                    speed
                )));
            }
        }
        if criteria.contains(&Criterion::Coverage) {
            constraints
                .area_bounds
                .as_ref()
                .ok_or_else(|| DomainError::invalid("coverage optimization requires area_bounds"))?
                .validate()?;
        }
        if criteria.contains(&Criterion::Battery) {
            match constraints.battery_level {
                Some(level) if level <= 100 => {}
                Some(level) => {
                    return Err(DomainError::invalid(format!(
                        "battery level {} is outside 0..=100",
                        level
                    )))
                }
                None => return Err(DomainError::invalid("battery optimization requires battery_level")),
            }
        }
        Ok(())
    }

    fn run_stage(
        &self,
        stage: Criterion,
        path: &[Waypoint],
        constraints: &OptimizationConstraints,
        metric: &dyn DistanceMetric,
    ) -> DomainResult<Vec<Waypoint>> {
        match stage {
            Criterion::Battery => {
                let level = constraints
                    .battery_level
                    .ok_or_else(|| DomainError::invalid("battery optimization requires battery_level"))?;
                reduce_for_battery(path, level)
            }
            Criterion::Coverage => {
                let bounds = constraints
                    .area_bounds
                    .as_ref()
                    .ok_or_else(|| DomainError::invalid("coverage optimization requires area_bounds"))?;
                densify_coverage(path, bounds, self.settings.grid_size)
            }
            Criterion::Time => sequence_nearest_neighbor(path, metric),
            Criterion::Obstacles => {
                deflect_obstacles(path, &constraints.obstacles, self.settings.safe_distance, metric)
            }
            Criterion::Historical => Ok(weight_by_history(
                path,
                &constraints.historical_data,
                self.settings.history_radius,
                metric,
            )),
        }
    }
}

fn wrap_stage_error(stage: Criterion, error: DomainError) -> DomainError {
    match error {
        DomainError::InvalidArgument { .. } => error,
        other => DomainError::InternalError {
            stage: stage.to_string(),
            reason: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn optimizer() -> PathOptimizer {
        PathOptimizer::new(OptimizerSettings::default()).unwrap()
    }

    fn criteria(list: &[Criterion]) -> BTreeSet<Criterion> {
        list.iter().copied().collect()
    }

    #[test]
    fn duplicate_stage_order_is_rejected() {
        let settings = OptimizerSettings {
            stage_order: vec![Criterion::Time, Criterion::Time],
            ..OptimizerSettings::default()
        };
        assert!(PathOptimizer::new(settings).is_err());
    }

    #[test]
    fn stage_order_follows_settings_not_request() {
        let settings = OptimizerSettings {
            stage_order: vec![Criterion::Obstacles, Criterion::Time],
            ..OptimizerSettings::default()
        };
        let opt = PathOptimizer::new(settings).unwrap();
        let path = vec![Waypoint::new(0.0, 0.0), Waypoint::new(5.0, 0.0), Waypoint::new(3.0, 0.0)];
        let constraints = OptimizationConstraints {
            obstacles: vec![Obstacle::new(3.0, 0.5)],
            ..Default::default()
        };
        let outcome = opt
            .optimize(&path, &criteria(&[Criterion::Time, Criterion::Obstacles]), &constraints)
            .unwrap();
        assert_eq!(outcome.applied, vec![Criterion::Obstacles, Criterion::Time]);
        // (3,0) was deflected to (5,2) before sequencing
        assert!(outcome.waypoints[2].same_position(&Waypoint::new(5.0, 2.0)));
    }

    #[test]
    fn criterion_outside_stage_order_is_invalid() {
        let settings = OptimizerSettings {
            stage_order: vec![Criterion::Time],
            ..OptimizerSettings::default()
        };
        let opt = PathOptimizer::new(settings).unwrap();
        let err = opt
            .optimize(&[Waypoint::new(0.0, 0.0)], &criteria(&[Criterion::Historical]), &Default::default())
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument { .. }));
    }

    #[test]
    fn non_positive_speed_limit_is_invalid() {
        let constraints = OptimizationConstraints {
            speed_limit: Some(0.0),
            ..Default::default()
        };
        assert!(optimizer()
            .optimize(&[Waypoint::new(0.0, 0.0)], &criteria(&[]), &constraints)
            .is_err());
    }

    #[test]
    fn battery_without_level_is_invalid() {
        let err = optimizer()
            .optimize(&[Waypoint::new(0.0, 0.0)], &criteria(&[Criterion::Battery]), &Default::default())
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument { .. }));
    }

    #[test]
    fn internal_errors_name_the_stage() {
        let err = wrap_stage_error(
            Criterion::Coverage,
            DomainError::InfrastructureError("grid exploded".to_string()),
        );
        match err {
            DomainError::InternalError { stage, reason } => {
                assert_eq!(stage, "coverage");
                assert!(reason.contains("grid exploded"));
            }
            other => panic!("Expected InternalError, got {:?}", other),
        }
    }
}
