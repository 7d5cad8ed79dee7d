use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::common::{ApplicationResult, DomainError};
use crate::domains::logger::DynLogger;
use crate::domains::patrol::loader::waypoints_from_geojson;
use crate::domains::patrol::{
    estimate_path, schedule_waypoints, Criterion, OptimizationConstraints, OptimizationStats,
    PathOptimizer, PatrolDataSource, PatrolPath, PatrolPathRepository, PatrolSchedule, Waypoint,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePathRequest {
    pub robot_id: u64,
    pub staff_id: u64,
    pub waypoints: Vec<Waypoint>,
    pub schedule: PatrolSchedule,
    /// Current charge reported by the robot status collaborator.
    pub battery_level: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizePathRequest {
    #[serde(default = "default_criteria")]
    pub criteria: Vec<Criterion>,
    #[serde(flatten)]
    pub constraints: OptimizationConstraints,
}

impl Default for OptimizePathRequest {
    fn default() -> Self {
        Self {
            criteria: default_criteria(),
            constraints: OptimizationConstraints::default(),
        }
    }
}

/// Criteria applied when a request names none.
pub fn default_criteria() -> Vec<Criterion> {
    vec![
        Criterion::Battery,
        Criterion::Coverage,
        Criterion::Time,
        Criterion::Obstacles,
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationReport {
    pub path_id: String,
    pub optimized_waypoints: Vec<Waypoint>,
    pub total_waypoints: usize,
    pub applied: Vec<Criterion>,
    pub stats: OptimizationStats,
}

pub struct PatrolPathService {
    repository: Arc<dyn PatrolPathRepository>,
    data_source: Arc<dyn PatrolDataSource>,
    optimizer: PathOptimizer,
    logger: DynLogger,
    default_speed: f64,
}

impl PatrolPathService {
    pub fn new(
        repository: Arc<dyn PatrolPathRepository>,
        data_source: Arc<dyn PatrolDataSource>,
        optimizer: PathOptimizer,
        logger: DynLogger,
    ) -> Self {
        Self {
            repository,
            data_source,
            optimizer,
            logger,
            default_speed: 1.5,
        }
    }

    pub fn with_default_speed(mut self, speed: f64) -> Self {
        self.default_speed = speed;
        self
    }

    pub async fn create_path(&self, request: CreatePathRequest) -> ApplicationResult<PatrolPath> {
        let mut path = PatrolPath::create(
            request.robot_id,
            request.staff_id,
            request.waypoints,
            request.schedule,
            request.battery_level,
        )
        .map_err(|e| {
            self.logger.warn(&format!(
                "rejected patrol path for robot {}: {}",
                request.robot_id, e
            ));
            e
        })?;
        self.repository.save(&mut path).await?;
        self.logger.info(&format!(
            "created patrol path {} for robot {} with {} waypoints",
            path.id,
            path.robot_id,
            path.waypoints.len()
        ));
        Ok(path)
    }

    pub async fn get_path(&self, path_id: &str) -> ApplicationResult<PatrolPath> {
        Ok(self.repository.load(path_id).await?)
    }

    pub async fn paths_for_robot(&self, robot_id: u64) -> ApplicationResult<Vec<PatrolPath>> {
        Ok(self.repository.list_for_robot(robot_id).await?)
    }

    /// Optimize a stored path and persist the result as a single event.
    ///
    /// Nothing is written unless every selected stage succeeds.
    pub async fn optimize_path(
        &self,
        path_id: &str,
        request: OptimizePathRequest,
    ) -> ApplicationResult<OptimizationReport> {
        let mut path = self.repository.load(path_id).await?;

        let criteria: BTreeSet<Criterion> = request.criteria.iter().copied().collect();
        let mut constraints = request.constraints;
        if constraints.battery_level.is_none() {
            constraints.battery_level = Some(path.metadata.battery_level_at_creation);
        }

        let outcome = self
            .optimizer
            .optimize(&path.waypoints, &criteria, &constraints)
            .map_err(|e| {
                self.logger
                    .error(&format!("optimization of path {} failed: {}", path_id, e));
                e
            })?;

        let settings = self.optimizer.settings();
        let metric = self.optimizer.metric();
        let speed = constraints.speed_limit.unwrap_or(self.default_speed);
        let estimate = estimate_path(&outcome.waypoints, speed, metric, settings.battery_per_unit)?;
        let waypoints = match &path.schedule {
            Some(schedule) => schedule_waypoints(&outcome.waypoints, schedule.start_time, speed, metric)?,
            None => outcome.waypoints.clone(),
        };

        path.record_optimization(waypoints.clone(), outcome.applied.clone(), outcome.stats, Some(estimate))?;
        self.repository.save(&mut path).await?;

        self.logger.info(&format!(
            "optimized path {} with [{}]: {:.2} -> {:.2} distance units",
            path_id,
            outcome
                .applied
                .iter()
                .map(Criterion::as_str)
                .collect::<Vec<_>>()
                .join(", "),
            outcome.stats.original_distance,
            outcome.stats.optimized_distance
        ));

        Ok(OptimizationReport {
            path_id: path_id.to_string(),
            total_waypoints: waypoints.len(),
            optimized_waypoints: waypoints,
            applied: outcome.applied,
            stats: outcome.stats,
        })
    }

    pub async fn delete_path(&self, path_id: &str) -> ApplicationResult<()> {
        let mut path = self.repository.load(path_id).await?;
        path.delete()?;
        self.repository.save(&mut path).await?;
        self.logger.info(&format!("deleted patrol path {}", path_id));
        Ok(())
    }

    /// Read waypoints from a named GeoJSON source.
    pub fn import_waypoints(&self, name: &str) -> ApplicationResult<Vec<Waypoint>> {
        let text = self.data_source.load_geojson(name)?;
        let waypoints = waypoints_from_geojson(&text)?;
        if waypoints.is_empty() {
            return Err(DomainError::invalid(format!("source '{}' contains no waypoints", name)).into());
        }
        Ok(waypoints)
    }
}
