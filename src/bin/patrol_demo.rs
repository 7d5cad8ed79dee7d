//! Generates a fake patrol fleet and runs every optimizer stage over it.
//!
//! Usage: `patrol_demo [seed]`. The same seed always yields the same fleet.

use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;
use std::sync::Arc;

use patrol_fleet::adapters::inbound::InMemoryEventStore;
use patrol_fleet::adapters::outbound::{init_prefixed_console_logger, EventSourcedPathRepository, FilesystemDataSource};
use patrol_fleet::application::{CreatePathRequest, OptimizePathRequest, PatrolPathService};
use patrol_fleet::domains::patrol::{
    AreaBounds, Criterion, Frequency, HistoricalRecord, Obstacle, OptimizationConstraints,
    OptimizerSettings, PathOptimizer, PatrolSchedule, Waypoint,
};

const ROBOTS: u64 = 5;
const AREA: f64 = 50.0;

fn fake_waypoints(rng: &mut StdRng, count: usize) -> Vec<Waypoint> {
    (0..count)
        .map(|_| Waypoint::new(rng.gen_range(0.0..AREA), rng.gen_range(0.0..AREA)))
        .collect()
}

fn fake_constraints(rng: &mut StdRng) -> OptimizationConstraints {
    OptimizationConstraints {
        battery_level: Some(rng.gen_range(5..=100)),
        area_bounds: Some(AreaBounds::new(0.0, AREA, 0.0, AREA)),
        speed_limit: Some(rng.gen_range(1..=10) as f64),
        obstacles: (0..rng.gen_range(0..6))
            .map(|_| Obstacle::new(rng.gen_range(0.0..AREA), rng.gen_range(0.0..AREA)))
            .collect(),
        historical_data: (0..rng.gen_range(0..10))
            .map(|_| {
                let location = Waypoint::new(rng.gen_range(0.0..AREA), rng.gen_range(0.0..AREA));
                HistoricalRecord::new(location, rng.gen_range(0.0..1.0))
            })
            .collect(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let seed = std::env::args()
        .nth(1)
        .map(|s| s.parse::<u64>())
        .transpose()?
        .unwrap_or(7);
    let mut rng = StdRng::seed_from_u64(seed);
    let logger = init_prefixed_console_logger("patrol_demo");

    let repository = Arc::new(EventSourcedPathRepository::new(Arc::new(InMemoryEventStore::new())));
    let data_source = Arc::new(FilesystemDataSource::new(None));
    let optimizer = PathOptimizer::new(OptimizerSettings::default())?;
    let service = PatrolPathService::new(repository, data_source, optimizer, logger.clone());

    let criteria: Vec<Criterion> = Criterion::ALL.to_vec();
    for robot_id in 1..=ROBOTS {
        let start = Utc::now() + Duration::minutes(rng.gen_range(0..120));
        let schedule = PatrolSchedule {
            start_time: start,
            end_time: start + Duration::hours(1),
            repeat: rng.gen_bool(0.5),
            frequency: Frequency::Daily,
        };
        let count = rng.gen_range(3..15);
        let request = CreatePathRequest {
            robot_id,
            staff_id: rng.gen_range(1..=3),
            waypoints: fake_waypoints(&mut rng, count),
            schedule,
            battery_level: rng.gen_range(20..=100),
        };
        let path = service.create_path(request).await?;

        let constraints = fake_constraints(&mut rng);
        let selected: BTreeSet<Criterion> = criteria
            .iter()
            .copied()
            .filter(|_| rng.gen_bool(0.7))
            .collect();
        let report = match service
            .optimize_path(
                &path.id,
                OptimizePathRequest {
                    criteria: selected.into_iter().collect(),
                    constraints,
                },
            )
            .await
        {
            Ok(report) => report,
            Err(e) => {
                logger.warn(&format!("robot {} skipped: {}", robot_id, e));
                continue;
            }
        };

        println!(
            "robot {} path {}: {} -> {} waypoints via [{}], distance {:.1} -> {:.1}, battery saved {:.2}, coverage +{:.2}",
            robot_id,
            report.path_id,
            path.waypoints.len(),
            report.total_waypoints,
            report.applied.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(","),
            report.stats.original_distance,
            report.stats.optimized_distance,
            report.stats.battery_saved,
            report.stats.coverage_improved,
        );
    }

    Ok(())
}
