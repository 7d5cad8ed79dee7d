use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;
use tempfile::TempDir;

use patrol_fleet::adapters::inbound::InMemoryEventStore;
use patrol_fleet::adapters::outbound::{init_noop_logger, EventSourcedPathRepository, FilesystemDataSource};
use patrol_fleet::application::*;
use patrol_fleet::common::{ApplicationError, DomainError};
use patrol_fleet::domains::patrol::*;

struct Fixture {
    service: PatrolPathService,
    data_dir: TempDir,
}

fn fixture() -> Fixture {
    let data_dir = TempDir::new().unwrap();
    let repository = Arc::new(EventSourcedPathRepository::new(Arc::new(InMemoryEventStore::new())));
    let data_source = Arc::new(FilesystemDataSource::new(Some(data_dir.path().to_path_buf())));
    let optimizer = PathOptimizer::new(OptimizerSettings::default()).unwrap();
    let service = PatrolPathService::new(repository, data_source, optimizer, init_noop_logger())
        .with_default_speed(2.0);
    Fixture { service, data_dir }
}

fn request(battery_level: u8) -> CreatePathRequest {
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
    CreatePathRequest {
        robot_id: 11,
        staff_id: 5,
        waypoints: vec![
            Waypoint::new(0.0, 0.0),
            Waypoint::new(10.0, 0.0),
            Waypoint::new(1.0, 0.0),
            Waypoint::new(9.0, 0.0),
        ],
        schedule: PatrolSchedule {
            start_time: start,
            end_time: start + Duration::hours(1),
            repeat: false,
            frequency: Frequency::Once,
        },
        battery_level,
    }
}

#[tokio::test]
async fn test_create_and_get_path() {
    let f = fixture();
    let created = f.service.create_path(request(90)).await.unwrap();

    let loaded = f.service.get_path(&created.id).await.unwrap();
    assert_eq!(loaded.robot_id, 11);
    assert_eq!(loaded.status, PathStatus::Pending);
    assert_eq!(loaded.waypoints.len(), 4);

    let for_robot = f.service.paths_for_robot(11).await.unwrap();
    assert_eq!(for_robot.len(), 1);
    assert!(f.service.paths_for_robot(12).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_rejects_low_battery() {
    let f = fixture();
    let err = f.service.create_path(request(10)).await.unwrap_err();
    assert!(matches!(err, ApplicationError::Domain(DomainError::InvalidArgument { .. })));
}

#[tokio::test]
async fn test_optimize_persists_result() {
    let f = fixture();
    let created = f.service.create_path(request(90)).await.unwrap();

    let report = f
        .service
        .optimize_path(
            &created.id,
            OptimizePathRequest {
                criteria: vec![Criterion::Time],
                constraints: OptimizationConstraints::default(),
            },
        )
        .await
        .unwrap();

    let xs: Vec<f64> = report.optimized_waypoints.iter().map(|w| w.x).collect();
    assert_eq!(xs, vec![0.0, 1.0, 9.0, 10.0]);
    assert_eq!(report.total_waypoints, 4);
    assert_eq!(report.stats.original_distance, 27.0);
    assert_eq!(report.stats.optimized_distance, 10.0);
    assert!(report.stats.battery_saved > 0.0);

    // arrival times follow the schedule start at the default speed
    let start = created.schedule.as_ref().unwrap().start_time;
    assert_eq!(report.optimized_waypoints[0].timestamp, Some(start));
    assert_eq!(report.optimized_waypoints[3].timestamp, Some(start + Duration::seconds(5)));

    let stored = f.service.get_path(&created.id).await.unwrap();
    assert_eq!(stored.status, PathStatus::Optimized);
    assert_eq!(stored.waypoints, report.optimized_waypoints);
    assert_eq!(stored.optimization_history.len(), 1);
    assert_eq!(stored.metadata.total_distance, Some(10.0));
    assert_eq!(stored.metadata.estimated_completion_secs, Some(5.0));
}

#[tokio::test]
async fn test_optimize_falls_back_to_creation_battery() {
    let f = fixture();
    let mut low = request(20);
    low.waypoints = (0..6).map(|i| Waypoint::new(i as f64, 0.0)).collect();
    let created = f.service.create_path(low).await.unwrap();

    let report = f
        .service
        .optimize_path(
            &created.id,
            OptimizePathRequest {
                criteria: vec![Criterion::Battery],
                constraints: OptimizationConstraints::default(),
            },
        )
        .await
        .unwrap();

    // without the fallback the battery stage would reject the request
    assert_eq!(report.applied, vec![Criterion::Battery]);
    assert_eq!(report.total_waypoints, 6);

    let err = f
        .service
        .optimize_path(
            &created.id,
            OptimizePathRequest {
                criteria: vec![Criterion::Battery],
                constraints: OptimizationConstraints {
                    battery_level: Some(101),
                    ..Default::default()
                },
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::Domain(DomainError::InvalidArgument { .. })));
}

#[tokio::test]
async fn test_failed_optimization_writes_nothing() {
    let f = fixture();
    let created = f.service.create_path(request(90)).await.unwrap();

    let err = f
        .service
        .optimize_path(
            &created.id,
            OptimizePathRequest {
                criteria: vec![Criterion::Coverage, Criterion::Time],
                constraints: OptimizationConstraints {
                    area_bounds: Some(AreaBounds::new(0.0, 0.0, 0.0, 10.0)),
                    ..Default::default()
                },
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::Domain(DomainError::InvalidArgument { .. })));

    let stored = f.service.get_path(&created.id).await.unwrap();
    assert_eq!(stored.status, PathStatus::Pending);
    assert!(stored.optimization_history.is_empty());
}

#[tokio::test]
async fn test_unknown_and_deleted_paths_are_not_found() {
    let f = fixture();
    let err = f
        .service
        .optimize_path("does-not-exist", OptimizePathRequest::default())
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let created = f.service.create_path(request(90)).await.unwrap();
    f.service.delete_path(&created.id).await.unwrap();
    assert!(f.service.get_path(&created.id).await.unwrap_err().is_not_found());
    assert!(f.service.delete_path(&created.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_import_waypoints_from_geojson() {
    let f = fixture();
    let geo_dir = f.data_dir.path().join("geojson");
    std::fs::create_dir_all(&geo_dir).unwrap();
    std::fs::write(
        geo_dir.join("lap.geojson"),
        r#"{"type": "LineString", "coordinates": [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0]]}"#,
    )
    .unwrap();
    std::fs::write(geo_dir.join("empty.geojson"), r#"{"type": "FeatureCollection", "features": []}"#).unwrap();

    let waypoints = f.service.import_waypoints("lap.geojson").unwrap();
    assert_eq!(waypoints.len(), 3);
    assert_eq!(waypoints[1], Waypoint::new(1.0, 0.0));

    assert!(f.service.import_waypoints("missing.geojson").unwrap_err().is_not_found());
    assert!(matches!(
        f.service.import_waypoints("empty.geojson"),
        Err(ApplicationError::Domain(DomainError::InvalidArgument { .. }))
    ));
}

#[test]
fn test_request_defaults_from_json() {
    let request: OptimizePathRequest =
        serde_json::from_str(r#"{"battery_level": 40, "speed_limit": 3.0}"#).unwrap();
    assert_eq!(request.criteria, default_criteria());
    assert_eq!(request.constraints.battery_level, Some(40));
    assert_eq!(request.constraints.speed_limit, Some(3.0));
    assert!(request.constraints.obstacles.is_empty());
}

#[test]
fn test_default_request_matches_empty_json() {
    let from_json: OptimizePathRequest = serde_json::from_str("{}").unwrap();
    let built = OptimizePathRequest::default();
    assert_eq!(built.criteria, default_criteria());
    assert_eq!(built.criteria, from_json.criteria);
    assert_eq!(built.constraints, from_json.constraints);
}

#[tokio::test]
async fn test_unschedulable_speed_is_rejected_without_writing() {
    let f = fixture();
    let mut far = request(90);
    far.waypoints = vec![Waypoint::new(0.0, 0.0), Waypoint::new(10_000.0, 0.0)];
    let created = f.service.create_path(far).await.unwrap();

    let err = f
        .service
        .optimize_path(
            &created.id,
            OptimizePathRequest {
                criteria: vec![Criterion::Time],
                constraints: OptimizationConstraints {
                    speed_limit: Some(1e-9),
                    ..Default::default()
                },
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::Domain(DomainError::InvalidArgument { .. })));

    let stored = f.service.get_path(&created.id).await.unwrap();
    assert_eq!(stored.status, PathStatus::Pending);
    assert_eq!(stored.version, 1);
}
