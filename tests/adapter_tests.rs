use chrono::{Duration, Utc};
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

use patrol_fleet::adapters::inbound::{FileEventStore, InMemoryEventStore};
use patrol_fleet::adapters::outbound::{EventSourcedPathRepository, FilesystemDataSource};
use patrol_fleet::common::{AggregateRoot, DomainError, EventStore};
use patrol_fleet::domains::patrol::*;

fn new_path(robot_id: u64) -> PatrolPath {
    let start = Utc::now();
    let schedule = PatrolSchedule {
        start_time: start,
        end_time: start + Duration::hours(1),
        repeat: true,
        frequency: Frequency::Daily,
    };
    let waypoints = vec![Waypoint::new(0.0, 0.0), Waypoint::new(5.0, 5.0)];
    PatrolPath::create(robot_id, 1, waypoints, schedule, 75).unwrap()
}

#[test]
fn test_filesystem_datasource_save_and_load() {
    let dir = tempdir().unwrap();
    let base = dir.path().to_path_buf();
    let ds = FilesystemDataSource::new(Some(base.clone()));

    let geo_dir = base.join("geojson");
    fs::create_dir_all(&geo_dir).unwrap();
    fs::write(
        geo_dir.join("route.geojson"),
        r#"{
    "type": "FeatureCollection",
    "features": [
        { "type": "Feature", "properties": {"name": "A"}, "geometry": { "type": "Point", "coordinates": [13.4, 52.5] } },
        { "type": "Feature", "properties": {"name": "B"}, "geometry": { "type": "Point", "coordinates": [13.5, 52.6] } }
    ]
}"#,
    )
    .unwrap();

    let geo = ds.load_geojson("route.geojson").unwrap();
    assert!(geo.contains("FeatureCollection"));

    let waypoints = ds.load_waypoints("route.geojson").unwrap();
    assert_eq!(waypoints.len(), 2);
    assert_eq!(waypoints[0].x, 52.5);
    assert_eq!(waypoints[0].y, 13.4);

    ds.save_geojson("copy.geojson", &geo).unwrap();
    assert_eq!(ds.load_waypoints("copy.geojson").unwrap(), waypoints);
}

#[test]
fn test_filesystem_datasource_errors() {
    let dir = tempdir().unwrap();
    let ds = FilesystemDataSource::new(Some(dir.path().to_path_buf()));

    assert!(matches!(ds.load_geojson("missing.geojson"), Err(DomainError::NotFound { .. })));
    assert!(matches!(
        ds.load_geojson("../secrets.geojson"),
        Err(DomainError::InvalidArgument { .. })
    ));
}

#[tokio::test]
async fn test_repository_round_trip() {
    let store: Arc<dyn EventStore> = Arc::new(InMemoryEventStore::new());
    let repository = EventSourcedPathRepository::new(store.clone());

    let mut path = new_path(9);
    repository.save(&mut path).await.unwrap();
    assert!(path.uncommitted_events().is_empty());

    let loaded = repository.load(&path.id).await.unwrap();
    assert_eq!(loaded.robot_id, 9);
    assert_eq!(loaded.waypoints, path.waypoints);
    assert_eq!(loaded.version(), 1);

    let envelopes = store.load_events(&path.id, 0).await.unwrap();
    assert_eq!(envelopes.len(), 1);
    assert_eq!(envelopes[0].aggregate_type, "PatrolPath");
    assert_eq!(envelopes[0].metadata.staff_id, Some(1));
}

#[tokio::test]
async fn test_repository_unknown_and_deleted_paths_are_not_found() {
    let repository = EventSourcedPathRepository::new(Arc::new(InMemoryEventStore::new()));
    assert!(matches!(repository.load("nope").await, Err(DomainError::NotFound { .. })));

    let mut path = new_path(1);
    repository.save(&mut path).await.unwrap();
    path.delete().unwrap();
    repository.save(&mut path).await.unwrap();

    assert!(matches!(repository.load(&path.id).await, Err(DomainError::NotFound { .. })));
    assert!(repository.list_for_robot(1).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_concurrent_writers_conflict() {
    let repository = EventSourcedPathRepository::new(Arc::new(InMemoryEventStore::new()));
    let mut path = new_path(2);
    repository.save(&mut path).await.unwrap();

    let mut first = repository.load(&path.id).await.unwrap();
    let mut second = repository.load(&path.id).await.unwrap();
    let stats = OptimizationStats::default();

    first.record_optimization(vec![Waypoint::new(1.0, 1.0)], vec![Criterion::Time], stats, None).unwrap();
    second.record_optimization(vec![Waypoint::new(2.0, 2.0)], vec![Criterion::Time], stats, None).unwrap();

    repository.save(&mut first).await.unwrap();
    let err = repository.save(&mut second).await.unwrap_err();
    assert!(matches!(err, DomainError::ConcurrencyConflict { expected: 1, actual: 2 }));

    let stored = repository.load(&path.id).await.unwrap();
    assert_eq!(stored.waypoints, vec![Waypoint::new(1.0, 1.0)]);
}

#[tokio::test]
async fn test_repository_over_file_store() {
    let dir = tempdir().unwrap();
    let store: Arc<dyn EventStore> = Arc::new(FileEventStore::new(dir.path().join("events")));
    let repository = EventSourcedPathRepository::new(store.clone()).with_source("adapter-test");

    let mut a = new_path(3);
    let mut b = new_path(3);
    let mut other = new_path(4);
    for path in [&mut a, &mut b, &mut other] {
        repository.save(path).await.unwrap();
    }

    let mut ids: Vec<String> = repository
        .list_for_robot(3)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    ids.sort();
    let mut expected = vec![a.id.clone(), b.id.clone()];
    expected.sort();
    assert_eq!(ids, expected);

    // a fresh repository over the same directory sees the same history
    let reopened = EventSourcedPathRepository::new(Arc::new(FileEventStore::new(dir.path().join("events"))));
    assert_eq!(reopened.load(&other.id).await.unwrap().robot_id, 4);
    let envelopes = store.load_events(&a.id, 0).await.unwrap();
    assert_eq!(envelopes[0].metadata.source, "adapter-test");
}

#[tokio::test]
async fn test_concurrent_writers_conflict_over_file_store() {
    let dir = tempdir().unwrap();
    let repository = EventSourcedPathRepository::new(Arc::new(FileEventStore::new(dir.path())));
    let mut path = new_path(6);
    repository.save(&mut path).await.unwrap();

    let mut first = repository.load(&path.id).await.unwrap();
    let mut second = repository.load(&path.id).await.unwrap();
    first.delete().unwrap();
    second.record_optimization(vec![Waypoint::new(3.0, 3.0)], vec![], OptimizationStats::default(), None).unwrap();

    repository.save(&mut first).await.unwrap();
    assert!(matches!(
        repository.save(&mut second).await,
        Err(DomainError::ConcurrencyConflict { expected: 1, actual: 2 })
    ));
    assert!(matches!(repository.load(&path.id).await, Err(DomainError::NotFound { .. })));
}
