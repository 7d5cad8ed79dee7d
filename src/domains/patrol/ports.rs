use crate::common::DomainResult;
use async_trait::async_trait;

use super::aggregate::PatrolPath;

/// Port for loading raw waypoint sources (GeoJSON files, remote maps, ...).
pub trait PatrolDataSource: Send + Sync {
    fn load_geojson(&self, name: &str) -> DomainResult<String>;
}

/// Typed repository for patrol paths.
///
/// `load` fails with `NotFound` for unknown or deleted paths. `save` persists
/// the aggregate's uncommitted events in one append, so a failed save leaves
/// the stored path untouched.
#[async_trait]
pub trait PatrolPathRepository: Send + Sync {
    async fn load(&self, path_id: &str) -> DomainResult<PatrolPath>;
    async fn save(&self, path: &mut PatrolPath) -> DomainResult<()>;
    async fn list_for_robot(&self, robot_id: u64) -> DomainResult<Vec<PatrolPath>>;
}
