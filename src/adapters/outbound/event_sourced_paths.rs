use async_trait::async_trait;
use std::sync::Arc;

use crate::common::{AggregateRoot, DomainError, DomainResult, EventEnvelope, EventMetadata, EventStore};
use crate::domains::patrol::{PatrolPath, PatrolPathEvent, PatrolPathRepository};

pub const AGGREGATE_TYPE: &str = "PatrolPath";

/// Patrol path repository backed by any [`EventStore`].
///
/// A path is rebuilt by replaying its stream; saving appends the aggregate's
/// uncommitted events with the stream length they were based on, which makes
/// concurrent writers to the same path fail instead of interleaving.
pub struct EventSourcedPathRepository {
    store: Arc<dyn EventStore>,
    source: String,
}

impl EventSourcedPathRepository {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self {
            store,
            source: "patrol-fleet".to_string(),
        }
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source = source.to_string();
        self
    }

    async fn replay(&self, path_id: &str) -> DomainResult<PatrolPath> {
        let envelopes = self
            .store
            .load_events(path_id, 0)
            .await
            .map_err(DomainError::InfrastructureError)?;
        if envelopes.is_empty() {
            return Err(DomainError::not_found(path_id));
        }
        let events = envelopes
            .iter()
            .map(|e| e.decode::<PatrolPathEvent>())
            .collect::<Result<Vec<_>, _>>()?;
        PatrolPath::from_history(path_id, &events)
    }
}

#[async_trait]
impl PatrolPathRepository for EventSourcedPathRepository {
    async fn load(&self, path_id: &str) -> DomainResult<PatrolPath> {
        let path = self.replay(path_id).await?;
        if path.is_deleted() {
            return Err(DomainError::not_found(path_id));
        }
        Ok(path)
    }

    async fn save(&self, path: &mut PatrolPath) -> DomainResult<()> {
        let pending = path.uncommitted_events().len() as u64;
        if pending == 0 {
            return Ok(());
        }
        let expected_version = path.version() - pending;

        // one correlation id for the whole batch
        let metadata = self.metadata_for(path);
        let envelopes = path
            .uncommitted_events()
            .iter()
            .map(|event| EventEnvelope::new(event, AGGREGATE_TYPE, metadata.clone()))
            .collect::<Result<Vec<_>, _>>()?;

        match self
            .store
            .append_events(path.aggregate_id(), expected_version, envelopes)
            .await
        {
            Ok(()) => {
                path.mark_events_as_committed();
                Ok(())
            }
            Err(e) if e.contains("Version mismatch") => {
                let actual = self
                    .store
                    .load_events(path.aggregate_id(), 0)
                    .await
                    .map(|events| events.len() as u64)
                    .map_err(DomainError::InfrastructureError)?;
                Err(DomainError::ConcurrencyConflict {
                    expected: expected_version,
                    actual,
                })
            }
            Err(e) => Err(DomainError::InfrastructureError(e)),
        }
    }

    async fn list_for_robot(&self, robot_id: u64) -> DomainResult<Vec<PatrolPath>> {
        let created = self
            .store
            .load_events_by_type("PathCreated", None)
            .await
            .map_err(DomainError::InfrastructureError)?;

        let mut paths = Vec::new();
        for envelope in created {
            let event = envelope.decode::<PatrolPathEvent>()?;
            if let PatrolPathEvent::PathCreated { path_id, robot_id: owner, .. } = event {
                if owner != robot_id {
                    continue;
                }
                match self.load(&path_id).await {
                    Ok(path) => paths.push(path),
                    Err(DomainError::NotFound { .. }) => {}
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(paths)
    }
}

impl EventSourcedPathRepository {
    fn metadata_for(&self, path: &PatrolPath) -> EventMetadata {
        EventMetadata {
            staff_id: Some(path.staff_id),
            ..EventMetadata::from_source(&self.source)
        }
    }
}
