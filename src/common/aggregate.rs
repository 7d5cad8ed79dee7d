use crate::common::{DomainEvent, DomainResult};
use serde::{Deserialize, Serialize};

pub trait AggregateRoot: Send + Sync + Clone {
    type Event: DomainEvent + Serialize + for<'de> Deserialize<'de>;

    fn aggregate_id(&self) -> &str;
    fn version(&self) -> u64;

    /// Apply an event to update the aggregate state
    fn apply(&mut self, event: &Self::Event) -> DomainResult<()>;

    fn uncommitted_events(&self) -> &[Self::Event];

    fn mark_events_as_committed(&mut self);

    fn add_event(&mut self, event: Self::Event);

    /// Record a new event and apply it in one step.
    fn raise(&mut self, event: Self::Event) -> DomainResult<()> {
        self.apply(&event)?;
        self.add_event(event);
        Ok(())
    }
}
