//! Domain events published after successful mutations

mod domain_event;

pub use domain_event::{AggregateKind, DomainEvent, EventMetadata, EventPayload};
