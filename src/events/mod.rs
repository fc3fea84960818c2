//! Claimable events: catalog, prerequisites, and payloads.

pub mod event;
pub mod registry;

pub use event::{Event, EventName, EventType, PlayedEventInfo};
