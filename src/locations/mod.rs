//! Worker-placement locations: catalog and occupancy rules.

pub mod location;
pub mod registry;

pub use location::{Location, LocationName, LocationOccupancy, LocationType};
