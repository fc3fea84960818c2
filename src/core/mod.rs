//! Core building blocks: ids, resources, piles, RNG, errors.
//!
//! Everything in here is a leaf: these types carry no game rules, only the
//! bookkeeping primitives the rules are written against.

pub mod card_stack;
pub mod error;
pub mod player_id;
pub mod resources;
pub mod rng;

pub use card_stack::CardStack;
pub use error::{EngineError, Result};
pub use player_id::PlayerId;
pub use resources::{ResourceMap, ResourceType};
pub use rng::{GameRng, GameRngSnapshot};
