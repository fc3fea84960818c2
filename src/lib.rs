//! # evergrove
//!
//! Rules engine for a woodland worker-placement tableau card game.
//!
//! ## Design Principles
//!
//! 1. **One authority**: `GameState::next` is the only way state changes.
//!    It consumes one [`GameInput`] and returns a fresh state; the receiver
//!    is never mutated, so every transition is all-or-nothing.
//!
//! 2. **Effects as catalog entries**: every card, location, and event is a
//!    record in an immutable, process-wide catalog carrying static rules
//!    data plus optional behavior slots (predicate, effect, scoring). No
//!    inheritance, no per-game catalog state.
//!
//! 3. **Suspension as data**: multi-step effects enqueue explicit
//!    continuation values on `pending_game_inputs` instead of suspending
//!    code. A half-finished turn serializes, persists, and resumes on a
//!    different process.
//!
//! 4. **Determinism**: every random decision flows through a seeded,
//!    snapshot-able RNG carried in the state.
//!
//! ## Modules
//!
//! - `core`: ids, resources, card piles, RNG, errors
//! - `cards`: the card catalog and per-copy played state
//! - `locations`: worker-placement spots and occupancy policies
//! - `events`: claimable one-time bonuses
//! - `game`: inputs, players, the state machine, JSON snapshots
//!
//! ## Boundary
//!
//! The engine is in-process and synchronous. Calling code builds a game
//! with [`GameState::initial`], shows [`GameState::get_possible_game_inputs`]
//! to whoever is deciding, applies the chosen input with
//! [`GameState::next`], and persists [`GameState::to_json`] between
//! requests. HTTP, storage, sessions, and rendering all live outside.

pub mod cards;
pub mod core;
pub mod events;
pub mod game;
pub mod locations;

// Re-export commonly used types
pub use crate::core::{
    CardStack, EngineError, GameRng, GameRngSnapshot, PlayerId, ResourceMap, ResourceType, Result,
};

pub use crate::cards::{Card, CardName, CardType, PlayedCardInfo, Season};

pub use crate::locations::{Location, LocationName, LocationOccupancy, LocationType};

pub use crate::events::{Event, EventName, EventType, PlayedEventInfo};

pub use crate::game::{
    EffectContext, GameInput, GameInputType, GameLogEntry, GameState, GameStateJson,
    NewGameOptions, PaymentDiscount, PaymentOptions, PlayCardInput, Player, PlayerJson,
    PlayerStatus, WorkerPlacement,
};
