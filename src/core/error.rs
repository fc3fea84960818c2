//! Error taxonomy for the engine.
//!
//! Every failure produced while applying a [`crate::game::GameInput`] falls
//! into one of a small number of kinds:
//!
//! - `IllegalAction`: a `can_play` style check failed (insufficient
//!   resources, wrong season, occupancy full, event already claimed, ...).
//! - `InvalidInput`: the input itself is malformed or doesn't correspond to
//!   anything the engine asked for (missing client options, a selection that
//!   isn't in the offered list, a continuation that matches no pending entry).
//! - `Overpay`: payment exceeds the exact cost while strict checking is on.
//! - `InvariantViolation`: internal consistency checks that a correctly
//!   driven game never trips; hitting one indicates a caller bug.
//!
//! All of these abort the in-flight transition wholesale. Since transitions
//! operate on a fresh clone of the state, the caller's snapshot is untouched.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("illegal action: {0}")]
    IllegalAction(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("cannot overpay for cards")]
    Overpay,

    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl EngineError {
    /// Shorthand for an `IllegalAction` error.
    pub fn illegal(msg: impl Into<String>) -> Self {
        Self::IllegalAction(msg.into())
    }

    /// Shorthand for an `InvalidInput` error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Shorthand for an `InvariantViolation` error.
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
