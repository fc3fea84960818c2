//! Claimable events.
//!
//! Events are one-time bonuses: the first player to meet an event's
//! prerequisites may spend a worker to claim it. Claimed events can store
//! resources or cards (recorded in the claiming player's `PlayedEventInfo`)
//! and score at game end.
//!
//! Unlike cards and locations, an event exposes `can_play_check`, which
//! returns a *descriptive reason* when the claim is not allowed; `can_play`
//! is simply its is-none view.

use serde::{Deserialize, Serialize};

use super::registry;
use crate::cards::CardName;
use crate::core::{EngineError, PlayerId, ResourceMap, Result};
use crate::game::{GameInput, GameState};

/// Every claimable event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventName {
    BasicFourProduction,
    BasicThreeDestination,
    BasicThreeGovernance,
    BasicThreeTraveler,
    SpecialGraduationOfScholars,
    SpecialABrilliantMarketingPlan,
    SpecialPerformerInResidence,
    SpecialCaptureOfTheAcornThieves,
    SpecialMinisteringToMiscreants,
    SpecialCroakWartCure,
    SpecialAnEveningOfFireworks,
    SpecialAWeeRunCity,
    SpecialTaxRelief,
    SpecialUnderNewManagement,
    SpecialAncientScrollsDiscovered,
    SpecialFlyingDoctorService,
    SpecialPathOfThePilgrims,
    SpecialRememberingTheFallen,
    SpecialPristineChapelCeiling,
    SpecialTheEvergroveGames,
}

impl std::fmt::Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Basic,
    Special,
}

/// Check slot: `None` when the claim is allowed, otherwise the reason it
/// isn't.
pub type CanPlayCheckFn = fn(&GameState, &GameInput) -> Option<String>;

/// Effect slot, shared with cards and locations.
pub type EventPlayFn = fn(&mut GameState, &GameInput) -> Result<()>;

/// Scoring slot.
pub type EventPointsFn = fn(&GameState, PlayerId) -> i32;

/// Static definition of one event.
pub struct Event {
    pub name: EventName,
    pub event_type: EventType,
    pub base_vp: i32,
    /// Cards that must be in the claiming player's city.
    pub required_cards: &'static [CardName],
    pub can_play_check_inner: Option<CanPlayCheckFn>,
    pub play_inner: Option<EventPlayFn>,
    pub points_inner: Option<EventPointsFn>,
}

impl Event {
    /// Look up an event in the catalog.
    #[must_use]
    pub fn from_name(name: EventName) -> &'static Event {
        registry::event(name)
    }

    /// All event names of the given type.
    #[must_use]
    pub fn by_type(event_type: EventType) -> Vec<EventName> {
        registry::events_by_type(event_type)
    }

    /// Why the active player cannot claim this event right now, or `None`
    /// when the claim is legal.
    #[must_use]
    pub fn can_play_check(&self, game_state: &GameState, game_input: &GameInput) -> Option<String> {
        let claimant = match game_state.events_map_entry(self.name) {
            Some(claimant) => claimant,
            None => {
                return Some(format!("event {} is not part of the current game", self.name));
            }
        };
        let player = match game_state.get_active_player() {
            Ok(p) => p,
            Err(err) => return Some(err.to_string()),
        };

        if matches!(game_input, GameInput::ClaimEvent(_)) {
            if let Some(owner) = claimant {
                return Some(format!(
                    "event {} is already claimed by {}",
                    self.name, owner
                ));
            }
            if player.num_available_workers() == 0 {
                return Some(format!(
                    "active player ({}) doesn't have any workers to place",
                    player.id()
                ));
            }
            for required in self.required_cards {
                if !player.has_card_in_city(*required) {
                    return Some(format!(
                        "need to have played {} to claim event {}",
                        required, self.name
                    ));
                }
            }
        }

        if let Some(check) = self.can_play_check_inner {
            if let Some(reason) = check(game_state, game_input) {
                return Some(reason);
            }
        }
        None
    }

    /// Whether the active player may claim this event right now.
    #[must_use]
    pub fn can_play(&self, game_state: &GameState, game_input: &GameInput) -> bool {
        self.can_play_check(game_state, game_input).is_none()
    }

    /// Claim the event (on a `CLAIM_EVENT` input) and run its effect.
    pub fn play(&self, game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
        if let Some(reason) = self.can_play_check(game_state, game_input) {
            return Err(EngineError::IllegalAction(reason));
        }
        if matches!(game_input, GameInput::ClaimEvent(_)) {
            game_state.record_event_claim(self.name)?;
        }
        if let Some(play_inner) = self.play_inner {
            play_inner(game_state, game_input)?;
        }
        Ok(())
    }

    /// Points this event is worth for the claiming player. Pure.
    #[must_use]
    pub fn points(&self, game_state: &GameState, player_id: PlayerId) -> i32 {
        let bonus = self
            .points_inner
            .map_or(0, |points_inner| points_inner(game_state, player_id));
        self.base_vp + bonus
    }
}

impl std::fmt::Debug for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("event_type", &self.event_type)
            .field("base_vp", &self.base_vp)
            .finish_non_exhaustive()
    }
}

/// Resources and cards accumulated under a claimed event.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayedEventInfo {
    #[serde(default)]
    pub stored_resources: ResourceMap,
    #[serde(default)]
    pub stored_cards: Vec<CardName>,
}
