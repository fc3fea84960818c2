//! The static card record and per-copy played state.
//!
//! A `Card` is a value object in the immutable catalog: static rules data
//! plus up to three optional behavior slots (predicate, effect, scoring).
//! Cards hold no per-game state; everything mutable about a played copy
//! lives in `PlayedCardInfo` inside the owning player.

use serde::{Deserialize, Serialize};

use super::registry;
use super::types::{CardName, CardType};
use crate::core::{PlayerId, ResourceMap, Result};
use crate::game::{GameInput, GameState};

/// Predicate slot: may this card be played given the current state?
pub type CanPlayFn = fn(&GameState, &GameInput) -> bool;

/// Effect slot: runs when the card is played, visited, re-activated, or when
/// one of its pending continuations resolves.
pub type PlayFn = fn(&mut GameState, &GameInput) -> Result<()>;

/// Scoring slot: extra points beyond `base_vp`, as a pure read.
pub type PointsFn = fn(&GameState, PlayerId) -> i32;

/// An unconditional "gain these, draw that many" effect.
///
/// Most production cards and basic locations need nothing more than this, so
/// it is plain data rather than a function slot.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FixedYield {
    pub resources: ResourceMap,
    pub num_cards_to_draw: usize,
}

/// Static definition of one card.
pub struct Card {
    pub name: CardName,
    pub card_type: CardType,
    pub base_cost: ResourceMap,
    pub base_vp: i32,
    pub is_unique: bool,
    pub is_construction: bool,
    /// The construction/critter this card is paired with; an unused copy of
    /// the associated construction lets the critter enter play for free.
    pub associated_card: Option<CardName>,
    /// Open destinations accept any player's worker; closed ones only the
    /// owner's.
    pub is_open_destination: bool,
    /// Worker capacity when this card hosts workers (destinations and the
    /// storehouse).
    pub max_workers: u8,
    /// Copies of this card in the deck.
    pub num_in_deck: u8,
    /// Resources a fresh copy enters play with (the clock tower's 3 VP).
    pub starting_resources: ResourceMap,
    /// Unconditional gain applied whenever the card activates.
    pub fixed_yield: Option<FixedYield>,
    pub can_play_inner: Option<CanPlayFn>,
    pub play_inner: Option<PlayFn>,
    pub points_inner: Option<PointsFn>,
}

impl Card {
    /// Look up a card in the catalog.
    #[must_use]
    pub fn from_name(name: CardName) -> &'static Card {
        registry::card(name)
    }

    #[must_use]
    pub fn is_critter(&self) -> bool {
        !self.is_construction
    }

    /// True if workers can ever be placed on a played copy.
    #[must_use]
    pub fn can_take_worker(&self) -> bool {
        self.card_type == CardType::Destination || self.name == CardName::Storehouse
    }

    /// True if this card is placed into an opponent's city instead of the
    /// active player's (the fool).
    #[must_use]
    pub fn played_into_opponent_city(&self) -> bool {
        self.name == CardName::Fool
    }

    /// Whether the active player may legally play this card right now.
    ///
    /// Only meaningful for a `PLAY_CARD` input; other inputs are dispatched
    /// straight to the effect slot by the state machine.
    #[must_use]
    pub fn can_play(&self, game_state: &GameState, game_input: &GameInput) -> bool {
        let from_meadow = match game_input {
            GameInput::PlayCard(play) => play.from_meadow,
            _ => return false,
        };
        let player = match game_state.get_active_player() {
            Ok(p) => p,
            Err(_) => return false,
        };
        if self.is_unique && player.has_card_in_city(self.name) {
            return false;
        }
        if !self.played_into_opponent_city() && !player.can_add_to_city(self.name) {
            return false;
        }
        if !player.can_afford_card(self.name, from_meadow) {
            return false;
        }
        if let Some(can_play_inner) = self.can_play_inner {
            if !can_play_inner(game_state, game_input) {
                return false;
            }
        }
        true
    }

    /// Put this card into play for the active player and run its effect.
    ///
    /// Callers gate on [`Card::can_play`] before charging payment. The
    /// placement checks re-run here, so a desynced pending input can never
    /// slip a card into a city it doesn't belong in. Affordability is not
    /// re-checked: by this point the cost has been paid.
    pub fn play(&self, game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
        if let Some(can_play_inner) = self.can_play_inner {
            if !can_play_inner(game_state, game_input) {
                return Err(crate::core::EngineError::illegal(format!(
                    "unable to play card {}",
                    self.name
                )));
            }
        }
        if !self.played_into_opponent_city() {
            game_state.get_active_player_mut()?.add_to_city(self.name)?;
        }
        self.activate(game_state, game_input)
    }

    /// Run this card's effect: the fixed yield, then the effect slot.
    ///
    /// Used both when the card is first played and when a production card is
    /// re-activated (season change, tax-relief event, chip sweep).
    pub fn activate(&self, game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
        if let Some(fixed_yield) = &self.fixed_yield {
            let num_to_draw = fixed_yield.num_cards_to_draw;
            let resources = fixed_yield.resources;
            game_state.active_player_gains(&resources)?;
            game_state.active_player_draws(num_to_draw)?;
        }
        if let Some(play_inner) = self.play_inner {
            play_inner(game_state, game_input)?;
        }
        Ok(())
    }

    /// Points one copy's base value plus the scoring slot.
    ///
    /// The scoring slot covers every copy of this card in `player_id`'s
    /// city at once. Pure: safe to call repeatedly for previews.
    #[must_use]
    pub fn points(&self, game_state: &GameState, player_id: PlayerId) -> i32 {
        let bonus = self
            .points_inner
            .map_or(0, |points_inner| points_inner(game_state, player_id));
        self.base_vp + bonus
    }

    /// Build the mutable per-copy state for a fresh play of this card.
    #[must_use]
    pub fn fresh_played_info(&self) -> PlayedCardInfo {
        PlayedCardInfo {
            card: self.name,
            is_occupied: false,
            resources: self.starting_resources,
            workers: Vec::new(),
            max_workers: if self.can_take_worker() {
                self.max_workers
            } else {
                0
            },
            paired_cards: Vec::new(),
        }
    }
}

impl std::fmt::Debug for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Card")
            .field("name", &self.name)
            .field("card_type", &self.card_type)
            .field("base_vp", &self.base_vp)
            .field("is_unique", &self.is_unique)
            .field("is_construction", &self.is_construction)
            .finish_non_exhaustive()
    }
}

/// Mutable state of one played copy of a card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayedCardInfo {
    pub card: CardName,
    /// Constructions: true once used to bring the associated critter into
    /// play for free.
    #[serde(default)]
    pub is_occupied: bool,
    /// Resources stored on the card (clock tower VP, storehouse goods,
    /// chapel VP).
    #[serde(default)]
    pub resources: ResourceMap,
    /// Visiting workers, by owner.
    #[serde(default)]
    pub workers: Vec<PlayerId>,
    #[serde(default)]
    pub max_workers: u8,
    /// Cards paired under this one (dungeon prisoners).
    #[serde(default)]
    pub paired_cards: Vec<CardName>,
}

impl PlayedCardInfo {
    /// True if another worker fits on this copy.
    #[must_use]
    pub fn has_worker_space(&self) -> bool {
        (self.workers.len() as u8) < self.max_workers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lookup() {
        let farm = Card::from_name(CardName::Farm);
        assert_eq!(farm.name, CardName::Farm);
        assert_eq!(farm.card_type, CardType::Production);
        assert!(farm.is_construction);
        assert!(!farm.is_unique);
    }

    #[test]
    fn test_critter_is_not_construction() {
        let bard = Card::from_name(CardName::Bard);
        assert!(bard.is_critter());
        assert!(!bard.is_construction);
    }

    #[test]
    fn test_destinations_take_workers() {
        assert!(Card::from_name(CardName::University).can_take_worker());
        assert!(Card::from_name(CardName::Storehouse).can_take_worker());
        assert!(!Card::from_name(CardName::Farm).can_take_worker());
    }

    #[test]
    fn test_fresh_played_info_clock_tower_vp() {
        let info = Card::from_name(CardName::ClockTower).fresh_played_info();
        assert_eq!(info.resources.vp, 3);
    }

    #[test]
    fn test_fresh_played_info_worker_slots() {
        let inn = Card::from_name(CardName::Inn).fresh_played_info();
        assert_eq!(inn.max_workers, 1);
        assert!(inn.has_worker_space());

        let farm = Card::from_name(CardName::Farm).fresh_played_info();
        assert_eq!(farm.max_workers, 0);
        assert!(!farm.has_worker_space());
    }
}
