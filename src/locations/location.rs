//! Worker-placement locations.
//!
//! A `Location` is a static catalog entry: its type, its occupancy policy,
//! and its effect. Which locations are actually in a given game is decided
//! at setup and recorded in `GameState::locations_map`; the map's value is
//! the ordered list of player ids whose workers stand there.

use serde::{Deserialize, Serialize};

use super::registry;
use crate::cards::{CanPlayFn, FixedYield, PlayFn};
use crate::core::{EngineError, Result};
use crate::game::{GameInput, GameState};

/// Every worker-placement location.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationName {
    BasicOneBerry,
    BasicOneBerryAndOneCard,
    BasicOneResinAndOneCard,
    BasicOneStone,
    BasicThreeTwigs,
    BasicTwoCardsAndOneVp,
    BasicTwoResin,
    BasicTwoTwigsAndOneCard,
    Haven,
    JourneyFive,
    JourneyFour,
    JourneyThree,
    JourneyTwo,
    ForestTwoBerryOneCard,
    ForestTwoWild,
    ForestDiscardAnyThenDrawTwoPerCard,
    ForestCopyBasicOneCard,
    ForestOnePebbleThreeCard,
    ForestOneTwigResinBerry,
    ForestThreeBerry,
    ForestTwoResinOneTwig,
    ForestTwoCardsOneWild,
    ForestDiscardUpToThreeCardsToGainWildPerCard,
    ForestDrawTwoMeadowPlayOneForOneLess,
}

impl std::fmt::Display for LocationName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationType {
    Basic,
    Forest,
    Haven,
    Journey,
}

/// How many workers a location holds at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationOccupancy {
    /// At most one worker, ever.
    Exclusive,
    /// One worker below four players, two at four or more.
    ExclusiveFour,
    /// No cap.
    Unlimited,
}

/// Static definition of one location.
pub struct Location {
    pub name: LocationName,
    pub location_type: LocationType,
    pub occupancy: LocationOccupancy,
    /// Unconditional gain applied on placement.
    pub fixed_yield: Option<FixedYield>,
    pub can_play_inner: Option<CanPlayFn>,
    pub play_inner: Option<PlayFn>,
}

impl Location {
    /// Look up a location in the catalog.
    #[must_use]
    pub fn from_name(name: LocationName) -> &'static Location {
        registry::location(name)
    }

    /// All location names of the given type.
    #[must_use]
    pub fn by_type(location_type: LocationType) -> Vec<LocationName> {
        registry::locations_by_type(location_type)
    }

    /// Whether the active player may place a worker here right now.
    #[must_use]
    pub fn can_play(&self, game_state: &GameState, game_input: &GameInput) -> bool {
        let occupants = match game_state.location_occupants(self.name) {
            Some(occupants) => occupants,
            None => return false, // not part of this game
        };
        let player = match game_state.get_active_player() {
            Ok(p) => p,
            Err(_) => return false,
        };
        if player.num_available_workers() == 0 {
            return false;
        }
        if let Some(can_play_inner) = self.can_play_inner {
            if !can_play_inner(game_state, game_input) {
                return false;
            }
        }
        match self.occupancy {
            LocationOccupancy::Exclusive => occupants.is_empty(),
            LocationOccupancy::ExclusiveFour => {
                let cap = if game_state.num_players() < 4 { 1 } else { 2 };
                occupants.len() < cap
            }
            LocationOccupancy::Unlimited => true,
        }
    }

    /// Validate and run this location's effect.
    ///
    /// The worker-placement ledger itself is written by the state machine;
    /// this covers only the effect.
    pub fn play(&self, game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
        if !self.can_play(game_state, game_input) {
            return Err(EngineError::illegal(format!(
                "unable to visit location {}",
                self.name
            )));
        }
        self.activate(game_state, game_input)
    }

    /// Run the effect without occupancy gating (used when another effect
    /// copies this location).
    pub fn activate(&self, game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
        if let Some(fixed_yield) = &self.fixed_yield {
            let resources = fixed_yield.resources;
            let num_to_draw = fixed_yield.num_cards_to_draw;
            game_state.active_player_gains(&resources)?;
            game_state.active_player_draws(num_to_draw)?;
        }
        if let Some(play_inner) = self.play_inner {
            play_inner(game_state, game_input)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Location")
            .field("name", &self.name)
            .field("location_type", &self.location_type)
            .field("occupancy", &self.occupancy)
            .finish_non_exhaustive()
    }
}
