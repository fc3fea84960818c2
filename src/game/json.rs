//! The persisted-state contract.
//!
//! `GameStateJson` is the full serialized form of a game: the storage layer
//! saves and loads it, and `from_json(to_json(true))` is lossless for any
//! reachable state. With `include_private = false` the snapshot redacts what
//! a spectator must not see: hand contents and the deck's order. Redacted
//! snapshots are for viewers only and cannot be loaded back into a playable
//! game.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::{CardName, PlayedCardInfo, Season};
use crate::core::{CardStack, EngineError, GameRng, GameRngSnapshot, PlayerId, ResourceMap, Result};
use crate::events::{EventName, PlayedEventInfo};
use crate::game::input::{GameInput, WorkerPlacement};
use crate::game::player::{Player, PlayerStatus};
use crate::game::state::{GameLogEntry, GameState};
use crate::locations::LocationName;

/// Serialized form of a deck or discard pile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardStackJson {
    pub name: String,
    pub num_cards: usize,
    /// Empty when the pile's order is private.
    #[serde(default)]
    pub cards: Vec<CardName>,
}

impl CardStack {
    /// Snapshot this pile; without private data only the count survives.
    #[must_use]
    pub fn to_json(&self, include_private: bool) -> CardStackJson {
        CardStackJson {
            name: self.name().to_string(),
            num_cards: self.len(),
            cards: if include_private {
                self.iter().collect()
            } else {
                Vec::new()
            },
        }
    }

    /// Rebuild a pile from its snapshot.
    #[must_use]
    pub fn from_json(json: &CardStackJson) -> CardStack {
        CardStack::new(json.name.clone(), json.cards.clone())
    }
}

/// Serialized form of one player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerJson {
    pub name: String,
    pub player_id: PlayerId,
    pub played_cards: BTreeMap<CardName, Vec<PlayedCardInfo>>,
    pub num_cards_in_hand: usize,
    /// Empty when the hand is private.
    #[serde(default)]
    pub cards_in_hand: Vec<CardName>,
    pub resources: ResourceMap,
    pub num_workers: u8,
    pub placed_workers: Vec<WorkerPlacement>,
    pub current_season: Season,
    pub status: PlayerStatus,
    pub claimed_events: BTreeMap<EventName, PlayedEventInfo>,
}

impl Player {
    /// Snapshot this player, redacting the hand unless private data is
    /// included.
    #[must_use]
    pub fn to_json(&self, include_private: bool) -> PlayerJson {
        PlayerJson {
            name: self.name().to_string(),
            player_id: self.id(),
            played_cards: self.played_cards().clone(),
            num_cards_in_hand: self.num_cards_in_hand(),
            cards_in_hand: if include_private {
                self.cards_in_hand().to_vec()
            } else {
                Vec::new()
            },
            resources: *self.resources(),
            num_workers: self.num_workers(),
            placed_workers: self.placed_workers().to_vec(),
            current_season: self.current_season(),
            status: self.status(),
            claimed_events: self.claimed_events().clone(),
        }
    }

    /// Rebuild a player from a full-fidelity snapshot.
    #[must_use]
    pub fn from_json(json: &PlayerJson) -> Player {
        Player::from_parts(
            json.name.clone(),
            json.player_id,
            json.cards_in_hand.clone(),
            json.resources,
            json.played_cards.clone(),
            json.claimed_events.clone(),
            json.num_workers,
            SmallVec::from_vec(json.placed_workers.clone()),
            json.current_season,
            json.status,
        )
    }
}

/// Serialized form of a whole game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameStateJson {
    pub game_state_id: u64,
    pub active_player_id: PlayerId,
    pub players: Vec<PlayerJson>,
    pub meadow_cards: Vec<CardName>,
    pub deck: CardStackJson,
    pub discard_pile: CardStackJson,
    pub locations_map: BTreeMap<LocationName, Vec<PlayerId>>,
    pub events_map: BTreeMap<EventName, Option<PlayerId>>,
    pub pending_game_inputs: Vec<GameInput>,
    pub game_log: Vec<GameLogEntry>,
    pub rng: GameRngSnapshot,
}

impl GameState {
    /// Snapshot the game.
    ///
    /// `include_private = true` is the authoritative full-fidelity form used
    /// for storage and cloning; `false` redacts hands and the deck order for
    /// spectators.
    #[must_use]
    pub fn to_json(&self, include_private: bool) -> GameStateJson {
        GameStateJson {
            game_state_id: self.game_state_id,
            active_player_id: self.active_player_id,
            players: self
                .players
                .iter()
                .map(|p| p.to_json(include_private))
                .collect(),
            meadow_cards: self.meadow_cards(),
            deck: self.deck.to_json(include_private),
            discard_pile: self.discard_pile.to_json(true),
            locations_map: self
                .locations_map
                .iter()
                .map(|(k, v)| (*k, v.clone()))
                .collect(),
            events_map: self.events_map.iter().map(|(k, v)| (*k, *v)).collect(),
            pending_game_inputs: self.pending_game_inputs(),
            game_log: self.game_log(),
            rng: self.rng.snapshot(),
        }
    }

    /// Rebuild a game from a full-fidelity snapshot.
    pub fn from_json(json: &GameStateJson) -> Result<GameState> {
        if json.players.is_empty() {
            return Err(EngineError::invalid("snapshot has no players"));
        }
        let players: Vec<Player> = json.players.iter().map(Player::from_json).collect();
        if !players.iter().any(|p| p.id() == json.active_player_id) {
            return Err(EngineError::invalid(format!(
                "unable to find player {}",
                json.active_player_id
            )));
        }
        Ok(GameState {
            game_state_id: json.game_state_id,
            active_player_id: json.active_player_id,
            players,
            meadow_cards: json.meadow_cards.iter().copied().collect(),
            deck: CardStack::from_json(&json.deck),
            discard_pile: CardStack::from_json(&json.discard_pile),
            locations_map: json
                .locations_map
                .iter()
                .map(|(k, v)| (*k, v.clone()))
                .collect(),
            events_map: json.events_map.iter().map(|(k, v)| (*k, *v)).collect(),
            pending_game_inputs: json.pending_game_inputs.iter().cloned().collect(),
            game_log: json.game_log.iter().cloned().collect(),
            rng: GameRng::restore(&json.rng),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::NewGameOptions;

    fn sample_game() -> GameState {
        GameState::initial(&["Rook", "Wren"], NewGameOptions { seed: 3, shuffle_deck: true })
            .unwrap()
    }

    #[test]
    fn test_private_round_trip_is_lossless() {
        let state = sample_game();
        let json = state.to_json(true);
        let restored = GameState::from_json(&json).unwrap();
        assert_eq!(restored.to_json(true), json);
    }

    #[test]
    fn test_public_snapshot_redacts_hands_and_deck() {
        let state = sample_game();
        let json = state.to_json(false);
        assert!(json.deck.cards.is_empty());
        assert_eq!(json.deck.num_cards, state.deck_size());
        for player_json in &json.players {
            assert!(player_json.cards_in_hand.is_empty());
            assert!(player_json.num_cards_in_hand > 0);
        }
        // The discard pile is public knowledge either way.
        assert_eq!(json.discard_pile.cards.len(), json.discard_pile.num_cards);
    }

    #[test]
    fn test_json_string_round_trip() {
        let state = sample_game();
        let json = state.to_json(true);
        let text = serde_json::to_string(&json).unwrap();
        let parsed: GameStateJson = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, json);
    }

    #[test]
    fn test_from_json_rejects_unknown_active_player() {
        let state = sample_game();
        let mut json = state.to_json(true);
        json.active_player_id = PlayerId::new(9);
        let err = GameState::from_json(&json).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }
}
