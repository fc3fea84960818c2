//! Game inputs: one discrete decision by a player.
//!
//! Inputs come in two layers:
//!
//! - **Top-level actions** a player picks freely on their turn: play a card,
//!   place a worker, visit a destination, claim an event, prepare for the
//!   next season, or pass out of the game.
//! - **Continuations** (`SELECT_*` / `DISCARD_CARDS`): follow-up decisions an
//!   effect requires before the turn can finish. Effects enqueue these onto
//!   `GameState::pending_game_inputs`; the player answers by submitting the
//!   same entry with `client_options` filled in.
//!
//! A continuation is matched against the queue **structurally**: everything
//! must be equal except the `client_options` answer payload. This makes each
//! multi-step effect a small state machine whose only persisted state is the
//! queue itself, so a half-finished turn survives serialization.

use serde::{Deserialize, Serialize};

use crate::cards::CardName;
use crate::core::{PlayerId, ResourceMap, ResourceType};
use crate::events::EventName;
use crate::locations::LocationName;

/// Discriminant for [`GameInput`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameInputType {
    PlayCard,
    PlaceWorker,
    VisitDestinationCard,
    ClaimEvent,
    PrepareForSeason,
    GameEnd,
    SelectCards,
    SelectPlayedCards,
    SelectPlayer,
    SelectResources,
    DiscardCards,
    SelectLocation,
    SelectPaymentForCard,
    SelectWorkerPlacement,
    SelectOptionGeneric,
}

/// Which registry entry (or engine flow) resolves a continuation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EffectContext {
    Card(CardName),
    Location(LocationName),
    Event(EventName),
    /// The season-change flow itself (the summer meadow draft); resolved by
    /// the state machine, not a catalog entry.
    Season,
}

/// Common metadata carried by every continuation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MultiStepMeta {
    /// The input type that spawned this continuation.
    pub prev_input_type: GameInputType,
    /// Back-reference to the spawning input, when a later stage needs the
    /// earlier answer (e.g. which player was selected).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_input: Option<Box<GameInput>>,
    /// The entry that must resolve this continuation.
    pub context: EffectContext,
}

impl MultiStepMeta {
    #[must_use]
    pub fn new(prev_input_type: GameInputType, context: EffectContext) -> Self {
        Self {
            prev_input_type,
            prev_input: None,
            context,
        }
    }

    #[must_use]
    pub fn with_prev(mut self, prev: GameInput) -> Self {
        self.prev_input = Some(Box::new(prev));
        self
    }
}

/// A played-card reference: the copy of `card` in `city_owner`'s city.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayedCardId {
    pub city_owner: PlayerId,
    pub card: CardName,
}

/// Where one of a player's workers currently stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerPlacement {
    Location { location: LocationName },
    Event { event: EventName },
    Card { card: CardName, city_owner: PlayerId },
}

/// How a card is being paid for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOptions {
    /// Resources handed over.
    #[serde(default)]
    pub resources: ResourceMap,
    /// A city card granting a discount or free play (crane, innkeeper,
    /// queen, inn).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_to_use: Option<CardName>,
    /// A critter imprisoned in the dungeon for a discount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_to_dungeon: Option<CardName>,
}

// === Top-level inputs ===

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayCardInput {
    pub card: CardName,
    pub from_meadow: bool,
    #[serde(default)]
    pub payment: PaymentOptions,
}

/// Choices some locations need up front (haven discards, journey discards).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceWorkerOptions {
    #[serde(default)]
    pub cards_to_discard: Vec<CardName>,
    #[serde(default)]
    pub resources_to_gain: ResourceMap,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaceWorkerInput {
    pub location: LocationName,
    #[serde(default)]
    pub client_options: PlaceWorkerOptions,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VisitDestinationCardInput {
    pub card: CardName,
    /// Whose city the destination sits in (open destinations may belong to
    /// an opponent).
    pub city_owner: PlayerId,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClaimEventInput {
    pub event: EventName,
}

// === Continuations ===

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectedCards {
    #[serde(default)]
    pub selected_cards: Vec<CardName>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectCardsInput {
    #[serde(flatten)]
    pub meta: MultiStepMeta,
    pub card_options: Vec<CardName>,
    pub min_to_select: usize,
    pub max_to_select: usize,
    #[serde(default)]
    pub client_options: SelectedCards,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectedPlayedCards {
    #[serde(default)]
    pub selected_cards: Vec<PlayedCardId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectPlayedCardsInput {
    #[serde(flatten)]
    pub meta: MultiStepMeta,
    pub card_options: Vec<PlayedCardId>,
    pub min_to_select: usize,
    pub max_to_select: usize,
    #[serde(default)]
    pub client_options: SelectedPlayedCards,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectedPlayer {
    #[serde(default)]
    pub selected_player: Option<PlayerId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectPlayerInput {
    #[serde(flatten)]
    pub meta: MultiStepMeta,
    pub player_options: Vec<PlayerId>,
    pub must_select_one: bool,
    #[serde(default)]
    pub client_options: SelectedPlayer,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectedResources {
    #[serde(default)]
    pub resources: ResourceMap,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectResourcesInput {
    #[serde(flatten)]
    pub meta: MultiStepMeta,
    /// True when the chosen resources leave the player's supply; false when
    /// they are gained.
    pub to_spend: bool,
    pub min_resources: u32,
    pub max_resources: u32,
    /// Which resource types may be chosen; empty means any material.
    #[serde(default)]
    pub allowed_resources: Vec<ResourceType>,
    #[serde(default)]
    pub client_options: SelectedResources,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscardedCards {
    #[serde(default)]
    pub cards_to_discard: Vec<CardName>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiscardCardsInput {
    #[serde(flatten)]
    pub meta: MultiStepMeta,
    pub min_cards: usize,
    pub max_cards: usize,
    #[serde(default)]
    pub client_options: DiscardedCards,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectedLocation {
    #[serde(default)]
    pub selected_location: Option<LocationName>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectLocationInput {
    #[serde(flatten)]
    pub meta: MultiStepMeta,
    pub location_options: Vec<LocationName>,
    #[serde(default)]
    pub client_options: SelectedLocation,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectedPayment {
    #[serde(default)]
    pub payment: ResourceMap,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectPaymentForCardInput {
    #[serde(flatten)]
    pub meta: MultiStepMeta,
    pub card: CardName,
    pub from_meadow: bool,
    /// "Pay N fewer resources of any kind" discount applied to the cost.
    pub wild_discount: u32,
    #[serde(default)]
    pub client_options: SelectedPayment,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectedWorkerPlacement {
    #[serde(default)]
    pub selected: Option<WorkerPlacement>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectWorkerPlacementInput {
    #[serde(flatten)]
    pub meta: MultiStepMeta,
    pub options: Vec<WorkerPlacement>,
    pub must_select_one: bool,
    #[serde(default)]
    pub client_options: SelectedWorkerPlacement,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectedOption {
    #[serde(default)]
    pub selected_option: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectOptionGenericInput {
    #[serde(flatten)]
    pub meta: MultiStepMeta,
    pub prompt: String,
    pub options: Vec<String>,
    #[serde(default)]
    pub client_options: SelectedOption,
}

/// One discrete decision, as a tagged union.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "input_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameInput {
    PlayCard(PlayCardInput),
    PlaceWorker(PlaceWorkerInput),
    VisitDestinationCard(VisitDestinationCardInput),
    ClaimEvent(ClaimEventInput),
    PrepareForSeason,
    GameEnd,
    SelectCards(SelectCardsInput),
    SelectPlayedCards(SelectPlayedCardsInput),
    SelectPlayer(SelectPlayerInput),
    SelectResources(SelectResourcesInput),
    DiscardCards(DiscardCardsInput),
    SelectLocation(SelectLocationInput),
    SelectPaymentForCard(SelectPaymentForCardInput),
    SelectWorkerPlacement(SelectWorkerPlacementInput),
    SelectOptionGeneric(SelectOptionGenericInput),
}

impl GameInput {
    /// The discriminant of this input.
    #[must_use]
    pub fn input_type(&self) -> GameInputType {
        match self {
            GameInput::PlayCard(_) => GameInputType::PlayCard,
            GameInput::PlaceWorker(_) => GameInputType::PlaceWorker,
            GameInput::VisitDestinationCard(_) => GameInputType::VisitDestinationCard,
            GameInput::ClaimEvent(_) => GameInputType::ClaimEvent,
            GameInput::PrepareForSeason => GameInputType::PrepareForSeason,
            GameInput::GameEnd => GameInputType::GameEnd,
            GameInput::SelectCards(_) => GameInputType::SelectCards,
            GameInput::SelectPlayedCards(_) => GameInputType::SelectPlayedCards,
            GameInput::SelectPlayer(_) => GameInputType::SelectPlayer,
            GameInput::SelectResources(_) => GameInputType::SelectResources,
            GameInput::DiscardCards(_) => GameInputType::DiscardCards,
            GameInput::SelectLocation(_) => GameInputType::SelectLocation,
            GameInput::SelectPaymentForCard(_) => GameInputType::SelectPaymentForCard,
            GameInput::SelectWorkerPlacement(_) => GameInputType::SelectWorkerPlacement,
            GameInput::SelectOptionGeneric(_) => GameInputType::SelectOptionGeneric,
        }
    }

    /// True for continuation inputs (anything the engine enqueues).
    #[must_use]
    pub fn is_multi_step(&self) -> bool {
        self.multi_step_meta().is_some()
    }

    /// The continuation metadata, when this is a continuation.
    #[must_use]
    pub fn multi_step_meta(&self) -> Option<&MultiStepMeta> {
        match self {
            GameInput::SelectCards(input) => Some(&input.meta),
            GameInput::SelectPlayedCards(input) => Some(&input.meta),
            GameInput::SelectPlayer(input) => Some(&input.meta),
            GameInput::SelectResources(input) => Some(&input.meta),
            GameInput::DiscardCards(input) => Some(&input.meta),
            GameInput::SelectLocation(input) => Some(&input.meta),
            GameInput::SelectPaymentForCard(input) => Some(&input.meta),
            GameInput::SelectWorkerPlacement(input) => Some(&input.meta),
            GameInput::SelectOptionGeneric(input) => Some(&input.meta),
            _ => None,
        }
    }

    /// The context that resolves this continuation.
    #[must_use]
    pub fn context(&self) -> Option<EffectContext> {
        self.multi_step_meta().map(|meta| meta.context)
    }

    /// A copy with the answer payload cleared.
    ///
    /// Two inputs describe the same pending step exactly when their stripped
    /// forms are equal.
    #[must_use]
    pub fn strip_response(&self) -> GameInput {
        let mut stripped = self.clone();
        match &mut stripped {
            GameInput::SelectCards(input) => input.client_options = SelectedCards::default(),
            GameInput::SelectPlayedCards(input) => {
                input.client_options = SelectedPlayedCards::default();
            }
            GameInput::SelectPlayer(input) => input.client_options = SelectedPlayer::default(),
            GameInput::SelectResources(input) => {
                input.client_options = SelectedResources::default();
            }
            GameInput::DiscardCards(input) => input.client_options = DiscardedCards::default(),
            GameInput::SelectLocation(input) => input.client_options = SelectedLocation::default(),
            GameInput::SelectPaymentForCard(input) => {
                input.client_options = SelectedPayment::default();
            }
            GameInput::SelectWorkerPlacement(input) => {
                input.client_options = SelectedWorkerPlacement::default();
            }
            GameInput::SelectOptionGeneric(input) => {
                input.client_options = SelectedOption::default();
            }
            _ => {}
        }
        stripped
    }

    /// Structural match against a pending queue entry: equal in everything
    /// but the answer payload.
    #[must_use]
    pub fn matches_pending(&self, pending: &GameInput) -> bool {
        self.strip_response() == pending.strip_response()
    }
}

impl std::fmt::Display for GameInputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_discard(context: EffectContext) -> GameInput {
        GameInput::DiscardCards(DiscardCardsInput {
            meta: MultiStepMeta::new(GameInputType::PlayCard, context),
            min_cards: 0,
            max_cards: 5,
            client_options: DiscardedCards::default(),
        })
    }

    #[test]
    fn test_input_type() {
        assert_eq!(
            GameInput::PrepareForSeason.input_type(),
            GameInputType::PrepareForSeason
        );
        let discard = sample_discard(EffectContext::Card(CardName::Bard));
        assert_eq!(discard.input_type(), GameInputType::DiscardCards);
        assert!(discard.is_multi_step());
        assert!(!GameInput::GameEnd.is_multi_step());
    }

    #[test]
    fn test_matches_pending_ignores_answer() {
        let pending = sample_discard(EffectContext::Card(CardName::Bard));
        let mut answered = pending.clone();
        if let GameInput::DiscardCards(input) = &mut answered {
            input.client_options.cards_to_discard = vec![CardName::Farm, CardName::Mine];
        }
        assert!(answered.matches_pending(&pending));
    }

    #[test]
    fn test_matches_pending_rejects_different_context() {
        let pending = sample_discard(EffectContext::Card(CardName::Bard));
        let other = sample_discard(EffectContext::Card(CardName::PostOffice));
        assert!(!other.matches_pending(&pending));
    }

    #[test]
    fn test_matches_pending_rejects_different_constraints() {
        let pending = sample_discard(EffectContext::Card(CardName::Bard));
        let mut other = sample_discard(EffectContext::Card(CardName::Bard));
        if let GameInput::DiscardCards(input) = &mut other {
            input.max_cards = 3;
        }
        assert!(!other.matches_pending(&pending));
    }

    #[test]
    fn test_serde_tagged_representation() {
        let input = GameInput::PlayCard(PlayCardInput {
            card: CardName::Farm,
            from_meadow: false,
            payment: PaymentOptions::default(),
        });
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["input_type"], "PLAY_CARD");
        assert_eq!(json["card"], "FARM");

        let back: GameInput = serde_json::from_value(json).unwrap();
        assert_eq!(back, input);
    }

    #[test]
    fn test_serde_round_trip_continuation_with_prev() {
        let first = GameInput::SelectPlayer(SelectPlayerInput {
            meta: MultiStepMeta::new(
                GameInputType::ClaimEvent,
                EffectContext::Event(crate::events::EventName::SpecialABrilliantMarketingPlan),
            ),
            player_options: vec![PlayerId::new(1)],
            must_select_one: false,
            client_options: SelectedPlayer {
                selected_player: Some(PlayerId::new(1)),
            },
        });
        let second = GameInput::SelectResources(SelectResourcesInput {
            meta: MultiStepMeta::new(
                GameInputType::SelectPlayer,
                EffectContext::Event(crate::events::EventName::SpecialABrilliantMarketingPlan),
            )
            .with_prev(first),
            to_spend: true,
            min_resources: 0,
            max_resources: 3,
            allowed_resources: Vec::new(),
            client_options: SelectedResources::default(),
        });

        let json = serde_json::to_string(&second).unwrap();
        let back: GameInput = serde_json::from_str(&json).unwrap();
        assert_eq!(back, second);
    }
}
