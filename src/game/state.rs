//! The game state machine.
//!
//! `GameState` is the single source of truth for one game in progress and
//! the sole authority for applying a [`GameInput`]. `next` consumes one
//! input and returns a fresh state; the receiver is never mutated, so a
//! failed transition leaves the caller's snapshot intact and every
//! transition is all-or-nothing.
//!
//! A turn is a chain: one top-level action, then however many continuation
//! inputs its effects enqueue. The active player only advances once the
//! pending-input queue drains.

use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};

use crate::cards::{Card, CardName, Season};
use crate::core::{CardStack, EngineError, GameRng, PlayerId, ResourceMap, Result};
use crate::events::{Event, EventName};
use crate::game::input::{
    ClaimEventInput, EffectContext, GameInput, GameInputType, MultiStepMeta, PlaceWorkerInput,
    PlayCardInput, SelectCardsInput, SelectWorkerPlacementInput, SelectedCards,
    SelectedWorkerPlacement, VisitDestinationCardInput, WorkerPlacement,
};
use crate::game::player::{Player, PlayerStatus};
use crate::locations::{self, Location, LocationName};

/// The face-up shared card row is kept at this size.
pub const MEADOW_SIZE: usize = 8;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 6;

/// One entry in the persisted, player-visible game log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameLogEntry {
    pub text: String,
}

/// Options for creating a fresh game.
#[derive(Clone, Copy, Debug)]
pub struct NewGameOptions {
    /// Seed for every random decision the game will ever make.
    pub seed: u64,
    /// Disabled only by tests that need a known deck order.
    pub shuffle_deck: bool,
}

impl Default for NewGameOptions {
    fn default() -> Self {
        Self {
            seed: 0,
            shuffle_deck: true,
        }
    }
}

/// Root aggregate for one game instance.
#[derive(Clone, Debug)]
pub struct GameState {
    /// Monotonic transition counter; bumps on every `next`.
    pub(crate) game_state_id: u64,
    pub(crate) active_player_id: PlayerId,
    pub(crate) players: Vec<Player>,
    pub(crate) meadow_cards: Vector<CardName>,
    pub(crate) deck: CardStack,
    pub(crate) discard_pile: CardStack,
    /// Location -> occupying player ids, in placement order.
    pub(crate) locations_map: OrdMap<LocationName, Vec<PlayerId>>,
    /// Event -> claiming player, `None` while unclaimed.
    pub(crate) events_map: OrdMap<EventName, Option<PlayerId>>,
    /// Continuations still required to finish the current player's turn.
    pub(crate) pending_game_inputs: Vector<GameInput>,
    pub(crate) game_log: Vector<GameLogEntry>,
    pub(crate) rng: GameRng,
}

impl GameState {
    // === Construction ===

    /// Build a fresh game: shuffled deck, dealt starting hands (5 + seat,
    /// capped at the hand limit), a full meadow, and the location/event maps
    /// for this player count.
    pub fn initial(player_names: &[&str], options: NewGameOptions) -> Result<GameState> {
        if player_names.len() < MIN_PLAYERS || player_names.len() > MAX_PLAYERS {
            return Err(EngineError::invalid(format!(
                "unable to create a game with {} players",
                player_names.len()
            )));
        }

        let mut rng = GameRng::seeded(options.seed);
        let players: Vec<Player> = player_names
            .iter()
            .enumerate()
            .map(|(idx, name)| Player::new(*name, PlayerId::new(idx as u8)))
            .collect();

        let mut deck = CardStack::new("deck", crate::cards::registry::build_deck());
        if options.shuffle_deck {
            deck.shuffle(&mut rng);
        }

        let locations_map = locations::registry::initial_locations_map(player_names.len(), &mut rng);
        let events_map = crate::events::registry::initial_events_map(&mut rng);

        let mut game_state = GameState {
            game_state_id: 0,
            active_player_id: players[0].id(),
            players,
            meadow_cards: Vector::new(),
            deck,
            discard_pile: CardStack::empty("discard"),
            locations_map,
            events_map,
            pending_game_inputs: Vector::new(),
            game_log: Vector::new(),
            rng,
        };

        // Later seats see more of the deck to offset going last.
        for idx in 0..game_state.players.len() {
            let hand_size = (5 + idx).min(crate::game::player::MAX_HAND_SIZE);
            for _ in 0..hand_size {
                let card = game_state.draw_card()?;
                if let Some(overflow) = game_state.players[idx].add_card_to_hand(card) {
                    game_state.discard_pile.add_to_stack(overflow);
                }
            }
        }
        game_state.replenish_meadow()?;
        game_state.add_to_game_log(format!(
            "Game created with {} players.",
            game_state.players.len()
        ));
        Ok(game_state)
    }

    // === Queries ===

    #[must_use]
    pub fn game_state_id(&self) -> u64 {
        self.game_state_id
    }

    #[must_use]
    pub fn active_player_id(&self) -> PlayerId {
        self.active_player_id
    }

    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    #[must_use]
    pub fn num_players(&self) -> usize {
        self.players.len()
    }

    pub fn get_player(&self, player_id: PlayerId) -> Result<&Player> {
        self.players
            .iter()
            .find(|p| p.id() == player_id)
            .ok_or_else(|| EngineError::invariant(format!("unable to find player {}", player_id)))
    }

    pub(crate) fn get_player_mut(&mut self, player_id: PlayerId) -> Result<&mut Player> {
        self.players
            .iter_mut()
            .find(|p| p.id() == player_id)
            .ok_or_else(|| EngineError::invariant(format!("unable to find player {}", player_id)))
    }

    pub fn get_active_player(&self) -> Result<&Player> {
        self.get_player(self.active_player_id)
    }

    pub(crate) fn get_active_player_mut(&mut self) -> Result<&mut Player> {
        let id = self.active_player_id;
        self.get_player_mut(id)
    }

    #[must_use]
    pub fn meadow_cards(&self) -> Vec<CardName> {
        self.meadow_cards.iter().copied().collect()
    }

    #[must_use]
    pub fn deck_size(&self) -> usize {
        self.deck.len()
    }

    #[must_use]
    pub fn discard_pile_size(&self) -> usize {
        self.discard_pile.len()
    }

    /// The occupants of a location, or `None` if it isn't in this game.
    #[must_use]
    pub fn location_occupants(&self, location: LocationName) -> Option<&Vec<PlayerId>> {
        self.locations_map.get(&location)
    }

    /// The claim state of an event, or `None` if it isn't in this game.
    #[must_use]
    pub fn events_map_entry(&self, event: EventName) -> Option<Option<PlayerId>> {
        self.events_map.get(&event).copied()
    }

    #[must_use]
    pub fn pending_game_inputs(&self) -> Vec<GameInput> {
        self.pending_game_inputs.iter().cloned().collect()
    }

    #[must_use]
    pub fn game_log(&self) -> Vec<GameLogEntry> {
        self.game_log.iter().cloned().collect()
    }

    /// True once every player has passed out of the game.
    #[must_use]
    pub fn game_over(&self) -> bool {
        self.players
            .iter()
            .all(|p| p.status() == PlayerStatus::GameEnded)
    }

    // === Shared pile plumbing (used by effects) ===

    /// Draw the top card of the deck, reshuffling the discard pile into the
    /// deck first if the deck ran dry. Both piles empty is unrecoverable.
    pub fn draw_card(&mut self) -> Result<CardName> {
        if self.deck.is_empty() {
            if self.discard_pile.is_empty() {
                return Err(EngineError::invariant("no more cards to draw"));
            }
            for card in self.discard_pile.take_all() {
                self.deck.add_to_stack(card);
            }
            self.deck.shuffle(&mut self.rng);
        }
        self.deck
            .draw()
            .ok_or_else(|| EngineError::invariant("no more cards to draw"))
    }

    /// Draw, or `None` when deck and discard pile are both exhausted.
    ///
    /// Reveal effects use this so an end-of-deck reveal shrinks instead of
    /// failing the whole transition.
    pub(crate) fn draw_card_opt(&mut self) -> Option<CardName> {
        if self.deck.is_empty() && self.discard_pile.is_empty() {
            return None;
        }
        self.draw_card().ok()
    }

    /// Take the top card of the discard pile.
    pub(crate) fn draw_from_discard(&mut self) -> Option<CardName> {
        self.discard_pile.draw()
    }

    /// Put a card on the discard pile.
    pub fn discard(&mut self, card: CardName) {
        self.discard_pile.add_to_stack(card);
    }

    /// The locations that are part of this game.
    #[must_use]
    pub fn locations_in_play(&self) -> Vec<LocationName> {
        self.locations_map.keys().copied().collect()
    }

    /// Top the meadow back up to its fixed size.
    pub fn replenish_meadow(&mut self) -> Result<()> {
        while self.meadow_cards.len() < MEADOW_SIZE {
            let card = self.draw_card()?;
            self.meadow_cards.push_back(card);
        }
        Ok(())
    }

    /// Remove one copy of `card` from the meadow (without replenishing).
    pub(crate) fn remove_from_meadow(&mut self, card: CardName) -> Result<()> {
        match self.meadow_cards.iter().position(|&c| c == card) {
            Some(idx) => {
                self.meadow_cards.remove(idx);
                Ok(())
            }
            None => Err(EngineError::invalid(format!(
                "{} is not in the meadow",
                card
            ))),
        }
    }

    /// The active player gains resources.
    pub fn active_player_gains(&mut self, gained: &ResourceMap) -> Result<()> {
        self.get_active_player_mut()?.gain_resources(gained);
        Ok(())
    }

    /// The active player draws cards; overflow past the hand limit goes to
    /// the discard pile.
    pub fn active_player_draws(&mut self, count: usize) -> Result<()> {
        for _ in 0..count {
            let card = self.draw_card()?;
            if let Some(overflow) = self.get_active_player_mut()?.add_card_to_hand(card) {
                self.discard_pile.add_to_stack(overflow);
            }
        }
        Ok(())
    }

    /// Enqueue a continuation the active player must answer.
    pub fn push_pending(&mut self, input: GameInput) {
        self.pending_game_inputs.push_back(input);
    }

    /// Append a line to the persisted game log.
    pub fn add_to_game_log(&mut self, text: impl Into<String>) {
        self.game_log.push_back(GameLogEntry { text: text.into() });
    }

    // === The transition function ===

    /// Apply one input, producing the successor state.
    ///
    /// The receiver is never mutated: all work happens on a structural-shared
    /// clone, so an error leaves the original untouched and usable.
    pub fn next(&self, game_input: &GameInput) -> Result<GameState> {
        let mut next_state = self.clone();
        next_state.game_state_id += 1;
        next_state.apply(game_input)?;
        Ok(next_state)
    }

    fn apply(&mut self, game_input: &GameInput) -> Result<()> {
        match game_input {
            GameInput::PlayCard(play) => {
                self.require_no_pending()?;
                self.apply_play_card(play)?;
            }
            GameInput::PlaceWorker(place) => {
                self.require_no_pending()?;
                self.apply_place_worker(place)?;
            }
            GameInput::VisitDestinationCard(visit) => {
                self.require_no_pending()?;
                self.apply_visit_destination(visit)?;
            }
            GameInput::ClaimEvent(claim) => {
                self.require_no_pending()?;
                self.apply_claim_event(claim)?;
            }
            GameInput::PrepareForSeason => {
                self.require_no_pending()?;
                self.apply_prepare_for_season()?;
            }
            GameInput::GameEnd => {
                self.require_no_pending()?;
                self.apply_game_end()?;
            }
            GameInput::SelectCards(_)
            | GameInput::SelectPlayedCards(_)
            | GameInput::SelectPlayer(_)
            | GameInput::SelectResources(_)
            | GameInput::DiscardCards(_)
            | GameInput::SelectLocation(_)
            | GameInput::SelectPaymentForCard(_)
            | GameInput::SelectWorkerPlacement(_)
            | GameInput::SelectOptionGeneric(_) => {
                self.apply_continuation(game_input)?;
            }
        }
        self.finish_turn_if_ready()
    }

    fn require_no_pending(&self) -> Result<()> {
        if self.pending_game_inputs.is_empty() {
            Ok(())
        } else {
            Err(EngineError::invalid(
                "a pending selection must be resolved first",
            ))
        }
    }

    // === PLAY_CARD ===

    fn apply_play_card(&mut self, play: &PlayCardInput) -> Result<()> {
        let card = Card::from_name(play.card);
        let game_input = GameInput::PlayCard(play.clone());

        if !card.can_play(self, &game_input) {
            return Err(EngineError::illegal(format!(
                "unable to play card {}",
                play.card
            )));
        }
        if play.from_meadow {
            if !self.meadow_cards.contains(&play.card) {
                return Err(EngineError::invalid(format!(
                    "{} is not in the meadow",
                    play.card
                )));
            }
        } else if !self
            .get_active_player()?
            .cards_in_hand()
            .contains(&play.card)
        {
            return Err(EngineError::invalid(format!(
                "{} is not in hand",
                play.card
            )));
        }

        self.get_active_player()?.is_payment_options_valid(play)?;
        self.pay_for_card(play)?;

        if play.from_meadow {
            self.remove_from_meadow(play.card)?;
            self.replenish_meadow()?;
        } else {
            self.get_active_player_mut()?
                .remove_card_from_hand(play.card)?;
        }

        card.play(self, &game_input)?;
        self.run_post_play_triggers(play.card)?;

        let player_name = self.get_active_player()?.name().to_string();
        self.add_to_game_log(format!("{} played {}.", player_name, play.card));
        Ok(())
    }

    /// Charge the submitted payment: resources, dungeon imprisonment, and
    /// payment cards (crane/innkeeper discard themselves; queen/inn host the
    /// worker that earned the discount).
    fn pay_for_card(&mut self, play: &PlayCardInput) -> Result<()> {
        let payment = &play.payment;
        let card = Card::from_name(play.card);

        self.get_active_player_mut()?
            .spend_resources(&payment.resources)?;

        if let Some(critter) = payment.card_to_dungeon {
            self.get_active_player_mut()?.imprison_in_dungeon(critter)?;
            return Ok(());
        }

        if let Some(card_to_use) = payment.card_to_use {
            match card_to_use {
                CardName::Crane | CardName::Innkeeper => {
                    let removed = self
                        .get_active_player_mut()?
                        .remove_card_from_city(card_to_use)?;
                    for removed_card in removed {
                        self.discard_pile.add_to_stack(removed_card);
                    }
                }
                CardName::Queen | CardName::Inn => {
                    self.place_worker_on_own_card(card_to_use)?;
                }
                other => {
                    return Err(EngineError::invalid(format!(
                        "unexpected payment card: {}",
                        other
                    )));
                }
            }
            return Ok(());
        }

        // A free critter occupies its associated construction.
        if card.is_critter()
            && payment.resources.is_empty()
            && card.base_cost.total_materials() > 0
        {
            let player = self.get_active_player_mut()?;
            if player.has_unused_by_critter_construction(CardName::Evertree) {
                player.use_construction_to_play_critter(CardName::Evertree)?;
            } else if let Some(associated) = card.associated_card {
                if player.has_unused_by_critter_construction(associated) {
                    player.use_construction_to_play_critter(associated)?;
                }
            }
        }
        Ok(())
    }

    /// Passive governance triggers that fire after the active player plays a
    /// card.
    fn run_post_play_triggers(&mut self, played: CardName) -> Result<()> {
        let card = Card::from_name(played);
        let player = self.get_active_player()?;

        let has_historian = player.has_card_in_city(CardName::Historian);
        let has_shopkeeper = player.has_card_in_city(CardName::Shopkeeper);
        let has_courthouse = player.has_card_in_city(CardName::Courthouse);

        // The historian files every new arrival but itself.
        if has_historian && played != CardName::Historian {
            self.active_player_draws(1)?;
        }
        if has_shopkeeper && played != CardName::Shopkeeper && card.is_critter() {
            self.active_player_gains(&crate::resources! { berry: 1 })?;
        }
        if has_courthouse && played != CardName::Courthouse && card.is_construction {
            self.push_pending(GameInput::SelectResources(
                crate::game::input::SelectResourcesInput {
                    meta: MultiStepMeta::new(
                        GameInputType::PlayCard,
                        EffectContext::Card(CardName::Courthouse),
                    ),
                    to_spend: false,
                    min_resources: 1,
                    max_resources: 1,
                    allowed_resources: vec![
                        crate::core::ResourceType::Twig,
                        crate::core::ResourceType::Resin,
                        crate::core::ResourceType::Pebble,
                    ],
                    client_options: Default::default(),
                },
            ));
        }
        Ok(())
    }

    /// Put a card into play without a payment (queen, postal pigeon,
    /// cemetery, inn purchases after their own payment step).
    pub(crate) fn put_card_into_play(&mut self, card_name: CardName) -> Result<()> {
        let card = Card::from_name(card_name);
        if !card.played_into_opponent_city() {
            self.get_active_player_mut()?.add_to_city(card_name)?;
        }
        let synthetic = GameInput::PlayCard(PlayCardInput {
            card: card_name,
            from_meadow: false,
            payment: Default::default(),
        });
        card.activate(self, &synthetic)?;
        self.run_post_play_triggers(card_name)
    }

    // === PLACE_WORKER ===

    fn apply_place_worker(&mut self, place: &PlaceWorkerInput) -> Result<()> {
        let location = Location::from_name(place.location);
        let game_input = GameInput::PlaceWorker(place.clone());
        if !location.can_play(self, &game_input) {
            return Err(EngineError::illegal(format!(
                "unable to visit location {}",
                place.location
            )));
        }

        location.activate(self, &game_input)?;
        self.record_worker_on_location(place.location)?;

        let player_name = self.get_active_player()?.name().to_string();
        self.add_to_game_log(format!(
            "{} placed a worker on {}.",
            player_name, place.location
        ));
        Ok(())
    }

    /// Write the occupancy ledger for a location placement.
    pub(crate) fn record_worker_on_location(&mut self, location: LocationName) -> Result<()> {
        let player_id = self.active_player_id;
        self.get_active_player_mut()?
            .place_worker(WorkerPlacement::Location { location })?;
        self.locations_map
            .entry(location)
            .or_insert_with(Vec::new)
            .push(player_id);
        Ok(())
    }

    /// Place one of the active player's workers on their own destination
    /// card (queen/inn payments).
    pub(crate) fn place_worker_on_own_card(&mut self, card: CardName) -> Result<()> {
        let player_id = self.active_player_id;
        let player = self.get_active_player_mut()?;
        if !player.can_place_worker_on_own_card(card) {
            return Err(EngineError::illegal(format!(
                "cannot place worker on {}",
                card
            )));
        }
        player.place_worker(WorkerPlacement::Card {
            card,
            city_owner: player_id,
        })?;
        player.host_worker_on_card(card, player_id)?;
        Ok(())
    }

    // === VISIT_DESTINATION_CARD ===

    /// Whether the active player may put a worker on `card` in
    /// `city_owner`'s city.
    #[must_use]
    pub fn can_visit_destination(&self, visit: &VisitDestinationCardInput) -> bool {
        let card = Card::from_name(visit.card);
        if !card.can_take_worker() {
            return false;
        }
        let visitor = match self.get_active_player() {
            Ok(p) => p,
            Err(_) => return false,
        };
        if visitor.num_available_workers() == 0 {
            return false;
        }
        let owner = match self.get_player(visit.city_owner) {
            Ok(p) => p,
            Err(_) => return false,
        };
        if owner.id() != visitor.id() && !card.is_open_destination {
            return false;
        }
        if !owner.has_space_on_destination_card(visit.card) {
            return false;
        }
        if let Some(can_play_inner) = card.can_play_inner {
            let candidate = GameInput::VisitDestinationCard(visit.clone());
            if !can_play_inner(self, &candidate) {
                return false;
            }
        }
        true
    }

    fn apply_visit_destination(&mut self, visit: &VisitDestinationCardInput) -> Result<()> {
        if !self.can_visit_destination(visit) {
            return Err(EngineError::illegal(format!(
                "unable to visit {} in {}'s city",
                visit.card, visit.city_owner
            )));
        }
        let card = Card::from_name(visit.card);
        let visitor_id = self.active_player_id;

        self.get_player_mut(visit.city_owner)?
            .host_worker_on_card(visit.card, visitor_id)?;
        self.get_active_player_mut()?
            .place_worker(WorkerPlacement::Card {
                card: visit.card,
                city_owner: visit.city_owner,
            })?;

        // Visiting someone else's open destination pays the owner.
        if visit.city_owner != visitor_id {
            self.get_player_mut(visit.city_owner)?
                .gain_resources(&crate::resources! { vp: 1 });
        }

        let game_input = GameInput::VisitDestinationCard(visit.clone());
        if let Some(play_inner) = card.play_inner {
            play_inner(self, &game_input)?;
        }

        let player_name = self.get_active_player()?.name().to_string();
        self.add_to_game_log(format!("{} visited {}.", player_name, visit.card));
        Ok(())
    }

    // === CLAIM_EVENT ===

    fn apply_claim_event(&mut self, claim: &ClaimEventInput) -> Result<()> {
        let event = Event::from_name(claim.event);
        let game_input = GameInput::ClaimEvent(claim.clone());
        event.play(self, &game_input)?;

        let player_name = self.get_active_player()?.name().to_string();
        self.add_to_game_log(format!("{} claimed {}.", player_name, claim.event));
        Ok(())
    }

    /// Spend the worker and mark the event claimed by the active player.
    pub(crate) fn record_event_claim(&mut self, event: EventName) -> Result<()> {
        let player_id = self.active_player_id;
        let player = self.get_active_player_mut()?;
        player.place_worker(WorkerPlacement::Event { event })?;
        player.record_claimed_event(event);
        self.events_map.insert(event, Some(player_id));
        Ok(())
    }

    // === PREPARE_FOR_SEASON ===

    fn apply_prepare_for_season(&mut self) -> Result<()> {
        let player = self.get_active_player()?;
        if player.status() != PlayerStatus::DuringSeason {
            return Err(EngineError::illegal("already preparing for a season"));
        }
        if player.current_season().next().is_none() {
            return Err(EngineError::illegal("no season left after autumn"));
        }
        if player.num_available_workers() != 0 {
            return Err(EngineError::illegal(
                "cannot prepare for a season with workers still to place",
            ));
        }

        let clock_tower_vp = player
            .get_played_card_infos(CardName::ClockTower)
            .first()
            .map_or(0, |info| info.resources.vp);
        let location_workers: Vec<WorkerPlacement> = player
            .placed_workers()
            .iter()
            .filter(|placement| matches!(placement, WorkerPlacement::Location { .. }))
            .copied()
            .collect();

        let player_name = player.name().to_string();
        self.get_active_player_mut()?
            .set_status(PlayerStatus::PreparingForSeason);
        self.add_to_game_log(format!("{} is preparing for the next season.", player_name));

        // The clock tower may spend a point to fire one occupied location
        // before the workers come home.
        if clock_tower_vp > 0 && !location_workers.is_empty() {
            self.push_pending(GameInput::SelectWorkerPlacement(
                SelectWorkerPlacementInput {
                    meta: MultiStepMeta::new(
                        GameInputType::PrepareForSeason,
                        EffectContext::Card(CardName::ClockTower),
                    ),
                    options: location_workers,
                    must_select_one: false,
                    client_options: SelectedWorkerPlacement::default(),
                },
            ));
        }
        Ok(())
    }

    /// Finish the deferred season change once the queue has drained.
    fn resolve_season_change(&mut self) -> Result<()> {
        // Flip status first so production continuations draining later
        // don't re-trigger the change.
        self.get_active_player_mut()?
            .set_status(PlayerStatus::DuringSeason);

        let player_id = self.active_player_id;
        self.recall_workers_for(player_id)?;

        let new_season = self.get_active_player_mut()?.advance_season()?;
        let player_name = self.get_active_player()?.name().to_string();
        self.add_to_game_log(format!("{} moved into {}.", player_name, new_season));

        match new_season {
            Season::Spring | Season::Autumn => {
                self.activate_production_for_active(&GameInput::PrepareForSeason)?;
            }
            Season::Summer => {
                let meadow = self.meadow_cards();
                let max_to_select = 2.min(meadow.len());
                self.push_pending(GameInput::SelectCards(SelectCardsInput {
                    meta: MultiStepMeta::new(GameInputType::PrepareForSeason, EffectContext::Season),
                    card_options: meadow,
                    min_to_select: max_to_select,
                    max_to_select,
                    client_options: SelectedCards::default(),
                }));
            }
            Season::Winter => {
                return Err(EngineError::invariant("season advanced into winter"));
            }
        }
        Ok(())
    }

    /// The summer meadow draft: take the chosen cards into hand.
    fn resolve_season_draft(&mut self, game_input: &GameInput) -> Result<()> {
        let select = match game_input {
            GameInput::SelectCards(select) => select,
            _ => {
                return Err(EngineError::invalid(
                    "season change expected a card selection",
                ));
            }
        };
        let selected = &select.client_options.selected_cards;
        validate_selection(selected, &select.card_options, select.min_to_select, select.max_to_select)?;

        for &card in selected {
            self.remove_from_meadow(card)?;
            if let Some(overflow) = self.get_active_player_mut()?.add_card_to_hand(card) {
                self.discard_pile.add_to_stack(overflow);
            }
        }
        self.replenish_meadow()?;
        Ok(())
    }

    /// Bring home every recallable worker `player_id` has out.
    pub(crate) fn recall_workers_for(&mut self, player_id: PlayerId) -> Result<()> {
        if self.get_player(player_id)?.num_available_workers() != 0 {
            return Err(EngineError::invariant("still have available workers"));
        }
        let placements = self.get_player(player_id)?.recallable_workers();
        for placement in placements {
            self.recall_one_worker(player_id, &placement)?;
        }
        Ok(())
    }

    /// Bring home a single worker (season recall, the ranger, one event).
    pub(crate) fn recall_one_worker(
        &mut self,
        player_id: PlayerId,
        placement: &WorkerPlacement,
    ) -> Result<()> {
        match placement {
            WorkerPlacement::Location { location } => {
                let occupants = self.locations_map.get_mut(location).ok_or_else(|| {
                    EngineError::invariant(format!("couldn't find location {}", location))
                })?;
                let idx = occupants.iter().position(|&p| p == player_id).ok_or_else(|| {
                    EngineError::invariant(format!("couldn't find worker at {}", location))
                })?;
                occupants.remove(idx);
            }
            WorkerPlacement::Event { .. } => {
                // The claim marker stays; only the ledger entry clears.
            }
            WorkerPlacement::Card { card, city_owner } => {
                if matches!(card, CardName::Cemetery | CardName::Monastery) {
                    return Err(EngineError::invalid(format!(
                        "workers on {} are committed for good",
                        card
                    )));
                }
                self.get_player_mut(*city_owner)?
                    .unhost_worker_on_card(*card, player_id)?;
            }
        }
        self.get_player_mut(player_id)?
            .remove_placed_worker(placement)
    }

    /// Fire every production card (each copy) in the active player's city.
    pub(crate) fn activate_production_for_active(&mut self, trigger: &GameInput) -> Result<()> {
        let production_cards = self.get_active_player()?.get_played_production_cards();
        for card in production_cards {
            Card::from_name(card).activate(self, trigger)?;
        }
        let player_name = self.get_active_player()?.name().to_string();
        self.add_to_game_log(format!("{} activated production.", player_name));
        Ok(())
    }

    // === GAME_END ===

    fn apply_game_end(&mut self) -> Result<()> {
        let player = self.get_active_player()?;
        if player.current_season() != Season::Autumn {
            return Err(EngineError::illegal(
                "can only pass out of the game in autumn",
            ));
        }
        if player.status() == PlayerStatus::GameEnded {
            return Err(EngineError::illegal("already passed out of the game"));
        }
        let player_name = player.name().to_string();
        let points = player.get_points(self);
        self.get_active_player_mut()?
            .set_status(PlayerStatus::GameEnded);
        self.add_to_game_log(format!(
            "{} ended the game with {} points.",
            player_name, points
        ));
        Ok(())
    }

    // === Continuations ===

    fn apply_continuation(&mut self, game_input: &GameInput) -> Result<()> {
        let idx = self
            .pending_game_inputs
            .iter()
            .position(|pending| game_input.matches_pending(pending))
            .ok_or_else(|| {
                EngineError::invalid("input does not match any pending selection")
            })?;
        self.pending_game_inputs.remove(idx);

        let context = game_input
            .context()
            .ok_or_else(|| EngineError::invalid("continuation input without a context"))?;
        match context {
            EffectContext::Card(card_name) => {
                let card = Card::from_name(card_name);
                let play_inner = card.play_inner.ok_or_else(|| {
                    EngineError::invariant(format!("{} has no effect to resume", card_name))
                })?;
                play_inner(self, game_input)
            }
            EffectContext::Location(location_name) => {
                let location = Location::from_name(location_name);
                let play_inner = location.play_inner.ok_or_else(|| {
                    EngineError::invariant(format!("{} has no effect to resume", location_name))
                })?;
                play_inner(self, game_input)
            }
            EffectContext::Event(event_name) => {
                let event = Event::from_name(event_name);
                let play_inner = event.play_inner.ok_or_else(|| {
                    EngineError::invariant(format!("{} has no effect to resume", event_name))
                })?;
                play_inner(self, game_input)
            }
            EffectContext::Season => self.resolve_season_draft(game_input),
        }
    }

    // === Turn bookkeeping ===

    fn finish_turn_if_ready(&mut self) -> Result<()> {
        if !self.pending_game_inputs.is_empty() {
            return Ok(());
        }
        if self.get_active_player()?.status() == PlayerStatus::PreparingForSeason {
            self.resolve_season_change()?;
            if !self.pending_game_inputs.is_empty() {
                return Ok(());
            }
        }
        self.advance_active_player();
        Ok(())
    }

    fn advance_active_player(&mut self) {
        if self.game_over() {
            return;
        }
        let current_idx = self
            .players
            .iter()
            .position(|p| p.id() == self.active_player_id)
            .unwrap_or(0);
        let n = self.players.len();
        let mut idx = current_idx;
        loop {
            idx = (idx + 1) % n;
            if self.players[idx].status() != PlayerStatus::GameEnded {
                break;
            }
        }
        self.active_player_id = self.players[idx].id();
    }

    // === Legal input enumeration ===

    /// Every input the active player may legally submit right now.
    ///
    /// When a continuation is pending the player has no other choice, so the
    /// queue is returned verbatim.
    #[must_use]
    pub fn get_possible_game_inputs(&self) -> Vec<GameInput> {
        if !self.pending_game_inputs.is_empty() {
            return self.pending_game_inputs();
        }
        let player = match self.get_active_player() {
            Ok(p) => p,
            Err(_) => return Vec::new(),
        };
        if player.status() == PlayerStatus::GameEnded {
            return Vec::new();
        }

        let mut possible: Vec<GameInput> = Vec::new();

        if player.num_available_workers() > 0 {
            for location in self.locations_map.keys() {
                let candidate = GameInput::PlaceWorker(PlaceWorkerInput {
                    location: *location,
                    client_options: Default::default(),
                });
                if Location::from_name(*location).can_play(self, &candidate) {
                    possible.push(candidate);
                }
            }
            for (event, claimant) in self.events_map.iter() {
                if claimant.is_some() {
                    continue;
                }
                let candidate = GameInput::ClaimEvent(ClaimEventInput { event: *event });
                if Event::from_name(*event).can_play(self, &candidate) {
                    possible.push(candidate);
                }
            }
            for other in &self.players {
                let destinations = if other.id() == player.id() {
                    other.get_all_destination_cards()
                } else {
                    other.get_available_open_destination_cards()
                };
                for card in destinations {
                    let visit = VisitDestinationCardInput {
                        card,
                        city_owner: other.id(),
                    };
                    if self.can_visit_destination(&visit) {
                        possible.push(GameInput::VisitDestinationCard(visit));
                    }
                }
            }
        }

        let mut seen_meadow: Vec<CardName> = Vec::new();
        for card in self.meadow_cards.iter() {
            if seen_meadow.contains(card) {
                continue;
            }
            seen_meadow.push(*card);
            let candidate = GameInput::PlayCard(PlayCardInput {
                card: *card,
                from_meadow: true,
                payment: Default::default(),
            });
            if Card::from_name(*card).can_play(self, &candidate) {
                possible.push(candidate);
            }
        }
        let mut seen_hand: Vec<CardName> = Vec::new();
        for card in player.cards_in_hand() {
            if seen_hand.contains(card) {
                continue;
            }
            seen_hand.push(*card);
            let candidate = GameInput::PlayCard(PlayCardInput {
                card: *card,
                from_meadow: false,
                payment: Default::default(),
            });
            if Card::from_name(*card).can_play(self, &candidate) {
                possible.push(candidate);
            }
        }

        if player.num_available_workers() == 0
            && player.current_season().next().is_some()
            && player.status() == PlayerStatus::DuringSeason
        {
            possible.push(GameInput::PrepareForSeason);
        }
        if player.current_season() == Season::Autumn {
            possible.push(GameInput::GameEnd);
        }

        possible
    }
}

/// Check a card selection against its offered options and bounds.
pub(crate) fn validate_selection<T: PartialEq + Copy + std::fmt::Debug>(
    selected: &[T],
    options: &[T],
    min: usize,
    max: usize,
) -> Result<()> {
    if selected.len() < min {
        return Err(EngineError::invalid(format!(
            "too few selected: need at least {}",
            min
        )));
    }
    if selected.len() > max {
        return Err(EngineError::invalid(format!(
            "too many selected: at most {}",
            max
        )));
    }
    // Each pick must consume a distinct offered option.
    let mut remaining: Vec<&T> = options.iter().collect();
    for pick in selected {
        match remaining.iter().position(|&option| option == pick) {
            Some(idx) => {
                remaining.remove(idx);
            }
            None => {
                return Err(EngineError::invalid(format!(
                    "{:?} is not one of the offered options",
                    pick
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_player_game() -> GameState {
        GameState::initial(&["Rook", "Wren"], NewGameOptions::default()).unwrap()
    }

    #[test]
    fn test_initial_game_state() {
        let state = two_player_game();
        assert_eq!(state.num_players(), 2);
        assert_eq!(state.players()[0].num_cards_in_hand(), 5);
        assert_eq!(state.players()[1].num_cards_in_hand(), 6);
        assert_eq!(state.meadow_cards().len(), MEADOW_SIZE);
        assert_eq!(state.players()[0].num_available_workers(), 2);
        assert_eq!(state.players()[0].resources().total(), 0);
        assert_eq!(state.active_player_id(), PlayerId::new(0));
        assert!(state.pending_game_inputs().is_empty());
    }

    #[test]
    fn test_initial_rejects_single_player() {
        let err = GameState::initial(&["Solo"], NewGameOptions::default()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn test_initial_is_deterministic_per_seed() {
        let opts = NewGameOptions {
            seed: 11,
            shuffle_deck: true,
        };
        let a = GameState::initial(&["Rook", "Wren"], opts).unwrap();
        let b = GameState::initial(&["Rook", "Wren"], opts).unwrap();
        assert_eq!(a.meadow_cards(), b.meadow_cards());
        assert_eq!(a.players()[0].cards_in_hand(), b.players()[0].cards_in_hand());
    }

    #[test]
    fn test_draw_reshuffles_discard_when_deck_empty() {
        let mut state = two_player_game();
        let deck_size = state.deck_size();
        for _ in 0..deck_size {
            let card = state.draw_card().unwrap();
            state.discard(card);
        }
        assert_eq!(state.deck_size(), 0);
        assert!(state.discard_pile_size() > 0);

        // The next draw flips the discard pile back into the deck.
        state.draw_card().unwrap();
        assert_eq!(state.discard_pile_size(), 0);
    }

    #[test]
    fn test_draw_with_both_piles_empty_is_invariant_violation() {
        let mut state = two_player_game();
        let deck_size = state.deck_size();
        let mut drawn = Vec::new();
        for _ in 0..deck_size {
            drawn.push(state.draw_card().unwrap());
        }
        let err = state.draw_card().unwrap_err();
        assert!(matches!(err, EngineError::InvariantViolation(_)));
    }

    #[test]
    fn test_next_does_not_mutate_receiver() {
        let state = two_player_game();
        let before = state.game_state_id();
        let inputs = state.get_possible_game_inputs();
        let place = inputs
            .iter()
            .find(|input| matches!(input, GameInput::PlaceWorker(_)))
            .unwrap();
        let next = state.next(place).unwrap();
        assert_eq!(state.game_state_id(), before);
        assert_eq!(next.game_state_id(), before + 1);
    }

    #[test]
    fn test_validate_selection_bounds() {
        let options = [CardName::Farm, CardName::Mine, CardName::Farm];
        assert!(validate_selection(&[CardName::Farm], &options, 0, 2).is_ok());
        assert!(validate_selection(&[CardName::Farm, CardName::Farm], &options, 0, 2).is_ok());
        // Three picks of a twice-offered card fails.
        assert!(validate_selection(
            &[CardName::Farm, CardName::Farm, CardName::Farm],
            &options,
            0,
            3
        )
        .is_err());
        assert!(validate_selection(&[CardName::Queen], &options, 0, 2).is_err());
        assert!(validate_selection(&[], &options, 1, 2).is_err());
    }
}
