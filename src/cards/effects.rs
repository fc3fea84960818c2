//! Card effect implementations.
//!
//! Each multi-step effect is a small state machine: the function branches on
//! the incoming input to tell which stage it is in, performs that stage's
//! mutation, and pushes at most one new continuation onto the pending queue.
//! The terminal stage mutates and pushes nothing. The queue is the only
//! persisted state, so a half-resolved card survives serialization.

use crate::cards::{Card, CardName, CardType};
use crate::core::{EngineError, PlayerId, ResourceType, Result};
use crate::events::Event;
use crate::game::input::{
    DiscardCardsInput, EffectContext, GameInput, MultiStepMeta, PlayedCardId, SelectCardsInput,
    SelectLocationInput, SelectOptionGenericInput, SelectPaymentForCardInput,
    SelectPlayedCardsInput, SelectPlayerInput, SelectResourcesInput, WorkerPlacement,
};
use crate::game::play_helpers::{
    opponents_of, required_selected_location, required_selected_option, required_selected_player,
    selected_worker_placement, single_resource_count, validate_selected_resources,
};
use crate::game::state::validate_selection;
use crate::game::{GameState, PaymentDiscount};
use crate::locations::{Location, LocationType};
use crate::resources;

fn card_ctx(card: CardName) -> EffectContext {
    EffectContext::Card(card)
}

fn is_ctx(meta: &MultiStepMeta, card: CardName) -> bool {
    meta.context == EffectContext::Card(card)
}

/// Production copies in `owner`'s city, minus the listed exclusions.
fn production_copies_except(
    game_state: &GameState,
    owner: PlayerId,
    exclude: &[CardName],
) -> Vec<PlayedCardId> {
    match game_state.get_player(owner) {
        Ok(player) => player
            .iter_played_cards()
            .filter(|info| {
                Card::from_name(info.card).card_type == CardType::Production
                    && !exclude.contains(&info.card)
            })
            .map(|info| PlayedCardId {
                city_owner: owner,
                card: info.card,
            })
            .collect(),
        Err(_) => Vec::new(),
    }
}

// === Bard ===

/// Discard up to 5 hand cards, 1 VP each.
pub(crate) fn play_bard(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    match game_input {
        GameInput::DiscardCards(discard) if is_ctx(&discard.meta, CardName::Bard) => {
            let cards = discard.client_options.cards_to_discard.clone();
            if cards.len() > discard.max_cards {
                return Err(EngineError::invalid("too many cards to discard"));
            }
            for card in &cards {
                game_state.get_active_player_mut()?.remove_card_from_hand(*card)?;
                game_state.discard(*card);
            }
            game_state.active_player_gains(&resources! { vp: cards.len() as u32 })?;
            Ok(())
        }
        _ => {
            game_state.push_pending(GameInput::DiscardCards(DiscardCardsInput {
                meta: MultiStepMeta::new(game_input.input_type(), card_ctx(CardName::Bard)),
                min_cards: 0,
                max_cards: 5,
                client_options: Default::default(),
            }));
            Ok(())
        }
    }
}

// === Barge Toad ===

/// 2 twigs per farm in the city.
pub(crate) fn play_barge_toad(game_state: &mut GameState, _game_input: &GameInput) -> Result<()> {
    let num_farms = game_state
        .get_active_player()?
        .get_played_card_infos(CardName::Farm)
        .len() as u32;
    game_state.active_player_gains(&resources! { twig: 2 * num_farms })
}

// === Chip Sweep ===

/// Re-activate one of your other production cards.
pub(crate) fn play_chip_sweep(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    match game_input {
        GameInput::SelectPlayedCards(select) if is_ctx(&select.meta, CardName::ChipSweep) => {
            let selected = select.client_options.selected_cards.clone();
            validate_selection(&selected, &select.card_options, select.min_to_select, select.max_to_select)?;
            let target = selected[0].card;
            Card::from_name(target).activate(game_state, game_input)
        }
        _ => {
            let player_id = game_state.active_player_id();
            let options = production_copies_except(
                game_state,
                player_id,
                &[CardName::ChipSweep, CardName::MinerMole],
            );
            if options.is_empty() {
                return Ok(());
            }
            game_state.push_pending(GameInput::SelectPlayedCards(SelectPlayedCardsInput {
                meta: MultiStepMeta::new(game_input.input_type(), card_ctx(CardName::ChipSweep)),
                card_options: options,
                min_to_select: 1,
                max_to_select: 1,
                client_options: Default::default(),
            }));
            Ok(())
        }
    }
}

// === Doctor / Woodcarver ===

fn play_pay_resource_for_vp(
    game_state: &mut GameState,
    game_input: &GameInput,
    card: CardName,
    resource: ResourceType,
    max: u32,
) -> Result<()> {
    match game_input {
        GameInput::SelectResources(select) if is_ctx(&select.meta, card) => {
            let chosen = validate_selected_resources(select)?;
            let count = single_resource_count(&chosen, resource, max)?;
            let player = game_state.get_active_player_mut()?;
            player.spend_resources(&chosen)?;
            player.gain_resources(&resources! { vp: count });
            Ok(())
        }
        _ => {
            game_state.push_pending(GameInput::SelectResources(SelectResourcesInput {
                meta: MultiStepMeta::new(game_input.input_type(), card_ctx(card)),
                to_spend: true,
                min_resources: 0,
                max_resources: max,
                allowed_resources: vec![resource],
                client_options: Default::default(),
            }));
            Ok(())
        }
    }
}

/// Pay up to 3 berries, 1 VP each.
pub(crate) fn play_doctor(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    play_pay_resource_for_vp(game_state, game_input, CardName::Doctor, ResourceType::Berry, 3)
}

/// Pay up to 3 twigs, 1 VP each.
pub(crate) fn play_woodcarver(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    play_pay_resource_for_vp(game_state, game_input, CardName::Woodcarver, ResourceType::Twig, 3)
}

// === Fool ===

pub(crate) fn can_play_fool(game_state: &GameState, _game_input: &GameInput) -> bool {
    let active_id = match game_state.get_active_player() {
        Ok(p) => p.id(),
        Err(_) => return false,
    };
    game_state
        .players()
        .iter()
        .any(|p| p.id() != active_id && p.can_add_to_city(CardName::Fool))
}

/// Played into an opponent's city, worth -2 there.
pub(crate) fn play_fool(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    match game_input {
        GameInput::SelectPlayer(select) if is_ctx(&select.meta, CardName::Fool) => {
            let target = required_selected_player(select)?;
            game_state.get_player_mut(target)?.add_to_city(CardName::Fool)
        }
        _ => {
            let active_id = game_state.active_player_id();
            let options: Vec<PlayerId> = game_state
                .players()
                .iter()
                .filter(|p| p.id() != active_id && p.can_add_to_city(CardName::Fool))
                .map(|p| p.id())
                .collect();
            game_state.push_pending(GameInput::SelectPlayer(SelectPlayerInput {
                meta: MultiStepMeta::new(game_input.input_type(), card_ctx(CardName::Fool)),
                player_options: options,
                must_select_one: true,
                client_options: Default::default(),
            }));
            Ok(())
        }
    }
}

// === General Store ===

/// 1 berry, 2 with a farm.
pub(crate) fn play_general_store(game_state: &mut GameState, _game_input: &GameInput) -> Result<()> {
    let bonus = game_state
        .get_active_player()?
        .has_card_in_city(CardName::Farm);
    let berries = if bonus { 2 } else { 1 };
    game_state.active_player_gains(&resources! { berry: berries })
}

// === Husband ===

/// A husband paired with a wife brings home 1 resource of any kind.
pub(crate) fn play_husband(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    match game_input {
        GameInput::SelectResources(select) if is_ctx(&select.meta, CardName::Husband) => {
            let chosen = validate_selected_resources(select)?;
            game_state.active_player_gains(&chosen)
        }
        _ => {
            let player = game_state.get_active_player()?;
            let husbands = player.get_played_card_infos(CardName::Husband).len();
            let wives = player.get_played_card_infos(CardName::Wife).len();
            if husbands > wives {
                return Ok(());
            }
            game_state.push_pending(GameInput::SelectResources(SelectResourcesInput {
                meta: MultiStepMeta::new(game_input.input_type(), card_ctx(CardName::Husband)),
                to_spend: false,
                min_resources: 1,
                max_resources: 1,
                allowed_resources: Vec::new(),
                client_options: Default::default(),
            }));
            Ok(())
        }
    }
}

// === Miner Mole ===

/// Copy a production card in an opponent's city.
pub(crate) fn play_miner_mole(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    match game_input {
        GameInput::SelectPlayedCards(select) if is_ctx(&select.meta, CardName::MinerMole) => {
            let selected = select.client_options.selected_cards.clone();
            validate_selection(&selected, &select.card_options, select.min_to_select, select.max_to_select)?;
            let target = selected[0].card;
            Card::from_name(target).activate(game_state, game_input)
        }
        _ => {
            let active_id = game_state.active_player_id();
            let mut options = Vec::new();
            for opponent in opponents_of(game_state, active_id) {
                options.extend(production_copies_except(
                    game_state,
                    opponent,
                    &[CardName::MinerMole, CardName::ChipSweep],
                ));
            }
            if options.is_empty() {
                return Ok(());
            }
            game_state.push_pending(GameInput::SelectPlayedCards(SelectPlayedCardsInput {
                meta: MultiStepMeta::new(game_input.input_type(), card_ctx(CardName::MinerMole)),
                card_options: options,
                min_to_select: 1,
                max_to_select: 1,
                client_options: Default::default(),
            }));
            Ok(())
        }
    }
}

// === Monk ===

/// Give up to 2 berries to an opponent, 2 VP per berry given.
pub(crate) fn play_monk(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    match game_input {
        GameInput::SelectResources(select) if is_ctx(&select.meta, CardName::Monk) => {
            let chosen = validate_selected_resources(select)?;
            let berries = single_resource_count(&chosen, ResourceType::Berry, 2)?;
            if berries == 0 {
                return Ok(());
            }
            game_state.get_active_player_mut()?.spend_resources(&chosen)?;
            let active_id = game_state.active_player_id();
            game_state.push_pending(GameInput::SelectPlayer(SelectPlayerInput {
                meta: MultiStepMeta::new(game_input.input_type(), card_ctx(CardName::Monk))
                    .with_prev(game_input.clone()),
                player_options: opponents_of(game_state, active_id),
                must_select_one: true,
                client_options: Default::default(),
            }));
            Ok(())
        }
        GameInput::SelectPlayer(select) if is_ctx(&select.meta, CardName::Monk) => {
            let target = required_selected_player(select)?;
            let given = match select.meta.prev_input.as_deref() {
                Some(GameInput::SelectResources(prev)) => prev.client_options.resources,
                _ => return Err(EngineError::invalid("missing berry selection")),
            };
            game_state.get_player_mut(target)?.gain_resources(&given);
            game_state.active_player_gains(&resources! { vp: 2 * given.berry })
        }
        _ => {
            game_state.push_pending(GameInput::SelectResources(SelectResourcesInput {
                meta: MultiStepMeta::new(game_input.input_type(), card_ctx(CardName::Monk)),
                to_spend: true,
                min_resources: 0,
                max_resources: 2,
                allowed_resources: vec![ResourceType::Berry],
                client_options: Default::default(),
            }));
            Ok(())
        }
    }
}

// === Peddler ===

/// Pay up to 2 of any resources to gain that many of any others.
pub(crate) fn play_peddler(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    match game_input {
        GameInput::SelectResources(select)
            if is_ctx(&select.meta, CardName::Peddler) && select.to_spend =>
        {
            let spent = validate_selected_resources(select)?;
            let count = spent.total_materials();
            game_state.get_active_player_mut()?.spend_resources(&spent)?;
            if count == 0 {
                return Ok(());
            }
            game_state.push_pending(GameInput::SelectResources(SelectResourcesInput {
                meta: MultiStepMeta::new(game_input.input_type(), card_ctx(CardName::Peddler))
                    .with_prev(game_input.clone()),
                to_spend: false,
                min_resources: count,
                max_resources: count,
                allowed_resources: Vec::new(),
                client_options: Default::default(),
            }));
            Ok(())
        }
        GameInput::SelectResources(select)
            if is_ctx(&select.meta, CardName::Peddler) && !select.to_spend =>
        {
            let gained = validate_selected_resources(select)?;
            game_state.active_player_gains(&gained)
        }
        _ => {
            game_state.push_pending(GameInput::SelectResources(SelectResourcesInput {
                meta: MultiStepMeta::new(game_input.input_type(), card_ctx(CardName::Peddler)),
                to_spend: true,
                min_resources: 0,
                max_resources: 2,
                allowed_resources: Vec::new(),
                client_options: Default::default(),
            }));
            Ok(())
        }
    }
}

// === Postal Pigeon ===

/// Reveal 2 cards; may play one worth up to 3 for free.
pub(crate) fn play_postal_pigeon(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    match game_input {
        GameInput::SelectCards(select) if is_ctx(&select.meta, CardName::PostalPigeon) => {
            let selected = select.client_options.selected_cards.clone();
            validate_selection(&selected, &select.card_options, select.min_to_select, select.max_to_select)?;

            let mut leftovers = select.card_options.clone();
            if let Some(&chosen) = selected.first() {
                if Card::from_name(chosen).base_vp > 3 {
                    return Err(EngineError::invalid(
                        "postal pigeon can only play a card worth up to 3",
                    ));
                }
                let idx = leftovers.iter().position(|&c| c == chosen).unwrap();
                leftovers.remove(idx);
                game_state.put_card_into_play(chosen)?;
            }
            for card in leftovers {
                game_state.discard(card);
            }
            Ok(())
        }
        _ => {
            let mut revealed = Vec::new();
            for _ in 0..2 {
                if let Some(card) = game_state.draw_card_opt() {
                    revealed.push(card);
                }
            }
            if revealed.is_empty() {
                return Ok(());
            }
            game_state.push_pending(GameInput::SelectCards(SelectCardsInput {
                meta: MultiStepMeta::new(game_input.input_type(), card_ctx(CardName::PostalPigeon)),
                card_options: revealed,
                min_to_select: 0,
                max_to_select: 1,
                client_options: Default::default(),
            }));
            Ok(())
        }
    }
}

// === Ranger ===

/// Move one deployed worker somewhere new.
pub(crate) fn play_ranger(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    match game_input {
        GameInput::SelectWorkerPlacement(select) if is_ctx(&select.meta, CardName::Ranger) => {
            let placement = selected_worker_placement(select)?
                .ok_or_else(|| EngineError::invalid("must select a worker to move"))?;
            let player_id = game_state.active_player_id();
            game_state.recall_one_worker(player_id, &placement)?;

            let options: Vec<_> = game_state
                .locations_in_play()
                .into_iter()
                .filter(|location| {
                    let candidate = GameInput::PlaceWorker(crate::game::input::PlaceWorkerInput {
                        location: *location,
                        client_options: Default::default(),
                    });
                    Location::from_name(*location).can_play(game_state, &candidate)
                })
                .collect();
            if options.is_empty() {
                return Ok(());
            }
            game_state.push_pending(GameInput::SelectLocation(SelectLocationInput {
                meta: MultiStepMeta::new(game_input.input_type(), card_ctx(CardName::Ranger))
                    .with_prev(game_input.clone()),
                location_options: options,
                client_options: Default::default(),
            }));
            Ok(())
        }
        GameInput::SelectLocation(select) if is_ctx(&select.meta, CardName::Ranger) => {
            let location = required_selected_location(select)?;
            let candidate = GameInput::PlaceWorker(crate::game::input::PlaceWorkerInput {
                location,
                client_options: Default::default(),
            });
            let definition = Location::from_name(location);
            if !definition.can_play(game_state, &candidate) {
                return Err(EngineError::illegal(format!(
                    "unable to visit location {}",
                    location
                )));
            }
            definition.activate(game_state, &candidate)?;
            game_state.record_worker_on_location(location)
        }
        _ => {
            let options = game_state.get_active_player()?.recallable_workers();
            if options.is_empty() {
                return Ok(());
            }
            game_state.push_pending(GameInput::SelectWorkerPlacement(
                crate::game::input::SelectWorkerPlacementInput {
                    meta: MultiStepMeta::new(game_input.input_type(), card_ctx(CardName::Ranger)),
                    options,
                    must_select_one: true,
                    client_options: Default::default(),
                },
            ));
            Ok(())
        }
    }
}

// === Ruins ===

pub(crate) fn can_play_ruins(game_state: &GameState, _game_input: &GameInput) -> bool {
    match game_state.get_active_player() {
        Ok(player) => player.iter_played_cards().any(|info| {
            info.card != CardName::Ruins
                && Card::from_name(info.card).is_construction
                && info.workers.is_empty()
        }),
        Err(_) => false,
    }
}

/// Demolish one of your constructions: refund its cost and draw 2.
pub(crate) fn play_ruins(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    match game_input {
        GameInput::SelectPlayedCards(select) if is_ctx(&select.meta, CardName::Ruins) => {
            let selected = select.client_options.selected_cards.clone();
            validate_selection(&selected, &select.card_options, select.min_to_select, select.max_to_select)?;
            let target = selected[0].card;
            let removed = game_state
                .get_active_player_mut()?
                .remove_card_from_city(target)?;
            for card in removed {
                game_state.discard(card);
            }
            let refund = Card::from_name(target).base_cost;
            game_state.active_player_gains(&refund)?;
            game_state.active_player_draws(2)
        }
        _ => {
            let player = game_state.get_active_player()?;
            let options: Vec<PlayedCardId> = player
                .iter_played_cards()
                .filter(|info| {
                    info.card != CardName::Ruins
                        && Card::from_name(info.card).is_construction
                        && info.workers.is_empty()
                })
                .map(|info| PlayedCardId {
                    city_owner: player.id(),
                    card: info.card,
                })
                .collect();
            game_state.push_pending(GameInput::SelectPlayedCards(SelectPlayedCardsInput {
                meta: MultiStepMeta::new(game_input.input_type(), card_ctx(CardName::Ruins)),
                card_options: options,
                min_to_select: 1,
                max_to_select: 1,
                client_options: Default::default(),
            }));
            Ok(())
        }
    }
}

// === Shepherd ===

/// The shepherd's hiring fee goes to an opponent; the chapel's points bless
/// the flock.
pub(crate) fn play_shepherd(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    match game_input {
        GameInput::SelectPlayer(select) if is_ctx(&select.meta, CardName::Shepherd) => {
            let target = required_selected_player(select)?;
            let paid = match select.meta.prev_input.as_deref() {
                Some(GameInput::PlayCard(play)) => play.payment.resources,
                _ => crate::core::ResourceMap::new(),
            };
            game_state.get_player_mut(target)?.gain_resources(&paid);
            Ok(())
        }
        _ => {
            let chapel_vp = game_state
                .get_active_player()?
                .get_played_card_infos(CardName::Chapel)
                .first()
                .map_or(0, |info| info.resources.vp);
            if chapel_vp > 0 {
                game_state.active_player_gains(&resources! { vp: chapel_vp })?;
            }
            let active_id = game_state.active_player_id();
            let options = opponents_of(game_state, active_id);
            game_state.push_pending(GameInput::SelectPlayer(SelectPlayerInput {
                meta: MultiStepMeta::new(game_input.input_type(), card_ctx(CardName::Shepherd))
                    .with_prev(game_input.clone()),
                player_options: options,
                must_select_one: true,
                client_options: Default::default(),
            }));
            Ok(())
        }
    }
}

// === Storehouse ===

const STOREHOUSE_OPTIONS: [&str; 4] = ["3 TWIG", "2 RESIN", "1 PEBBLE", "2 BERRY"];

/// Stock the storehouse from the supply; a visiting worker empties it.
pub(crate) fn play_storehouse(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    match game_input {
        GameInput::SelectOptionGeneric(select) if is_ctx(&select.meta, CardName::Storehouse) => {
            let choice = required_selected_option(
                &select.options,
                select.client_options.selected_option.as_ref(),
            )?;
            let stocked = match choice.as_str() {
                "3 TWIG" => resources! { twig: 3 },
                "2 RESIN" => resources! { resin: 2 },
                "1 PEBBLE" => resources! { pebble: 1 },
                "2 BERRY" => resources! { berry: 2 },
                _ => return Err(EngineError::invalid("unknown storehouse option")),
            };
            let player = game_state.get_active_player_mut()?;
            let infos = player.get_played_card_infos_mut(CardName::Storehouse);
            let info = infos
                .first_mut()
                .ok_or_else(|| EngineError::invariant("storehouse disappeared"))?;
            info.resources.add_all(&stocked);
            Ok(())
        }
        GameInput::VisitDestinationCard(_) => {
            let visitor = game_state.active_player_id();
            let player = game_state.get_active_player_mut()?;
            let infos = player.get_played_card_infos_mut(CardName::Storehouse);
            let info = infos
                .iter_mut()
                .find(|info| info.workers.contains(&visitor))
                .ok_or_else(|| EngineError::invariant("no worker on the storehouse"))?;
            let stored = info.resources;
            info.resources = crate::core::ResourceMap::new();
            game_state.active_player_gains(&stored)
        }
        _ => {
            game_state.push_pending(GameInput::SelectOptionGeneric(SelectOptionGenericInput {
                meta: MultiStepMeta::new(game_input.input_type(), card_ctx(CardName::Storehouse)),
                prompt: "Stock the storehouse".to_string(),
                options: STOREHOUSE_OPTIONS.iter().map(|s| s.to_string()).collect(),
                client_options: Default::default(),
            }));
            Ok(())
        }
    }
}

// === Teacher ===

/// Draw 2, keep 1, hand the other to an opponent.
pub(crate) fn play_teacher(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    match game_input {
        GameInput::SelectCards(select) if is_ctx(&select.meta, CardName::Teacher) => {
            let selected = select.client_options.selected_cards.clone();
            validate_selection(&selected, &select.card_options, select.min_to_select, select.max_to_select)?;
            let kept = selected[0];
            if let Some(overflow) = game_state.get_active_player_mut()?.add_card_to_hand(kept) {
                game_state.discard(overflow);
            }
            let active_id = game_state.active_player_id();
            game_state.push_pending(GameInput::SelectPlayer(SelectPlayerInput {
                meta: MultiStepMeta::new(game_input.input_type(), card_ctx(CardName::Teacher))
                    .with_prev(game_input.clone()),
                player_options: opponents_of(game_state, active_id),
                must_select_one: true,
                client_options: Default::default(),
            }));
            Ok(())
        }
        GameInput::SelectPlayer(select) if is_ctx(&select.meta, CardName::Teacher) => {
            let target = required_selected_player(select)?;
            let (options, kept) = match select.meta.prev_input.as_deref() {
                Some(GameInput::SelectCards(prev)) => (
                    prev.card_options.clone(),
                    prev.client_options.selected_cards.clone(),
                ),
                _ => return Err(EngineError::invalid("missing card selection")),
            };
            let mut leftovers = options;
            for card in kept {
                if let Some(idx) = leftovers.iter().position(|&c| c == card) {
                    leftovers.remove(idx);
                }
            }
            for card in leftovers {
                if let Some(overflow) = game_state.get_player_mut(target)?.add_card_to_hand(card) {
                    game_state.discard(overflow);
                }
            }
            Ok(())
        }
        _ => {
            let mut revealed = Vec::new();
            for _ in 0..2 {
                if let Some(card) = game_state.draw_card_opt() {
                    revealed.push(card);
                }
            }
            if revealed.is_empty() {
                return Ok(());
            }
            game_state.push_pending(GameInput::SelectCards(SelectCardsInput {
                meta: MultiStepMeta::new(game_input.input_type(), card_ctx(CardName::Teacher)),
                card_options: revealed,
                min_to_select: 1,
                max_to_select: 1,
                client_options: Default::default(),
            }));
            Ok(())
        }
    }
}

// === Undertaker ===

/// Clear 3 cards out of the meadow, then pocket one of the replacements.
pub(crate) fn play_undertaker(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    match game_input {
        GameInput::SelectCards(select)
            if is_ctx(&select.meta, CardName::Undertaker)
                && select.meta.prev_input_type != crate::game::input::GameInputType::SelectCards =>
        {
            let selected = select.client_options.selected_cards.clone();
            validate_selection(&selected, &select.card_options, select.min_to_select, select.max_to_select)?;
            for card in &selected {
                game_state.remove_from_meadow(*card)?;
                game_state.discard(*card);
            }
            game_state.replenish_meadow()?;
            game_state.push_pending(GameInput::SelectCards(SelectCardsInput {
                meta: MultiStepMeta::new(game_input.input_type(), card_ctx(CardName::Undertaker)),
                card_options: game_state.meadow_cards(),
                min_to_select: 1,
                max_to_select: 1,
                client_options: Default::default(),
            }));
            Ok(())
        }
        GameInput::SelectCards(select) if is_ctx(&select.meta, CardName::Undertaker) => {
            let selected = select.client_options.selected_cards.clone();
            validate_selection(&selected, &select.card_options, select.min_to_select, select.max_to_select)?;
            let card = selected[0];
            game_state.remove_from_meadow(card)?;
            if let Some(overflow) = game_state.get_active_player_mut()?.add_card_to_hand(card) {
                game_state.discard(overflow);
            }
            game_state.replenish_meadow()
        }
        _ => {
            let meadow = game_state.meadow_cards();
            let to_discard = 3.min(meadow.len());
            game_state.push_pending(GameInput::SelectCards(SelectCardsInput {
                meta: MultiStepMeta::new(game_input.input_type(), card_ctx(CardName::Undertaker)),
                card_options: meadow,
                min_to_select: to_discard,
                max_to_select: to_discard,
                client_options: Default::default(),
            }));
            Ok(())
        }
    }
}

// === University (destination) ===

/// Send a city card back to school: it leaves, you keep 1 VP and a resource.
pub(crate) fn play_university(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    match game_input {
        GameInput::SelectPlayedCards(select) if is_ctx(&select.meta, CardName::University) => {
            let selected = select.client_options.selected_cards.clone();
            validate_selection(&selected, &select.card_options, select.min_to_select, select.max_to_select)?;
            let target = selected[0].card;
            let removed = game_state
                .get_active_player_mut()?
                .remove_card_from_city(target)?;
            for card in removed {
                game_state.discard(card);
            }
            game_state.active_player_gains(&resources! { vp: 1 })?;
            game_state.push_pending(GameInput::SelectResources(SelectResourcesInput {
                meta: MultiStepMeta::new(game_input.input_type(), card_ctx(CardName::University))
                    .with_prev(game_input.clone()),
                to_spend: false,
                min_resources: 1,
                max_resources: 1,
                allowed_resources: Vec::new(),
                client_options: Default::default(),
            }));
            Ok(())
        }
        GameInput::SelectResources(select) if is_ctx(&select.meta, CardName::University) => {
            let gained = validate_selected_resources(select)?;
            game_state.active_player_gains(&gained)
        }
        GameInput::VisitDestinationCard(_) => {
            let player = game_state.get_active_player()?;
            let options: Vec<PlayedCardId> = player
                .iter_played_cards()
                .filter(|info| info.card != CardName::University && info.workers.is_empty())
                .map(|info| PlayedCardId {
                    city_owner: player.id(),
                    card: info.card,
                })
                .collect();
            if options.is_empty() {
                return Err(EngineError::illegal("no card to discard from the city"));
            }
            game_state.push_pending(GameInput::SelectPlayedCards(SelectPlayedCardsInput {
                meta: MultiStepMeta::new(game_input.input_type(), card_ctx(CardName::University)),
                card_options: options,
                min_to_select: 1,
                max_to_select: 1,
                client_options: Default::default(),
            }));
            Ok(())
        }
        _ => Ok(()),
    }
}

// === Chapel (destination) ===

/// Add 1 VP to the chapel, draw 2 cards per VP on it.
pub(crate) fn play_chapel(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    if !matches!(game_input, GameInput::VisitDestinationCard(_)) {
        return Ok(());
    }
    let player = game_state.get_active_player_mut()?;
    let infos = player.get_played_card_infos_mut(CardName::Chapel);
    let info = infos
        .first_mut()
        .ok_or_else(|| EngineError::invariant("chapel disappeared"))?;
    info.resources.vp += 1;
    let num_to_draw = 2 * info.resources.vp as usize;
    game_state.active_player_draws(num_to_draw)
}

// === Cemetery (destination) ===

/// The second plot only opens once the undertaker is in the city.
pub(crate) fn can_play_cemetery(game_state: &GameState, game_input: &GameInput) -> bool {
    if !matches!(game_input, GameInput::VisitDestinationCard(_)) {
        return true;
    }
    match game_state.get_active_player() {
        Ok(player) => {
            let occupied = player
                .get_played_card_infos(CardName::Cemetery)
                .first()
                .map_or(0, |info| info.workers.len());
            occupied == 0 || player.has_card_in_city(CardName::Undertaker)
        }
        Err(_) => false,
    }
}

const CEMETERY_FROM_DECK: &str = "FROM_DECK";
const CEMETERY_FROM_DISCARD: &str = "FROM_DISCARD";

/// Exhume 4 cards from the deck or the discard pile and play one for free.
/// The worker never comes back.
pub(crate) fn play_cemetery(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    match game_input {
        GameInput::SelectOptionGeneric(select) if is_ctx(&select.meta, CardName::Cemetery) => {
            let choice = required_selected_option(
                &select.options,
                select.client_options.selected_option.as_ref(),
            )?;
            let mut revealed = Vec::new();
            if choice == CEMETERY_FROM_DECK {
                for _ in 0..4 {
                    if let Some(card) = game_state.draw_card_opt() {
                        revealed.push(card);
                    }
                }
            } else {
                for _ in 0..4 {
                    match game_state.draw_from_discard() {
                        Some(card) => revealed.push(card),
                        None => break,
                    }
                }
            }
            if revealed.is_empty() {
                return Ok(());
            }
            game_state.push_pending(GameInput::SelectCards(SelectCardsInput {
                meta: MultiStepMeta::new(game_input.input_type(), card_ctx(CardName::Cemetery)),
                card_options: revealed,
                min_to_select: 0,
                max_to_select: 1,
                client_options: Default::default(),
            }));
            Ok(())
        }
        GameInput::SelectCards(select) if is_ctx(&select.meta, CardName::Cemetery) => {
            let selected = select.client_options.selected_cards.clone();
            validate_selection(&selected, &select.card_options, select.min_to_select, select.max_to_select)?;
            let mut leftovers = select.card_options.clone();
            if let Some(&chosen) = selected.first() {
                let idx = leftovers.iter().position(|&c| c == chosen).unwrap();
                leftovers.remove(idx);
                game_state.put_card_into_play(chosen)?;
            }
            for card in leftovers {
                game_state.discard(card);
            }
            Ok(())
        }
        GameInput::VisitDestinationCard(_) => {
            game_state.push_pending(GameInput::SelectOptionGeneric(SelectOptionGenericInput {
                meta: MultiStepMeta::new(game_input.input_type(), card_ctx(CardName::Cemetery)),
                prompt: "Reveal 4 cards from".to_string(),
                options: vec![
                    CEMETERY_FROM_DECK.to_string(),
                    CEMETERY_FROM_DISCARD.to_string(),
                ],
                client_options: Default::default(),
            }));
            Ok(())
        }
        _ => Ok(()),
    }
}

// === Monastery (destination) ===

/// Room one is always open; the monk unlocks room two. Visiting also needs
/// 2 resources to give away.
pub(crate) fn can_play_monastery(game_state: &GameState, game_input: &GameInput) -> bool {
    if !matches!(game_input, GameInput::VisitDestinationCard(_)) {
        return true;
    }
    match game_state.get_active_player() {
        Ok(player) => {
            let occupied = player
                .get_played_card_infos(CardName::Monastery)
                .first()
                .map_or(0, |info| info.workers.len());
            (occupied == 0 || player.has_card_in_city(CardName::Monk))
                && player.resources().total_materials() >= 2
        }
        Err(_) => false,
    }
}

/// Give 2 resources to an opponent for 4 VP. The worker stays to serve.
pub(crate) fn play_monastery(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    match game_input {
        GameInput::SelectResources(select) if is_ctx(&select.meta, CardName::Monastery) => {
            let chosen = validate_selected_resources(select)?;
            game_state.get_active_player_mut()?.spend_resources(&chosen)?;
            let active_id = game_state.active_player_id();
            game_state.push_pending(GameInput::SelectPlayer(SelectPlayerInput {
                meta: MultiStepMeta::new(game_input.input_type(), card_ctx(CardName::Monastery))
                    .with_prev(game_input.clone()),
                player_options: opponents_of(game_state, active_id),
                must_select_one: true,
                client_options: Default::default(),
            }));
            Ok(())
        }
        GameInput::SelectPlayer(select) if is_ctx(&select.meta, CardName::Monastery) => {
            let target = required_selected_player(select)?;
            let given = match select.meta.prev_input.as_deref() {
                Some(GameInput::SelectResources(prev)) => prev.client_options.resources,
                _ => return Err(EngineError::invalid("missing resource selection")),
            };
            game_state.get_player_mut(target)?.gain_resources(&given);
            game_state.active_player_gains(&resources! { vp: 4 })
        }
        GameInput::VisitDestinationCard(_) => {
            game_state.push_pending(GameInput::SelectResources(SelectResourcesInput {
                meta: MultiStepMeta::new(game_input.input_type(), card_ctx(CardName::Monastery)),
                to_spend: true,
                min_resources: 2,
                max_resources: 2,
                allowed_resources: Vec::new(),
                client_options: Default::default(),
            }));
            Ok(())
        }
        _ => Ok(()),
    }
}

// === Lookout (destination) ===

/// Copy any basic or forest location, ignoring occupancy.
pub(crate) fn play_lookout(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    match game_input {
        GameInput::SelectLocation(select) if is_ctx(&select.meta, CardName::Lookout) => {
            let location = required_selected_location(select)?;
            let candidate = GameInput::PlaceWorker(crate::game::input::PlaceWorkerInput {
                location,
                client_options: Default::default(),
            });
            Location::from_name(location).activate(game_state, &candidate)
        }
        GameInput::VisitDestinationCard(_) => {
            let options: Vec<_> = game_state
                .locations_in_play()
                .into_iter()
                .filter(|location| {
                    matches!(
                        Location::from_name(*location).location_type,
                        LocationType::Basic | LocationType::Forest
                    )
                })
                .collect();
            game_state.push_pending(GameInput::SelectLocation(SelectLocationInput {
                meta: MultiStepMeta::new(game_input.input_type(), card_ctx(CardName::Lookout)),
                location_options: options,
                client_options: Default::default(),
            }));
            Ok(())
        }
        _ => Ok(()),
    }
}

// === Queen (destination) ===

/// Host a card worth up to 3 for free.
pub(crate) fn play_queen(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    match game_input {
        GameInput::SelectCards(select) if is_ctx(&select.meta, CardName::Queen) => {
            let selected = select.client_options.selected_cards.clone();
            validate_selection(&selected, &select.card_options, select.min_to_select, select.max_to_select)?;
            if let Some(&chosen) = selected.first() {
                if Card::from_name(chosen).base_vp > 3 {
                    return Err(EngineError::invalid(
                        "the queen only hosts cards worth up to 3",
                    ));
                }
                let in_hand = game_state
                    .get_active_player()?
                    .cards_in_hand()
                    .contains(&chosen);
                if in_hand {
                    game_state.get_active_player_mut()?.remove_card_from_hand(chosen)?;
                } else {
                    game_state.remove_from_meadow(chosen)?;
                    game_state.replenish_meadow()?;
                }
                game_state.put_card_into_play(chosen)?;
            }
            Ok(())
        }
        GameInput::VisitDestinationCard(_) => {
            let player = game_state.get_active_player()?;
            let mut options: Vec<CardName> = Vec::new();
            for card in player.cards_in_hand().iter().chain(game_state.meadow_cards.iter()) {
                if Card::from_name(*card).base_vp <= 3
                    && player.can_add_to_city(*card)
                    && !options.contains(card)
                {
                    options.push(*card);
                }
            }
            game_state.push_pending(GameInput::SelectCards(SelectCardsInput {
                meta: MultiStepMeta::new(game_input.input_type(), card_ctx(CardName::Queen)),
                card_options: options,
                min_to_select: 0,
                max_to_select: 1,
                client_options: Default::default(),
            }));
            Ok(())
        }
        _ => Ok(()),
    }
}

// === Inn (open destination) ===

/// Buy a meadow card at 3 off.
pub(crate) fn play_inn(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    match game_input {
        GameInput::SelectCards(select) if is_ctx(&select.meta, CardName::Inn) => {
            let selected = select.client_options.selected_cards.clone();
            validate_selection(&selected, &select.card_options, select.min_to_select, select.max_to_select)?;
            if let Some(&chosen) = selected.first() {
                game_state.push_pending(GameInput::SelectPaymentForCard(
                    SelectPaymentForCardInput {
                        meta: MultiStepMeta::new(game_input.input_type(), card_ctx(CardName::Inn))
                            .with_prev(game_input.clone()),
                        card: chosen,
                        from_meadow: true,
                        wild_discount: 3,
                        client_options: Default::default(),
                    },
                ));
            }
            Ok(())
        }
        GameInput::SelectPaymentForCard(select) if is_ctx(&select.meta, CardName::Inn) => {
            resolve_discounted_purchase(game_state, select)
        }
        GameInput::VisitDestinationCard(_) => {
            game_state.push_pending(GameInput::SelectCards(SelectCardsInput {
                meta: MultiStepMeta::new(game_input.input_type(), card_ctx(CardName::Inn)),
                card_options: game_state.meadow_cards(),
                min_to_select: 0,
                max_to_select: 1,
                client_options: Default::default(),
            }));
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Shared terminal stage for "play this card at a wild discount" chains
/// (the inn, one forest clearing).
pub(crate) fn resolve_discounted_purchase(
    game_state: &mut GameState,
    select: &SelectPaymentForCardInput,
) -> Result<()> {
    let card = Card::from_name(select.card);
    let payment = select.client_options.payment;
    let player = game_state.get_active_player()?;
    let covered = player.is_paid_resources_valid(
        &payment,
        &card.base_cost,
        PaymentDiscount::Wild(select.wild_discount),
        true,
    )?;
    if !covered {
        return Err(EngineError::illegal("payment does not cover the card's cost"));
    }
    game_state.get_active_player_mut()?.spend_resources(&payment)?;
    if select.from_meadow {
        game_state.remove_from_meadow(select.card)?;
        game_state.replenish_meadow()?;
    } else {
        game_state
            .get_active_player_mut()?
            .remove_card_from_hand(select.card)?;
    }
    game_state.put_card_into_play(select.card)
}

// === Post Office (open destination) ===

pub(crate) fn can_play_post_office(game_state: &GameState, game_input: &GameInput) -> bool {
    if !matches!(game_input, GameInput::VisitDestinationCard(_)) {
        return true;
    }
    match game_state.get_active_player() {
        Ok(player) => player.num_cards_in_hand() >= 2,
        Err(_) => false,
    }
}

/// Mail 2 cards to an opponent, then purge and restock your hand.
pub(crate) fn play_post_office(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    match game_input {
        GameInput::SelectPlayer(select) if is_ctx(&select.meta, CardName::PostOffice) => {
            required_selected_player(select)?;
            let hand = game_state.get_active_player()?.cards_in_hand().to_vec();
            game_state.push_pending(GameInput::SelectCards(SelectCardsInput {
                meta: MultiStepMeta::new(game_input.input_type(), card_ctx(CardName::PostOffice))
                    .with_prev(game_input.clone()),
                card_options: hand,
                min_to_select: 2,
                max_to_select: 2,
                client_options: Default::default(),
            }));
            Ok(())
        }
        GameInput::SelectCards(select) if is_ctx(&select.meta, CardName::PostOffice) => {
            let selected = select.client_options.selected_cards.clone();
            validate_selection(&selected, &select.card_options, select.min_to_select, select.max_to_select)?;
            let target = match select.meta.prev_input.as_deref() {
                Some(GameInput::SelectPlayer(prev)) => prev
                    .client_options
                    .selected_player
                    .ok_or_else(|| EngineError::invalid("missing player selection"))?,
                _ => return Err(EngineError::invalid("missing player selection")),
            };
            for card in &selected {
                game_state.get_active_player_mut()?.remove_card_from_hand(*card)?;
                if let Some(overflow) = game_state.get_player_mut(target)?.add_card_to_hand(*card) {
                    game_state.discard(overflow);
                }
            }
            let hand_size = game_state.get_active_player()?.num_cards_in_hand();
            game_state.push_pending(GameInput::DiscardCards(DiscardCardsInput {
                meta: MultiStepMeta::new(game_input.input_type(), card_ctx(CardName::PostOffice)),
                min_cards: 0,
                max_cards: hand_size,
                client_options: Default::default(),
            }));
            Ok(())
        }
        GameInput::DiscardCards(discard) if is_ctx(&discard.meta, CardName::PostOffice) => {
            let cards = discard.client_options.cards_to_discard.clone();
            if cards.len() > discard.max_cards {
                return Err(EngineError::invalid("too many cards to discard"));
            }
            for card in &cards {
                game_state.get_active_player_mut()?.remove_card_from_hand(*card)?;
                game_state.discard(*card);
            }
            let hand_size = game_state.get_active_player()?.num_cards_in_hand();
            let refill = crate::game::player::MAX_HAND_SIZE.saturating_sub(hand_size);
            game_state.active_player_draws(refill)
        }
        GameInput::VisitDestinationCard(_) => {
            let active_id = game_state.active_player_id();
            game_state.push_pending(GameInput::SelectPlayer(SelectPlayerInput {
                meta: MultiStepMeta::new(game_input.input_type(), card_ctx(CardName::PostOffice)),
                player_options: opponents_of(game_state, active_id),
                must_select_one: true,
                client_options: Default::default(),
            }));
            Ok(())
        }
        _ => Ok(()),
    }
}

// === Clock Tower ===

/// Spend a point from the tower to re-fire one occupied location before the
/// season recall.
pub(crate) fn play_clock_tower(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    let select = match game_input {
        GameInput::SelectWorkerPlacement(select) if is_ctx(&select.meta, CardName::ClockTower) => {
            select
        }
        _ => return Ok(()),
    };
    let placement = match selected_worker_placement(select)? {
        Some(placement) => placement,
        None => return Ok(()),
    };
    let location = match placement {
        WorkerPlacement::Location { location } => location,
        _ => return Err(EngineError::invalid("the clock tower only re-fires locations")),
    };

    let player = game_state.get_active_player_mut()?;
    let infos = player.get_played_card_infos_mut(CardName::ClockTower);
    let info = infos
        .first_mut()
        .ok_or_else(|| EngineError::invariant("clock tower disappeared"))?;
    if info.resources.vp == 0 {
        return Err(EngineError::illegal("no points left on the clock tower"));
    }
    info.resources.vp -= 1;

    let candidate = GameInput::PlaceWorker(crate::game::input::PlaceWorkerInput {
        location,
        client_options: Default::default(),
    });
    Location::from_name(location).activate(game_state, &candidate)
}

// === Courthouse ===

/// Collect a building-material bonus for the construction just played.
pub(crate) fn play_courthouse(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    match game_input {
        GameInput::SelectResources(select) if is_ctx(&select.meta, CardName::Courthouse) => {
            let chosen = validate_selected_resources(select)?;
            game_state.active_player_gains(&chosen)
        }
        _ => Ok(()),
    }
}

// === Scoring slots ===

pub(crate) fn points_architect(game_state: &GameState, player_id: PlayerId) -> i32 {
    match game_state.get_player(player_id) {
        Ok(player) => {
            let spendable = player.resources().pebble + player.resources().resin;
            spendable.min(6) as i32
        }
        Err(_) => 0,
    }
}

fn count_city_copies(
    game_state: &GameState,
    player_id: PlayerId,
    predicate: impl Fn(&Card) -> bool,
) -> i32 {
    match game_state.get_player(player_id) {
        Ok(player) => player
            .iter_played_cards()
            .filter(|info| predicate(Card::from_name(info.card)))
            .count() as i32,
        Err(_) => 0,
    }
}

/// 1 per common construction.
pub(crate) fn points_castle(game_state: &GameState, player_id: PlayerId) -> i32 {
    count_city_copies(game_state, player_id, |card| {
        card.is_construction && !card.is_unique
    })
}

/// 1 per unique construction.
pub(crate) fn points_palace(game_state: &GameState, player_id: PlayerId) -> i32 {
    count_city_copies(game_state, player_id, |card| {
        card.is_construction && card.is_unique
    })
}

/// 1 per unique critter.
pub(crate) fn points_theatre(game_state: &GameState, player_id: PlayerId) -> i32 {
    count_city_copies(game_state, player_id, |card| {
        card.is_critter() && card.is_unique
    })
}

/// 1 per common critter.
pub(crate) fn points_school(game_state: &GameState, player_id: PlayerId) -> i32 {
    count_city_copies(game_state, player_id, |card| {
        card.is_critter() && !card.is_unique
    })
}

/// 1 per prosperity card.
pub(crate) fn points_evertree(game_state: &GameState, player_id: PlayerId) -> i32 {
    count_city_copies(game_state, player_id, |card| {
        card.card_type == CardType::Prosperity
    })
}

/// 1 per claimed basic event, 2 per special.
pub(crate) fn points_king(game_state: &GameState, player_id: PlayerId) -> i32 {
    match game_state.get_player(player_id) {
        Ok(player) => player
            .claimed_events()
            .keys()
            .map(|event| match Event::from_name(*event).event_type {
                crate::events::EventType::Basic => 1,
                crate::events::EventType::Special => 2,
            })
            .sum(),
        Err(_) => 0,
    }
}

/// 3 per husband/wife pair.
pub(crate) fn points_wife(game_state: &GameState, player_id: PlayerId) -> i32 {
    match game_state.get_player(player_id) {
        Ok(player) => 3 * player.num_husband_wife_pairs() as i32,
        Err(_) => 0,
    }
}
