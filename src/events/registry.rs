//! The event catalog and per-game event map.

use im::OrdMap;
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use super::event::{Event, EventName, EventType};
use crate::cards::{Card, CardName, CardType};
use crate::core::{EngineError, GameRng, PlayerId, ResourceType, Result};
use crate::game::input::{
    EffectContext, GameInput, MultiStepMeta, PlayedCardId, SelectCardsInput,
    SelectPlayedCardsInput, SelectPlayerInput, SelectResourcesInput, SelectWorkerPlacementInput,
};
use crate::game::play_helpers::{
    opponents_of, selected_worker_placement, validate_selected_resources,
};
use crate::game::state::validate_selection;
use crate::game::GameState;
use crate::resources;

fn event_ctx(event: EventName) -> EffectContext {
    EffectContext::Event(event)
}

fn is_ctx(meta: &MultiStepMeta, event: EventName) -> bool {
    meta.context == EffectContext::Event(event)
}

fn stored_info(game_state: &GameState, player_id: PlayerId, event: EventName) -> (u32, usize) {
    match game_state.get_player(player_id) {
        Ok(player) => match player.claimed_events().get(&event) {
            Some(info) => (info.stored_resources.total(), info.stored_cards.len()),
            None => (0, 0),
        },
        Err(_) => (0, 0),
    }
}

// === Basic events ===

fn check_card_type_count(
    game_state: &GameState,
    card_type: CardType,
    needed: usize,
) -> Option<String> {
    match game_state.get_active_player() {
        Ok(player) => {
            if player.get_num_card_type(card_type) < needed {
                Some(format!(
                    "need at least {} {} cards to claim event",
                    needed, card_type
                ))
            } else {
                None
            }
        }
        Err(err) => Some(err.to_string()),
    }
}

fn check_four_production(game_state: &GameState, _: &GameInput) -> Option<String> {
    check_card_type_count(game_state, CardType::Production, 4)
}
fn check_three_destination(game_state: &GameState, _: &GameInput) -> Option<String> {
    check_card_type_count(game_state, CardType::Destination, 3)
}
fn check_three_governance(game_state: &GameState, _: &GameInput) -> Option<String> {
    check_card_type_count(game_state, CardType::Governance, 3)
}
fn check_three_traveler(game_state: &GameState, _: &GameInput) -> Option<String> {
    check_card_type_count(game_state, CardType::Traveler, 3)
}

// === Graduation of Scholars ===

/// Tuck up to 3 critters from hand beneath the event, 2 VP each.
fn play_graduation(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    let event = EventName::SpecialGraduationOfScholars;
    match game_input {
        GameInput::SelectCards(select) if is_ctx(&select.meta, event) => {
            let selected = select.client_options.selected_cards.clone();
            validate_selection(&selected, &select.card_options, select.min_to_select, select.max_to_select)?;
            for card in &selected {
                if !Card::from_name(*card).is_critter() {
                    return Err(EngineError::invalid(
                        "only critters go beneath this event",
                    ));
                }
            }
            let player = game_state.get_active_player_mut()?;
            for card in &selected {
                player.remove_card_from_hand(*card)?;
            }
            player
                .claimed_event_info_mut(event)?
                .stored_cards
                .extend(selected);
            Ok(())
        }
        _ => {
            let critters: Vec<CardName> = game_state
                .get_active_player()?
                .cards_in_hand()
                .iter()
                .copied()
                .filter(|card| Card::from_name(*card).is_critter())
                .collect();
            game_state.push_pending(GameInput::SelectCards(SelectCardsInput {
                meta: MultiStepMeta::new(game_input.input_type(), event_ctx(event)),
                card_options: critters,
                min_to_select: 0,
                max_to_select: 3,
                client_options: Default::default(),
            }));
            Ok(())
        }
    }
}

fn points_graduation(game_state: &GameState, player_id: PlayerId) -> i32 {
    let (_, cards) = stored_info(game_state, player_id, EventName::SpecialGraduationOfScholars);
    2 * cards as i32
}

// === A Brilliant Marketing Plan ===

/// Donate up to 3 resources across opponents; each donated resource banks
/// 2 VP on the event. Loops player-then-amount until the budget runs out or
/// the donor stops.
fn play_marketing_plan(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    let event = EventName::SpecialABrilliantMarketingPlan;
    match game_input {
        GameInput::SelectPlayer(select) if is_ctx(&select.meta, event) => {
            let selected = match select.client_options.selected_player {
                // Declining ends the donation round.
                None => return Ok(()),
                Some(selected) => selected,
            };
            if !select.player_options.contains(&selected) {
                return Err(EngineError::invalid(format!(
                    "{} is not one of the offered players",
                    selected
                )));
            }
            let remaining = match select.meta.prev_input.as_deref() {
                Some(GameInput::SelectResources(prev)) => {
                    prev.max_resources - prev.client_options.resources.total()
                }
                _ => 3,
            };
            game_state.push_pending(GameInput::SelectResources(SelectResourcesInput {
                meta: MultiStepMeta::new(game_input.input_type(), event_ctx(event))
                    .with_prev(game_input.clone()),
                to_spend: true,
                min_resources: 0,
                max_resources: remaining,
                allowed_resources: Vec::new(),
                client_options: Default::default(),
            }));
            Ok(())
        }
        GameInput::SelectResources(select) if is_ctx(&select.meta, event) => {
            let donated = validate_selected_resources(select)?;
            let target = match select.meta.prev_input.as_deref() {
                Some(GameInput::SelectPlayer(prev)) => prev
                    .client_options
                    .selected_player
                    .ok_or_else(|| EngineError::invalid("selected player cannot be empty"))?,
                _ => return Err(EngineError::invalid("missing player selection")),
            };
            let amount = donated.total_materials();
            game_state.get_active_player_mut()?.spend_resources(&donated)?;
            game_state.get_player_mut(target)?.gain_resources(&donated);
            game_state
                .get_active_player_mut()?
                .claimed_event_info_mut(event)?
                .stored_resources
                .add(ResourceType::Vp, 2 * amount);

            let remaining = select.max_resources - amount;
            if remaining > 0 {
                let active_id = game_state.active_player_id();
                game_state.push_pending(GameInput::SelectPlayer(SelectPlayerInput {
                    meta: MultiStepMeta::new(game_input.input_type(), event_ctx(event))
                        .with_prev(game_input.clone()),
                    player_options: opponents_of(game_state, active_id),
                    must_select_one: false,
                    client_options: Default::default(),
                }));
            }
            Ok(())
        }
        _ => {
            let active_id = game_state.active_player_id();
            game_state.push_pending(GameInput::SelectPlayer(SelectPlayerInput {
                meta: MultiStepMeta::new(game_input.input_type(), event_ctx(event)),
                player_options: opponents_of(game_state, active_id),
                must_select_one: false,
                client_options: Default::default(),
            }));
            Ok(())
        }
    }
}

fn points_marketing_plan(game_state: &GameState, player_id: PlayerId) -> i32 {
    match game_state.get_player(player_id) {
        Ok(player) => player
            .claimed_events()
            .get(&EventName::SpecialABrilliantMarketingPlan)
            .map_or(0, |info| info.stored_resources.vp as i32),
        Err(_) => 0,
    }
}

// === Performer in Residence / An Evening of Fireworks / Under New Management ===

fn play_store_resources(
    game_state: &mut GameState,
    game_input: &GameInput,
    event: EventName,
    allowed: Vec<ResourceType>,
) -> Result<()> {
    match game_input {
        GameInput::SelectResources(select) if is_ctx(&select.meta, event) => {
            let chosen = validate_selected_resources(select)?;
            game_state.get_active_player_mut()?.spend_resources(&chosen)?;
            game_state
                .get_active_player_mut()?
                .claimed_event_info_mut(event)?
                .stored_resources
                .add_all(&chosen);
            Ok(())
        }
        _ => {
            game_state.push_pending(GameInput::SelectResources(SelectResourcesInput {
                meta: MultiStepMeta::new(game_input.input_type(), event_ctx(event)),
                to_spend: true,
                min_resources: 0,
                max_resources: 3,
                allowed_resources: allowed,
                client_options: Default::default(),
            }));
            Ok(())
        }
    }
}

/// Place up to 3 berries here, 2 VP each.
fn play_performer(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    play_store_resources(
        game_state,
        game_input,
        EventName::SpecialPerformerInResidence,
        vec![ResourceType::Berry],
    )
}

fn points_performer(game_state: &GameState, player_id: PlayerId) -> i32 {
    let (resources, _) = stored_info(game_state, player_id, EventName::SpecialPerformerInResidence);
    2 * resources as i32
}

/// Place up to 3 twigs here, 2 VP each.
fn play_fireworks(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    play_store_resources(
        game_state,
        game_input,
        EventName::SpecialAnEveningOfFireworks,
        vec![ResourceType::Twig],
    )
}

fn points_fireworks(game_state: &GameState, player_id: PlayerId) -> i32 {
    let (resources, _) = stored_info(game_state, player_id, EventName::SpecialAnEveningOfFireworks);
    2 * resources as i32
}

/// Place up to 3 of anything; twigs and berries bank 1 VP, resin and
/// pebbles 2.
fn play_under_new_management(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    play_store_resources(
        game_state,
        game_input,
        EventName::SpecialUnderNewManagement,
        Vec::new(),
    )
}

fn points_under_new_management(game_state: &GameState, player_id: PlayerId) -> i32 {
    match game_state.get_player(player_id) {
        Ok(player) => player
            .claimed_events()
            .get(&EventName::SpecialUnderNewManagement)
            .map_or(0, |info| {
                let stored = &info.stored_resources;
                (stored.twig + stored.berry + 2 * (stored.resin + stored.pebble)) as i32
            }),
        Err(_) => 0,
    }
}

// === Capture of the Acorn Thieves ===

/// Jail up to 2 of your city's critters beneath the event, 3 VP each.
fn play_acorn_thieves(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    let event = EventName::SpecialCaptureOfTheAcornThieves;
    match game_input {
        GameInput::SelectPlayedCards(select) if is_ctx(&select.meta, event) => {
            let selected = select.client_options.selected_cards.clone();
            validate_selection(&selected, &select.card_options, select.min_to_select, select.max_to_select)?;
            for picked in &selected {
                if !Card::from_name(picked.card).is_critter() {
                    return Err(EngineError::invalid(
                        "only critters go beneath this event",
                    ));
                }
            }
            for picked in &selected {
                let removed = game_state
                    .get_active_player_mut()?
                    .remove_card_from_city(picked.card)?;
                // The critter itself is stored; anything paired under it is
                // discarded.
                for card in removed {
                    if card == picked.card {
                        game_state
                            .get_active_player_mut()?
                            .claimed_event_info_mut(event)?
                            .stored_cards
                            .push(card);
                    } else {
                        game_state.discard(card);
                    }
                }
            }
            Ok(())
        }
        _ => {
            let player = game_state.get_active_player()?;
            let options: Vec<PlayedCardId> = player
                .iter_played_cards()
                .filter(|info| {
                    Card::from_name(info.card).is_critter() && info.workers.is_empty()
                })
                .map(|info| PlayedCardId {
                    city_owner: player.id(),
                    card: info.card,
                })
                .collect();
            game_state.push_pending(GameInput::SelectPlayedCards(SelectPlayedCardsInput {
                meta: MultiStepMeta::new(game_input.input_type(), event_ctx(event)),
                card_options: options,
                min_to_select: 0,
                max_to_select: 2,
                client_options: Default::default(),
            }));
            Ok(())
        }
    }
}

fn points_acorn_thieves(game_state: &GameState, player_id: PlayerId) -> i32 {
    let (_, cards) = stored_info(game_state, player_id, EventName::SpecialCaptureOfTheAcornThieves);
    3 * cards as i32
}

// === Ministering to Miscreants ===

fn points_ministering(game_state: &GameState, player_id: PlayerId) -> i32 {
    match game_state.get_player(player_id) {
        Ok(player) => {
            let prisoners = player
                .get_played_card_infos(CardName::Dungeon)
                .first()
                .map_or(0, |info| info.paired_cards.len());
            3 * prisoners as i32
        }
        Err(_) => 0,
    }
}

// === Croak Wart Cure ===

fn check_croak_wart_cure(game_state: &GameState, game_input: &GameInput) -> Option<String> {
    if !matches!(game_input, GameInput::ClaimEvent(_)) {
        return None;
    }
    match game_state.get_active_player() {
        Ok(player) => {
            if player.num_resources_by_type(ResourceType::Berry) < 2 {
                Some("need at least 2 BERRY to claim event".to_string())
            } else {
                None
            }
        }
        Err(err) => Some(err.to_string()),
    }
}

/// Pay 2 berries and discard up to 2 cards from your city.
fn play_croak_wart_cure(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    let event = EventName::SpecialCroakWartCure;
    match game_input {
        GameInput::SelectPlayedCards(select) if is_ctx(&select.meta, event) => {
            let selected = select.client_options.selected_cards.clone();
            validate_selection(&selected, &select.card_options, select.min_to_select, select.max_to_select)?;
            for picked in &selected {
                let removed = game_state
                    .get_active_player_mut()?
                    .remove_card_from_city(picked.card)?;
                for card in removed {
                    game_state.discard(card);
                }
            }
            Ok(())
        }
        _ => {
            game_state
                .get_active_player_mut()?
                .spend_resources(&resources! { berry: 2 })?;
            let player = game_state.get_active_player()?;
            let options: Vec<PlayedCardId> = player
                .iter_played_cards()
                .filter(|info| info.workers.is_empty())
                .map(|info| PlayedCardId {
                    city_owner: player.id(),
                    card: info.card,
                })
                .collect();
            game_state.push_pending(GameInput::SelectPlayedCards(SelectPlayedCardsInput {
                meta: MultiStepMeta::new(game_input.input_type(), event_ctx(event)),
                card_options: options,
                min_to_select: 0,
                max_to_select: 2,
                client_options: Default::default(),
            }));
            Ok(())
        }
    }
}

// === A Wee Run City ===

/// Bring one deployed worker home immediately.
fn play_wee_run_city(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    let event = EventName::SpecialAWeeRunCity;
    match game_input {
        GameInput::SelectWorkerPlacement(select) if is_ctx(&select.meta, event) => {
            let placement = selected_worker_placement(select)?
                .ok_or_else(|| EngineError::invalid("must select a worker"))?;
            let player_id = game_state.active_player_id();
            game_state.recall_one_worker(player_id, &placement)
        }
        _ => {
            let options = game_state.get_active_player()?.recallable_workers();
            if options.is_empty() {
                return Ok(());
            }
            game_state.push_pending(GameInput::SelectWorkerPlacement(
                SelectWorkerPlacementInput {
                    meta: MultiStepMeta::new(game_input.input_type(), event_ctx(event)),
                    options,
                    must_select_one: true,
                    client_options: Default::default(),
                },
            ));
            Ok(())
        }
    }
}

// === Tax Relief ===

/// Everything green fires again.
fn play_tax_relief(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    game_state.activate_production_for_active(game_input)
}

// === Ancient Scrolls Discovered ===

/// Reveal 5 cards; keep any in hand, tuck the rest for 1 VP each.
fn play_ancient_scrolls(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    let event = EventName::SpecialAncientScrollsDiscovered;
    match game_input {
        GameInput::SelectCards(select) if is_ctx(&select.meta, event) => {
            let selected = select.client_options.selected_cards.clone();
            validate_selection(&selected, &select.card_options, select.min_to_select, select.max_to_select)?;
            let mut leftovers = select.card_options.clone();
            for card in &selected {
                if let Some(idx) = leftovers.iter().position(|c| c == card) {
                    leftovers.remove(idx);
                }
                if let Some(overflow) = game_state.get_active_player_mut()?.add_card_to_hand(*card) {
                    game_state.discard(overflow);
                }
            }
            game_state
                .get_active_player_mut()?
                .claimed_event_info_mut(event)?
                .stored_cards
                .extend(leftovers);
            Ok(())
        }
        _ => {
            let mut revealed = Vec::new();
            for _ in 0..5 {
                if let Some(card) = game_state.draw_card_opt() {
                    revealed.push(card);
                }
            }
            if revealed.is_empty() {
                return Ok(());
            }
            let num_revealed = revealed.len();
            game_state.push_pending(GameInput::SelectCards(SelectCardsInput {
                meta: MultiStepMeta::new(game_input.input_type(), event_ctx(event)),
                card_options: revealed,
                min_to_select: 0,
                max_to_select: num_revealed,
                client_options: Default::default(),
            }));
            Ok(())
        }
    }
}

fn points_ancient_scrolls(game_state: &GameState, player_id: PlayerId) -> i32 {
    let (_, cards) = stored_info(
        game_state,
        player_id,
        EventName::SpecialAncientScrollsDiscovered,
    );
    cards as i32
}

// === Flying Doctor Service ===

fn points_flying_doctor(game_state: &GameState, _player_id: PlayerId) -> i32 {
    let pairs: usize = game_state
        .players()
        .iter()
        .map(|player| player.num_husband_wife_pairs())
        .sum();
    3 * pairs as i32
}

// === Path of the Pilgrims / Remembering the Fallen ===

fn workers_on_card(game_state: &GameState, player_id: PlayerId, card: CardName) -> usize {
    match game_state.get_player(player_id) {
        Ok(player) => player
            .get_played_card_infos(card)
            .first()
            .map_or(0, |info| info.workers.len()),
        Err(_) => 0,
    }
}

fn points_path_of_pilgrims(game_state: &GameState, player_id: PlayerId) -> i32 {
    3 * workers_on_card(game_state, player_id, CardName::Monastery) as i32
}

fn points_remembering_fallen(game_state: &GameState, player_id: PlayerId) -> i32 {
    3 * workers_on_card(game_state, player_id, CardName::Cemetery) as i32
}

// === Pristine Chapel Ceiling ===

/// Draw a card and gain a resource of choice per VP on your chapel.
fn play_pristine_chapel(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    let event = EventName::SpecialPristineChapelCeiling;
    match game_input {
        GameInput::SelectResources(select) if is_ctx(&select.meta, event) => {
            let gained = validate_selected_resources(select)?;
            game_state.active_player_gains(&gained)
        }
        _ => {
            let chapel_vp = game_state
                .get_active_player()?
                .get_played_card_infos(CardName::Chapel)
                .first()
                .map_or(0, |info| info.resources.vp);
            game_state.active_player_draws(chapel_vp as usize)?;
            if chapel_vp > 0 {
                game_state.push_pending(GameInput::SelectResources(SelectResourcesInput {
                    meta: MultiStepMeta::new(game_input.input_type(), event_ctx(event)),
                    to_spend: false,
                    min_resources: 0,
                    max_resources: chapel_vp,
                    allowed_resources: Vec::new(),
                    client_options: Default::default(),
                }));
            }
            Ok(())
        }
    }
}

fn points_pristine_chapel(game_state: &GameState, player_id: PlayerId) -> i32 {
    match game_state.get_player(player_id) {
        Ok(player) => {
            let chapel_vp = player
                .get_played_card_infos(CardName::Chapel)
                .first()
                .map_or(0, |info| info.resources.vp);
            2 * chapel_vp as i32
        }
        Err(_) => 0,
    }
}

// === The Everdell Games ===

fn check_evergrove_games(game_state: &GameState, _: &GameInput) -> Option<String> {
    let player = match game_state.get_active_player() {
        Ok(player) => player,
        Err(err) => return Some(err.to_string()),
    };
    for card_type in CardType::ALL {
        if player.get_num_card_type(card_type) < 2 {
            return Some(format!(
                "need at least 2 {} cards to claim event, got {}",
                card_type,
                player.get_num_card_type(card_type)
            ));
        }
    }
    None
}

// === Catalog ===

fn make(name: EventName, event_type: EventType, base_vp: i32) -> Event {
    Event {
        name,
        event_type,
        base_vp,
        required_cards: &[],
        can_play_check_inner: None,
        play_inner: None,
        points_inner: None,
    }
}

static EVENT_REGISTRY: Lazy<FxHashMap<EventName, Event>> = Lazy::new(|| {
    let mut registry = FxHashMap::default();
    let mut add = |event: Event| {
        let existing = registry.insert(event.name, event);
        assert!(existing.is_none(), "event registered twice");
    };

    add({
        let mut e = make(EventName::BasicFourProduction, EventType::Basic, 3);
        e.can_play_check_inner = Some(check_four_production);
        e
    });
    add({
        let mut e = make(EventName::BasicThreeDestination, EventType::Basic, 3);
        e.can_play_check_inner = Some(check_three_destination);
        e
    });
    add({
        let mut e = make(EventName::BasicThreeGovernance, EventType::Basic, 3);
        e.can_play_check_inner = Some(check_three_governance);
        e
    });
    add({
        let mut e = make(EventName::BasicThreeTraveler, EventType::Basic, 3);
        e.can_play_check_inner = Some(check_three_traveler);
        e
    });

    add({
        let mut e = make(EventName::SpecialGraduationOfScholars, EventType::Special, 0);
        e.required_cards = &[CardName::Teacher, CardName::University];
        e.play_inner = Some(play_graduation);
        e.points_inner = Some(points_graduation);
        e
    });
    add({
        let mut e = make(EventName::SpecialABrilliantMarketingPlan, EventType::Special, 0);
        e.required_cards = &[CardName::Shopkeeper, CardName::PostOffice];
        e.play_inner = Some(play_marketing_plan);
        e.points_inner = Some(points_marketing_plan);
        e
    });
    add({
        let mut e = make(EventName::SpecialPerformerInResidence, EventType::Special, 0);
        e.required_cards = &[CardName::Inn, CardName::Bard];
        e.play_inner = Some(play_performer);
        e.points_inner = Some(points_performer);
        e
    });
    add({
        let mut e = make(EventName::SpecialCaptureOfTheAcornThieves, EventType::Special, 0);
        e.required_cards = &[CardName::Courthouse, CardName::Ranger];
        e.play_inner = Some(play_acorn_thieves);
        e.points_inner = Some(points_acorn_thieves);
        e
    });
    add({
        let mut e = make(EventName::SpecialMinisteringToMiscreants, EventType::Special, 0);
        e.required_cards = &[CardName::Monk, CardName::Dungeon];
        e.points_inner = Some(points_ministering);
        e
    });
    add({
        let mut e = make(EventName::SpecialCroakWartCure, EventType::Special, 6);
        e.required_cards = &[CardName::Undertaker, CardName::BargeToad];
        e.can_play_check_inner = Some(check_croak_wart_cure);
        e.play_inner = Some(play_croak_wart_cure);
        e
    });
    add({
        let mut e = make(EventName::SpecialAnEveningOfFireworks, EventType::Special, 0);
        e.required_cards = &[CardName::Lookout, CardName::MinerMole];
        e.play_inner = Some(play_fireworks);
        e.points_inner = Some(points_fireworks);
        e
    });
    add({
        let mut e = make(EventName::SpecialAWeeRunCity, EventType::Special, 4);
        e.required_cards = &[CardName::ChipSweep, CardName::ClockTower];
        e.play_inner = Some(play_wee_run_city);
        e
    });
    add({
        let mut e = make(EventName::SpecialTaxRelief, EventType::Special, 3);
        e.required_cards = &[CardName::Judge, CardName::Queen];
        e.play_inner = Some(play_tax_relief);
        e
    });
    add({
        let mut e = make(EventName::SpecialUnderNewManagement, EventType::Special, 0);
        e.required_cards = &[CardName::Peddler, CardName::GeneralStore];
        e.play_inner = Some(play_under_new_management);
        e.points_inner = Some(points_under_new_management);
        e
    });
    add({
        let mut e = make(EventName::SpecialAncientScrollsDiscovered, EventType::Special, 0);
        e.required_cards = &[CardName::Historian, CardName::Ruins];
        e.play_inner = Some(play_ancient_scrolls);
        e.points_inner = Some(points_ancient_scrolls);
        e
    });
    add({
        let mut e = make(EventName::SpecialFlyingDoctorService, EventType::Special, 0);
        e.required_cards = &[CardName::Doctor, CardName::PostalPigeon];
        e.points_inner = Some(points_flying_doctor);
        e
    });
    add({
        let mut e = make(EventName::SpecialPathOfThePilgrims, EventType::Special, 0);
        e.required_cards = &[CardName::Monastery, CardName::Wanderer];
        e.points_inner = Some(points_path_of_pilgrims);
        e
    });
    add({
        let mut e = make(EventName::SpecialRememberingTheFallen, EventType::Special, 0);
        e.required_cards = &[CardName::Cemetery, CardName::Shepherd];
        e.points_inner = Some(points_remembering_fallen);
        e
    });
    add({
        let mut e = make(EventName::SpecialPristineChapelCeiling, EventType::Special, 0);
        e.required_cards = &[CardName::Woodcarver, CardName::Chapel];
        e.play_inner = Some(play_pristine_chapel);
        e.points_inner = Some(points_pristine_chapel);
        e
    });
    add({
        let mut e = make(EventName::SpecialTheEvergroveGames, EventType::Special, 9);
        e.can_play_check_inner = Some(check_evergrove_games);
        e
    });

    registry
});

/// Look up an event definition.
#[must_use]
pub fn event(name: EventName) -> &'static Event {
    EVENT_REGISTRY
        .get(&name)
        .expect("every event name has a catalog entry")
}

/// All event names of the given type, in a stable order.
#[must_use]
pub fn events_by_type(event_type: EventType) -> Vec<EventName> {
    let mut names: Vec<EventName> = EVENT_REGISTRY
        .values()
        .filter(|e| e.event_type == event_type)
        .map(|e| e.name)
        .collect();
    names.sort();
    names
}

/// The events in play for a fresh game: all four basic events plus four
/// random special ones.
#[must_use]
pub fn initial_events_map(rng: &mut GameRng) -> OrdMap<EventName, Option<PlayerId>> {
    let mut map = OrdMap::new();
    for name in events_by_type(EventType::Basic) {
        map.insert(name, None);
    }
    let mut special = events_by_type(EventType::Special);
    rng.shuffle(&mut special);
    for name in special.into_iter().take(4) {
        map.insert(name, None);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lookup() {
        let games = event(EventName::SpecialTheEvergroveGames);
        assert_eq!(games.base_vp, 9);
        assert_eq!(games.event_type, EventType::Special);
    }

    #[test]
    fn test_events_by_type_counts() {
        assert_eq!(events_by_type(EventType::Basic).len(), 4);
        assert_eq!(events_by_type(EventType::Special).len(), 16);
    }

    #[test]
    fn test_initial_events_map() {
        let mut rng = GameRng::seeded(2);
        let map = initial_events_map(&mut rng);
        assert_eq!(map.len(), 8);
        let basics = map
            .keys()
            .filter(|name| event(**name).event_type == EventType::Basic)
            .count();
        assert_eq!(basics, 4);
        assert!(map.values().all(Option::is_none));
    }

    #[test]
    fn test_required_cards() {
        let cure = event(EventName::SpecialCroakWartCure);
        assert_eq!(
            cure.required_cards,
            &[CardName::Undertaker, CardName::BargeToad]
        );
    }
}
