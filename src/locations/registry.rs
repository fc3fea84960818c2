//! The location catalog and per-game location maps.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use im::OrdMap;

use super::location::{Location, LocationName, LocationOccupancy, LocationType};
use crate::cards::{FixedYield, Season};
use crate::core::{EngineError, GameRng, PlayerId, Result};
use crate::game::input::{
    DiscardCardsInput, EffectContext, GameInput, MultiStepMeta, SelectCardsInput,
    SelectLocationInput, SelectPaymentForCardInput, SelectResourcesInput,
};
use crate::game::play_helpers::{required_selected_location, validate_selected_resources};
use crate::game::state::validate_selection;
use crate::game::GameState;
use crate::resources;

fn loc_ctx(location: LocationName) -> EffectContext {
    EffectContext::Location(location)
}

fn is_ctx(meta: &MultiStepMeta, location: LocationName) -> bool {
    meta.context == EffectContext::Location(location)
}

// === Haven ===

/// Discard any number of cards, gain 1 resource of choice per 2 discarded.
/// The choices ride along on the placement input itself.
fn play_haven(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    let place = match game_input {
        GameInput::PlaceWorker(place) => place,
        _ => return Err(EngineError::invalid("the haven expects a worker placement")),
    };
    let to_discard = &place.client_options.cards_to_discard;
    let to_gain = place.client_options.resources_to_gain;

    if to_gain.vp != 0 {
        return Err(EngineError::invalid("cannot gain VP from the haven"));
    }
    let entitled = (to_discard.len() / 2) as u32;
    if to_gain.total() != entitled {
        return Err(EngineError::invalid(format!(
            "mismatched resources: can gain {}, gaining {}",
            entitled,
            to_gain.total()
        )));
    }
    for card in to_discard.clone() {
        game_state.get_active_player_mut()?.remove_card_from_hand(card)?;
        game_state.discard(card);
    }
    game_state.active_player_gains(&to_gain)
}

// === Journeys ===

fn can_play_journey(game_state: &GameState, num_points: usize) -> bool {
    match game_state.get_active_player() {
        Ok(player) => {
            player.current_season() == Season::Autumn
                && player.num_cards_in_hand() >= num_points
        }
        Err(_) => false,
    }
}

fn play_journey(game_state: &mut GameState, game_input: &GameInput, num_points: usize) -> Result<()> {
    let place = match game_input {
        GameInput::PlaceWorker(place) => place,
        _ => return Err(EngineError::invalid("a journey expects a worker placement")),
    };
    let to_discard = place.client_options.cards_to_discard.clone();
    if to_discard.len() != num_points {
        return Err(EngineError::invalid(format!(
            "must discard exactly {} cards for this journey",
            num_points
        )));
    }
    for card in to_discard {
        game_state.get_active_player_mut()?.remove_card_from_hand(card)?;
        game_state.discard(card);
    }
    game_state.active_player_gains(&resources! { vp: num_points as u32 })
}

fn can_play_journey_five(game_state: &GameState, _: &GameInput) -> bool {
    can_play_journey(game_state, 5)
}
fn can_play_journey_four(game_state: &GameState, _: &GameInput) -> bool {
    can_play_journey(game_state, 4)
}
fn can_play_journey_three(game_state: &GameState, _: &GameInput) -> bool {
    can_play_journey(game_state, 3)
}
fn can_play_journey_two(game_state: &GameState, _: &GameInput) -> bool {
    can_play_journey(game_state, 2)
}

fn play_journey_five(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    play_journey(game_state, game_input, 5)
}
fn play_journey_four(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    play_journey(game_state, game_input, 4)
}
fn play_journey_three(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    play_journey(game_state, game_input, 3)
}
fn play_journey_two(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    play_journey(game_state, game_input, 2)
}

// === Forest clearings ===

fn play_forest_two_wild(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    match game_input {
        GameInput::SelectResources(select) if is_ctx(&select.meta, LocationName::ForestTwoWild) => {
            let gained = validate_selected_resources(select)?;
            game_state.active_player_gains(&gained)
        }
        _ => {
            game_state.push_pending(GameInput::SelectResources(SelectResourcesInput {
                meta: MultiStepMeta::new(game_input.input_type(), loc_ctx(LocationName::ForestTwoWild)),
                to_spend: false,
                min_resources: 2,
                max_resources: 2,
                allowed_resources: Vec::new(),
                client_options: Default::default(),
            }));
            Ok(())
        }
    }
}

fn play_forest_two_cards_one_wild(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    match game_input {
        GameInput::SelectResources(select)
            if is_ctx(&select.meta, LocationName::ForestTwoCardsOneWild) =>
        {
            let gained = validate_selected_resources(select)?;
            game_state.active_player_gains(&gained)
        }
        _ => {
            game_state.active_player_draws(2)?;
            game_state.push_pending(GameInput::SelectResources(SelectResourcesInput {
                meta: MultiStepMeta::new(
                    game_input.input_type(),
                    loc_ctx(LocationName::ForestTwoCardsOneWild),
                ),
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

fn play_forest_discard_then_draw(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    let location = LocationName::ForestDiscardAnyThenDrawTwoPerCard;
    match game_input {
        GameInput::DiscardCards(discard) if is_ctx(&discard.meta, location) => {
            let cards = discard.client_options.cards_to_discard.clone();
            if cards.len() > discard.max_cards {
                return Err(EngineError::invalid("too many cards to discard"));
            }
            for card in &cards {
                game_state.get_active_player_mut()?.remove_card_from_hand(*card)?;
                game_state.discard(*card);
            }
            game_state.active_player_draws(2 * cards.len())
        }
        _ => {
            let hand_size = game_state.get_active_player()?.num_cards_in_hand();
            game_state.push_pending(GameInput::DiscardCards(DiscardCardsInput {
                meta: MultiStepMeta::new(game_input.input_type(), loc_ctx(location)),
                min_cards: 0,
                max_cards: hand_size,
                client_options: Default::default(),
            }));
            Ok(())
        }
    }
}

fn play_forest_discard_for_wild(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    let location = LocationName::ForestDiscardUpToThreeCardsToGainWildPerCard;
    match game_input {
        GameInput::DiscardCards(discard) if is_ctx(&discard.meta, location) => {
            let cards = discard.client_options.cards_to_discard.clone();
            if cards.len() > discard.max_cards {
                return Err(EngineError::invalid("too many cards to discard"));
            }
            for card in &cards {
                game_state.get_active_player_mut()?.remove_card_from_hand(*card)?;
                game_state.discard(*card);
            }
            let count = cards.len() as u32;
            if count > 0 {
                game_state.push_pending(GameInput::SelectResources(SelectResourcesInput {
                    meta: MultiStepMeta::new(game_input.input_type(), loc_ctx(location))
                        .with_prev(game_input.clone()),
                    to_spend: false,
                    min_resources: count,
                    max_resources: count,
                    allowed_resources: Vec::new(),
                    client_options: Default::default(),
                }));
            }
            Ok(())
        }
        GameInput::SelectResources(select) if is_ctx(&select.meta, location) => {
            let gained = validate_selected_resources(select)?;
            game_state.active_player_gains(&gained)
        }
        _ => {
            game_state.push_pending(GameInput::DiscardCards(DiscardCardsInput {
                meta: MultiStepMeta::new(game_input.input_type(), loc_ctx(location)),
                min_cards: 0,
                max_cards: 3,
                client_options: Default::default(),
            }));
            Ok(())
        }
    }
}

fn play_forest_copy_basic(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    let location = LocationName::ForestCopyBasicOneCard;
    match game_input {
        GameInput::SelectLocation(select) if is_ctx(&select.meta, location) => {
            let copied = required_selected_location(select)?;
            let candidate = GameInput::PlaceWorker(crate::game::input::PlaceWorkerInput {
                location: copied,
                client_options: Default::default(),
            });
            Location::from_name(copied).activate(game_state, &candidate)?;
            game_state.active_player_draws(1)
        }
        _ => {
            let options: Vec<LocationName> = game_state
                .locations_in_play()
                .into_iter()
                .filter(|l| Location::from_name(*l).location_type == LocationType::Basic)
                .collect();
            game_state.push_pending(GameInput::SelectLocation(SelectLocationInput {
                meta: MultiStepMeta::new(game_input.input_type(), loc_ctx(location)),
                location_options: options,
                client_options: Default::default(),
            }));
            Ok(())
        }
    }
}

fn play_forest_meadow_discount(game_state: &mut GameState, game_input: &GameInput) -> Result<()> {
    let location = LocationName::ForestDrawTwoMeadowPlayOneForOneLess;
    match game_input {
        GameInput::SelectCards(select)
            if is_ctx(&select.meta, location)
                && select.meta.prev_input_type == crate::game::input::GameInputType::PlaceWorker =>
        {
            // Stage 1: take two cards out of the meadow.
            let selected = select.client_options.selected_cards.clone();
            validate_selection(&selected, &select.card_options, select.min_to_select, select.max_to_select)?;
            for card in &selected {
                game_state.remove_from_meadow(*card)?;
                if let Some(overflow) = game_state.get_active_player_mut()?.add_card_to_hand(*card) {
                    game_state.discard(overflow);
                }
            }
            game_state.replenish_meadow()?;
            game_state.push_pending(GameInput::SelectCards(SelectCardsInput {
                meta: MultiStepMeta::new(game_input.input_type(), loc_ctx(location)),
                card_options: selected,
                min_to_select: 0,
                max_to_select: 1,
                client_options: Default::default(),
            }));
            Ok(())
        }
        GameInput::SelectCards(select) if is_ctx(&select.meta, location) => {
            // Stage 2: optionally pick one of them to play at a discount.
            let selected = select.client_options.selected_cards.clone();
            validate_selection(&selected, &select.card_options, select.min_to_select, select.max_to_select)?;
            if let Some(&chosen) = selected.first() {
                game_state.push_pending(GameInput::SelectPaymentForCard(
                    SelectPaymentForCardInput {
                        meta: MultiStepMeta::new(game_input.input_type(), loc_ctx(location)),
                        card: chosen,
                        from_meadow: false,
                        wild_discount: 1,
                        client_options: Default::default(),
                    },
                ));
            }
            Ok(())
        }
        GameInput::SelectPaymentForCard(select) if is_ctx(&select.meta, location) => {
            crate::cards::effects::resolve_discounted_purchase(game_state, select)
        }
        _ => {
            let meadow = game_state.meadow_cards();
            let to_take = 2.min(meadow.len());
            game_state.push_pending(GameInput::SelectCards(SelectCardsInput {
                meta: MultiStepMeta::new(game_input.input_type(), loc_ctx(location)),
                card_options: meadow,
                min_to_select: to_take,
                max_to_select: to_take,
                client_options: Default::default(),
            }));
            Ok(())
        }
    }
}

// === Catalog ===

fn make(
    name: LocationName,
    location_type: LocationType,
    occupancy: LocationOccupancy,
) -> Location {
    Location {
        name,
        location_type,
        occupancy,
        fixed_yield: None,
        can_play_inner: None,
        play_inner: None,
    }
}

fn with_yield(mut location: Location, resources: crate::core::ResourceMap, draw: usize) -> Location {
    location.fixed_yield = Some(FixedYield {
        resources,
        num_cards_to_draw: draw,
    });
    location
}

static LOCATION_REGISTRY: Lazy<FxHashMap<LocationName, Location>> = Lazy::new(|| {
    let mut registry = FxHashMap::default();
    let mut add = |location: Location| {
        let existing = registry.insert(location.name, location);
        assert!(existing.is_none(), "location registered twice");
    };

    add(with_yield(
        make(LocationName::BasicOneBerry, LocationType::Basic, LocationOccupancy::Unlimited),
        resources! { berry: 1 },
        0,
    ));
    add(with_yield(
        make(
            LocationName::BasicOneBerryAndOneCard,
            LocationType::Basic,
            LocationOccupancy::Exclusive,
        ),
        resources! { berry: 1 },
        1,
    ));
    add(with_yield(
        make(
            LocationName::BasicOneResinAndOneCard,
            LocationType::Basic,
            LocationOccupancy::Unlimited,
        ),
        resources! { resin: 1 },
        1,
    ));
    add(with_yield(
        make(LocationName::BasicOneStone, LocationType::Basic, LocationOccupancy::Exclusive),
        resources! { pebble: 1 },
        0,
    ));
    add(with_yield(
        make(LocationName::BasicThreeTwigs, LocationType::Basic, LocationOccupancy::Exclusive),
        resources! { twig: 3 },
        0,
    ));
    add(with_yield(
        make(
            LocationName::BasicTwoCardsAndOneVp,
            LocationType::Basic,
            LocationOccupancy::Unlimited,
        ),
        resources! { vp: 1 },
        2,
    ));
    add(with_yield(
        make(LocationName::BasicTwoResin, LocationType::Basic, LocationOccupancy::Exclusive),
        resources! { resin: 2 },
        0,
    ));
    add(with_yield(
        make(
            LocationName::BasicTwoTwigsAndOneCard,
            LocationType::Basic,
            LocationOccupancy::Unlimited,
        ),
        resources! { twig: 2 },
        1,
    ));

    add({
        let mut l = make(LocationName::Haven, LocationType::Haven, LocationOccupancy::Unlimited);
        l.play_inner = Some(play_haven);
        l
    });

    add({
        let mut l = make(LocationName::JourneyFive, LocationType::Journey, LocationOccupancy::Exclusive);
        l.can_play_inner = Some(can_play_journey_five);
        l.play_inner = Some(play_journey_five);
        l
    });
    add({
        let mut l = make(LocationName::JourneyFour, LocationType::Journey, LocationOccupancy::Exclusive);
        l.can_play_inner = Some(can_play_journey_four);
        l.play_inner = Some(play_journey_four);
        l
    });
    add({
        let mut l = make(LocationName::JourneyThree, LocationType::Journey, LocationOccupancy::Exclusive);
        l.can_play_inner = Some(can_play_journey_three);
        l.play_inner = Some(play_journey_three);
        l
    });
    add({
        let mut l = make(LocationName::JourneyTwo, LocationType::Journey, LocationOccupancy::Unlimited);
        l.can_play_inner = Some(can_play_journey_two);
        l.play_inner = Some(play_journey_two);
        l
    });

    add(with_yield(
        make(
            LocationName::ForestTwoBerryOneCard,
            LocationType::Forest,
            LocationOccupancy::ExclusiveFour,
        ),
        resources! { berry: 2 },
        1,
    ));
    add({
        let mut l = make(LocationName::ForestTwoWild, LocationType::Forest, LocationOccupancy::ExclusiveFour);
        l.play_inner = Some(play_forest_two_wild);
        l
    });
    add({
        let mut l = make(
            LocationName::ForestDiscardAnyThenDrawTwoPerCard,
            LocationType::Forest,
            LocationOccupancy::ExclusiveFour,
        );
        l.play_inner = Some(play_forest_discard_then_draw);
        l
    });
    add({
        let mut l = make(
            LocationName::ForestCopyBasicOneCard,
            LocationType::Forest,
            LocationOccupancy::ExclusiveFour,
        );
        l.play_inner = Some(play_forest_copy_basic);
        l
    });
    add(with_yield(
        make(
            LocationName::ForestOnePebbleThreeCard,
            LocationType::Forest,
            LocationOccupancy::ExclusiveFour,
        ),
        resources! { pebble: 1 },
        3,
    ));
    add(with_yield(
        make(
            LocationName::ForestOneTwigResinBerry,
            LocationType::Forest,
            LocationOccupancy::ExclusiveFour,
        ),
        resources! { twig: 1, resin: 1, berry: 1 },
        0,
    ));
    add(with_yield(
        make(
            LocationName::ForestThreeBerry,
            LocationType::Forest,
            LocationOccupancy::ExclusiveFour,
        ),
        resources! { berry: 3 },
        0,
    ));
    add(with_yield(
        make(
            LocationName::ForestTwoResinOneTwig,
            LocationType::Forest,
            LocationOccupancy::ExclusiveFour,
        ),
        resources! { twig: 1, resin: 2 },
        0,
    ));
    add({
        let mut l = make(
            LocationName::ForestTwoCardsOneWild,
            LocationType::Forest,
            LocationOccupancy::ExclusiveFour,
        );
        l.play_inner = Some(play_forest_two_cards_one_wild);
        l
    });
    add({
        let mut l = make(
            LocationName::ForestDiscardUpToThreeCardsToGainWildPerCard,
            LocationType::Forest,
            LocationOccupancy::ExclusiveFour,
        );
        l.play_inner = Some(play_forest_discard_for_wild);
        l
    });
    add({
        let mut l = make(
            LocationName::ForestDrawTwoMeadowPlayOneForOneLess,
            LocationType::Forest,
            LocationOccupancy::ExclusiveFour,
        );
        l.play_inner = Some(play_forest_meadow_discount);
        l
    });

    registry
});

/// Look up a location definition.
#[must_use]
pub fn location(name: LocationName) -> &'static Location {
    LOCATION_REGISTRY
        .get(&name)
        .expect("every location name has a catalog entry")
}

/// All location names of the given type, in a stable order.
#[must_use]
pub fn locations_by_type(location_type: LocationType) -> Vec<LocationName> {
    let mut names: Vec<LocationName> = LOCATION_REGISTRY
        .values()
        .filter(|l| l.location_type == location_type)
        .map(|l| l.name)
        .collect();
    names.sort();
    names
}

/// The locations in play for a fresh game: every basic, haven, and journey
/// location, plus a random draw of forest clearings (3 below four players,
/// 4 otherwise).
#[must_use]
pub fn initial_locations_map(
    player_count: usize,
    rng: &mut GameRng,
) -> OrdMap<LocationName, Vec<PlayerId>> {
    let mut map = OrdMap::new();
    for name in locations_by_type(LocationType::Basic) {
        map.insert(name, Vec::new());
    }
    map.insert(LocationName::Haven, Vec::new());
    for name in locations_by_type(LocationType::Journey) {
        map.insert(name, Vec::new());
    }

    let mut forest = locations_by_type(LocationType::Forest);
    rng.shuffle(&mut forest);
    let num_forest = if player_count < 4 { 3 } else { 4 };
    for name in forest.into_iter().take(num_forest) {
        map.insert(name, Vec::new());
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lookup() {
        let haven = location(LocationName::Haven);
        assert_eq!(haven.occupancy, LocationOccupancy::Unlimited);
        assert_eq!(haven.location_type, LocationType::Haven);
    }

    #[test]
    fn test_locations_by_type_counts() {
        assert_eq!(locations_by_type(LocationType::Basic).len(), 8);
        assert_eq!(locations_by_type(LocationType::Journey).len(), 4);
        assert_eq!(locations_by_type(LocationType::Forest).len(), 11);
    }

    #[test]
    fn test_initial_locations_map_two_players() {
        let mut rng = GameRng::seeded(5);
        let map = initial_locations_map(2, &mut rng);
        // 8 basic + haven + 4 journeys + 3 forest.
        assert_eq!(map.len(), 16);
        let forest_count = map
            .keys()
            .filter(|name| location(**name).location_type == LocationType::Forest)
            .count();
        assert_eq!(forest_count, 3);
    }

    #[test]
    fn test_initial_locations_map_four_players() {
        let mut rng = GameRng::seeded(5);
        let map = initial_locations_map(4, &mut rng);
        assert_eq!(map.len(), 17);
    }

    #[test]
    fn test_forest_draw_is_seed_deterministic() {
        let mut rng_a = GameRng::seeded(9);
        let mut rng_b = GameRng::seeded(9);
        let a = initial_locations_map(3, &mut rng_a);
        let b = initial_locations_map(3, &mut rng_b);
        let keys_a: Vec<_> = a.keys().collect();
        let keys_b: Vec<_> = b.keys().collect();
        assert_eq!(keys_a, keys_b);
    }
}
