//! Event claiming and payload tests.

use evergrove::game::{ClaimEventInput, GameStateJson, SelectResourcesInput};
use evergrove::{
    Card, CardName, EngineError, Event, EventName, GameInput, GameState, NewGameOptions, PlayerId,
    ResourceMap,
};

fn new_game() -> GameState {
    GameState::initial(
        &["Rook", "Wren"],
        NewGameOptions {
            seed: 31,
            shuffle_deck: true,
        },
    )
    .unwrap()
}

fn modify_state(state: &GameState, f: impl FnOnce(&mut GameStateJson)) -> GameState {
    let mut json = state.to_json(true);
    f(&mut json);
    GameState::from_json(&json).unwrap()
}

fn give_city_card(json: &mut GameStateJson, player: usize, card: CardName) {
    json.players[player]
        .played_cards
        .entry(card)
        .or_default()
        .push(Card::from_name(card).fresh_played_info());
}

/// Force a specific special event into the game's event row.
fn ensure_event_in_play(json: &mut GameStateJson, event: EventName) {
    json.events_map.entry(event).or_insert(None);
}

#[test]
fn test_basic_event_needs_three_matching_tags() {
    let state = new_game();
    let claim = GameInput::ClaimEvent(ClaimEventInput {
        event: EventName::BasicThreeTraveler,
    });
    let reason = Event::from_name(EventName::BasicThreeTraveler)
        .can_play_check(&state, &claim)
        .expect("no travelers yet");
    assert!(reason.contains("TRAVELER") || reason.contains("Traveler"));

    let state = modify_state(&state, |json| {
        give_city_card(json, 0, CardName::Wanderer);
        give_city_card(json, 0, CardName::Wanderer);
        give_city_card(json, 0, CardName::Ranger);
    });
    let done = state.next(&claim).unwrap();

    assert_eq!(
        done.events_map_entry(EventName::BasicThreeTraveler),
        Some(Some(PlayerId::new(0)))
    );
    assert_eq!(done.players()[0].num_available_workers(), 1);
    assert!(done.players()[0].has_claimed_event(EventName::BasicThreeTraveler));
    // Worth 3 at scoring time.
    assert_eq!(
        done.players()[0].get_points(&done),
        3 + 2 * Card::from_name(CardName::Wanderer).base_vp
            + Card::from_name(CardName::Ranger).base_vp
    );
}

#[test]
fn test_claimed_event_cannot_be_claimed_again() {
    let state = new_game();
    let state = modify_state(&state, |json| {
        give_city_card(json, 0, CardName::Wanderer);
        give_city_card(json, 0, CardName::Wanderer);
        give_city_card(json, 0, CardName::Ranger);
        give_city_card(json, 1, CardName::Wanderer);
        give_city_card(json, 1, CardName::Wanderer);
        give_city_card(json, 1, CardName::Ranger);
    });
    let claim = GameInput::ClaimEvent(ClaimEventInput {
        event: EventName::BasicThreeTraveler,
    });
    let after_first = state.next(&claim).unwrap();

    // Player 1's attempt at the same event fails with a reason.
    let err = after_first.next(&claim).unwrap_err();
    match err {
        EngineError::IllegalAction(msg) => assert!(msg.contains("already claimed")),
        other => panic!("expected IllegalAction, got {:?}", other),
    }
}

#[test]
fn test_special_event_requires_its_cards() {
    let state = new_game();
    let state = modify_state(&state, |json| {
        ensure_event_in_play(json, EventName::SpecialAnEveningOfFireworks);
        give_city_card(json, 0, CardName::Lookout);
        // Miner mole missing.
    });
    let claim = GameInput::ClaimEvent(ClaimEventInput {
        event: EventName::SpecialAnEveningOfFireworks,
    });
    let err = state.next(&claim).unwrap_err();
    match err {
        EngineError::IllegalAction(msg) => assert!(msg.contains("MinerMole")),
        other => panic!("expected IllegalAction, got {:?}", other),
    }
}

#[test]
fn test_fireworks_stores_twigs_for_points() {
    let state = new_game();
    let state = modify_state(&state, |json| {
        ensure_event_in_play(json, EventName::SpecialAnEveningOfFireworks);
        give_city_card(json, 0, CardName::Lookout);
        give_city_card(json, 0, CardName::MinerMole);
        json.players[0].resources = ResourceMap {
            twig: 3,
            ..ResourceMap::default()
        };
    });

    let mid = state
        .next(&GameInput::ClaimEvent(ClaimEventInput {
            event: EventName::SpecialAnEveningOfFireworks,
        }))
        .unwrap();

    let answered = match &mid.pending_game_inputs()[0] {
        GameInput::SelectResources(select) => {
            // Only twigs are on offer here.
            assert_eq!(
                select.allowed_resources,
                vec![evergrove::ResourceType::Twig]
            );
            let mut answered: SelectResourcesInput = select.clone();
            answered.client_options.resources = ResourceMap {
                twig: 3,
                ..ResourceMap::default()
            };
            GameInput::SelectResources(answered)
        }
        other => panic!("expected a resource selection, got {:?}", other),
    };
    let done = mid.next(&answered).unwrap();

    let player = &done.players()[0];
    assert_eq!(player.resources().twig, 0);
    let info = &player.claimed_events()[&EventName::SpecialAnEveningOfFireworks];
    assert_eq!(info.stored_resources.twig, 3);
    // 2 VP per stored twig, plus the two required cards' base values.
    let expected = 6
        + Card::from_name(CardName::Lookout).base_vp
        + Card::from_name(CardName::MinerMole).base_vp;
    assert_eq!(player.get_points(&done), expected);
}

#[test]
fn test_fireworks_rejects_berries() {
    let state = new_game();
    let state = modify_state(&state, |json| {
        ensure_event_in_play(json, EventName::SpecialAnEveningOfFireworks);
        give_city_card(json, 0, CardName::Lookout);
        give_city_card(json, 0, CardName::MinerMole);
        json.players[0].resources = ResourceMap {
            berry: 3,
            ..ResourceMap::default()
        };
    });
    let mid = state
        .next(&GameInput::ClaimEvent(ClaimEventInput {
            event: EventName::SpecialAnEveningOfFireworks,
        }))
        .unwrap();
    let answered = match &mid.pending_game_inputs()[0] {
        GameInput::SelectResources(select) => {
            let mut answered: SelectResourcesInput = select.clone();
            answered.client_options.resources = ResourceMap {
                berry: 2,
                ..ResourceMap::default()
            };
            GameInput::SelectResources(answered)
        }
        other => panic!("expected a resource selection, got {:?}", other),
    };
    let err = mid.next(&answered).unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[test]
fn test_tax_relief_reactivates_production() {
    let state = new_game();
    let state = modify_state(&state, |json| {
        ensure_event_in_play(json, EventName::SpecialTaxRelief);
        give_city_card(json, 0, CardName::Judge);
        give_city_card(json, 0, CardName::Queen);
        give_city_card(json, 0, CardName::Farm);
        give_city_card(json, 0, CardName::Farm);
    });

    let done = state
        .next(&GameInput::ClaimEvent(ClaimEventInput {
            event: EventName::SpecialTaxRelief,
        }))
        .unwrap();
    // Both farms produced again.
    assert_eq!(done.players()[0].resources().berry, 2);
}

#[test]
fn test_flying_doctor_counts_every_city() {
    let state = new_game();
    let state = modify_state(&state, |json| {
        ensure_event_in_play(json, EventName::SpecialFlyingDoctorService);
        give_city_card(json, 0, CardName::Doctor);
        give_city_card(json, 0, CardName::PostalPigeon);
        give_city_card(json, 1, CardName::Husband);
        give_city_card(json, 1, CardName::Wife);
    });

    let done = state
        .next(&GameInput::ClaimEvent(ClaimEventInput {
            event: EventName::SpecialFlyingDoctorService,
        }))
        .unwrap();
    let event_points = Event::from_name(EventName::SpecialFlyingDoctorService)
        .points(&done, PlayerId::new(0));
    // One pair, in the opponent's city, is still worth 3 to the claimant.
    assert_eq!(event_points, 3);
}

#[test]
fn test_events_not_in_play_cannot_be_claimed() {
    let state = new_game();
    // Find a special event that didn't make this game's draw.
    let missing = evergrove::events::registry::events_by_type(evergrove::EventType::Special)
        .into_iter()
        .find(|event| state.events_map_entry(*event).is_none())
        .expect("twelve of sixteen specials sit out every game");
    let err = state
        .next(&GameInput::ClaimEvent(ClaimEventInput { event: missing }))
        .unwrap_err();
    assert!(matches!(err, EngineError::IllegalAction(_)));
}
