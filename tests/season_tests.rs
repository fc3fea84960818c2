//! Season-change and end-of-game tests.

use evergrove::game::{PlaceWorkerInput, SelectCardsInput};
use evergrove::{
    Card, CardName, EngineError, GameInput, GameState, LocationName, NewGameOptions, PlayerId,
    PlayerStatus, Season,
};

fn new_game() -> GameState {
    GameState::initial(
        &["Rook", "Wren"],
        NewGameOptions {
            seed: 13,
            shuffle_deck: true,
        },
    )
    .unwrap()
}

fn place_on_unlimited(state: &GameState) -> GameState {
    state
        .next(&GameInput::PlaceWorker(PlaceWorkerInput {
            location: LocationName::BasicOneBerry,
            client_options: Default::default(),
        }))
        .unwrap()
}

/// The active player keeps placing on an unlimited spot until out of
/// workers; turn order interleaves the opponent doing the same.
fn exhaust_all_workers(mut state: GameState) -> GameState {
    while state
        .players()
        .iter()
        .any(|p| p.num_available_workers() > 0)
    {
        state = place_on_unlimited(&state);
    }
    state
}

#[test]
fn test_prepare_requires_all_workers_placed() {
    let state = new_game();
    let err = state.next(&GameInput::PrepareForSeason).unwrap_err();
    assert!(matches!(err, EngineError::IllegalAction(_)));
}

#[test]
fn test_prepare_for_season_recalls_and_advances() {
    let state = exhaust_all_workers(new_game());
    assert_eq!(state.active_player_id(), PlayerId::new(0));

    let next = state.next(&GameInput::PrepareForSeason).unwrap();
    let player = &next.players()[0];
    assert_eq!(player.current_season(), Season::Spring);
    assert_eq!(player.num_workers(), 3);
    assert_eq!(player.num_available_workers(), 3);
    assert_eq!(player.status(), PlayerStatus::DuringSeason);
    // The opponent's workers are still out.
    assert_eq!(next.players()[1].num_available_workers(), 0);
    assert_eq!(
        next.location_occupants(LocationName::BasicOneBerry)
            .map(Vec::len),
        Some(2)
    );
    assert_eq!(next.active_player_id(), PlayerId::new(1));
}

#[test]
fn test_entering_spring_activates_production() {
    let state = exhaust_all_workers(new_game());
    // Rig a farm into the city so production has something to fire.
    let mut json = state.to_json(true);
    json.players[0].played_cards.insert(
        CardName::Farm,
        vec![Card::from_name(CardName::Farm).fresh_played_info()],
    );
    let berries_before = json.players[0].resources.berry;
    let state = GameState::from_json(&json).unwrap();

    let next = state.next(&GameInput::PrepareForSeason).unwrap();
    assert_eq!(next.players()[0].resources().berry, berries_before + 1);
}

#[test]
fn test_entering_summer_drafts_from_the_meadow() {
    // Walk player 0 to spring, then to the summer boundary.
    let mut state = exhaust_all_workers(new_game());
    state = state.next(&GameInput::PrepareForSeason).unwrap(); // p0 -> spring
    state = state.next(&GameInput::PrepareForSeason).unwrap(); // p1 -> spring
    state = exhaust_all_workers(state);

    let mid = state.next(&GameInput::PrepareForSeason).unwrap(); // p0 -> summer
    let pending = mid.pending_game_inputs();
    assert_eq!(pending.len(), 1);
    assert_eq!(mid.players()[0].current_season(), Season::Summer);

    let answered = match &pending[0] {
        GameInput::SelectCards(select) => {
            let mut answered: SelectCardsInput = select.clone();
            answered.client_options.selected_cards =
                select.card_options.iter().take(2).copied().collect();
            GameInput::SelectCards(answered)
        }
        other => panic!("expected the meadow draft, got {:?}", other),
    };
    let hand_before = mid.players()[0].num_cards_in_hand();
    let done = mid.next(&answered).unwrap();

    assert_eq!(done.players()[0].num_cards_in_hand(), hand_before + 2);
    assert_eq!(done.meadow_cards().len(), 8);
    assert_eq!(done.players()[0].num_workers(), 4);
    assert_eq!(done.active_player_id(), PlayerId::new(1));
}

#[test]
fn test_seasons_stop_at_autumn() {
    let mut state = exhaust_all_workers(new_game());
    // Cycle both players through every season boundary.
    for _ in 0..2 {
        state = state.next(&GameInput::PrepareForSeason).unwrap(); // -> spring
    }
    state = exhaust_all_workers(state);
    for _ in 0..2 {
        state = state.next(&GameInput::PrepareForSeason).unwrap(); // -> summer
        // Resolve the meadow draft.
        let draft = match &state.pending_game_inputs()[0] {
            GameInput::SelectCards(select) => {
                let mut answered = select.clone();
                answered.client_options.selected_cards =
                    select.card_options.iter().take(2).copied().collect();
                GameInput::SelectCards(answered)
            }
            other => panic!("expected the meadow draft, got {:?}", other),
        };
        state = state.next(&draft).unwrap();
    }
    state = exhaust_all_workers(state);
    for _ in 0..2 {
        state = state.next(&GameInput::PrepareForSeason).unwrap(); // -> autumn
    }
    assert!(state
        .players()
        .iter()
        .all(|p| p.current_season() == Season::Autumn));
    assert!(state.players().iter().all(|p| p.num_workers() == 6));

    // There is no season after autumn.
    let state = exhaust_all_workers(state);
    let err = state.next(&GameInput::PrepareForSeason).unwrap_err();
    assert!(matches!(err, EngineError::IllegalAction(_)));
}

#[test]
fn test_game_end_passes_players_out() {
    // Fast-forward both players to autumn via snapshot surgery.
    let state = new_game();
    let mut json = state.to_json(true);
    for player in &mut json.players {
        player.current_season = Season::Autumn;
        player.num_workers = 6;
    }
    let state = GameState::from_json(&json).unwrap();

    let after_first = state.next(&GameInput::GameEnd).unwrap();
    assert_eq!(
        after_first.players()[0].status(),
        PlayerStatus::GameEnded
    );
    assert!(!after_first.game_over());
    assert_eq!(after_first.active_player_id(), PlayerId::new(1));

    let after_second = after_first.next(&GameInput::GameEnd).unwrap();
    assert!(after_second.game_over());
    assert!(after_second.get_possible_game_inputs().is_empty());

    // Passing twice is rejected.
    let err = after_second.next(&GameInput::GameEnd).unwrap_err();
    assert!(matches!(err, EngineError::IllegalAction(_)));
}

#[test]
fn test_game_end_outside_autumn_is_rejected() {
    let state = new_game();
    let err = state.next(&GameInput::GameEnd).unwrap_err();
    assert!(matches!(err, EngineError::IllegalAction(_)));
}

#[test]
fn test_possible_inputs_offer_prepare_only_when_workers_spent() {
    let state = new_game();
    let offered = state.get_possible_game_inputs();
    assert!(!offered.contains(&GameInput::PrepareForSeason));

    let state = exhaust_all_workers(state);
    let offered = state.get_possible_game_inputs();
    assert!(offered.contains(&GameInput::PrepareForSeason));
}
