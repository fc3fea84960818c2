//! Card-behavior tests: discounts, pairings, free plays, and passive
//! triggers, driven through full transitions.

use evergrove::game::{
    GameStateJson, PlayCardInput, SelectCardsInput, SelectResourcesInput,
    VisitDestinationCardInput,
};
use evergrove::{
    Card, CardName, EngineError, GameInput, GameState, NewGameOptions, PaymentOptions, PlayerId,
    ResourceMap,
};

fn new_game() -> GameState {
    GameState::initial(
        &["Rook", "Wren"],
        NewGameOptions {
            seed: 21,
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

fn give_hand_card(json: &mut GameStateJson, player: usize, card: CardName) {
    json.players[player].cards_in_hand.push(card);
    json.players[player].num_cards_in_hand += 1;
}

fn berries(count: u32) -> ResourceMap {
    ResourceMap {
        berry: count,
        ..ResourceMap::default()
    }
}

#[test]
fn test_critter_enters_free_via_associated_construction() {
    let state = new_game();
    let state = modify_state(&state, |json| {
        give_city_card(json, 0, CardName::Farm);
        give_hand_card(json, 0, CardName::Husband);
    });

    assert!(state.players()[0].can_afford_card(CardName::Husband, false));
    let mid = state
        .next(&GameInput::PlayCard(PlayCardInput {
            card: CardName::Husband,
            from_meadow: false,
            payment: PaymentOptions::default(),
        }))
        .unwrap();

    let player = &mid.players()[0];
    assert!(player.has_card_in_city(CardName::Husband));
    assert_eq!(player.resources().total(), 0);
    // The farm is now spoken for.
    assert!(player.get_played_card_infos(CardName::Farm)[0].is_occupied);
}

#[test]
fn test_husband_paired_with_wife_gains_any_resource() {
    let state = new_game();
    let state = modify_state(&state, |json| {
        give_city_card(json, 0, CardName::Wife);
        give_hand_card(json, 0, CardName::Husband);
        json.players[0].resources = berries(3);
    });

    let mid = state
        .next(&GameInput::PlayCard(PlayCardInput {
            card: CardName::Husband,
            from_meadow: false,
            payment: PaymentOptions {
                resources: berries(3),
                ..Default::default()
            },
        }))
        .unwrap();

    let answered = match &mid.pending_game_inputs()[0] {
        GameInput::SelectResources(select) => {
            let mut answered: SelectResourcesInput = select.clone();
            answered.client_options.resources = ResourceMap {
                pebble: 1,
                ..ResourceMap::default()
            };
            GameInput::SelectResources(answered)
        }
        other => panic!("expected a resource selection, got {:?}", other),
    };
    let done = mid.next(&answered).unwrap();
    assert_eq!(done.players()[0].resources().pebble, 1);

    // The pair shares a slot and the wife's bonus shows up in scoring:
    // husband 2 + wife 2 + pairing 3 + 1 pebble's worth of nothing.
    let player = &done.players()[0];
    assert_eq!(player.num_occupied_city_spaces(), 1);
    assert_eq!(player.get_points(&done), 7);
}

#[test]
fn test_wife_alone_scores_no_pairing_bonus() {
    let state = new_game();
    let state = modify_state(&state, |json| {
        give_city_card(json, 0, CardName::Wife);
    });
    assert_eq!(state.players()[0].get_points(&state), 2);
}

#[test]
fn test_innkeeper_discounts_critters_and_is_spent() {
    let state = new_game();
    let state = modify_state(&state, |json| {
        give_city_card(json, 0, CardName::Innkeeper);
        give_hand_card(json, 0, CardName::Queen); // 5 berries
        json.players[0].resources = berries(2);
    });

    assert!(state.players()[0].can_afford_card(CardName::Queen, false));
    let done = state
        .next(&GameInput::PlayCard(PlayCardInput {
            card: CardName::Queen,
            from_meadow: false,
            payment: PaymentOptions {
                resources: berries(2),
                card_to_use: Some(CardName::Innkeeper),
                ..Default::default()
            },
        }))
        .unwrap();

    let player = &done.players()[0];
    assert!(player.has_card_in_city(CardName::Queen));
    assert!(!player.has_card_in_city(CardName::Innkeeper));
    assert_eq!(player.resources().berry, 0);
}

#[test]
fn test_crane_only_discounts_constructions() {
    let state = new_game();
    let state = modify_state(&state, |json| {
        give_city_card(json, 0, CardName::Crane);
        give_hand_card(json, 0, CardName::Farm);
        give_hand_card(json, 0, CardName::Bard);
        json.players[0].resources = berries(3);
    });

    // Farm (a construction) rides the crane for free.
    let done = state
        .next(&GameInput::PlayCard(PlayCardInput {
            card: CardName::Farm,
            from_meadow: false,
            payment: PaymentOptions {
                resources: ResourceMap::default(),
                card_to_use: Some(CardName::Crane),
                ..Default::default()
            },
        }))
        .unwrap();
    assert!(done.players()[0].has_card_in_city(CardName::Farm));
    assert!(!done.players()[0].has_card_in_city(CardName::Crane));

    // A critter cannot.
    let err = state
        .next(&GameInput::PlayCard(PlayCardInput {
            card: CardName::Bard,
            from_meadow: false,
            payment: PaymentOptions {
                resources: ResourceMap::default(),
                card_to_use: Some(CardName::Crane),
                ..Default::default()
            },
        }))
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[test]
fn test_unique_card_cannot_be_played_twice() {
    let state = new_game();
    let state = modify_state(&state, |json| {
        give_city_card(json, 0, CardName::Historian);
        give_hand_card(json, 0, CardName::Historian);
        json.players[0].resources = berries(2);
    });
    let candidate = GameInput::PlayCard(PlayCardInput {
        card: CardName::Historian,
        from_meadow: false,
        payment: PaymentOptions {
            resources: berries(2),
            ..Default::default()
        },
    });
    assert!(!Card::from_name(CardName::Historian).can_play(&state, &candidate));
    assert!(state.next(&candidate).is_err());
}

#[test]
fn test_historian_draws_on_each_play() {
    let state = new_game();
    let state = modify_state(&state, |json| {
        give_city_card(json, 0, CardName::Historian);
        give_hand_card(json, 0, CardName::Farm);
        json.players[0].resources = ResourceMap {
            twig: 2,
            resin: 1,
            ..ResourceMap::default()
        };
    });

    let hand_before = state.players()[0].num_cards_in_hand();
    let done = state
        .next(&GameInput::PlayCard(PlayCardInput {
            card: CardName::Farm,
            from_meadow: false,
            payment: PaymentOptions {
                resources: ResourceMap {
                    twig: 2,
                    resin: 1,
                    ..ResourceMap::default()
                },
                ..Default::default()
            },
        }))
        .unwrap();
    // Farm left the hand, the historian drew a replacement.
    assert_eq!(done.players()[0].num_cards_in_hand(), hand_before);
}

#[test]
fn test_shopkeeper_pays_out_for_critters_only() {
    let state = new_game();
    let state = modify_state(&state, |json| {
        give_city_card(json, 0, CardName::Shopkeeper);
        give_hand_card(json, 0, CardName::Wanderer);
        json.players[0].resources = berries(2);
    });

    let done = state
        .next(&GameInput::PlayCard(PlayCardInput {
            card: CardName::Wanderer,
            from_meadow: false,
            payment: PaymentOptions {
                resources: berries(2),
                ..Default::default()
            },
        }))
        .unwrap();
    assert_eq!(done.players()[0].resources().berry, 1);
}

#[test]
fn test_queen_hosts_a_cheap_card_for_free() {
    let state = new_game();
    let state = modify_state(&state, |json| {
        give_city_card(json, 0, CardName::Queen);
        give_hand_card(json, 0, CardName::Farm);
    });

    let mid = state
        .next(&GameInput::VisitDestinationCard(VisitDestinationCardInput {
            card: CardName::Queen,
            city_owner: PlayerId::new(0),
        }))
        .unwrap();

    let answered = match &mid.pending_game_inputs()[0] {
        GameInput::SelectCards(select) => {
            assert!(select.card_options.contains(&CardName::Farm));
            let mut answered: SelectCardsInput = select.clone();
            answered.client_options.selected_cards = vec![CardName::Farm];
            GameInput::SelectCards(answered)
        }
        other => panic!("expected a card selection, got {:?}", other),
    };
    let done = mid.next(&answered).unwrap();

    let player = &done.players()[0];
    assert!(player.has_card_in_city(CardName::Farm));
    // Farm's own production still fired.
    assert_eq!(player.resources().berry, 1);
    // One worker is committed to the queen until recall.
    assert_eq!(player.num_available_workers(), 1);
}

#[test]
fn test_queen_refuses_expensive_cards() {
    let state = new_game();
    let state = modify_state(&state, |json| {
        give_city_card(json, 0, CardName::Queen);
        give_hand_card(json, 0, CardName::King); // base 4
        give_hand_card(json, 0, CardName::Farm);
    });

    let mid = state
        .next(&GameInput::VisitDestinationCard(VisitDestinationCardInput {
            card: CardName::Queen,
            city_owner: PlayerId::new(0),
        }))
        .unwrap();
    match &mid.pending_game_inputs()[0] {
        GameInput::SelectCards(select) => {
            assert!(!select.card_options.contains(&CardName::King));
        }
        other => panic!("expected a card selection, got {:?}", other),
    }
}

#[test]
fn test_storehouse_stocks_then_pays_out_on_visit() {
    let state = new_game();
    let state = modify_state(&state, |json| {
        give_hand_card(json, 0, CardName::Storehouse);
        json.players[0].resources = ResourceMap {
            twig: 1,
            resin: 1,
            pebble: 1,
            ..ResourceMap::default()
        };
    });

    let mid = state
        .next(&GameInput::PlayCard(PlayCardInput {
            card: CardName::Storehouse,
            from_meadow: false,
            payment: PaymentOptions {
                resources: ResourceMap {
                    twig: 1,
                    resin: 1,
                    pebble: 1,
                    ..ResourceMap::default()
                },
                ..Default::default()
            },
        }))
        .unwrap();

    let answered = match &mid.pending_game_inputs()[0] {
        GameInput::SelectOptionGeneric(select) => {
            let mut answered = select.clone();
            answered.client_options.selected_option = Some("3 TWIG".to_string());
            GameInput::SelectOptionGeneric(answered)
        }
        other => panic!("expected a generic option, got {:?}", other),
    };
    let stocked = mid.next(&answered).unwrap();
    assert_eq!(
        stocked.players()[0].get_played_card_infos(CardName::Storehouse)[0]
            .resources
            .twig,
        3
    );

    // Player 1 takes a turn, then player 0 collects with a worker.
    let stocked = stocked
        .next(&GameInput::PlaceWorker(evergrove::game::PlaceWorkerInput {
            location: evergrove::LocationName::BasicOneBerry,
            client_options: Default::default(),
        }))
        .unwrap();
    let done = stocked
        .next(&GameInput::VisitDestinationCard(VisitDestinationCardInput {
            card: CardName::Storehouse,
            city_owner: PlayerId::new(0),
        }))
        .unwrap();
    assert_eq!(done.players()[0].resources().twig, 3);
    assert_eq!(
        done.players()[0].get_played_card_infos(CardName::Storehouse)[0]
            .resources
            .twig,
        0
    );
}

#[test]
fn test_fool_lands_in_the_opponents_city() {
    let state = new_game();
    let state = modify_state(&state, |json| {
        give_hand_card(json, 0, CardName::Fool);
        json.players[0].resources = berries(3);
    });

    let mid = state
        .next(&GameInput::PlayCard(PlayCardInput {
            card: CardName::Fool,
            from_meadow: false,
            payment: PaymentOptions {
                resources: berries(3),
                ..Default::default()
            },
        }))
        .unwrap();

    let answered = match &mid.pending_game_inputs()[0] {
        GameInput::SelectPlayer(select) => {
            let mut answered = select.clone();
            answered.client_options.selected_player = Some(PlayerId::new(1));
            GameInput::SelectPlayer(answered)
        }
        other => panic!("expected a player selection, got {:?}", other),
    };
    let done = mid.next(&answered).unwrap();

    assert!(!done.players()[0].has_card_in_city(CardName::Fool));
    assert!(done.players()[1].has_card_in_city(CardName::Fool));
    // And it drags the victim's score down.
    assert_eq!(done.players()[1].get_points(&done), -2);
}

#[test]
fn test_ruins_demolishes_and_refunds() {
    let state = new_game();
    let state = modify_state(&state, |json| {
        give_city_card(json, 0, CardName::Mine);
        give_hand_card(json, 0, CardName::Ruins);
    });

    let mid = state
        .next(&GameInput::PlayCard(PlayCardInput {
            card: CardName::Ruins,
            from_meadow: false,
            payment: PaymentOptions::default(),
        }))
        .unwrap();

    let answered = match &mid.pending_game_inputs()[0] {
        GameInput::SelectPlayedCards(select) => {
            let mut answered = select.clone();
            answered.client_options.selected_cards = vec![select.card_options[0]];
            GameInput::SelectPlayedCards(answered)
        }
        other => panic!("expected a played-card selection, got {:?}", other),
    };
    let hand_before = mid.players()[0].num_cards_in_hand();
    let done = mid.next(&answered).unwrap();

    let player = &done.players()[0];
    assert!(!player.has_card_in_city(CardName::Mine));
    assert!(player.has_card_in_city(CardName::Ruins));
    // Mine's cost came back, plus two cards.
    assert_eq!(player.resources().twig, 1);
    assert_eq!(player.resources().resin, 1);
    assert_eq!(player.resources().pebble, 1);
    assert_eq!(player.num_cards_in_hand(), hand_before + 2);
}

#[test]
fn test_dungeon_discount_imprisons_a_critter() {
    let state = new_game();
    let state = modify_state(&state, |json| {
        give_city_card(json, 0, CardName::Dungeon);
        give_city_card(json, 0, CardName::Wanderer);
        give_hand_card(json, 0, CardName::Farm);
    });

    let done = state
        .next(&GameInput::PlayCard(PlayCardInput {
            card: CardName::Farm,
            from_meadow: false,
            payment: PaymentOptions {
                resources: ResourceMap::default(),
                card_to_dungeon: Some(CardName::Wanderer),
                ..Default::default()
            },
        }))
        .unwrap();

    let player = &done.players()[0];
    assert!(player.has_card_in_city(CardName::Farm));
    assert!(!player.has_card_in_city(CardName::Wanderer));
    assert_eq!(
        player.get_played_card_infos(CardName::Dungeon)[0].paired_cards,
        vec![CardName::Wanderer]
    );
}

#[test]
fn test_scoring_is_idempotent() {
    let state = new_game();
    let state = modify_state(&state, |json| {
        give_city_card(json, 0, CardName::Farm);
        give_city_card(json, 0, CardName::Castle);
        give_city_card(json, 0, CardName::ClockTower);
        json.players[0].resources.vp = 2;
    });
    let snapshot = state.to_json(true);
    let first = state.players()[0].get_points(&state);
    let second = state.players()[0].get_points(&state);
    assert_eq!(first, second);
    // Farm 1 + castle 4 + castle's bonus for one common construction 1 +
    // clock tower's 3 stored VP + 2 loose VP.
    assert_eq!(first, 11);
    assert_eq!(state.to_json(true), snapshot);
}
