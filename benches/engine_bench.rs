//! Engine throughput benchmarks: game setup, the per-transition snapshot
//! clone, and serialization.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use evergrove::game::PlaceWorkerInput;
use evergrove::{GameInput, GameState, LocationName, NewGameOptions};

fn bench_initial_game_state(c: &mut Criterion) {
    c.bench_function("initial_game_state_2p", |b| {
        b.iter(|| {
            GameState::initial(
                black_box(&["Rook", "Wren"]),
                NewGameOptions {
                    seed: 42,
                    shuffle_deck: true,
                },
            )
            .unwrap()
        })
    });
}

fn bench_next_transition(c: &mut Criterion) {
    let state = GameState::initial(
        &["Rook", "Wren"],
        NewGameOptions {
            seed: 42,
            shuffle_deck: true,
        },
    )
    .unwrap();
    let input = GameInput::PlaceWorker(PlaceWorkerInput {
        location: LocationName::BasicOneBerry,
        client_options: Default::default(),
    });

    c.bench_function("next_place_worker", |b| {
        b.iter(|| state.next(black_box(&input)).unwrap())
    });
}

fn bench_snapshot_round_trip(c: &mut Criterion) {
    let state = GameState::initial(
        &["Rook", "Wren"],
        NewGameOptions {
            seed: 42,
            shuffle_deck: true,
        },
    )
    .unwrap();

    c.bench_function("to_json_from_json", |b| {
        b.iter(|| {
            let json = state.to_json(true);
            GameState::from_json(black_box(&json)).unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_initial_game_state,
    bench_next_transition,
    bench_snapshot_round_trip
);
criterion_main!(benches);
