//! The card catalog.
//!
//! Built once at startup and never mutated. Static rules data lives in the
//! entry; behavior hangs off the optional slots. Deck skew: unique cards
//! carry 2 copies, commons 3, with the farm (8) and the husband/wife pair
//! (4 each) over-represented the way the physical deck is.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use super::card::{Card, FixedYield};
use super::effects;
use super::types::{CardName, CardType};
use crate::core::ResourceMap;
use crate::resources;

fn make(
    name: CardName,
    card_type: CardType,
    base_cost: ResourceMap,
    base_vp: i32,
    is_unique: bool,
    is_construction: bool,
    associated_card: Option<CardName>,
) -> Card {
    Card {
        name,
        card_type,
        base_cost,
        base_vp,
        is_unique,
        is_construction,
        associated_card,
        is_open_destination: false,
        max_workers: 1,
        num_in_deck: if is_unique { 2 } else { 3 },
        starting_resources: ResourceMap::new(),
        fixed_yield: None,
        can_play_inner: None,
        play_inner: None,
        points_inner: None,
    }
}

fn yield_of(resources: ResourceMap, num_cards_to_draw: usize) -> Option<FixedYield> {
    Some(FixedYield {
        resources,
        num_cards_to_draw,
    })
}

static CARD_REGISTRY: Lazy<FxHashMap<CardName, Card>> = Lazy::new(|| {
    let mut registry = FxHashMap::default();
    let mut add = |card: Card| {
        let existing = registry.insert(card.name, card);
        assert!(existing.is_none(), "card registered twice");
    };

    add({
        let mut c = make(
            CardName::Architect,
            CardType::Prosperity,
            resources! { berry: 4 },
            2,
            true,
            false,
            Some(CardName::Crane),
        );
        c.points_inner = Some(effects::points_architect);
        c
    });
    add({
        let mut c = make(
            CardName::Bard,
            CardType::Traveler,
            resources! { berry: 3 },
            0,
            true,
            false,
            Some(CardName::Theatre),
        );
        c.play_inner = Some(effects::play_bard);
        c
    });
    add({
        let mut c = make(
            CardName::BargeToad,
            CardType::Production,
            resources! { berry: 2 },
            1,
            false,
            false,
            Some(CardName::TwigBarge),
        );
        c.play_inner = Some(effects::play_barge_toad);
        c
    });
    add({
        let mut c = make(
            CardName::Castle,
            CardType::Prosperity,
            resources! { twig: 2, resin: 3, pebble: 3 },
            4,
            true,
            true,
            Some(CardName::King),
        );
        c.points_inner = Some(effects::points_castle);
        c
    });
    add({
        let mut c = make(
            CardName::Cemetery,
            CardType::Destination,
            resources! { pebble: 2 },
            0,
            true,
            true,
            Some(CardName::Undertaker),
        );
        c.max_workers = 2;
        c.can_play_inner = Some(effects::can_play_cemetery);
        c.play_inner = Some(effects::play_cemetery);
        c
    });
    add({
        let mut c = make(
            CardName::Chapel,
            CardType::Destination,
            resources! { twig: 2, resin: 1, pebble: 1 },
            2,
            true,
            true,
            Some(CardName::Shepherd),
        );
        c.play_inner = Some(effects::play_chapel);
        c
    });
    add({
        let mut c = make(
            CardName::ChipSweep,
            CardType::Production,
            resources! { berry: 3 },
            2,
            false,
            false,
            Some(CardName::ResinRefinery),
        );
        c.play_inner = Some(effects::play_chip_sweep);
        c
    });
    add({
        let mut c = make(
            CardName::ClockTower,
            CardType::Governance,
            resources! { twig: 3, pebble: 1 },
            0,
            true,
            true,
            Some(CardName::Historian),
        );
        c.starting_resources = resources! { vp: 3 };
        c.play_inner = Some(effects::play_clock_tower);
        c
    });
    add({
        let mut c = make(
            CardName::Courthouse,
            CardType::Governance,
            resources! { twig: 1, resin: 1, pebble: 2 },
            2,
            true,
            true,
            Some(CardName::Judge),
        );
        c.play_inner = Some(effects::play_courthouse);
        c
    });
    add(make(
        CardName::Crane,
        CardType::Governance,
        resources! { pebble: 1 },
        1,
        true,
        true,
        Some(CardName::Architect),
    ));
    add({
        let mut c = make(
            CardName::Doctor,
            CardType::Production,
            resources! { berry: 4 },
            4,
            true,
            false,
            Some(CardName::University),
        );
        c.play_inner = Some(effects::play_doctor);
        c
    });
    add(make(
        CardName::Dungeon,
        CardType::Governance,
        resources! { resin: 1, pebble: 2 },
        0,
        true,
        true,
        Some(CardName::Ranger),
    ));
    add({
        let mut c = make(
            CardName::Evertree,
            CardType::Prosperity,
            resources! { twig: 3, resin: 3, pebble: 3 },
            5,
            true,
            true,
            None,
        );
        c.points_inner = Some(effects::points_evertree);
        c
    });
    add({
        let mut c = make(
            CardName::Fairgrounds,
            CardType::Production,
            resources! { twig: 1, resin: 2, pebble: 1 },
            3,
            true,
            true,
            Some(CardName::Fool),
        );
        c.fixed_yield = yield_of(ResourceMap::new(), 2);
        c
    });
    add({
        let mut c = make(
            CardName::Farm,
            CardType::Production,
            resources! { twig: 2, resin: 1 },
            1,
            false,
            true,
            None,
        );
        c.num_in_deck = 8;
        c.fixed_yield = yield_of(resources! { berry: 1 }, 0);
        c
    });
    add({
        let mut c = make(
            CardName::Fool,
            CardType::Traveler,
            resources! { berry: 3 },
            -2,
            true,
            false,
            Some(CardName::Fairgrounds),
        );
        c.can_play_inner = Some(effects::can_play_fool);
        c.play_inner = Some(effects::play_fool);
        c
    });
    add({
        let mut c = make(
            CardName::GeneralStore,
            CardType::Production,
            resources! { resin: 1, pebble: 1 },
            1,
            false,
            true,
            Some(CardName::Shopkeeper),
        );
        c.play_inner = Some(effects::play_general_store);
        c
    });
    add(make(
        CardName::Historian,
        CardType::Governance,
        resources! { berry: 2 },
        1,
        true,
        false,
        Some(CardName::ClockTower),
    ));
    add({
        let mut c = make(
            CardName::Husband,
            CardType::Production,
            resources! { berry: 3 },
            2,
            false,
            false,
            Some(CardName::Farm),
        );
        c.num_in_deck = 4;
        c.play_inner = Some(effects::play_husband);
        c
    });
    add({
        let mut c = make(
            CardName::Inn,
            CardType::Destination,
            resources! { twig: 2, resin: 1 },
            2,
            false,
            true,
            Some(CardName::Innkeeper),
        );
        c.is_open_destination = true;
        c.play_inner = Some(effects::play_inn);
        c
    });
    add(make(
        CardName::Innkeeper,
        CardType::Governance,
        resources! { berry: 1 },
        1,
        true,
        false,
        Some(CardName::Inn),
    ));
    add(make(
        CardName::Judge,
        CardType::Governance,
        resources! { berry: 3 },
        2,
        true,
        false,
        Some(CardName::Courthouse),
    ));
    add({
        let mut c = make(
            CardName::King,
            CardType::Prosperity,
            resources! { berry: 6 },
            4,
            true,
            false,
            Some(CardName::Castle),
        );
        c.points_inner = Some(effects::points_king);
        c
    });
    add({
        let mut c = make(
            CardName::Lookout,
            CardType::Destination,
            resources! { twig: 1, resin: 1, pebble: 1 },
            2,
            true,
            true,
            Some(CardName::Wanderer),
        );
        c.play_inner = Some(effects::play_lookout);
        c
    });
    add({
        let mut c = make(
            CardName::Mine,
            CardType::Production,
            resources! { twig: 1, resin: 1, pebble: 1 },
            2,
            false,
            true,
            Some(CardName::MinerMole),
        );
        c.fixed_yield = yield_of(resources! { pebble: 1 }, 0);
        c
    });
    add({
        let mut c = make(
            CardName::MinerMole,
            CardType::Production,
            resources! { berry: 3 },
            1,
            false,
            false,
            Some(CardName::Mine),
        );
        c.play_inner = Some(effects::play_miner_mole);
        c
    });
    add({
        let mut c = make(
            CardName::Monastery,
            CardType::Destination,
            resources! { twig: 1, resin: 1, pebble: 1 },
            1,
            true,
            true,
            Some(CardName::Monk),
        );
        c.max_workers = 2;
        c.can_play_inner = Some(effects::can_play_monastery);
        c.play_inner = Some(effects::play_monastery);
        c
    });
    add({
        let mut c = make(
            CardName::Monk,
            CardType::Production,
            resources! { berry: 1 },
            0,
            true,
            false,
            Some(CardName::Monastery),
        );
        c.play_inner = Some(effects::play_monk);
        c
    });
    add({
        let mut c = make(
            CardName::Palace,
            CardType::Prosperity,
            resources! { twig: 2, resin: 3, pebble: 3 },
            4,
            true,
            true,
            Some(CardName::Queen),
        );
        c.points_inner = Some(effects::points_palace);
        c
    });
    add({
        let mut c = make(
            CardName::Peddler,
            CardType::Production,
            resources! { berry: 2 },
            1,
            false,
            false,
            Some(CardName::Ruins),
        );
        c.play_inner = Some(effects::play_peddler);
        c
    });
    add({
        let mut c = make(
            CardName::PostOffice,
            CardType::Destination,
            resources! { twig: 1, resin: 2 },
            2,
            false,
            true,
            Some(CardName::PostalPigeon),
        );
        c.is_open_destination = true;
        c.can_play_inner = Some(effects::can_play_post_office);
        c.play_inner = Some(effects::play_post_office);
        c
    });
    add({
        let mut c = make(
            CardName::PostalPigeon,
            CardType::Traveler,
            resources! { berry: 2 },
            0,
            false,
            false,
            Some(CardName::PostOffice),
        );
        c.play_inner = Some(effects::play_postal_pigeon);
        c
    });
    add({
        let mut c = make(
            CardName::Queen,
            CardType::Destination,
            resources! { berry: 5 },
            4,
            true,
            false,
            Some(CardName::Palace),
        );
        c.play_inner = Some(effects::play_queen);
        c
    });
    add({
        let mut c = make(
            CardName::Ranger,
            CardType::Traveler,
            resources! { berry: 2 },
            1,
            true,
            false,
            Some(CardName::Dungeon),
        );
        c.play_inner = Some(effects::play_ranger);
        c
    });
    add({
        let mut c = make(
            CardName::ResinRefinery,
            CardType::Production,
            resources! { resin: 1, pebble: 1 },
            1,
            false,
            true,
            Some(CardName::ChipSweep),
        );
        c.fixed_yield = yield_of(resources! { resin: 1 }, 0);
        c
    });
    add({
        let mut c = make(
            CardName::Ruins,
            CardType::Traveler,
            ResourceMap::new(),
            0,
            false,
            true,
            Some(CardName::Peddler),
        );
        c.can_play_inner = Some(effects::can_play_ruins);
        c.play_inner = Some(effects::play_ruins);
        c
    });
    add({
        let mut c = make(
            CardName::School,
            CardType::Prosperity,
            resources! { twig: 2, resin: 2 },
            2,
            true,
            true,
            Some(CardName::Teacher),
        );
        c.points_inner = Some(effects::points_school);
        c
    });
    add({
        let mut c = make(
            CardName::Shepherd,
            CardType::Traveler,
            resources! { berry: 3 },
            1,
            true,
            false,
            Some(CardName::Chapel),
        );
        c.play_inner = Some(effects::play_shepherd);
        c
    });
    add(make(
        CardName::Shopkeeper,
        CardType::Governance,
        resources! { berry: 2 },
        1,
        true,
        false,
        Some(CardName::GeneralStore),
    ));
    add({
        let mut c = make(
            CardName::Storehouse,
            CardType::Production,
            resources! { twig: 1, resin: 1, pebble: 1 },
            2,
            false,
            true,
            Some(CardName::Woodcarver),
        );
        c.play_inner = Some(effects::play_storehouse);
        c
    });
    add({
        let mut c = make(
            CardName::Teacher,
            CardType::Production,
            resources! { berry: 2 },
            2,
            false,
            false,
            Some(CardName::School),
        );
        c.play_inner = Some(effects::play_teacher);
        c
    });
    add({
        let mut c = make(
            CardName::Theatre,
            CardType::Prosperity,
            resources! { twig: 3, resin: 1, pebble: 1 },
            3,
            true,
            true,
            Some(CardName::Bard),
        );
        c.points_inner = Some(effects::points_theatre);
        c
    });
    add({
        let mut c = make(
            CardName::TwigBarge,
            CardType::Production,
            resources! { twig: 1, pebble: 1 },
            1,
            false,
            true,
            Some(CardName::BargeToad),
        );
        c.fixed_yield = yield_of(resources! { twig: 2 }, 0);
        c
    });
    add({
        let mut c = make(
            CardName::Undertaker,
            CardType::Traveler,
            resources! { berry: 2 },
            1,
            true,
            false,
            Some(CardName::Cemetery),
        );
        c.play_inner = Some(effects::play_undertaker);
        c
    });
    add({
        let mut c = make(
            CardName::University,
            CardType::Destination,
            resources! { resin: 1, pebble: 2 },
            3,
            true,
            true,
            Some(CardName::Doctor),
        );
        c.play_inner = Some(effects::play_university);
        c
    });
    add({
        let mut c = make(
            CardName::Wanderer,
            CardType::Traveler,
            resources! { berry: 2 },
            1,
            false,
            false,
            Some(CardName::Lookout),
        );
        c.fixed_yield = yield_of(ResourceMap::new(), 3);
        c
    });
    add({
        let mut c = make(
            CardName::Wife,
            CardType::Prosperity,
            resources! { berry: 2 },
            2,
            false,
            false,
            Some(CardName::Farm),
        );
        c.num_in_deck = 4;
        c.points_inner = Some(effects::points_wife);
        c
    });
    add({
        let mut c = make(
            CardName::Woodcarver,
            CardType::Production,
            resources! { berry: 2 },
            2,
            false,
            false,
            Some(CardName::Storehouse),
        );
        c.play_inner = Some(effects::play_woodcarver);
        c
    });

    assert_eq!(registry.len(), CardName::ALL.len(), "catalog is incomplete");
    registry
});

/// Look up a card definition.
#[must_use]
pub fn card(name: CardName) -> &'static Card {
    CARD_REGISTRY
        .get(&name)
        .expect("every card name has a catalog entry")
}

/// Iterate over every card definition.
pub fn all_cards() -> impl Iterator<Item = &'static Card> {
    CardName::ALL.iter().map(|name| card(*name))
}

/// The full deck, unshuffled: each card repeated by its copy count.
#[must_use]
pub fn build_deck() -> Vec<CardName> {
    let mut deck = Vec::new();
    for definition in all_cards() {
        for _ in 0..definition.num_in_deck {
            deck.push(definition.name);
        }
    }
    deck
}
