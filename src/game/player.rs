//! Per-player state: hand, city, resources, workers, season.
//!
//! The `Player` owns every mutable fact about one participant. Card,
//! location, and event effects read and write players through the
//! `GameState`; nothing here reaches back into the shared piles, which keeps
//! borrow scopes small and the ownership story obvious.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::{Card, CardName, CardType, PlayedCardInfo, Season};
use crate::core::{EngineError, PlayerId, ResourceMap, ResourceType, Result};
use crate::events::{Event, EventName, PlayedEventInfo};
use crate::game::input::{PlayCardInput, PlayedCardId, WorkerPlacement};
use crate::game::GameState;

/// Hand limit; cards drawn past it go straight to the discard pile.
pub const MAX_HAND_SIZE: usize = 8;

/// City size cap. Husband/wife pairs share a slot and the wanderer is
/// exempt.
pub const MAX_CITY_SIZE: usize = 15;

/// Workers each player starts the game with.
pub const STARTING_WORKERS: u8 = 2;

/// Where a player is in their lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerStatus {
    #[default]
    DuringSeason,
    /// A season change was requested and resolves once the pending-input
    /// queue drains.
    PreparingForSeason,
    /// Passed out of the game for good.
    GameEnded,
}

/// The discount applied while validating a payment. Discounts are exclusive;
/// at most one is in effect for a given payment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymentDiscount {
    None,
    /// Pay up to N fewer berries (the innkeeper).
    Berries(u32),
    /// Pay up to N fewer resources of any kind (dungeon, inn, crane, ...).
    Wild(u32),
}

/// One participant's mutable state.
#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    name: String,
    id: PlayerId,
    cards_in_hand: Vec<CardName>,
    resources: ResourceMap,
    played_cards: BTreeMap<CardName, Vec<PlayedCardInfo>>,
    claimed_events: BTreeMap<EventName, PlayedEventInfo>,
    num_workers: u8,
    placed_workers: SmallVec<[WorkerPlacement; 6]>,
    current_season: Season,
    status: PlayerStatus,
}

impl Player {
    /// A fresh winter player with two workers and nothing else.
    #[must_use]
    pub fn new(name: impl Into<String>, id: PlayerId) -> Self {
        Self {
            name: name.into(),
            id,
            cards_in_hand: Vec::new(),
            resources: ResourceMap::new(),
            played_cards: BTreeMap::new(),
            claimed_events: BTreeMap::new(),
            num_workers: STARTING_WORKERS,
            placed_workers: SmallVec::new(),
            current_season: Season::Winter,
            status: PlayerStatus::DuringSeason,
        }
    }

    /// Rebuild a player from snapshot parts.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub(crate) fn from_parts(
        name: String,
        id: PlayerId,
        cards_in_hand: Vec<CardName>,
        resources: ResourceMap,
        played_cards: BTreeMap<CardName, Vec<PlayedCardInfo>>,
        claimed_events: BTreeMap<EventName, PlayedEventInfo>,
        num_workers: u8,
        placed_workers: SmallVec<[WorkerPlacement; 6]>,
        current_season: Season,
        status: PlayerStatus,
    ) -> Self {
        Self {
            name,
            id,
            cards_in_hand,
            resources,
            played_cards,
            claimed_events,
            num_workers,
            placed_workers,
            current_season,
            status,
        }
    }

    // === Identity & status ===

    #[must_use]
    pub fn id(&self) -> PlayerId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn current_season(&self) -> Season {
        self.current_season
    }

    #[must_use]
    pub fn status(&self) -> PlayerStatus {
        self.status
    }

    pub(crate) fn set_status(&mut self, status: PlayerStatus) {
        self.status = status;
    }

    /// Advance to the next season, granting its workers.
    pub(crate) fn advance_season(&mut self) -> Result<Season> {
        let next = self.current_season.next().ok_or_else(|| {
            EngineError::illegal("no season left to prepare for after autumn")
        })?;
        self.current_season = next;
        self.num_workers += next.workers_granted();
        Ok(next)
    }

    // === Hand ===

    #[must_use]
    pub fn cards_in_hand(&self) -> &[CardName] {
        &self.cards_in_hand
    }

    #[must_use]
    pub fn num_cards_in_hand(&self) -> usize {
        self.cards_in_hand.len()
    }

    /// Add a card to the hand. Returns the card back when the hand is full;
    /// the caller routes it to the discard pile.
    pub fn add_card_to_hand(&mut self, card: CardName) -> Option<CardName> {
        if self.cards_in_hand.len() < MAX_HAND_SIZE {
            self.cards_in_hand.push(card);
            None
        } else {
            Some(card)
        }
    }

    /// Remove one copy of `card` from the hand.
    pub fn remove_card_from_hand(&mut self, card: CardName) -> Result<()> {
        match self.cards_in_hand.iter().position(|&c| c == card) {
            Some(idx) => {
                self.cards_in_hand.remove(idx);
                Ok(())
            }
            None => Err(EngineError::invalid(format!(
                "unable to discard {}: not in hand",
                card
            ))),
        }
    }

    // === City ===

    #[must_use]
    pub fn played_cards(&self) -> &BTreeMap<CardName, Vec<PlayedCardInfo>> {
        &self.played_cards
    }

    #[must_use]
    pub fn has_card_in_city(&self, card: CardName) -> bool {
        !self.get_played_card_infos(card).is_empty()
    }

    #[must_use]
    pub fn get_played_card_infos(&self, card: CardName) -> &[PlayedCardInfo] {
        self.played_cards.get(&card).map_or(&[], Vec::as_slice)
    }

    pub(crate) fn get_played_card_infos_mut(&mut self, card: CardName) -> &mut Vec<PlayedCardInfo> {
        self.played_cards.entry(card).or_default()
    }

    /// Iterate over every played copy in the city.
    pub fn iter_played_cards(&self) -> impl Iterator<Item = &PlayedCardInfo> {
        self.played_cards.values().flatten()
    }

    /// Number of city slots currently occupied. The wanderer takes no slot
    /// and a husband/wife pair shares one.
    #[must_use]
    pub fn num_occupied_city_spaces(&self) -> usize {
        let occupied = self
            .iter_played_cards()
            .filter(|info| info.card != CardName::Wanderer)
            .count();
        occupied - self.num_husband_wife_pairs()
    }

    #[must_use]
    pub fn num_husband_wife_pairs(&self) -> usize {
        let husbands = self.get_played_card_infos(CardName::Husband).len();
        let wives = self.get_played_card_infos(CardName::Wife).len();
        husbands.min(wives)
    }

    /// Whether `card` fits in the city right now.
    #[must_use]
    pub fn can_add_to_city(&self, card: CardName) -> bool {
        let definition = Card::from_name(card);
        if definition.is_unique && self.has_card_in_city(card) {
            return false;
        }
        if card == CardName::Wanderer {
            return true;
        }
        // A new wife/husband completing a pair shares the partner's slot.
        let completes_pair = match card {
            CardName::Husband => {
                self.get_played_card_infos(CardName::Husband).len()
                    < self.get_played_card_infos(CardName::Wife).len()
            }
            CardName::Wife => {
                self.get_played_card_infos(CardName::Wife).len()
                    < self.get_played_card_infos(CardName::Husband).len()
            }
            _ => false,
        };
        if completes_pair {
            return true;
        }
        self.num_occupied_city_spaces() < MAX_CITY_SIZE
    }

    /// Put a fresh copy of `card` into the city.
    pub fn add_to_city(&mut self, card: CardName) -> Result<()> {
        if !self.can_add_to_city(card) {
            return Err(EngineError::illegal(format!(
                "unable to add {} to city",
                card
            )));
        }
        let info = Card::from_name(card).fresh_played_info();
        self.played_cards.entry(card).or_default().push(info);
        Ok(())
    }

    /// Remove the most recent copy of `card` from the city.
    ///
    /// Returns every card that left the city: the card itself plus anything
    /// paired under it (dungeon prisoners). The caller decides whether the
    /// removed cards hit the discard pile.
    pub fn remove_card_from_city(&mut self, card: CardName) -> Result<Vec<CardName>> {
        let infos = self.played_cards.get_mut(&card).ok_or_else(|| {
            EngineError::invalid(format!("unable to remove {}: not in city", card))
        })?;
        let info = infos
            .pop()
            .ok_or_else(|| EngineError::invalid(format!("unable to remove {}: not in city", card)))?;
        if infos.is_empty() {
            self.played_cards.remove(&card);
        }
        let mut removed = vec![card];
        removed.extend(info.paired_cards);
        Ok(removed)
    }

    /// Mark an unused copy of `construction` as having paid for its critter.
    pub fn use_construction_to_play_critter(&mut self, construction: CardName) -> Result<()> {
        if !Card::from_name(construction).is_construction {
            return Err(EngineError::invalid("can only occupy a construction"));
        }
        let info = self
            .played_cards
            .get_mut(&construction)
            .and_then(|infos| infos.iter_mut().find(|info| !info.is_occupied))
            .ok_or_else(|| EngineError::illegal("no unoccupied construction found"))?;
        info.is_occupied = true;
        Ok(())
    }

    #[must_use]
    pub fn has_unused_by_critter_construction(&self, construction: CardName) -> bool {
        Card::from_name(construction).is_construction
            && self
                .get_played_card_infos(construction)
                .iter()
                .any(|info| !info.is_occupied)
    }

    /// Critters currently in the city, one entry per copy.
    #[must_use]
    pub fn get_played_critters(&self) -> Vec<CardName> {
        self.iter_played_cards()
            .filter(|info| Card::from_name(info.card).is_critter())
            .map(|info| info.card)
            .collect()
    }

    /// Number of played cards (copies) of the given type.
    #[must_use]
    pub fn get_num_card_type(&self, card_type: CardType) -> usize {
        self.iter_played_cards()
            .filter(|info| Card::from_name(info.card).card_type == card_type)
            .count()
    }

    /// Production cards in the city, one entry per copy.
    #[must_use]
    pub fn get_played_production_cards(&self) -> Vec<CardName> {
        self.iter_played_cards()
            .filter(|info| Card::from_name(info.card).card_type == CardType::Production)
            .map(|info| info.card)
            .collect()
    }

    /// Whether the dungeon has a free cell and a critter to put in it.
    #[must_use]
    pub fn can_invoke_dungeon(&self) -> bool {
        let dungeon = match self.get_played_card_infos(CardName::Dungeon).first() {
            Some(info) => info,
            None => return false,
        };
        let num_dungeoned = dungeon.paired_cards.len();
        let max_dungeoned = if self.has_card_in_city(CardName::Ranger) {
            2
        } else {
            1
        };

        // Need a critter to imprison; the ranger can't lock itself up to
        // open its own second cell.
        let critters = self.get_played_critters();
        if critters.is_empty() || (critters == [CardName::Ranger]) {
            return false;
        }
        num_dungeoned < max_dungeoned
    }

    /// Move a critter from the city into the dungeon.
    pub fn imprison_in_dungeon(&mut self, critter: CardName) -> Result<()> {
        if !self.can_invoke_dungeon() {
            return Err(EngineError::invalid("cannot use dungeon"));
        }
        if !Card::from_name(critter).is_critter() {
            return Err(EngineError::invalid("can only dungeon a critter"));
        }
        if !self.has_card_in_city(critter) {
            return Err(EngineError::invalid(format!("{} is not in city", critter)));
        }
        self.remove_card_from_city(critter)?;
        let dungeon = self
            .played_cards
            .get_mut(&CardName::Dungeon)
            .and_then(|infos| infos.first_mut())
            .ok_or_else(|| EngineError::invariant("dungeon disappeared"))?;
        dungeon.paired_cards.push(critter);
        Ok(())
    }

    // === Destination cards ===

    /// Destination cards (storehouse included) in the city, deduplicated.
    #[must_use]
    pub fn get_all_destination_cards(&self) -> Vec<CardName> {
        let mut cards: Vec<CardName> = self
            .iter_played_cards()
            .filter(|info| Card::from_name(info.card).can_take_worker())
            .map(|info| info.card)
            .collect();
        cards.dedup();
        cards
    }

    /// Whether some copy of `card` has room for another worker.
    #[must_use]
    pub fn has_space_on_destination_card(&self, card: CardName) -> bool {
        self.get_played_card_infos(card)
            .iter()
            .any(PlayedCardInfo::has_worker_space)
    }

    /// Destinations this player owns with space, that only they may visit.
    #[must_use]
    pub fn get_available_closed_destination_cards(&self) -> Vec<CardName> {
        self.get_all_destination_cards()
            .into_iter()
            .filter(|&card| {
                !Card::from_name(card).is_open_destination
                    && self.has_space_on_destination_card(card)
            })
            .collect()
    }

    /// Open destinations this player owns with space; anyone may visit.
    #[must_use]
    pub fn get_available_open_destination_cards(&self) -> Vec<CardName> {
        self.get_all_destination_cards()
            .into_iter()
            .filter(|&card| {
                Card::from_name(card).is_open_destination
                    && self.has_space_on_destination_card(card)
            })
            .collect()
    }

    /// Whether this player can put a worker on their own copy of `card`.
    #[must_use]
    pub fn can_place_worker_on_own_card(&self, card: CardName) -> bool {
        self.num_available_workers() > 0
            && self.has_card_in_city(card)
            && self.has_space_on_destination_card(card)
    }

    /// Record a visiting worker on the first copy of `card` with space.
    pub(crate) fn host_worker_on_card(&mut self, card: CardName, visitor: PlayerId) -> Result<()> {
        let info = self
            .played_cards
            .get_mut(&card)
            .and_then(|infos| infos.iter_mut().find(|info| info.has_worker_space()))
            .ok_or_else(|| {
                EngineError::illegal(format!("no space for a worker on {}", card))
            })?;
        info.workers.push(visitor);
        Ok(())
    }

    /// Remove a visiting worker from some copy of `card`.
    pub(crate) fn unhost_worker_on_card(&mut self, card: CardName, visitor: PlayerId) -> Result<()> {
        let infos = self.played_cards.get_mut(&card).ok_or_else(|| {
            EngineError::invariant(format!("couldn't find {} to recall a worker from", card))
        })?;
        for info in infos.iter_mut() {
            if let Some(idx) = info.workers.iter().position(|&w| w == visitor) {
                info.workers.remove(idx);
                return Ok(());
            }
        }
        Err(EngineError::invariant(format!(
            "couldn't find worker on {}",
            card
        )))
    }

    // === Workers ===

    #[must_use]
    pub fn num_workers(&self) -> u8 {
        self.num_workers
    }

    #[must_use]
    pub fn num_available_workers(&self) -> usize {
        self.num_workers as usize - self.placed_workers.len()
    }

    #[must_use]
    pub fn placed_workers(&self) -> &[WorkerPlacement] {
        &self.placed_workers
    }

    /// Record a worker placement.
    pub(crate) fn place_worker(&mut self, placement: WorkerPlacement) -> Result<()> {
        if self.num_available_workers() == 0 {
            return Err(EngineError::illegal("cannot place worker: none available"));
        }
        self.placed_workers.push(placement);
        Ok(())
    }

    /// Forget a previously recorded placement.
    pub(crate) fn remove_placed_worker(&mut self, placement: &WorkerPlacement) -> Result<()> {
        match self.placed_workers.iter().position(|p| p == placement) {
            Some(idx) => {
                self.placed_workers.remove(idx);
                Ok(())
            }
            None => Err(EngineError::invariant(format!(
                "couldn't find placed worker {:?}",
                placement
            ))),
        }
    }

    /// Placements a season-change recall brings home. Workers in the
    /// cemetery and monastery are committed for good.
    #[must_use]
    pub fn recallable_workers(&self) -> Vec<WorkerPlacement> {
        self.placed_workers
            .iter()
            .filter(|placement| {
                !matches!(
                    placement,
                    WorkerPlacement::Card {
                        card: CardName::Cemetery | CardName::Monastery,
                        ..
                    }
                )
            })
            .copied()
            .collect()
    }

    // === Resources ===

    #[must_use]
    pub fn resources(&self) -> &ResourceMap {
        &self.resources
    }

    #[must_use]
    pub fn num_resources_by_type(&self, ty: ResourceType) -> u32 {
        self.resources.get(ty)
    }

    pub fn gain_resources(&mut self, gained: &ResourceMap) {
        self.resources.add_all(gained);
    }

    pub fn spend_resources(&mut self, spent: &ResourceMap) -> Result<()> {
        self.resources.checked_sub_all(spent)
    }

    // === Affordability & payment ===

    /// Whether any legal payment exists for `card`, discounts included.
    ///
    /// This is a probe used while enumerating legal inputs, so it never
    /// errors on overpayment; strict checking happens when an actual payment
    /// is submitted.
    #[must_use]
    pub fn can_afford_card(&self, card: CardName, from_meadow: bool) -> bool {
        let definition = Card::from_name(card);

        // A matching unused construction lets a critter in for free.
        if definition.is_critter() {
            if self.has_unused_by_critter_construction(CardName::Evertree) {
                return true;
            }
            if let Some(associated) = definition.associated_card {
                if self.has_unused_by_critter_construction(associated) {
                    return true;
                }
            }
        }

        // The queen hosts cheap cards for free.
        if definition.base_vp <= 3 && self.can_place_worker_on_own_card(CardName::Queen) {
            return true;
        }

        // Innkeeper: 3 berries off a critter.
        if definition.base_cost.berry > 0
            && definition.is_critter()
            && self.has_card_in_city(CardName::Innkeeper)
            && matches!(
                self.is_paid_resources_valid(
                    &self.resources,
                    &definition.base_cost,
                    PaymentDiscount::Berries(3),
                    false,
                ),
                Ok(true)
            )
        {
            return true;
        }

        let wild_discount = self.can_invoke_dungeon()
            || (from_meadow && self.can_place_worker_on_own_card(CardName::Inn))
            || (definition.is_construction && self.has_card_in_city(CardName::Crane));
        let discount = if wild_discount {
            PaymentDiscount::Wild(3)
        } else {
            PaymentDiscount::None
        };
        matches!(
            self.is_paid_resources_valid(&self.resources, &definition.base_cost, discount, false),
            Ok(true)
        )
    }

    /// The payment-validation algorithm.
    ///
    /// Nets `paid` against the cost resource-by-resource after applying the
    /// discount; shortfalls accumulate as outstanding debt. The payment is
    /// valid when the debt is zero, when a wild discount covers it, or when
    /// the judge substitutes for exactly one unit. With `error_if_overpay`,
    /// any leftover beyond the exact cost is an error rather than a
    /// rejection, because callers submitting real payments must compute them
    /// exactly.
    pub fn is_paid_resources_valid(
        &self,
        paid: &ResourceMap,
        cost: &ResourceMap,
        discount: PaymentDiscount,
        error_if_overpay: bool,
    ) -> Result<bool> {
        let mut need_to_pay = ResourceMap::new();
        let mut paying_with = ResourceMap::new();
        for ty in ResourceType::MATERIALS {
            need_to_pay.set(ty, cost.get(ty));
            paying_with.set(ty, paid.get(ty));
        }

        let need_to_pay_sum = need_to_pay.total_materials();
        let paying_with_sum = paying_with.total_materials();

        // Discounts come off the requirement first.
        if let PaymentDiscount::Berries(n) = discount {
            need_to_pay.set(
                ResourceType::Berry,
                need_to_pay.get(ResourceType::Berry).saturating_sub(n),
            );
        }

        let mut outstanding_owed = ResourceMap::new();
        for ty in ResourceType::MATERIALS {
            let needed = need_to_pay.get(ty);
            let available = paying_with.get(ty);
            if needed <= available {
                paying_with.set(ty, available - needed);
            } else {
                outstanding_owed.set(ty, needed - available);
                paying_with.set(ty, 0);
            }
        }

        let outstanding_owed_sum = outstanding_owed.total_materials();
        let paying_with_remainder_sum = paying_with.total_materials();

        if let PaymentDiscount::Wild(n) = discount {
            if outstanding_owed_sum <= n {
                if error_if_overpay && paying_with_sum != 0 && paying_with_sum + n > need_to_pay_sum
                {
                    return Err(EngineError::Overpay);
                }
                return Ok(true);
            }
        }

        // The judge substitutes one resource for another, but only when no
        // other discount is in effect.
        if discount == PaymentDiscount::None && self.has_card_in_city(CardName::Judge) {
            if outstanding_owed_sum == 1 && paying_with_remainder_sum >= 1 {
                if error_if_overpay && paying_with_remainder_sum != 1 {
                    return Err(EngineError::Overpay);
                }
                return Ok(true);
            }
        }

        if outstanding_owed_sum == 0 && paying_with_remainder_sum != 0 && error_if_overpay {
            return Err(EngineError::Overpay);
        }
        Ok(outstanding_owed_sum == 0)
    }

    /// Validate a submitted payment for a `PLAY_CARD` input, strictly.
    pub fn is_payment_options_valid(&self, play: &PlayCardInput) -> Result<()> {
        let definition = Card::from_name(play.card);
        let payment = &play.payment;

        for ty in ResourceType::MATERIALS {
            if self.num_resources_by_type(ty) < payment.resources.get(ty) {
                return Err(EngineError::illegal(format!(
                    "can't spend {} {}",
                    payment.resources.get(ty),
                    ty
                )));
            }
        }

        if let Some(card_to_dungeon) = payment.card_to_dungeon {
            if !self.can_invoke_dungeon() {
                return Err(EngineError::invalid("cannot use dungeon"));
            }
            if !Card::from_name(card_to_dungeon).is_critter() {
                return Err(EngineError::invalid("can only dungeon a critter"));
            }
            if !self.has_card_in_city(card_to_dungeon) {
                return Err(EngineError::invalid(format!(
                    "{} is not in city",
                    card_to_dungeon
                )));
            }
            return self
                .expect_valid(payment.resources, definition.base_cost, PaymentDiscount::Wild(3));
        }

        if let Some(card_to_use) = payment.card_to_use {
            if !self.has_card_in_city(card_to_use) {
                return Err(EngineError::invalid(format!(
                    "cannot use {}: not in city",
                    card_to_use
                )));
            }
            return match card_to_use {
                CardName::Crane => {
                    if !definition.is_construction {
                        return Err(EngineError::invalid(format!(
                            "cannot use Crane on {}",
                            definition.name
                        )));
                    }
                    self.expect_valid(
                        payment.resources,
                        definition.base_cost,
                        PaymentDiscount::Wild(3),
                    )
                }
                CardName::Innkeeper => {
                    if !definition.is_critter() {
                        return Err(EngineError::invalid(format!(
                            "cannot use Innkeeper on {}",
                            definition.name
                        )));
                    }
                    self.expect_valid(
                        payment.resources,
                        definition.base_cost,
                        PaymentDiscount::Berries(3),
                    )
                }
                CardName::Queen => {
                    if definition.base_vp > 3 {
                        return Err(EngineError::invalid(format!(
                            "cannot use Queen to play {}",
                            definition.name
                        )));
                    }
                    if !self.can_place_worker_on_own_card(CardName::Queen) {
                        return Err(EngineError::invalid("cannot place a worker on the Queen"));
                    }
                    if !payment.resources.is_empty() {
                        return Err(EngineError::Overpay);
                    }
                    Ok(())
                }
                CardName::Inn => {
                    if !play.from_meadow {
                        return Err(EngineError::invalid(
                            "cannot use Inn on a non-meadow card",
                        ));
                    }
                    if !self.can_place_worker_on_own_card(CardName::Inn) {
                        return Err(EngineError::invalid("cannot place a worker on the Inn"));
                    }
                    self.expect_valid(
                        payment.resources,
                        definition.base_cost,
                        PaymentDiscount::Wild(3),
                    )
                }
                other => Err(EngineError::invalid(format!(
                    "unexpected payment card: {}",
                    other
                ))),
            };
        }

        // A critter entering via its unused associated construction pays
        // nothing.
        if definition.is_critter() && payment.resources.is_empty() {
            let via_evertree = self.has_unused_by_critter_construction(CardName::Evertree);
            let via_associated = definition
                .associated_card
                .is_some_and(|associated| self.has_unused_by_critter_construction(associated));
            if via_evertree || via_associated {
                return Ok(());
            }
        }

        self.expect_valid(payment.resources, definition.base_cost, PaymentDiscount::None)
    }

    fn expect_valid(
        &self,
        paid: ResourceMap,
        cost: ResourceMap,
        discount: PaymentDiscount,
    ) -> Result<()> {
        if self.is_paid_resources_valid(&paid, &cost, discount, true)? {
            Ok(())
        } else {
            Err(EngineError::illegal("payment does not cover the card's cost"))
        }
    }

    // === Events ===

    #[must_use]
    pub fn claimed_events(&self) -> &BTreeMap<EventName, PlayedEventInfo> {
        &self.claimed_events
    }

    #[must_use]
    pub fn has_claimed_event(&self, event: EventName) -> bool {
        self.claimed_events.contains_key(&event)
    }

    pub(crate) fn record_claimed_event(&mut self, event: EventName) {
        self.claimed_events.insert(event, PlayedEventInfo::default());
    }

    pub(crate) fn claimed_event_info_mut(&mut self, event: EventName) -> Result<&mut PlayedEventInfo> {
        self.claimed_events
            .get_mut(&event)
            .ok_or_else(|| EngineError::invariant(format!("cannot find event info for {}", event)))
    }

    // === Scoring ===

    /// Total points: city cards, point tokens stored on them, claimed
    /// events, and loose VP. Pure.
    ///
    /// A card's scoring slot covers every copy of that card at once, so it
    /// runs once per card name rather than once per copy.
    #[must_use]
    pub fn get_points(&self, game_state: &GameState) -> i32 {
        let mut total = 0i32;
        for (card, infos) in &self.played_cards {
            let definition = Card::from_name(*card);
            total += definition.base_vp * infos.len() as i32;
            if let Some(points_inner) = definition.points_inner {
                total += points_inner(game_state, self.id);
            }
            for info in infos {
                total += info.resources.vp as i32;
            }
        }
        for event in self.claimed_events.keys() {
            total += Event::from_name(*event).points(game_state, self.id);
        }
        total += self.resources.vp as i32;
        total
    }

    /// Every played copy as a `PlayedCardId`, for selection options.
    #[must_use]
    pub fn all_played_card_ids(&self) -> Vec<PlayedCardId> {
        self.iter_played_cards()
            .map(|info| PlayedCardId {
                city_owner: self.id,
                card: info.card,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources;

    fn player() -> Player {
        Player::new("Rook", PlayerId::new(0))
    }

    #[test]
    fn test_new_player_defaults() {
        let p = player();
        assert_eq!(p.current_season(), Season::Winter);
        assert_eq!(p.num_workers(), STARTING_WORKERS);
        assert_eq!(p.num_available_workers(), 2);
        assert_eq!(p.resources().total(), 0);
        assert_eq!(p.num_cards_in_hand(), 0);
    }

    #[test]
    fn test_hand_overflow_returns_card() {
        let mut p = player();
        for _ in 0..MAX_HAND_SIZE {
            assert_eq!(p.add_card_to_hand(CardName::Farm), None);
        }
        assert_eq!(p.add_card_to_hand(CardName::Mine), Some(CardName::Mine));
        assert_eq!(p.num_cards_in_hand(), MAX_HAND_SIZE);
    }

    #[test]
    fn test_remove_card_from_hand_missing() {
        let mut p = player();
        let err = p.remove_card_from_hand(CardName::Farm).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn test_unique_card_blocks_second_copy() {
        let mut p = player();
        p.add_to_city(CardName::Queen).unwrap();
        assert!(!p.can_add_to_city(CardName::Queen));
        assert!(p.can_add_to_city(CardName::Farm));
    }

    #[test]
    fn test_husband_wife_share_a_slot() {
        let mut p = player();
        p.add_to_city(CardName::Husband).unwrap();
        p.add_to_city(CardName::Wife).unwrap();
        assert_eq!(p.num_husband_wife_pairs(), 1);
        assert_eq!(p.num_occupied_city_spaces(), 1);
    }

    #[test]
    fn test_wanderer_takes_no_slot() {
        let mut p = player();
        p.add_to_city(CardName::Wanderer).unwrap();
        assert_eq!(p.num_occupied_city_spaces(), 0);
    }

    #[test]
    fn test_city_cap() {
        let mut p = player();
        for _ in 0..MAX_CITY_SIZE {
            p.add_to_city(CardName::Farm).unwrap();
        }
        assert!(!p.can_add_to_city(CardName::Mine));
        // The wanderer still fits.
        assert!(p.can_add_to_city(CardName::Wanderer));
        // A wife pairing with a husband would too, if one were present.
        assert!(p.add_to_city(CardName::Mine).is_err());
    }

    #[test]
    fn test_construction_occupancy() {
        let mut p = player();
        p.add_to_city(CardName::Farm).unwrap();
        assert!(p.has_unused_by_critter_construction(CardName::Farm));
        p.use_construction_to_play_critter(CardName::Farm).unwrap();
        assert!(!p.has_unused_by_critter_construction(CardName::Farm));
        assert!(p.use_construction_to_play_critter(CardName::Farm).is_err());
    }

    #[test]
    fn test_spend_resources_checked() {
        let mut p = player();
        p.gain_resources(&resources! { twig: 2 });
        assert!(p.spend_resources(&resources! { twig: 3 }).is_err());
        p.spend_resources(&resources! { twig: 2 }).unwrap();
        assert_eq!(p.resources().twig, 0);
    }

    #[test]
    fn test_worker_ledger() {
        let mut p = player();
        let placement = WorkerPlacement::Location {
            location: crate::locations::LocationName::BasicOneBerry,
        };
        p.place_worker(placement).unwrap();
        assert_eq!(p.num_available_workers(), 1);
        p.place_worker(WorkerPlacement::Event {
            event: EventName::BasicThreeTraveler,
        })
        .unwrap();
        assert_eq!(p.num_available_workers(), 0);
        assert!(p
            .place_worker(WorkerPlacement::Location {
                location: crate::locations::LocationName::Haven,
            })
            .is_err());

        p.remove_placed_worker(&placement).unwrap();
        assert_eq!(p.num_available_workers(), 1);
    }

    #[test]
    fn test_cemetery_workers_not_recallable() {
        let mut p = player();
        p.place_worker(WorkerPlacement::Card {
            card: CardName::Cemetery,
            city_owner: PlayerId::new(0),
        })
        .unwrap();
        p.place_worker(WorkerPlacement::Location {
            location: crate::locations::LocationName::BasicTwoResin,
        })
        .unwrap();
        let recallable = p.recallable_workers();
        assert_eq!(recallable.len(), 1);
        assert!(matches!(recallable[0], WorkerPlacement::Location { .. }));
    }

    #[test]
    fn test_season_advance_grants_workers() {
        let mut p = player();
        assert_eq!(p.advance_season().unwrap(), Season::Spring);
        assert_eq!(p.num_workers(), 3);
        assert_eq!(p.advance_season().unwrap(), Season::Summer);
        assert_eq!(p.num_workers(), 4);
        assert_eq!(p.advance_season().unwrap(), Season::Autumn);
        assert_eq!(p.num_workers(), 6);
        assert!(p.advance_season().is_err());
    }

    #[test]
    fn test_dungeon_requires_critter_and_cell() {
        let mut p = player();
        assert!(!p.can_invoke_dungeon());
        p.add_to_city(CardName::Dungeon).unwrap();
        assert!(!p.can_invoke_dungeon()); // no critter to imprison
        p.add_to_city(CardName::Wanderer).unwrap();
        assert!(p.can_invoke_dungeon());

        p.imprison_in_dungeon(CardName::Wanderer).unwrap();
        assert!(!p.has_card_in_city(CardName::Wanderer));
        assert_eq!(
            p.get_played_card_infos(CardName::Dungeon)[0].paired_cards,
            vec![CardName::Wanderer]
        );
        // Cell now full (no ranger).
        assert!(!p.can_invoke_dungeon());
    }

    #[test]
    fn test_payment_exact() {
        let p = player();
        let paid = resources! { twig: 2, resin: 1 };
        let cost = resources! { twig: 2, resin: 1 };
        assert!(p
            .is_paid_resources_valid(&paid, &cost, PaymentDiscount::None, true)
            .unwrap());
    }

    #[test]
    fn test_payment_overpay_errors_when_strict() {
        let p = player();
        let paid = resources! { twig: 3 };
        let cost = resources! { twig: 2 };
        let err = p
            .is_paid_resources_valid(&paid, &cost, PaymentDiscount::None, true)
            .unwrap_err();
        assert!(matches!(err, EngineError::Overpay));
        // Lenient mode accepts the same payment: the cost is covered.
        assert!(p
            .is_paid_resources_valid(&paid, &cost, PaymentDiscount::None, false)
            .unwrap());
    }

    #[test]
    fn test_payment_shortfall_rejected() {
        let p = player();
        let paid = resources! { twig: 1 };
        let cost = resources! { twig: 2 };
        assert!(!p
            .is_paid_resources_valid(&paid, &cost, PaymentDiscount::None, true)
            .unwrap());
    }

    #[test]
    fn test_berry_discount() {
        let p = player();
        let cost = resources! { berry: 4 };
        let paid = resources! { berry: 1 };
        assert!(p
            .is_paid_resources_valid(&paid, &cost, PaymentDiscount::Berries(3), true)
            .unwrap());
    }

    #[test]
    fn test_wild_discount_covers_shortfall() {
        let p = player();
        let cost = resources! { twig: 2, pebble: 2 };
        let paid = resources! { twig: 1 };
        assert!(p
            .is_paid_resources_valid(&paid, &cost, PaymentDiscount::Wild(3), true)
            .unwrap());
        let paid_nothing = ResourceMap::new();
        let big_cost = resources! { twig: 2, pebble: 2 };
        assert!(!p
            .is_paid_resources_valid(&paid_nothing, &big_cost, PaymentDiscount::Wild(3), true)
            .unwrap());
    }

    #[test]
    fn test_judge_substitutes_one_unit() {
        let mut p = player();
        p.add_to_city(CardName::Judge).unwrap();
        let cost = resources! { twig: 2 };
        let paid = resources! { twig: 1, berry: 1 };
        assert!(p
            .is_paid_resources_valid(&paid, &cost, PaymentDiscount::None, true)
            .unwrap());

        // Two substitutions is too many.
        let paid = resources! { berry: 2 };
        assert!(!p
            .is_paid_resources_valid(&paid, &cost, PaymentDiscount::None, true)
            .unwrap());
    }

    #[test]
    fn test_can_afford_via_associated_construction() {
        let mut p = player();
        // Farm is the husband's associated construction.
        p.add_to_city(CardName::Farm).unwrap();
        assert!(p.can_afford_card(CardName::Husband, false));
        p.use_construction_to_play_critter(CardName::Farm).unwrap();
        assert!(!p.can_afford_card(CardName::Husband, false));
    }

    #[test]
    fn test_can_afford_plain() {
        let mut p = player();
        assert!(!p.can_afford_card(CardName::Farm, false));
        p.gain_resources(&resources! { twig: 2, resin: 1 });
        assert!(p.can_afford_card(CardName::Farm, false));
    }
}
