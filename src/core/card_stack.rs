//! Ordered card piles.
//!
//! `CardStack` backs the shared deck and discard pile. It is an ordered
//! container: `draw` takes from the front, `add_to_stack` appends to the
//! back, and `shuffle` randomizes the order through the game's RNG.
//!
//! Backed by a persistent vector so that cloning the whole game state per
//! transition shares structure instead of copying the pile.

use im::Vector;

use super::rng::GameRng;
use crate::cards::CardName;

/// A named, ordered pile of cards.
#[derive(Clone, Debug, PartialEq)]
pub struct CardStack {
    name: String,
    cards: Vector<CardName>,
}

impl CardStack {
    /// Create a stack with the given contents (front of the vector draws
    /// first).
    #[must_use]
    pub fn new(name: impl Into<String>, cards: Vec<CardName>) -> Self {
        Self {
            name: name.into(),
            cards: cards.into_iter().collect(),
        }
    }

    /// Create an empty stack.
    #[must_use]
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    /// The stack's display name (used in logs and snapshots).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Draw the top card, or `None` if the stack is empty.
    pub fn draw(&mut self) -> Option<CardName> {
        self.cards.pop_front()
    }

    /// Add a card to the bottom of the stack.
    pub fn add_to_stack(&mut self, card: CardName) {
        self.cards.push_back(card);
    }

    /// Move every card out of this stack, leaving it empty.
    pub fn take_all(&mut self) -> Vec<CardName> {
        let cards: Vec<CardName> = self.cards.iter().copied().collect();
        self.cards = Vector::new();
        cards
    }

    /// Randomize the order of the stack.
    pub fn shuffle(&mut self, rng: &mut GameRng) {
        let mut cards: Vec<CardName> = self.cards.iter().copied().collect();
        rng.shuffle(&mut cards);
        self.cards = cards.into_iter().collect();
    }

    /// Number of cards in the stack.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// True if the stack holds no cards.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterate over the cards from top to bottom.
    pub fn iter(&self) -> impl Iterator<Item = CardName> + '_ {
        self.cards.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_order_is_front_first() {
        let mut stack = CardStack::new("deck", vec![CardName::Farm, CardName::Mine]);
        assert_eq!(stack.draw(), Some(CardName::Farm));
        assert_eq!(stack.draw(), Some(CardName::Mine));
        assert_eq!(stack.draw(), None);
    }

    #[test]
    fn test_add_to_stack_appends() {
        let mut stack = CardStack::empty("discard");
        stack.add_to_stack(CardName::Farm);
        stack.add_to_stack(CardName::Wanderer);
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.draw(), Some(CardName::Farm));
    }

    #[test]
    fn test_take_all_empties_the_stack() {
        let mut stack = CardStack::new("discard", vec![CardName::Farm, CardName::Mine]);
        let cards = stack.take_all();
        assert_eq!(cards, vec![CardName::Farm, CardName::Mine]);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_shuffle_preserves_contents() {
        let original: Vec<CardName> = vec![
            CardName::Farm,
            CardName::Mine,
            CardName::Wanderer,
            CardName::Bard,
            CardName::Queen,
            CardName::Innkeeper,
            CardName::Lookout,
            CardName::Ruins,
        ];
        let mut stack = CardStack::new("deck", original.clone());
        let mut rng = GameRng::seeded(3);
        stack.shuffle(&mut rng);

        let mut shuffled: Vec<CardName> = stack.iter().collect();
        assert_eq!(shuffled.len(), original.len());
        shuffled.sort();
        let mut sorted = original;
        sorted.sort();
        assert_eq!(shuffled, sorted);
    }
}
