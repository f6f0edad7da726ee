//! The action deck: the catalog's ids in a seeded shuffle order.
//!
//! The deck is materialized state, not a lazy view. Its card order is
//! serialized with the game, so a restored session draws exactly what the
//! original would have drawn. Reshuffles rebuild the full catalog order
//! from the game seed and a reshuffle counter, never from ambient
//! randomness.

use kuiper_core::catalog::ActionCatalog;
use kuiper_core::id::ActionId;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Stream separator so deck order never correlates with other uses of the
/// game seed.
const SHUFFLE_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, thiserror::Error)]
pub enum DeckError {
    #[error("the action deck is exhausted")]
    Exhausted,
}

/// A shuffled stack of action ids. The top of the deck is the end of the
/// vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<ActionId>,
    seed: u64,
    reshuffles: u32,
}

impl Deck {
    /// Build and shuffle the initial deck from the full catalog.
    pub fn new(catalog: &ActionCatalog, seed: u64) -> Self {
        let mut deck = Self {
            cards: Vec::new(),
            seed,
            reshuffles: 0,
        };
        deck.fill(catalog);
        deck
    }

    fn fill(&mut self, catalog: &ActionCatalog) {
        self.cards = catalog.ids().collect();
        let stream = self
            .seed
            .wrapping_add(SHUFFLE_SALT.wrapping_mul(u64::from(self.reshuffles).wrapping_add(1)));
        let mut rng = SmallRng::seed_from_u64(stream);
        self.cards.shuffle(&mut rng);
    }

    /// Take the top card. An empty deck is a typed outcome the caller must
    /// handle, never a silent no-op.
    pub fn draw(&mut self) -> Result<ActionId, DeckError> {
        self.cards.pop().ok_or(DeckError::Exhausted)
    }

    /// The card a draw would return next.
    pub fn peek(&self) -> Option<ActionId> {
        self.cards.last().copied()
    }

    /// Rebuild the full catalog order. Each reshuffle advances the counter,
    /// so successive shuffles differ while staying reproducible from the
    /// seed.
    pub fn reshuffle(&mut self, catalog: &ActionCatalog) {
        self.reshuffles += 1;
        self.fill(catalog);
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// How many times the deck has been rebuilt.
    pub fn reshuffles(&self) -> u32 {
        self.reshuffles
    }

    /// Current card order, bottom to top.
    pub fn cards(&self) -> &[ActionId] {
        &self.cards
    }
}
