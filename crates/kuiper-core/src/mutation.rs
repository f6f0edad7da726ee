//! The declarative effect language applied by active actions.
//!
//! A mutation describes how one tick's amount combines with the target's
//! current value. Resource mutations target a stock in the ledger; science
//! mutations target a per-turn rate. Interpretation is a pure function of
//! (mutation, ledger) with no other state.

use serde::{Serialize, Deserialize};

use crate::fixed::Fixed64;
use crate::ledger::Ledger;
use crate::resource::ResourceType;
use crate::science::Science;

/// How a tick's amount combines with the target's current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MutationKind {
    /// Add the amount (negative amounts model recurring costs).
    Add,
    /// Subtract the amount.
    Subtract,
    /// Zero the target; the amount is ignored.
    Reset,
    /// Multiply the target by the amount. Rates only.
    RateMultiply,
}

impl MutationKind {
    /// Whether this kind may target a resource stock. `RateMultiply` is a
    /// rate operator and is rejected at catalog build for stocks.
    pub fn valid_for_stock(self) -> bool {
        !matches!(self, MutationKind::RateMultiply)
    }
}

/// A per-turn effect on one resource stock, with an optional one-time
/// completion override applied when the owning action retires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceMutation {
    pub resource: ResourceType,
    pub kind: MutationKind,
    pub amount_per_year: i64,
    pub completion_amount: Option<i64>,
}

impl ResourceMutation {
    /// Apply one active tick against the ledger.
    pub fn apply_tick(&self, ledger: &mut Ledger) {
        match self.kind {
            MutationKind::Add => ledger.add_resource(self.resource, self.amount_per_year),
            MutationKind::Subtract => ledger.add_resource(self.resource, -self.amount_per_year),
            MutationKind::Reset => ledger.set_resource(self.resource, 0),
            // Rejected by catalog validation; unreachable for built defs.
            MutationKind::RateMultiply => {}
        }
    }

    /// Apply the one-time completion override, if any. Runs after the final
    /// tick's `apply_tick`, so the override wins over the cumulative delta.
    pub fn apply_completion(&self, ledger: &mut Ledger) {
        if let Some(amount) = self.completion_amount {
            ledger.set_resource(self.resource, amount);
        }
    }
}

/// A per-turn effect on one science rate. Rate changes are permanent: they
/// are not reverted when the owning action expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScienceMutation {
    pub science: Science,
    pub kind: MutationKind,
    pub amount: Fixed64,
}

impl ScienceMutation {
    /// Apply one active tick against the ledger.
    pub fn apply_tick(&self, ledger: &mut Ledger) {
        match self.kind {
            MutationKind::Add => ledger.add_science_rate(self.science, self.amount),
            MutationKind::Subtract => ledger.add_science_rate(self.science, -self.amount),
            MutationKind::Reset => ledger.set_science_rate(self.science, Fixed64::ZERO),
            MutationKind::RateMultiply => ledger.multiply_science_rate(self.science, self.amount),
        }
    }
}
