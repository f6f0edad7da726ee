//! The single point of truth for resource stocks and science rates.
//!
//! The ledger enforces no bounds: callers that want an affordability check
//! perform it before writing (see [`crate::company::Company::activate`]).
//! All mutation is synchronous and immediate.

use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};

use crate::fixed::Fixed64;
use crate::resource::ResourceType;
use crate::science::Science;

/// Company resource stocks (integer) and science rates (fixed-point flow).
///
/// Backed by `BTreeMap` so iteration, serialization, and hashing follow
/// enum declaration order deterministically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    resources: BTreeMap<ResourceType, i64>,
    science_rates: BTreeMap<Science, Fixed64>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Resource stocks ---

    /// Current stock for a resource kind. Absent entries read as zero.
    pub fn resource(&self, kind: ResourceType) -> i64 {
        self.resources.get(&kind).copied().unwrap_or(0)
    }

    /// Add a signed delta to a stock. Stocks may go negative; policy lives
    /// in the callers.
    pub fn add_resource(&mut self, kind: ResourceType, delta: i64) {
        *self.resources.entry(kind).or_insert(0) += delta;
    }

    /// Overwrite a stock. Used by completion effects and sponsor setup.
    pub fn set_resource(&mut self, kind: ResourceType, value: i64) {
        self.resources.insert(kind, value);
    }

    /// Iterate non-default stocks in declaration order.
    pub fn resources(&self) -> impl Iterator<Item = (ResourceType, i64)> + '_ {
        self.resources.iter().map(|(&k, &v)| (k, v))
    }

    // --- Science rates ---

    /// Current per-turn rate for a discipline. Absent entries read as zero.
    pub fn science_rate(&self, science: Science) -> Fixed64 {
        self.science_rates
            .get(&science)
            .copied()
            .unwrap_or(Fixed64::ZERO)
    }

    pub fn set_science_rate(&mut self, science: Science, rate: Fixed64) {
        self.science_rates.insert(science, rate);
    }

    pub fn add_science_rate(&mut self, science: Science, delta: Fixed64) {
        let rate = self.science_rate(science) + delta;
        self.science_rates.insert(science, rate);
    }

    /// Scale a rate in place. Compounds across repeated calls.
    pub fn multiply_science_rate(&mut self, science: Science, factor: Fixed64) {
        let rate = self.science_rate(science) * factor;
        self.science_rates.insert(science, rate);
    }

    /// Iterate non-default rates in declaration order.
    pub fn science_rates(&self) -> impl Iterator<Item = (Science, Fixed64)> + '_ {
        self.science_rates.iter().map(|(&k, &v)| (k, v))
    }
}
