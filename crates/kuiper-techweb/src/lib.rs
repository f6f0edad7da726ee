//! Technology web for the Kuiper campaign core.
//!
//! Provides the research dependency graph: technologies with prerequisite
//! edges, per-science unlock costs rolled from authored ranges, clamped
//! progress accumulation, and unlock tracking.
//!
//! # Overview
//!
//! Technology definitions are registered at startup via
//! [`TechWebBuilder::register`] and frozen by [`TechWebBuilder::build`],
//! which validates the whole graph (unique ids, existing prerequisites, no
//! cycles) and rolls each authored [`CostRange`] into a concrete per-science
//! requirement using the caller's seeded RNG. The same seed and catalog
//! always produce the same requirements.
//!
//! At runtime, game code drives research by calling
//! [`TechWeb::add_progress`] with whatever science a turn produced. Progress
//! is clamped to the remaining requirement and the amount actually consumed
//! is returned. Completion raises [`TechEvent::ResearchCompleted`] and a
//! [`TechEvent::TechnologyUnlocked`] for every dependent whose
//! prerequisites just became fully researched.
//!
//! # Derived Status
//!
//! [`TechStatus`] is never stored. It is recomputed on demand from progress
//! and prerequisite state, so it cannot drift: `Locked` while any
//! prerequisite is unresearched, `Unlocked` once all are, `Researching`
//! once progress lands, `Researched` when every per-science requirement is
//! met.

use std::collections::BTreeMap;

use kuiper_core::fixed::{Fixed64, Year};
use kuiper_core::id::TechId;
use kuiper_core::science::Science;
use rand::Rng;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Tiers
// ---------------------------------------------------------------------------

/// Catalog depth band of a technology. Ordinal: `Tier0` is the era's
/// starting equipment, `Tier5` the endgame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    Tier0,
    Tier1,
    Tier2,
    Tier3,
    Tier4,
    Tier5,
}

impl Tier {
    pub const ALL: [Tier; 6] = [
        Tier::Tier0,
        Tier::Tier1,
        Tier::Tier2,
        Tier::Tier3,
        Tier::Tier4,
        Tier::Tier5,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Tier {
    type Error = TechWebError;

    fn try_from(value: u8) -> Result<Self, TechWebError> {
        match value {
            0 => Ok(Tier::Tier0),
            1 => Ok(Tier::Tier1),
            2 => Ok(Tier::Tier2),
            3 => Ok(Tier::Tier3),
            4 => Ok(Tier::Tier4),
            5 => Ok(Tier::Tier5),
            other => Err(TechWebError::InvalidTier(other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Status and costs
// ---------------------------------------------------------------------------

/// Research status, derived on demand and never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TechStatus {
    /// At least one prerequisite is unresearched.
    Locked,
    /// All prerequisites researched, no progress yet.
    Unlocked,
    /// Progress recorded but requirements not yet met.
    Researching,
    /// Every per-science requirement is met.
    Researched,
}

/// An authored cost band. The concrete requirement is rolled uniformly in
/// `[min, max]` when the web is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostRange {
    pub min: Fixed64,
    pub max: Fixed64,
}

// ---------------------------------------------------------------------------
// Technology definition
// ---------------------------------------------------------------------------

/// A technology as authored in the catalog. Immutable once the web is
/// built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechDef {
    /// Unique identifier.
    pub id: TechId,

    /// Human-readable title.
    pub title: String,

    /// Flavor and effect text shown by the UI.
    pub description: String,

    /// Catalog depth band.
    pub tier: Tier,

    /// Technologies that must be researched before progress on this one
    /// counts as an unlock.
    pub requires: Vec<TechId>,

    /// Per-science cost bands. Sciences absent here never absorb progress.
    pub costs: BTreeMap<Science, CostRange>,

    /// Authoring metadata carried opaquely for editor round-trips.
    pub multiplier: Fixed64,

    /// Seeds full progress at build time. Used for era starting tech.
    pub pre_researched: bool,
}

/// Per-technology dynamic state.
#[derive(Debug, Clone)]
struct TechNode {
    def: TechDef,
    /// Concrete requirement per science, rolled at build time.
    rolled: BTreeMap<Science, Fixed64>,
    /// Accumulated progress per science. Never exceeds `rolled`.
    progress: BTreeMap<Science, Fixed64>,
}

fn node_researched(node: &TechNode) -> bool {
    node.rolled.iter().all(|(science, &required)| {
        node.progress
            .get(science)
            .copied()
            .unwrap_or(Fixed64::ZERO)
            >= required
    })
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Events emitted by the tech web, drained once per turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TechEvent {
    /// Progress was consumed into a technology.
    ProgressAdded {
        tech: TechId,
        science: Science,
        consumed: Fixed64,
        year: Year,
    },

    /// A technology met all of its requirements.
    ResearchCompleted { tech: TechId, year: Year },

    /// A dependent's prerequisites just became fully researched.
    TechnologyUnlocked { tech: TechId, year: Year },
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised during web construction and research operations.
#[derive(Debug, thiserror::Error)]
pub enum TechWebError {
    #[error("technology not found: {0:?}")]
    UnknownTech(TechId),

    #[error("duplicate technology id: {0:?}")]
    DuplicateTech(TechId),

    #[error("technology {tech:?} requires unknown technology {requires:?}")]
    DanglingPrerequisite { tech: TechId, requires: TechId },

    #[error("prerequisite cycle involving {0:?}")]
    CycleDetected(Vec<TechId>),

    #[error("technology {tech:?} has an invalid cost range for {science:?}")]
    InvalidCostRange { tech: TechId, science: Science },

    #[error("invalid tier index: {0}")]
    InvalidTier(u8),

    #[error("state does not match the catalog for technology {0:?}")]
    StateMismatch(TechId),
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Collects definitions, then validates and freezes them into a [`TechWeb`].
#[derive(Debug, Default)]
pub struct TechWebBuilder {
    defs: Vec<TechDef>,
}

impl TechWebBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a definition. All validation happens in [`Self::build`].
    pub fn register(&mut self, def: TechDef) {
        self.defs.push(def);
    }

    /// Validate the graph and roll concrete costs.
    ///
    /// Rolls iterate technologies in id order and sciences in key order, so
    /// the same seed and catalog always yield the same requirements.
    pub fn build<R: Rng>(self, rng: &mut R) -> Result<TechWeb, TechWebError> {
        let mut nodes: BTreeMap<TechId, TechNode> = BTreeMap::new();
        for def in self.defs {
            let id = def.id;
            for (&science, range) in &def.costs {
                if range.min < Fixed64::ZERO || range.min > range.max {
                    return Err(TechWebError::InvalidCostRange { tech: id, science });
                }
            }
            let node = TechNode {
                def,
                rolled: BTreeMap::new(),
                progress: BTreeMap::new(),
            };
            if nodes.insert(id, node).is_some() {
                return Err(TechWebError::DuplicateTech(id));
            }
        }

        // Prerequisites must exist; build the reverse index while checking.
        let mut unlocked_by: BTreeMap<TechId, Vec<TechId>> =
            nodes.keys().map(|&id| (id, Vec::new())).collect();
        for node in nodes.values() {
            for &req in &node.def.requires {
                match unlocked_by.get_mut(&req) {
                    Some(dependents) => dependents.push(node.def.id),
                    None => {
                        return Err(TechWebError::DanglingPrerequisite {
                            tech: node.def.id,
                            requires: req,
                        });
                    }
                }
            }
        }

        // Kahn's algorithm over prerequisite edges. Anything left with a
        // nonzero in-degree sits on a cycle.
        let mut indegree: BTreeMap<TechId, usize> = nodes
            .iter()
            .map(|(&id, node)| (id, node.def.requires.len()))
            .collect();
        let mut ready: Vec<TechId> = indegree
            .iter()
            .filter(|(_, &deg)| deg == 0)
            .map(|(&id, _)| id)
            .collect();
        let mut resolved = 0usize;
        while let Some(id) = ready.pop() {
            resolved += 1;
            if let Some(dependents) = unlocked_by.get(&id) {
                for &dep in dependents {
                    if let Some(deg) = indegree.get_mut(&dep) {
                        *deg -= 1;
                        if *deg == 0 {
                            ready.push(dep);
                        }
                    }
                }
            }
        }
        if resolved < nodes.len() {
            let cycle: Vec<TechId> = indegree
                .iter()
                .filter(|(_, &deg)| deg > 0)
                .map(|(&id, _)| id)
                .collect();
            return Err(TechWebError::CycleDetected(cycle));
        }

        // Roll the authored bands into concrete requirements.
        for node in nodes.values_mut() {
            for (&science, range) in &node.def.costs {
                let required = if range.min == range.max {
                    range.min
                } else {
                    Fixed64::from_bits(rng.gen_range(range.min.to_bits()..=range.max.to_bits()))
                };
                node.rolled.insert(science, required);
                node.progress.insert(science, Fixed64::ZERO);
            }
            if node.def.pre_researched {
                node.progress = node.rolled.clone();
            }
        }

        Ok(TechWeb {
            nodes,
            unlocked_by,
            events: Vec::new(),
        })
    }
}

// ---------------------------------------------------------------------------
// Snapshot state
// ---------------------------------------------------------------------------

/// The dynamic half of a [`TechWeb`]: rolled requirements and accumulated
/// progress, keyed by technology. Definitions are not included; a restore
/// re-supplies them and re-validates this state against them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechWebState {
    pub rolled: BTreeMap<TechId, BTreeMap<Science, Fixed64>>,
    pub progress: BTreeMap<TechId, BTreeMap<Science, Fixed64>>,
}

// ---------------------------------------------------------------------------
// TechWeb
// ---------------------------------------------------------------------------

/// The frozen research graph plus its runtime progress.
#[derive(Debug, Clone)]
pub struct TechWeb {
    nodes: BTreeMap<TechId, TechNode>,
    /// Reverse adjacency of `requires`, computed once at build.
    unlocked_by: BTreeMap<TechId, Vec<TechId>>,
    events: Vec<TechEvent>,
}

impl TechWeb {
    // -- Query API --

    pub fn get(&self, id: TechId) -> Option<&TechDef> {
        self.nodes.get(&id).map(|node| &node.def)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = TechId> + '_ {
        self.nodes.keys().copied()
    }

    /// Definitions in id order.
    pub fn defs(&self) -> impl Iterator<Item = &TechDef> {
        self.nodes.values().map(|node| &node.def)
    }

    /// True iff every per-science requirement's progress meets its rolled
    /// amount.
    pub fn researched(&self, id: TechId) -> Result<bool, TechWebError> {
        let node = self.nodes.get(&id).ok_or(TechWebError::UnknownTech(id))?;
        Ok(node_researched(node))
    }

    /// Whether every prerequisite is researched.
    pub fn prerequisites_met(&self, id: TechId) -> Result<bool, TechWebError> {
        let node = self.nodes.get(&id).ok_or(TechWebError::UnknownTech(id))?;
        for req in &node.def.requires {
            let parent = self
                .nodes
                .get(req)
                .ok_or(TechWebError::UnknownTech(*req))?;
            if !node_researched(parent) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Derive the current status.
    pub fn status(&self, id: TechId) -> Result<TechStatus, TechWebError> {
        let node = self.nodes.get(&id).ok_or(TechWebError::UnknownTech(id))?;
        if node_researched(node) {
            return Ok(TechStatus::Researched);
        }
        if !self.prerequisites_met(id)? {
            return Ok(TechStatus::Locked);
        }
        let started = node
            .progress
            .values()
            .any(|&amount| amount > Fixed64::ZERO);
        if started {
            Ok(TechStatus::Researching)
        } else {
            Ok(TechStatus::Unlocked)
        }
    }

    /// Sum of accumulated progress across sciences.
    pub fn progress(&self, id: TechId) -> Result<Fixed64, TechWebError> {
        let node = self.nodes.get(&id).ok_or(TechWebError::UnknownTech(id))?;
        Ok(node
            .progress
            .values()
            .fold(Fixed64::ZERO, |acc, &amount| acc + amount))
    }

    /// Sum of rolled requirements across sciences.
    pub fn total_cost(&self, id: TechId) -> Result<Fixed64, TechWebError> {
        let node = self.nodes.get(&id).ok_or(TechWebError::UnknownTech(id))?;
        Ok(node
            .rolled
            .values()
            .fold(Fixed64::ZERO, |acc, &amount| acc + amount))
    }

    /// Progress over total cost, in `[0, 1]`. A technology with no
    /// requirements reports 1.
    pub fn progress_pct(&self, id: TechId) -> Result<Fixed64, TechWebError> {
        let total = self.total_cost(id)?;
        if total == Fixed64::ZERO {
            return Ok(Fixed64::ONE);
        }
        Ok(self.progress(id)? / total)
    }

    /// The rolled requirement for one science, if that science is part of
    /// the cost map.
    pub fn rolled_cost(&self, id: TechId, science: Science) -> Result<Option<Fixed64>, TechWebError> {
        let node = self.nodes.get(&id).ok_or(TechWebError::UnknownTech(id))?;
        Ok(node.rolled.get(&science).copied())
    }

    /// Technologies that list `id` as a prerequisite, ascending.
    pub fn unlocked_by(&self, id: TechId) -> Result<&[TechId], TechWebError> {
        self.unlocked_by
            .get(&id)
            .map(Vec::as_slice)
            .ok_or(TechWebError::UnknownTech(id))
    }

    // -- Research API --

    /// Add science progress, clamped to the remaining requirement. Returns
    /// the amount actually consumed.
    ///
    /// Gating is the caller's concern: the web accumulates wherever it is
    /// told to. Sciences outside the technology's cost map and
    /// already-researched technologies consume nothing.
    pub fn add_progress(
        &mut self,
        id: TechId,
        science: Science,
        amount: Fixed64,
        year: Year,
    ) -> Result<Fixed64, TechWebError> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(TechWebError::UnknownTech(id))?;
        if amount <= Fixed64::ZERO {
            return Ok(Fixed64::ZERO);
        }
        let Some(&required) = node.rolled.get(&science) else {
            return Ok(Fixed64::ZERO);
        };
        let was_researched = node_researched(node);
        let current = node
            .progress
            .get(&science)
            .copied()
            .unwrap_or(Fixed64::ZERO);
        let remaining = required - current;
        if remaining <= Fixed64::ZERO {
            return Ok(Fixed64::ZERO);
        }
        let consumed = amount.min(remaining);
        node.progress.insert(science, current + consumed);
        let completed = !was_researched && node_researched(node);

        self.events.push(TechEvent::ProgressAdded {
            tech: id,
            science,
            consumed,
            year,
        });
        if completed {
            self.events.push(TechEvent::ResearchCompleted { tech: id, year });
            let dependents = self.unlocked_by.get(&id).cloned().unwrap_or_default();
            for dep in dependents {
                if !self.researched(dep)? && self.prerequisites_met(dep)? {
                    self.events
                        .push(TechEvent::TechnologyUnlocked { tech: dep, year });
                }
            }
        }
        Ok(consumed)
    }

    // -- Event API --

    /// Drain all pending events. Returns events and clears the internal list.
    pub fn drain_events(&mut self) -> Vec<TechEvent> {
        std::mem::take(&mut self.events)
    }

    /// Read-only view of pending events.
    pub fn pending_events(&self) -> &[TechEvent] {
        &self.events
    }

    // -- Snapshot API --

    /// Export the dynamic state for persistence.
    pub fn export_state(&self) -> TechWebState {
        TechWebState {
            rolled: self
                .nodes
                .iter()
                .map(|(&id, node)| (id, node.rolled.clone()))
                .collect(),
            progress: self
                .nodes
                .iter()
                .map(|(&id, node)| (id, node.progress.clone()))
                .collect(),
        }
    }

    /// Replace the dynamic state with a previously exported one.
    ///
    /// The state must cover exactly this catalog: every technology, the
    /// exact science set of each cost map, and progress within the rolled
    /// requirement. Anything else is a data-integrity failure.
    pub fn apply_state(&mut self, state: TechWebState) -> Result<(), TechWebError> {
        for &id in state.rolled.keys() {
            if !self.nodes.contains_key(&id) {
                return Err(TechWebError::UnknownTech(id));
            }
        }
        for (&id, node) in &self.nodes {
            let rolled = state.rolled.get(&id).ok_or(TechWebError::StateMismatch(id))?;
            let progress = state
                .progress
                .get(&id)
                .ok_or(TechWebError::StateMismatch(id))?;
            if !maps_cover_same_sciences(rolled, &node.def.costs) {
                return Err(TechWebError::StateMismatch(id));
            }
            if !maps_cover_same_sciences(progress, &node.def.costs) {
                return Err(TechWebError::StateMismatch(id));
            }
            for (science, &amount) in progress {
                let required = rolled.get(science).copied().unwrap_or(Fixed64::ZERO);
                if amount < Fixed64::ZERO || amount > required {
                    return Err(TechWebError::StateMismatch(id));
                }
            }
        }
        for (id, node) in &mut self.nodes {
            if let (Some(rolled), Some(progress)) =
                (state.rolled.get(id), state.progress.get(id))
            {
                node.rolled = rolled.clone();
                node.progress = progress.clone();
            }
        }
        Ok(())
    }
}

fn maps_cover_same_sciences(
    state: &BTreeMap<Science, Fixed64>,
    costs: &BTreeMap<Science, CostRange>,
) -> bool {
    state.len() == costs.len() && state.keys().all(|science| costs.contains_key(science))
}

// ===========================================================================
// Tests
// ===========================================================================
