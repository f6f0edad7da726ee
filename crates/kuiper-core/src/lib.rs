//! Kuiper Core -- the turn simulation model for space-agency games.
//!
//! This crate provides the resource ledger, mutation engine, action
//! lifecycle, spatial world, notifications, and deterministic fixed-point
//! arithmetic that the Kuiper campaign layer is built on.
//!
//! # Turn Model
//!
//! One turn is one calendar year. All state transitions happen inside the
//! campaign layer's single `advance_turn` call; this crate contributes the
//! per-turn steps it orchestrates:
//!
//! 1. **Actions** -- Active actions apply their per-turn mutations in
//!    insertion order, count down, and complete.
//! 2. **Construction** -- In-progress buildings count down and come online.
//! 3. **Upkeep** -- Standing buildings charge their running costs.
//!
//! Catalogs are immutable: action and sponsor templates are built once
//! through their builders, validated, and frozen before play begins.
//! Runtime state (ledger, active actions, sectors) only ever references
//! them by id.
//!
//! # Key Types
//!
//! - [`company::Company`] -- The player aggregate: ledger plus active
//!   actions.
//! - [`ledger::Ledger`] -- Integer resource stocks and fixed-point science
//!   rates.
//! - [`mutation::ResourceMutation`] / [`mutation::ScienceMutation`] --
//!   Per-turn state deltas with completion effects.
//! - [`catalog::ActionCatalog`] -- Immutable action templates (frozen at
//!   startup).
//! - [`world::World`] -- Zones, six-sector locations, and the building
//!   arena.
//! - [`notify::NotificationQueue`] -- Turn-stamped player notifications.
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type for deterministic math.

pub mod catalog;
pub mod company;
pub mod fixed;
pub mod id;
pub mod ledger;
pub mod mutation;
pub mod notify;
pub mod resource;
pub mod science;
pub mod world;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
