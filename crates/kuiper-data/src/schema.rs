//! Serde data file structs for campaign content definitions.
//!
//! These structs define the on-disk format for actions, sponsors, and the
//! technology web. They are deserialized from RON, JSON, or TOML data
//! files and then converted into catalog types by the loader. Closed sets
//! (resources, sciences, mutation kinds) reuse the simulation enums and
//! their catalog spellings; amounts that are fractional on disk are plain
//! floats here and convert to fixed point in the loader.

use std::collections::BTreeMap;

use kuiper_core::mutation::MutationKind;
use kuiper_core::resource::ResourceType;
use kuiper_core::science::Science;
use serde::Deserialize;

// ===========================================================================
// Actions
// ===========================================================================

/// An action template in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionData {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub duration: u32,
    /// One-time activation costs.
    #[serde(default)]
    pub costs: BTreeMap<ResourceType, i64>,
    #[serde(default)]
    pub mutation: Option<ResourceMutationData>,
    #[serde(default)]
    pub science_mutation: Option<ScienceMutationData>,
}

/// A per-turn resource effect in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceMutationData {
    pub resource: ResourceType,
    pub kind: MutationKind,
    pub amount_per_year: i64,
    #[serde(default)]
    pub completion_amount: Option<i64>,
}

/// A per-turn science-rate effect in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct ScienceMutationData {
    pub science: Science,
    pub kind: MutationKind,
    pub amount: f64,
}

// ===========================================================================
// Sponsors
// ===========================================================================

/// A sponsor record in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct SponsorData {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub resources: BTreeMap<ResourceType, i64>,
    #[serde(default)]
    pub science_rates: BTreeMap<Science, f64>,
    #[serde(default)]
    pub intro: String,
}

// ===========================================================================
// Technology web
// ===========================================================================

/// A technology record in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct TechData {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Tier index, 0 through 5.
    pub tier: u8,
    #[serde(default)]
    pub status: Option<TechStatusData>,
    #[serde(default)]
    pub requires: Vec<u32>,
    #[serde(default)]
    pub costs: BTreeMap<Science, CostRangeData>,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

fn default_multiplier() -> f64 {
    1.0
}

/// Authored starting status. `researched` marks founding technologies the
/// sponsor begins with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechStatusData {
    Available,
    Researched,
}

/// An inclusive requirement range, rolled to a concrete amount when the
/// web is built.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CostRangeData {
    pub min: f64,
    pub max: f64,
}
