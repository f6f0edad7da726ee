//! Frozen catalogs of action and sponsor definitions.
//!
//! Catalog data is loaded once at session start and never mutated
//! afterward. An [`ActionDef`] is immutable: it is assembled through
//! [`ActionDefBuilder`] and validated before it can enter a catalog, so no
//! half-configured template is ever observable by the simulation.

use std::collections::{BTreeMap, HashMap};

use serde::{Serialize, Deserialize};

use crate::id::{ActionId, SponsorId};
use crate::fixed::Fixed64;
use crate::mutation::{MutationKind, ResourceMutation, ScienceMutation};
use crate::resource::ResourceType;
use crate::science::Science;

/// An immutable action template.
///
/// Costs are charged exactly once at activation. The mutations, if present,
/// apply once per turn for the action's active lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDef {
    id: ActionId,
    name: String,
    description: String,
    duration: u32,
    costs: BTreeMap<ResourceType, i64>,
    resource_mutation: Option<ResourceMutation>,
    science_mutation: Option<ScienceMutation>,
}

impl ActionDef {
    pub fn id(&self) -> ActionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Active lifetime in turns. Always at least 1.
    pub fn duration(&self) -> u32 {
        self.duration
    }

    /// Activation costs in declaration order.
    pub fn costs(&self) -> impl Iterator<Item = (ResourceType, i64)> + Clone + '_ {
        self.costs.iter().map(|(&k, &v)| (k, v))
    }

    pub fn resource_mutation(&self) -> Option<&ResourceMutation> {
        self.resource_mutation.as_ref()
    }

    pub fn science_mutation(&self) -> Option<&ScienceMutation> {
        self.science_mutation.as_ref()
    }
}

/// Assembles an [`ActionDef`], frozen by [`ActionDefBuilder::build`].
#[derive(Debug)]
pub struct ActionDefBuilder {
    id: ActionId,
    name: String,
    description: String,
    duration: u32,
    costs: BTreeMap<ResourceType, i64>,
    resource_mutation: Option<ResourceMutation>,
    science_mutation: Option<ScienceMutation>,
}

impl ActionDefBuilder {
    pub fn new(id: ActionId, name: &str, duration: u32) -> Self {
        Self {
            id,
            name: name.to_string(),
            description: String::new(),
            duration,
            costs: BTreeMap::new(),
            resource_mutation: None,
            science_mutation: None,
        }
    }

    pub fn description(mut self, text: &str) -> Self {
        self.description = text.to_string();
        self
    }

    /// Add one activation cost entry. Later entries for the same resource
    /// overwrite earlier ones.
    pub fn cost(mut self, resource: ResourceType, amount: i64) -> Self {
        self.costs.insert(resource, amount);
        self
    }

    pub fn resource_mutation(mut self, mutation: ResourceMutation) -> Self {
        self.resource_mutation = Some(mutation);
        self
    }

    pub fn science_mutation(mut self, mutation: ScienceMutation) -> Self {
        self.science_mutation = Some(mutation);
        self
    }

    /// Validate and freeze the template.
    pub fn build(self) -> Result<ActionDef, CatalogError> {
        if self.duration == 0 {
            return Err(CatalogError::ZeroDuration(self.id));
        }
        if let Some(m) = &self.resource_mutation {
            if !m.kind.valid_for_stock() {
                return Err(CatalogError::InvalidStockMutation {
                    action: self.id,
                    kind: m.kind,
                });
            }
        }
        for (&resource, &amount) in &self.costs {
            if amount < 0 {
                return Err(CatalogError::NegativeCost {
                    action: self.id,
                    resource,
                });
            }
        }
        Ok(ActionDef {
            id: self.id,
            name: self.name,
            description: self.description,
            duration: self.duration,
            costs: self.costs,
            resource_mutation: self.resource_mutation,
            science_mutation: self.science_mutation,
        })
    }
}

/// Immutable action catalog. Frozen after construction.
#[derive(Debug, Clone)]
pub struct ActionCatalog {
    defs: BTreeMap<ActionId, ActionDef>,
    name_to_id: HashMap<String, ActionId>,
}

impl ActionCatalog {
    /// Freeze a set of built definitions. Duplicate ids are a
    /// data-integrity error.
    pub fn new(defs: Vec<ActionDef>) -> Result<Self, CatalogError> {
        let mut map = BTreeMap::new();
        let mut name_to_id = HashMap::new();
        for def in defs {
            let id = def.id;
            name_to_id.insert(def.name.clone(), id);
            if map.insert(id, def).is_some() {
                return Err(CatalogError::DuplicateAction(id));
            }
        }
        Ok(Self {
            defs: map,
            name_to_id,
        })
    }

    pub fn get(&self, id: ActionId) -> Option<&ActionDef> {
        self.defs.get(&id)
    }

    pub fn id_by_name(&self, name: &str) -> Option<ActionId> {
        self.name_to_id.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Iterate definitions in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ActionDef> {
        self.defs.values()
    }

    /// All ids in ascending order. The deck is seeded from this.
    pub fn ids(&self) -> impl Iterator<Item = ActionId> + '_ {
        self.defs.keys().copied()
    }
}

/// A sponsor: the player's starting position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SponsorDef {
    pub id: SponsorId,
    pub name: String,
    /// Hex color used by the UI, carried opaquely.
    pub color: String,
    pub starting_resources: BTreeMap<ResourceType, i64>,
    pub starting_science_rates: BTreeMap<Science, Fixed64>,
    pub intro: String,
}

/// Immutable sponsor catalog. Frozen after construction.
#[derive(Debug, Clone)]
pub struct SponsorCatalog {
    defs: BTreeMap<SponsorId, SponsorDef>,
}

impl SponsorCatalog {
    pub fn new(defs: Vec<SponsorDef>) -> Result<Self, CatalogError> {
        let mut map = BTreeMap::new();
        for def in defs {
            let id = def.id;
            if map.insert(id, def).is_some() {
                return Err(CatalogError::DuplicateSponsor(id));
            }
        }
        Ok(Self { defs: map })
    }

    pub fn get(&self, id: SponsorId) -> Option<&SponsorDef> {
        self.defs.get(&id)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Iterate definitions in id order.
    pub fn iter(&self) -> impl Iterator<Item = &SponsorDef> {
        self.defs.values()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate action id: {0:?}")]
    DuplicateAction(ActionId),
    #[error("duplicate sponsor id: {0:?}")]
    DuplicateSponsor(SponsorId),
    #[error("action {0:?} has zero duration")]
    ZeroDuration(ActionId),
    #[error("action {action:?} applies {kind:?} to a resource stock")]
    InvalidStockMutation { action: ActionId, kind: MutationKind },
    #[error("action {action:?} has a negative cost for {resource:?}")]
    NegativeCost {
        action: ActionId,
        resource: ResourceType,
    },
}
