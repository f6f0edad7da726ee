//! The player's persistent aggregate: ledger plus in-progress actions.
//!
//! Activation is the policy boundary for overspending: every cost entry is
//! checked before any deduction, and an insufficient stock rejects the whole
//! activation with the ledger untouched. Per-turn mutation deltas are
//! deliberately unchecked and may drive stocks negative.

use serde::{Serialize, Deserialize};

use crate::catalog::{ActionCatalog, ActionDef};
use crate::fixed::Year;
use crate::id::{ActionId, LocationId};
use crate::ledger::Ledger;
use crate::resource::ResourceType;

/// Per-instance state of a played action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveAction {
    pub action: ActionId,
    /// Initialized to the template duration; never negative.
    pub turns_remaining: u32,
    /// Target location, when the action was played onto one.
    pub location: Option<LocationId>,
}

/// State transitions raised by the company, drained each turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyEvent {
    ActionActivated {
        action: ActionId,
        year: Year,
    },
    ActionCompleted {
        action: ActionId,
        location: Option<LocationId>,
        year: Year,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum CompanyError {
    #[error("insufficient {resource:?}: need {required}, have {available}")]
    Insufficient {
        resource: ResourceType,
        required: i64,
        available: i64,
    },
    #[error("active action references unknown template {0:?}")]
    UnknownAction(ActionId),
}

/// The player company: name, ledger, and the insertion-ordered set of
/// active actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    name: String,
    ledger: Ledger,
    active: Vec<ActiveAction>,
    #[serde(skip)]
    events: Vec<CompanyEvent>,
}

impl Company {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ledger: Ledger::new(),
            active: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    /// Active actions in insertion order.
    pub fn active_actions(&self) -> &[ActiveAction] {
        &self.active
    }

    /// Take all pending events, leaving the buffer empty.
    pub fn drain_events(&mut self) -> Vec<CompanyEvent> {
        std::mem::take(&mut self.events)
    }

    /// Check-then-deduct a cost map atomically: either every entry is
    /// charged or none is.
    pub fn try_spend<I>(&mut self, costs: I) -> Result<(), CompanyError>
    where
        I: Iterator<Item = (ResourceType, i64)> + Clone,
    {
        for (resource, required) in costs.clone() {
            let available = self.ledger.resource(resource);
            if available < required {
                return Err(CompanyError::Insufficient {
                    resource,
                    required,
                    available,
                });
            }
        }
        for (resource, required) in costs {
            self.ledger.add_resource(resource, -required);
        }
        Ok(())
    }

    /// Play an action: charge its costs once and add it to the active set.
    pub fn activate(
        &mut self,
        def: &ActionDef,
        location: Option<LocationId>,
        year: Year,
    ) -> Result<(), CompanyError> {
        self.try_spend(def.costs())?;
        self.active.push(ActiveAction {
            action: def.id(),
            turns_remaining: def.duration(),
            location,
        });
        self.events.push(CompanyEvent::ActionActivated {
            action: def.id(),
            year,
        });
        Ok(())
    }

    /// Advance every active action by one turn, in insertion order.
    ///
    /// Each action applies its per-turn mutations, then its countdown
    /// drops; instances reaching zero apply their completion effect and are
    /// retired within this same call.
    pub fn advance_actions(
        &mut self,
        catalog: &ActionCatalog,
        year: Year,
    ) -> Result<(), CompanyError> {
        let mut completed = Vec::new();
        for idx in 0..self.active.len() {
            let id = self.active[idx].action;
            let def = catalog.get(id).ok_or(CompanyError::UnknownAction(id))?;

            if let Some(m) = def.resource_mutation() {
                m.apply_tick(&mut self.ledger);
            }
            if let Some(m) = def.science_mutation() {
                m.apply_tick(&mut self.ledger);
            }

            self.active[idx].turns_remaining -= 1;
            if self.active[idx].turns_remaining == 0 {
                if let Some(m) = def.resource_mutation() {
                    m.apply_completion(&mut self.ledger);
                }
                self.events.push(CompanyEvent::ActionCompleted {
                    action: id,
                    location: self.active[idx].location,
                    year,
                });
                completed.push(idx);
            }
        }
        for idx in completed.into_iter().rev() {
            self.active.remove(idx);
        }
        Ok(())
    }
}
