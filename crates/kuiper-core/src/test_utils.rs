//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use std::collections::BTreeMap;

use crate::catalog::{ActionCatalog, ActionDef, ActionDefBuilder, SponsorCatalog, SponsorDef};
use crate::company::Company;
use crate::fixed::Fixed64;
use crate::id::{ActionId, LocationId, SponsorId};
use crate::mutation::{MutationKind, ResourceMutation, ScienceMutation};
use crate::resource::ResourceType;
use crate::science::Science;
use crate::world::{BuildingPlan, World};

// ===========================================================================
// Fixed-point helper
// ===========================================================================

pub fn fixed(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

// ===========================================================================
// Action constructors
// ===========================================================================

/// Two turns of geology surveying, no costs.
pub fn survey_action() -> ActionDef {
    ActionDefBuilder::new(ActionId(1), "Survey launch sites", 2)
        .description("Send field teams to chart candidate pads.")
        .science_mutation(ScienceMutation {
            science: Science::Geology,
            kind: MutationKind::Add,
            amount: fixed(0.5),
        })
        .build()
        .unwrap()
}

/// Costs gold and influence up front, trickles influence back per turn.
pub fn lobby_action() -> ActionDef {
    ActionDefBuilder::new(ActionId(2), "Lobby parliament", 3)
        .description("Court the appropriations committee.")
        .cost(ResourceType::Gold, 20)
        .cost(ResourceType::Influence, 5)
        .resource_mutation(ResourceMutation {
            resource: ResourceType::Influence,
            kind: MutationKind::Add,
            amount_per_year: 2,
            completion_amount: None,
        })
        .build()
        .unwrap()
}

/// Converts gold into construction materials over two turns.
pub fn order_materials_action() -> ActionDef {
    ActionDefBuilder::new(ActionId(3), "Order materials", 2)
        .cost(ResourceType::Gold, 30)
        .resource_mutation(ResourceMutation {
            resource: ResourceType::ConstructionMaterials,
            kind: MutationKind::Add,
            amount_per_year: 20,
            completion_amount: None,
        })
        .build()
        .unwrap()
}

/// Drains gold for five turns, then the position pays out at a fixed value.
pub fn invest_action() -> ActionDef {
    ActionDefBuilder::new(ActionId(5), "Invest gold", 5)
        .resource_mutation(ResourceMutation {
            resource: ResourceType::Gold,
            kind: MutationKind::Add,
            amount_per_year: -5,
            completion_amount: Some(50),
        })
        .build()
        .unwrap()
}

/// Multiplies the physics rate by 1.2 each turn it runs.
pub fn symposium_action() -> ActionDef {
    ActionDefBuilder::new(ActionId(8), "Physics symposium", 1)
        .cost(ResourceType::Gold, 10)
        .science_mutation(ScienceMutation {
            science: Science::Physics,
            kind: MutationKind::RateMultiply,
            amount: fixed(1.2),
        })
        .build()
        .unwrap()
}

// ===========================================================================
// Catalog builders
// ===========================================================================

pub fn sample_catalog() -> ActionCatalog {
    ActionCatalog::new(vec![
        survey_action(),
        lobby_action(),
        order_materials_action(),
        invest_action(),
        symposium_action(),
    ])
    .unwrap()
}

pub fn sample_sponsor() -> SponsorDef {
    SponsorDef {
        id: SponsorId(0),
        name: "Korolev Design Bureau".to_string(),
        color: "#B7410E".to_string(),
        starting_resources: BTreeMap::from([
            (ResourceType::Gold, 200),
            (ResourceType::Influence, 20),
            (ResourceType::ConstructionMaterials, 50),
        ]),
        starting_science_rates: BTreeMap::from([
            (Science::Physics, fixed(1.0)),
            (Science::Engineering, fixed(0.5)),
        ]),
        intro: "The chief designer answers to no committee.".to_string(),
    }
}

pub fn sample_sponsors() -> SponsorCatalog {
    SponsorCatalog::new(vec![sample_sponsor()]).unwrap()
}

// ===========================================================================
// Company helper
// ===========================================================================

/// A company seeded with the sample sponsor's starting position.
pub fn funded_company(name: &str) -> Company {
    let sponsor = sample_sponsor();
    let mut company = Company::new(name);
    for (&resource, &amount) in &sponsor.starting_resources {
        company.ledger_mut().set_resource(resource, amount);
    }
    for (&science, &rate) in &sponsor.starting_science_rates {
        company.ledger_mut().set_science_rate(science, rate);
    }
    company
}

// ===========================================================================
// World helpers
// ===========================================================================

/// One zone with one six-sector location.
pub fn sample_world() -> (World, LocationId) {
    let mut world = World::new();
    let zone = world.add_zone("Baikonur steppe");
    let location = world.add_location(zone, "Site 1").unwrap();
    (world, location)
}

/// Three turns of construction; grants engineering and costs gold upkeep.
pub fn lab_plan() -> BuildingPlan {
    BuildingPlan {
        name: "Propulsion lab".to_string(),
        build_turns: 3,
        costs: BTreeMap::from([(ResourceType::ConstructionMaterials, 40)]),
        science_bonus: Some((Science::Engineering, fixed(0.5))),
        upkeep: Some((ResourceType::Gold, 2)),
    }
}
