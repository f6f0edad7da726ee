//! Full-campaign integration tests.
//!
//! Models an early space-race agency from founding through its first
//! research breakthroughs, driving the action economy, construction,
//! research, and the deck together through the public `Game` API. Each test
//! targets one cross-cutting mechanic: the action/research interplay, how a
//! finished lab accelerates research, income versus standing upkeep, and
//! full-session replay determinism.

use std::collections::BTreeMap;

use kuiper_core::catalog::{ActionCatalog, ActionDef, ActionDefBuilder, SponsorDef};
use kuiper_core::id::{ActionId, SponsorId, TechId};
use kuiper_core::mutation::{MutationKind, ResourceMutation, ScienceMutation};
use kuiper_core::notify::{Notification, NotificationKind};
use kuiper_core::resource::ResourceType;
use kuiper_core::science::Science;
use kuiper_core::test_utils::fixed;
use kuiper_core::world::{BuildingPlan, SectorStatus};
use kuiper_game::game::{Game, GameConfig, GameSetup};
use kuiper_techweb::{CostRange, TechDef, TechStatus, Tier};

// ============================================================================
// Campaign content (action ids 10-14, tech ids 0-2)
// ============================================================================

/// Two turns of geology fieldwork, no costs.
fn survey_steppe() -> ActionDef {
    ActionDefBuilder::new(ActionId(10), "Survey the Kazakh steppe", 2)
        .science_mutation(ScienceMutation {
            science: Science::Geology,
            kind: MutationKind::Add,
            amount: fixed(0.4),
        })
        .build()
        .unwrap()
}

/// Pays gold and influence up front, returns influence over three turns.
fn lobby_politburo() -> ActionDef {
    ActionDefBuilder::new(ActionId(11), "Lobby the Politburo", 3)
        .cost(ResourceType::Gold, 30)
        .cost(ResourceType::Influence, 5)
        .resource_mutation(ResourceMutation {
            resource: ResourceType::Influence,
            kind: MutationKind::Add,
            amount_per_year: 3,
            completion_amount: None,
        })
        .build()
        .unwrap()
}

/// Converts gold into construction materials over two turns.
fn procure_alloys() -> ActionDef {
    ActionDefBuilder::new(ActionId(12), "Procure structural alloys", 2)
        .cost(ResourceType::Gold, 50)
        .resource_mutation(ResourceMutation {
            resource: ResourceType::ConstructionMaterials,
            kind: MutationKind::Add,
            amount_per_year: 25,
            completion_amount: None,
        })
        .build()
        .unwrap()
}

/// Free to activate; pays a gold dividend for five turns.
fn float_bonds() -> ActionDef {
    ActionDefBuilder::new(ActionId(13), "Float agency bonds", 5)
        .resource_mutation(ResourceMutation {
            resource: ResourceType::Gold,
            kind: MutationKind::Add,
            amount_per_year: 15,
            completion_amount: None,
        })
        .build()
        .unwrap()
}

/// Spends influence to stand up a permanent astronomy program.
fn academy_lectures() -> ActionDef {
    ActionDefBuilder::new(ActionId(14), "Academy lecture circuit", 2)
        .cost(ResourceType::Influence, 10)
        .science_mutation(ScienceMutation {
            science: Science::Astronomy,
            kind: MutationKind::Add,
            amount: fixed(0.6),
        })
        .build()
        .unwrap()
}

fn campaign_catalog() -> ActionCatalog {
    ActionCatalog::new(vec![
        survey_steppe(),
        lobby_politburo(),
        procure_alloys(),
        float_bonds(),
        academy_lectures(),
    ])
    .unwrap()
}

fn state_commission() -> SponsorDef {
    SponsorDef {
        id: SponsorId(0),
        name: "State Commission for Spaceflight".to_string(),
        color: "#8B0000".to_string(),
        starting_resources: BTreeMap::from([
            (ResourceType::Gold, 400),
            (ResourceType::Influence, 40),
            (ResourceType::ConstructionMaterials, 120),
        ]),
        starting_science_rates: BTreeMap::from([
            (Science::Physics, fixed(1.0)),
            (Science::Engineering, fixed(0.5)),
        ]),
        intro: "The ministry expects results before the next congress.".to_string(),
    }
}

/// Exact-cost technology: min == max makes the rolled requirement
/// independent of the seed, so turn counts below are deterministic.
fn tech(id: u32, title: &str, tier: Tier, requires: &[u32], costs: &[(Science, f64)]) -> TechDef {
    TechDef {
        id: TechId(id),
        title: title.to_string(),
        description: String::new(),
        tier,
        requires: requires.iter().map(|&r| TechId(r)).collect(),
        costs: costs
            .iter()
            .map(|&(science, amount)| {
                (
                    science,
                    CostRange {
                        min: fixed(amount),
                        max: fixed(amount),
                    },
                )
            })
            .collect(),
        multiplier: fixed(1.0),
        pre_researched: false,
    }
}

fn rocketry_techs() -> Vec<TechDef> {
    vec![
        tech(0, "Sounding rockets", Tier::Tier0, &[], &[(Science::Physics, 3.0)]),
        tech(
            1,
            "Staged combustion",
            Tier::Tier1,
            &[0],
            &[(Science::Physics, 2.0), (Science::Engineering, 2.0)],
        ),
        tech(
            2,
            "Orbital telemetry",
            Tier::Tier2,
            &[1],
            &[(Science::Astronomy, 4.0)],
        ),
    ]
}

// ============================================================================
// Building plans
// ============================================================================

/// Two turns to build; opens an astronomy program and costs gold to run.
fn tracking_station_plan() -> BuildingPlan {
    BuildingPlan {
        name: "Tracking station".to_string(),
        build_turns: 2,
        costs: BTreeMap::from([(ResourceType::ConstructionMaterials, 80)]),
        science_bonus: Some((Science::Astronomy, fixed(0.5))),
        upkeep: Some((ResourceType::Gold, 3)),
    }
}

/// Three turns to build; doubles the commission's engineering output.
fn propulsion_complex_plan() -> BuildingPlan {
    BuildingPlan {
        name: "Propulsion research complex".to_string(),
        build_turns: 3,
        costs: BTreeMap::from([(ResourceType::ConstructionMaterials, 60)]),
        science_bonus: Some((Science::Engineering, fixed(0.5))),
        upkeep: Some((ResourceType::Gold, 2)),
    }
}

// ============================================================================
// Session builders
// ============================================================================

fn founded_agency(tech_defs: Vec<TechDef>) -> Game {
    Game::new(GameSetup {
        action_catalog: campaign_catalog(),
        tech_defs,
        sponsor: state_commission(),
        company_name: "Glavkosmos".to_string(),
        config: GameConfig {
            start_year: 1957,
            seed: 11,
        },
    })
    .unwrap()
}

fn count_kind(notes: &[Notification], kind: NotificationKind) -> usize {
    notes.iter().filter(|n| n.kind() == kind).count()
}

// ============================================================================
// Test 1: The first five-year plan
// ============================================================================

/// Run the opening five turns of a campaign: lobby for influence, buy
/// alloys, build a tracking station, and research the first technology.
/// Verifies the exact ledger arithmetic across all five pipeline phases and
/// the full notification record of the period.
#[test]
fn test_first_five_year_plan() {
    let mut game = founded_agency(rocketry_techs());
    let zone = game.add_zone("Kazakh steppe");
    let site = game.add_location(zone, "Site 1").unwrap();

    // 1957 directives. Costs are charged immediately.
    game.activate_action(ActionId(11), None).unwrap();
    game.activate_action(ActionId(12), None).unwrap();
    let station = game
        .begin_construction(site, &[0, 1], tracking_station_plan())
        .unwrap();
    game.set_research_target(Some(TechId(0))).unwrap();
    game.draw_card().unwrap();

    assert_eq!(game.company().ledger().resource(ResourceType::Gold), 320);
    assert_eq!(game.company().ledger().resource(ResourceType::Influence), 35);
    assert_eq!(
        game.company()
            .ledger()
            .resource(ResourceType::ConstructionMaterials),
        40
    );
    assert_eq!(game.deck().remaining(), 4);

    for _ in 0..5 {
        game.advance_turn().unwrap();
    }
    assert_eq!(game.year(), 1962);

    // Lobby returned 3 influence for three turns; alloys delivered 25
    // materials for two; the station charged 3 gold upkeep from 1958 on.
    assert_eq!(game.company().ledger().resource(ResourceType::Gold), 308);
    assert_eq!(game.company().ledger().resource(ResourceType::Influence), 44);
    assert_eq!(
        game.company()
            .ledger()
            .resource(ResourceType::ConstructionMaterials),
        90
    );
    assert!(game.company().active_actions().is_empty());

    // The finished station opened an astronomy program.
    assert!(game.world().building(station).unwrap().is_built());
    assert_eq!(
        game.company().ledger().science_rate(Science::Astronomy),
        fixed(0.5)
    );

    // Physics 1.0/turn against an exact 3.0 requirement: researched in 1959,
    // unlocking its tier-1 dependent and leaving the tier-2 capstone locked.
    assert_eq!(
        game.techweb().status(TechId(0)).unwrap(),
        TechStatus::Researched
    );
    assert_eq!(
        game.techweb().status(TechId(1)).unwrap(),
        TechStatus::Unlocked
    );
    assert_eq!(game.techweb().status(TechId(2)).unwrap(), TechStatus::Locked);
    assert_eq!(game.research_target(), None);

    assert_eq!(game.history().samples(), 5);
    assert_eq!(
        game.history().latest_resource(ResourceType::Gold),
        Some(308)
    );

    let notes = game.drain_notifications();
    assert_eq!(count_kind(&notes, NotificationKind::ActionActivated), 2);
    assert_eq!(count_kind(&notes, NotificationKind::ActionCompleted), 2);
    assert_eq!(count_kind(&notes, NotificationKind::ConstructionStarted), 1);
    assert_eq!(count_kind(&notes, NotificationKind::ConstructionCompleted), 1);
    assert_eq!(count_kind(&notes, NotificationKind::ResearchProgress), 3);
    assert_eq!(count_kind(&notes, NotificationKind::ResearchCompleted), 1);
    assert_eq!(count_kind(&notes, NotificationKind::TechnologyUnlocked), 1);
    // The two target-less years after the breakthrough stalled.
    assert_eq!(count_kind(&notes, NotificationKind::ScienceStalled), 2);

    assert!(notes.contains(&Notification::ConstructionCompleted {
        building: station,
        location: site,
        year: 1958,
    }));
    assert!(notes.contains(&Notification::ResearchCompleted {
        tech: TechId(0),
        year: 1959,
    }));
}

// ============================================================================
// Test 2: A research complex accelerates engineering
// ============================================================================

/// Race two identical agencies toward a physics-and-engineering technology.
/// One builds a propulsion complex whose bonus doubles the engineering rate
/// mid-campaign; the other relies on the sponsor's base rate. The complex
/// should cut two full years off the program.
#[test]
fn test_lab_accelerates_engineering_research() {
    let program = vec![tech(
        0,
        "Staged combustion",
        Tier::Tier0,
        &[],
        &[(Science::Physics, 4.0), (Science::Engineering, 3.0)],
    )];

    let turns_to_research = |game: &mut Game| -> u32 {
        game.set_research_target(Some(TechId(0))).unwrap();
        for turn in 1..=10 {
            game.advance_turn().unwrap();
            if game.techweb().status(TechId(0)).unwrap() == TechStatus::Researched {
                return turn;
            }
        }
        panic!("research never completed within ten turns");
    };

    // Control: engineering 0.5/turn fills the 3.0 requirement in six turns.
    let mut control = founded_agency(program.clone());
    assert_eq!(turns_to_research(&mut control), 6);
    assert_eq!(
        control.company().ledger().science_rate(Science::Engineering),
        fixed(0.5)
    );

    // With the complex: built during the third turn, so turns four onward
    // run engineering at 1.0 and the requirement fills in four turns total.
    let mut accelerated = founded_agency(program);
    let zone = accelerated.add_zone("Kazakh steppe");
    let site = accelerated.add_location(zone, "Site 1").unwrap();
    accelerated
        .begin_construction(site, &[0, 1], propulsion_complex_plan())
        .unwrap();
    assert_eq!(turns_to_research(&mut accelerated), 4);
    assert_eq!(
        accelerated
            .company()
            .ledger()
            .science_rate(Science::Engineering),
        fixed(1.0)
    );
}

// ============================================================================
// Test 3: Bond income carries the station's upkeep
// ============================================================================

/// A bond drive pays 15 gold for five years while a tracking station
/// charges 3 a year forever. Verifies the ledger trend the history series
/// records and the exact closing balance after eight turns.
#[test]
fn test_bond_drive_finances_outpost() {
    let mut game = founded_agency(rocketry_techs());
    let zone = game.add_zone("Kazakh steppe");
    let site = game.add_location(zone, "Site 1").unwrap();

    game.activate_action(ActionId(13), None).unwrap();
    game.begin_construction(site, &[0, 1], tracking_station_plan())
        .unwrap();

    for _ in 0..8 {
        game.advance_turn().unwrap();
    }
    assert_eq!(game.year(), 1965);

    // Income: 15 * 5 bond years. Upkeep: 3 gold from 1958 through 1964.
    assert_eq!(game.company().ledger().resource(ResourceType::Gold), 454);

    let series = game.history().resource_series(ResourceType::Gold);
    assert_eq!(series.len(), 8);
    assert_eq!(series[0], 415); // dividend only; station still building
    assert_eq!(series[1], 427); // dividend minus first upkeep charge
    assert_eq!(series[7], 454);

    let notes = game.drain_notifications();
    assert!(notes.contains(&Notification::ActionCompleted {
        action: ActionId(13),
        location: None,
        year: 1961,
    }));
}

// ============================================================================
// Test 4: Lectures open a discipline the sponsor lacks
// ============================================================================

/// Target an astronomy-only technology with no astronomy rate: every turn
/// stalls. The lecture circuit then installs a permanent astronomy rate and
/// research proceeds to completion.
#[test]
fn test_academy_lectures_open_astronomy() {
    let program = vec![tech(
        0,
        "Orbital telemetry",
        Tier::Tier0,
        &[],
        &[(Science::Astronomy, 4.0)],
    )];
    let mut game = founded_agency(program);
    game.set_research_target(Some(TechId(0))).unwrap();

    // Physics and engineering flow but nothing absorbs them.
    game.advance_turn().unwrap();
    assert_eq!(game.techweb().progress(TechId(0)).unwrap(), fixed(0.0));

    game.activate_action(ActionId(14), None).unwrap();
    for _ in 0..4 {
        game.advance_turn().unwrap();
    }

    // Two lecture ticks left a permanent 1.2 rate: 0.6 + 1.2 + 1.2 + 1.2
    // clamps onto the 4.0 requirement on the fourth post-stall turn.
    assert_eq!(
        game.techweb().status(TechId(0)).unwrap(),
        TechStatus::Researched
    );
    assert_eq!(
        game.company().ledger().science_rate(Science::Astronomy),
        fixed(1.2)
    );

    let notes = game.drain_notifications();
    assert_eq!(count_kind(&notes, NotificationKind::ScienceStalled), 1);
    assert_eq!(count_kind(&notes, NotificationKind::ResearchProgress), 4);
}

// ============================================================================
// Test 5: Parallel sites, then demolition
// ============================================================================

/// Build at two launch sites in different zones, staggered so the alloy
/// order can finance the second structure. Demolishing the first structure
/// revokes its bonus, stops its upkeep, and poisons its ground.
#[test]
fn test_parallel_sites_and_demolition() {
    let mut game = founded_agency(rocketry_techs());
    let zone_a = game.add_zone("Kazakh steppe");
    let zone_b = game.add_zone("Crimean highlands");
    let site_a = game.add_location(zone_a, "Site 1").unwrap();
    let site_b = game.add_location(zone_b, "Site 2").unwrap();

    let station = game
        .begin_construction(site_a, &[0, 1], tracking_station_plan())
        .unwrap();
    game.activate_action(ActionId(12), None).unwrap();

    game.advance_turn().unwrap();
    game.advance_turn().unwrap();

    // Alloy deliveries (2 x 25) top the stock back up to 90.
    assert_eq!(
        game.company()
            .ledger()
            .resource(ResourceType::ConstructionMaterials),
        90
    );
    let complex = game
        .begin_construction(site_b, &[0, 1], propulsion_complex_plan())
        .unwrap();

    for _ in 0..3 {
        game.advance_turn().unwrap();
    }
    assert!(game.world().building(station).unwrap().is_built());
    assert!(game.world().building(complex).unwrap().is_built());
    assert_eq!(game.world().buildings().count(), 2);
    assert_eq!(
        game.company().ledger().science_rate(Science::Astronomy),
        fixed(0.5)
    );
    assert_eq!(
        game.company().ledger().science_rate(Science::Engineering),
        fixed(1.0)
    );

    game.demolish(station).unwrap();
    assert_eq!(game.world().buildings().count(), 1);
    assert_eq!(
        game.company().ledger().science_rate(Science::Astronomy),
        fixed(0.0)
    );
    // Engineering came from the complex and survives.
    assert_eq!(
        game.company().ledger().science_rate(Science::Engineering),
        fixed(1.0)
    );

    let sectors_a = game.world().location(site_a).unwrap().sectors();
    assert_eq!(sectors_a[0], SectorStatus::Destroyed);
    assert_eq!(sectors_a[1], SectorStatus::Destroyed);
    let sectors_b = game.world().location(site_b).unwrap().sectors();
    assert_eq!(sectors_b[0], SectorStatus::Built);
    assert_eq!(sectors_b[2], SectorStatus::Empty);

    // Only the complex charges upkeep now.
    let before = game.company().ledger().resource(ResourceType::Gold);
    game.advance_turn().unwrap();
    let after = game.company().ledger().resource(ResourceType::Gold);
    assert_eq!(before - after, 2);
}

// ============================================================================
// Test 6: Twelve-year replay determinism
// ============================================================================

/// Run the same twelve-year campaign script in two sessions with the same
/// seed. State hashes, drained notifications, and final calendars must
/// agree at every turn boundary.
#[test]
fn test_replay_long_campaign() {
    fn run_script(game: &mut Game) -> (Vec<u64>, Vec<Notification>) {
        let mut hashes = Vec::new();
        let mut notes = Vec::new();

        let zone = game.add_zone("Kazakh steppe");
        let site_a = game.add_location(zone, "Site 1").unwrap();
        let site_b = game.add_location(zone, "Site 2").unwrap();

        game.draw_card().unwrap();
        game.activate_action(ActionId(11), None).unwrap();
        game.set_research_target(Some(TechId(0))).unwrap();
        let station = game
            .begin_construction(site_a, &[0, 1], tracking_station_plan())
            .unwrap();

        for turn in 1..=12 {
            if turn == 3 {
                game.activate_action(ActionId(12), None).unwrap();
            }
            if turn == 5 {
                game.begin_construction(site_b, &[0, 1], propulsion_complex_plan())
                    .unwrap();
            }
            if turn == 6 {
                game.set_research_target(Some(TechId(1))).unwrap();
            }
            if turn == 9 {
                game.demolish(station).unwrap();
            }
            game.advance_turn().unwrap();
            hashes.push(game.state_hash());
            notes.extend(game.drain_notifications());
        }
        (hashes, notes)
    }

    let mut first = founded_agency(rocketry_techs());
    let mut second = founded_agency(rocketry_techs());

    let (hashes_a, notes_a) = run_script(&mut first);
    let (hashes_b, notes_b) = run_script(&mut second);

    assert_eq!(hashes_a, hashes_b);
    assert_eq!(notes_a, notes_b);
    assert_eq!(first.year(), 1969);
    assert_eq!(second.year(), 1969);
}
