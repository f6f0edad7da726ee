//! The game session: owns every aggregate and orchestrates the five-phase
//! turn pipeline.
//!
//! # Architecture
//!
//! The `Game` owns:
//! - A [`Company`] (ledger plus active actions)
//! - A [`World`] (zones, locations, buildings under construction)
//! - A [`TechWeb`] (rolled research requirements and progress)
//! - A [`Deck`] of action cards and the immutable [`ActionCatalog`]
//! - A [`NotificationQueue`] and a [`TurnHistory`] (both transient)
//!
//! Commands between turns (activate, draw, target research, build) validate
//! against the current state and either apply fully or return a typed error
//! with nothing written.
//!
//! # Five-Phase Pipeline
//!
//! Each `advance_turn()` runs:
//! 1. **Actions** -- active actions apply per-turn mutations; countdowns at
//!    zero apply completion effects and retire
//! 2. **Construction** -- build countdowns advance; completed buildings
//!    claim their sectors and grant their science bonus
//! 3. **Upkeep** -- standing charges from built structures hit the ledger
//! 4. **Research** -- science rates flow into the research target; a turn
//!    with nowhere for nonzero rates to go raises a stall
//! 5. **Notify & bookkeeping** -- component events become notifications,
//!    history samples the ledger, the year advances

use kuiper_core::catalog::{ActionCatalog, SponsorDef};
use kuiper_core::company::{Company, CompanyError, CompanyEvent};
use kuiper_core::fixed::{Fixed64, Year};
use kuiper_core::id::{ActionId, BuildingKey, LocationId, TechId, ZoneId};
use kuiper_core::notify::{Notification, NotificationQueue};
use kuiper_core::world::{BuildingPlan, SectorStatus, World, WorldError, WorldEvent};
use kuiper_techweb::{TechDef, TechEvent, TechStatus, TechWeb, TechWebBuilder, TechWebError};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::deck::{Deck, DeckError};
use crate::history::{HistoryConfig, TurnHistory};

/// Stream separator for requirement rolls, so the tech web and the deck
/// never draw from the same RNG sequence.
const TECH_ROLL_SALT: u64 = 0x6B75_6970_6572_7477;

/// Build and roll a tech web from definitions. Restores use the same seed
/// derivation so a rebuilt web accepts the saved state.
pub(crate) fn build_techweb(
    tech_defs: Vec<TechDef>,
    seed: u64,
) -> Result<TechWeb, TechWebError> {
    let mut builder = TechWebBuilder::new();
    for def in tech_defs {
        builder.register(def);
    }
    let mut rng = SmallRng::seed_from_u64(seed ^ TECH_ROLL_SALT);
    builder.build(&mut rng)
}

// ---------------------------------------------------------------------------
// Configuration and setup
// ---------------------------------------------------------------------------

/// Session-level knobs fixed at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Calendar year of the first turn.
    pub start_year: Year,
    /// Master seed for requirement rolls and deck shuffles.
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            start_year: 1957,
            seed: 0,
        }
    }
}

/// Everything needed to start a session. Catalogs come from the data layer;
/// the sponsor decides the starting ledger.
#[derive(Debug, Clone)]
pub struct GameSetup {
    pub action_catalog: ActionCatalog,
    pub tech_defs: Vec<TechDef>,
    pub sponsor: SponsorDef,
    pub company_name: String,
    pub config: GameConfig,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum NewGameError {
    #[error("technology catalog rejected: {0}")]
    TechWeb(#[from] TechWebError),
}

#[derive(Debug, thiserror::Error)]
pub enum ActivateError {
    #[error("unknown action {0:?}")]
    UnknownAction(ActionId),
    #[error("unknown location {0:?}")]
    UnknownLocation(LocationId),
    #[error(transparent)]
    Company(#[from] CompanyError),
}

#[derive(Debug, thiserror::Error)]
pub enum ResearchError {
    #[error("unknown technology {0:?}")]
    UnknownTech(TechId),
    #[error("technology {0:?} is still locked")]
    Locked(TechId),
    #[error("technology {0:?} is already researched")]
    AlreadyResearched(TechId),
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Site(#[from] WorldError),
    #[error(transparent)]
    Funds(#[from] CompanyError),
}

/// Integrity failures inside the pipeline. These indicate state referencing
/// ids its own catalogs no longer carry, so the turn is abandoned.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error(transparent)]
    Company(#[from] CompanyError),
    #[error(transparent)]
    TechWeb(#[from] TechWebError),
}

// ---------------------------------------------------------------------------
// State hash
// ---------------------------------------------------------------------------

/// A deterministic digest of session state for replay comparison.
///
/// Uses FNV-1a (64-bit) for speed and simplicity. Not cryptographic.
struct StateHash(u64);

impl StateHash {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    fn new() -> Self {
        Self(Self::FNV_OFFSET)
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(Self::FNV_PRIME);
        }
    }

    fn write_u32(&mut self, v: u32) {
        self.write(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    fn write_i64(&mut self, v: i64) {
        self.write(&v.to_le_bytes());
    }

    fn write_fixed64(&mut self, v: Fixed64) {
        self.write(&v.to_bits().to_le_bytes());
    }

    fn finish(self) -> u64 {
        self.0
    }
}

fn sector_code(status: SectorStatus) -> u32 {
    match status {
        SectorStatus::Empty => 0,
        SectorStatus::Constructing => 1,
        SectorStatus::Built => 2,
        SectorStatus::Destroyed => 3,
    }
}

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

/// One running session. Commands mutate between turns; `advance_turn` runs
/// the pipeline and moves the calendar.
#[derive(Debug)]
pub struct Game {
    /// Creation-time configuration, kept for snapshots.
    pub(crate) config: GameConfig,

    /// The year the next `advance_turn` will simulate.
    pub(crate) year: Year,

    /// The player aggregate.
    pub(crate) company: Company,

    /// Zones, locations, and buildings.
    pub(crate) world: World,

    /// Research state with rolled requirements.
    pub(crate) techweb: TechWeb,

    /// Immutable action templates. Never serialized; snapshots store ids.
    pub(crate) catalog: ActionCatalog,

    /// Shuffled action cards.
    pub(crate) deck: Deck,

    /// Where science rates flow during the research phase.
    pub(crate) research_target: Option<TechId>,

    /// Player-facing queue, drained by the UI. Transient.
    pub(crate) notifications: NotificationQueue,

    /// Ledger trend series. Transient.
    pub(crate) history: TurnHistory,
}

impl Game {
    /// Start a session: build the tech web (rolling requirements from the
    /// seed), seed the ledger from the sponsor, and shuffle the deck.
    pub fn new(setup: GameSetup) -> Result<Self, NewGameError> {
        let GameSetup {
            action_catalog,
            tech_defs,
            sponsor,
            company_name,
            config,
        } = setup;

        let techweb = build_techweb(tech_defs, config.seed)?;

        let mut company = Company::new(&company_name);
        for (&resource, &amount) in &sponsor.starting_resources {
            company.ledger_mut().set_resource(resource, amount);
        }
        for (&science, &rate) in &sponsor.starting_science_rates {
            company.ledger_mut().set_science_rate(science, rate);
        }

        let deck = Deck::new(&action_catalog, config.seed);

        Ok(Self {
            config,
            year: config.start_year,
            company,
            world: World::new(),
            techweb,
            catalog: action_catalog,
            deck,
            research_target: None,
            notifications: NotificationQueue::new(),
            history: TurnHistory::new(&HistoryConfig::default()),
        })
    }

    // -----------------------------------------------------------------------
    // World setup
    // -----------------------------------------------------------------------

    pub fn add_zone(&mut self, name: &str) -> ZoneId {
        self.world.add_zone(name)
    }

    pub fn add_location(&mut self, zone: ZoneId, name: &str) -> Result<LocationId, WorldError> {
        self.world.add_location(zone, name)
    }

    // -----------------------------------------------------------------------
    // Commands (between turns)
    // -----------------------------------------------------------------------

    /// Play an action, optionally onto a location. Costs are charged
    /// atomically; rejection leaves the ledger untouched.
    pub fn activate_action(
        &mut self,
        action: ActionId,
        location: Option<LocationId>,
    ) -> Result<(), ActivateError> {
        let def = self
            .catalog
            .get(action)
            .ok_or(ActivateError::UnknownAction(action))?;
        if let Some(loc) = location {
            if self.world.location(loc).is_none() {
                return Err(ActivateError::UnknownLocation(loc));
            }
        }
        self.company.activate(def, location, self.year)?;
        Ok(())
    }

    /// Take the top card of the deck.
    pub fn draw_card(&mut self) -> Result<ActionId, DeckError> {
        self.deck.draw()
    }

    /// Rebuild the deck from the catalog. Deterministic per seed and
    /// reshuffle count.
    pub fn reshuffle_deck(&mut self) {
        self.deck.reshuffle(&self.catalog);
    }

    /// Point the research phase at a technology, or clear it with `None`.
    /// Locked and already-researched targets are rejected.
    pub fn set_research_target(&mut self, target: Option<TechId>) -> Result<(), ResearchError> {
        if let Some(tech) = target {
            let status = self
                .techweb
                .status(tech)
                .map_err(|_| ResearchError::UnknownTech(tech))?;
            match status {
                TechStatus::Locked => return Err(ResearchError::Locked(tech)),
                TechStatus::Researched => return Err(ResearchError::AlreadyResearched(tech)),
                TechStatus::Unlocked | TechStatus::Researching => {}
            }
        }
        self.research_target = target;
        Ok(())
    }

    /// Start a building: validate the site, charge the plan's costs, then
    /// claim the sectors. Any rejection leaves both ledger and world
    /// untouched.
    pub fn begin_construction(
        &mut self,
        location: LocationId,
        sectors: &[u8],
        plan: BuildingPlan,
    ) -> Result<BuildingKey, BuildError> {
        self.world.check_site(location, sectors)?;
        if plan.build_turns == 0 {
            return Err(BuildError::Site(WorldError::ZeroBuildTurns));
        }
        self.company
            .try_spend(plan.costs.iter().map(|(&kind, &amount)| (kind, amount)))?;
        let key = self.world.begin_construction(location, sectors, plan, self.year)?;
        Ok(key)
    }

    /// Tear a building down. A built structure's science bonus is revoked;
    /// its sectors are permanently destroyed.
    pub fn demolish(&mut self, key: BuildingKey) -> Result<(), WorldError> {
        let removed = self.world.demolish(key)?;
        if removed.is_built() {
            if let Some((science, bonus)) = removed.science_bonus() {
                self.company.ledger_mut().add_science_rate(science, -bonus);
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Turn pipeline
    // -----------------------------------------------------------------------

    /// Simulate the current year and advance the calendar. Returns the new
    /// year. Events raised anywhere in the pipeline surface as
    /// notifications stamped with the simulated year.
    pub fn advance_turn(&mut self) -> Result<Year, TurnError> {
        let year = self.year;

        // Phase 1: Actions -- per-turn mutations and completions.
        self.company.advance_actions(&self.catalog, year)?;

        // Phase 2: Construction -- countdowns; completions grant bonuses.
        let completed = self.world.advance_constructions(year);
        for key in completed {
            if let Some(building) = self.world.building(key) {
                if let Some((science, bonus)) = building.science_bonus() {
                    self.company.ledger_mut().add_science_rate(science, bonus);
                }
            }
        }

        // Phase 3: Upkeep -- standing charges from built structures.
        for (_, building) in self.world.buildings() {
            if !building.is_built() {
                continue;
            }
            if let Some((resource, amount)) = building.upkeep() {
                self.company.ledger_mut().add_resource(resource, -amount);
            }
        }

        // Phase 4: Research -- route science rates into the target.
        self.phase_research(year)?;

        // Phase 5: Notify & bookkeeping.
        self.phase_notify();
        self.history.sample(self.company.ledger());
        self.year = year + 1;
        Ok(self.year)
    }

    fn phase_research(&mut self, year: Year) -> Result<(), TurnError> {
        let rates: Vec<_> = self
            .company
            .ledger()
            .science_rates()
            .filter(|&(_, rate)| rate > Fixed64::ZERO)
            .collect();

        let mut absorbed = false;
        if let Some(target) = self.research_target {
            for &(science, rate) in &rates {
                let consumed = self.techweb.add_progress(target, science, rate, year)?;
                if consumed > Fixed64::ZERO {
                    absorbed = true;
                }
            }
            // A finished target stops absorbing; the player picks the next.
            if self.techweb.researched(target)? {
                self.research_target = None;
            }
        }

        if !rates.is_empty() && !absorbed {
            self.notifications.emit(Notification::ScienceStalled { year });
        }
        Ok(())
    }

    fn phase_notify(&mut self) {
        for event in self.company.drain_events() {
            self.notifications.emit(match event {
                CompanyEvent::ActionActivated { action, year } => {
                    Notification::ActionActivated { action, year }
                }
                CompanyEvent::ActionCompleted {
                    action,
                    location,
                    year,
                } => Notification::ActionCompleted {
                    action,
                    location,
                    year,
                },
            });
        }
        for event in self.world.drain_events() {
            self.notifications.emit(match event {
                WorldEvent::ConstructionStarted {
                    building,
                    location,
                    year,
                } => Notification::ConstructionStarted {
                    building,
                    location,
                    year,
                },
                WorldEvent::ConstructionCompleted {
                    building,
                    location,
                    year,
                } => Notification::ConstructionCompleted {
                    building,
                    location,
                    year,
                },
            });
        }
        for event in self.techweb.drain_events() {
            self.notifications.emit(match event {
                TechEvent::ProgressAdded {
                    tech,
                    science,
                    consumed,
                    year,
                } => Notification::ResearchProgress {
                    tech,
                    science,
                    consumed,
                    year,
                },
                TechEvent::ResearchCompleted { tech, year } => {
                    Notification::ResearchCompleted { tech, year }
                }
                TechEvent::TechnologyUnlocked { tech, year } => {
                    Notification::TechnologyUnlocked { tech, year }
                }
            });
        }
    }

    // -----------------------------------------------------------------------
    // Query API (read-only)
    // -----------------------------------------------------------------------

    pub fn year(&self) -> Year {
        self.year
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn company(&self) -> &Company {
        &self.company
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn techweb(&self) -> &TechWeb {
        &self.techweb
    }

    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn research_target(&self) -> Option<TechId> {
        self.research_target
    }

    pub fn history(&self) -> &TurnHistory {
        &self.history
    }

    pub fn pending_notifications(&self) -> &[Notification] {
        self.notifications.pending()
    }

    /// Take all queued notifications, oldest first.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain()
    }

    /// Compute a deterministic digest of the full persistent state. Two
    /// sessions with the same seed and command history always agree.
    pub fn state_hash(&self) -> u64 {
        let mut hasher = StateHash::new();

        hasher.write_u32(self.year);
        hasher.write_u64(self.config.seed);
        hasher.write_u32(self.config.start_year);

        // Company: name, stocks, rates, active actions in insertion order.
        hasher.write(self.company.name().as_bytes());
        for (kind, amount) in self.company.ledger().resources() {
            hasher.write(kind.label().as_bytes());
            hasher.write_i64(amount);
        }
        for (science, rate) in self.company.ledger().science_rates() {
            hasher.write(science.label().as_bytes());
            hasher.write_fixed64(rate);
        }
        for entry in self.company.active_actions() {
            hasher.write_u32(entry.action.0);
            hasher.write_u32(entry.turns_remaining);
            match entry.location {
                Some(loc) => {
                    hasher.write_u32(1);
                    hasher.write_u32(loc.0);
                }
                None => hasher.write_u32(0),
            }
        }

        // Research: target plus rolled requirements and progress.
        match self.research_target {
            Some(tech) => {
                hasher.write_u32(1);
                hasher.write_u32(tech.0);
            }
            None => hasher.write_u32(0),
        }
        let tech_state = self.techweb.export_state();
        for (tech, rolled) in &tech_state.rolled {
            hasher.write_u32(tech.0);
            for (science, amount) in rolled {
                hasher.write(science.label().as_bytes());
                hasher.write_fixed64(*amount);
            }
        }
        for (tech, progress) in &tech_state.progress {
            hasher.write_u32(tech.0);
            for (science, amount) in progress {
                hasher.write(science.label().as_bytes());
                hasher.write_fixed64(*amount);
            }
        }

        // Deck order and reshuffle count.
        hasher.write_u32(self.deck.reshuffles());
        for &card in self.deck.cards() {
            hasher.write_u32(card.0);
        }

        // World: zones, locations with sector statuses, buildings in arena
        // order (stable for identical histories).
        for zone in self.world.zones() {
            hasher.write_u32(zone.id().0);
            hasher.write(zone.name().as_bytes());
        }
        for location in self.world.locations() {
            hasher.write_u32(location.id().0);
            hasher.write_u32(location.zone().0);
            for &status in location.sectors() {
                hasher.write_u32(sector_code(status));
            }
        }
        for (_, building) in self.world.buildings() {
            hasher.write(building.name().as_bytes());
            hasher.write_u32(building.location().0);
            for &sector in building.sectors() {
                hasher.write_u32(u32::from(sector));
            }
            hasher.write_u32(building.turns_remaining());
        }

        hasher.finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
