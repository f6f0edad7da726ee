//! Save-file encoding for a running [`Game`].
//!
//! A snapshot is a bitcode blob: a small self-describing header followed
//! by the dynamic state (calendar, company, world, tech web progress with
//! its rolled requirements, research target, and deck order). Catalogs and
//! tech definitions are content rather than state, so they are never
//! written; [`Game::restore`] takes them as arguments and re-validates
//! every persisted id against them before handing the game back.
//! Notifications and ledger history are presentation state and restart
//! empty.

use kuiper_core::catalog::ActionCatalog;
use kuiper_core::company::Company;
use kuiper_core::fixed::Year;
use kuiper_core::id::{ActionId, LocationId, TechId};
use kuiper_core::notify::NotificationQueue;
use kuiper_core::world::World;
use kuiper_techweb::{TechDef, TechWebError, TechWebState};
use serde::{Deserialize, Serialize};

use crate::deck::Deck;
use crate::game::{Game, GameConfig, build_techweb};
use crate::history::{HistoryConfig, TurnHistory};

/// Leading bytes of every snapshot ("KUIP").
pub const SNAPSHOT_MAGIC: u32 = 0x4B55_4950;

/// Format written by this build.
pub const FORMAT_VERSION: u32 = 1;

/// Oldest format this build can still read.
pub const MIN_SUPPORTED_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures while encoding a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("snapshot encoding failed: {0}")]
    Encode(String),
}

/// Failures while decoding or validating a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("not a kuiper snapshot (magic {0:#010x})")]
    InvalidMagic(u32),

    #[error("snapshot format v{0} is newer than this build's v{max}", max = FORMAT_VERSION)]
    FutureVersion(u32),

    #[error("snapshot format v{0} is older than the supported v{min}", min = MIN_SUPPORTED_VERSION)]
    UnsupportedVersion(u32),

    #[error("snapshot decoding failed: {0}")]
    Decode(String),

    #[error("snapshot references action {0:?} missing from the catalog")]
    UnknownAction(ActionId),

    #[error("snapshot references location {0:?} missing from the saved world")]
    UnknownLocation(LocationId),

    #[error(transparent)]
    TechWeb(#[from] TechWebError),
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Fixed preamble of every snapshot. Decoded and checked before any state
/// is trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
    /// The year the saved game would simulate next.
    pub year: Year,
}

impl SnapshotHeader {
    pub fn new(year: Year) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
            year,
        }
    }

    /// Check magic and version bounds, in that order.
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(LoadError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(LoadError::FutureVersion(self.version));
        }
        if self.version < MIN_SUPPORTED_VERSION {
            return Err(LoadError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

/// Decode just the header of a snapshot, without validating it. Lets a
/// caller report the version of a save this build refuses to load.
pub fn read_snapshot_header(data: &[u8]) -> Result<SnapshotHeader, LoadError> {
    let snapshot: GameSnapshot =
        bitcode::deserialize(data).map_err(|e| LoadError::Decode(e.to_string()))?;
    Ok(snapshot.header)
}

// ---------------------------------------------------------------------------
// Snapshot payload
// ---------------------------------------------------------------------------

/// Everything a save file carries. Event queues inside `company` and
/// `world` are skipped by their own serde derives.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GameSnapshot {
    header: SnapshotHeader,
    config: GameConfig,
    company: Company,
    world: World,
    tech_state: TechWebState,
    research_target: Option<TechId>,
    deck: Deck,
}

impl Game {
    /// Encode the persistent state into a save blob.
    pub fn save(&self) -> Result<Vec<u8>, SaveError> {
        let snapshot = GameSnapshot {
            header: SnapshotHeader::new(self.year),
            config: self.config,
            company: self.company.clone(),
            world: self.world.clone(),
            tech_state: self.techweb.export_state(),
            research_target: self.research_target,
            deck: self.deck.clone(),
        };
        bitcode::serialize(&snapshot).map_err(|e| SaveError::Encode(e.to_string()))
    }

    /// Rebuild a game from a save blob plus the content it was played
    /// against.
    ///
    /// The tech web is rebuilt from `tech_defs` with the saved seed and
    /// then overlaid with the saved progress, so the definitions must
    /// cover exactly the technologies the save knows. Every action and
    /// location id in the save is checked against `action_catalog` and
    /// the saved world. Notifications and history restart empty.
    pub fn restore(
        action_catalog: ActionCatalog,
        tech_defs: Vec<TechDef>,
        data: &[u8],
    ) -> Result<Self, LoadError> {
        let snapshot: GameSnapshot =
            bitcode::deserialize(data).map_err(|e| LoadError::Decode(e.to_string()))?;
        snapshot.header.validate()?;

        let mut techweb = build_techweb(tech_defs, snapshot.config.seed)?;
        techweb.apply_state(snapshot.tech_state)?;

        for active in snapshot.company.active_actions() {
            if action_catalog.get(active.action).is_none() {
                return Err(LoadError::UnknownAction(active.action));
            }
            if let Some(location) = active.location {
                if snapshot.world.location(location).is_none() {
                    return Err(LoadError::UnknownLocation(location));
                }
            }
        }
        if let Some(target) = snapshot.research_target {
            if techweb.get(target).is_none() {
                return Err(LoadError::TechWeb(TechWebError::UnknownTech(target)));
            }
        }
        for &card in snapshot.deck.cards() {
            if action_catalog.get(card).is_none() {
                return Err(LoadError::UnknownAction(card));
            }
        }

        Ok(Game {
            config: snapshot.config,
            year: snapshot.header.year,
            company: snapshot.company,
            world: snapshot.world,
            techweb,
            catalog: action_catalog,
            deck: snapshot.deck,
            research_target: snapshot.research_target,
            notifications: NotificationQueue::new(),
            history: TurnHistory::new(&HistoryConfig::default()),
        })
    }
}

// ===========================================================================
// Tests
// ===========================================================================
