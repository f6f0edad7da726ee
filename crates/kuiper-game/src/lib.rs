//! Kuiper Game -- the campaign layer for space-agency games.
//!
//! This crate owns one running session: the player company, the spatial
//! world, the technology web, the shuffled action deck, and the calendar.
//! It drives them through a deterministic turn pipeline and persists them
//! as versioned save blobs.
//!
//! # Five-Phase Turn Pipeline
//!
//! Each call to [`game::Game::advance_turn`] simulates one calendar year
//! through the following phases:
//!
//! 1. **Actions** -- Active actions mutate the ledger in insertion order,
//!    count down, and complete.
//! 2. **Construction** -- In-progress buildings count down; completions
//!    come online and grant their science bonus.
//! 3. **Upkeep** -- Standing buildings charge their running costs.
//! 4. **Research** -- Science rates flow into the research target; a
//!    finished technology unlocks its dependents.
//! 5. **Notify** -- Domain events become turn-stamped notifications, the
//!    ledger history is sampled, and the calendar advances.
//!
//! # Session Lifecycle
//!
//! Commands are issued between turns and fail atomically; the pipeline
//! itself takes no input:
//!
//! ```rust,ignore
//! let mut game = Game::new(setup)?;
//! game.set_research_target(Some(TechId(4)))?;
//! game.activate_action(action, Some(site))?;
//! let year = game.advance_turn()?;
//! let save = game.save()?;
//! ```
//!
//! # Key Types
//!
//! - [`game::Game`] -- One session and its pipeline orchestrator.
//! - [`game::GameSetup`] / [`game::GameConfig`] -- Frozen content plus the
//!   seed and start year a session is created from.
//! - [`deck::Deck`] -- Seeded shuffle of the action catalog with
//!   deterministic reshuffles.
//! - [`history::TurnHistory`] -- Ring-buffered ledger series for trend
//!   panels.
//! - [`snapshot`] -- Versioned save blobs via bitcode, re-validated
//!   against content on restore.

pub mod deck;
pub mod game;
pub mod history;
pub mod snapshot;
