//! Kuiper Data -- content loading for campaign definitions.
//!
//! Actions, sponsors, and the technology web are authored as data files in
//! RON, TOML, or JSON (format detected by extension). This crate holds the
//! raw serde records ([`schema`]) and the loading pipeline ([`loader`])
//! that converts them into the validated catalog types the simulation
//! consumes. Float amounts live only in documents; they become fixed point
//! at this boundary.

pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, GameData, load_game_data};
