//! Spatial model: zones own locations, each location carries a fixed
//! hexagonal subdivision of six sectors, and buildings occupy distinct
//! sectors of exactly one location.
//!
//! The world owns sector state transitions. `Empty -> Constructing -> Built`
//! is the only forward path; `Destroyed` is terminal and a destroyed sector
//! never hosts another building. Ledger effects (construction costs, rate
//! bonuses, upkeep) are applied by the caller, never here.

use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};
use slotmap::SlotMap;

use crate::fixed::{Fixed64, Year};
use crate::id::{BuildingKey, LocationId, ZoneId};
use crate::resource::ResourceType;
use crate::science::Science;

/// Every location is subdivided into exactly this many sectors.
pub const SECTOR_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SectorStatus {
    Empty,
    Constructing,
    Built,
    Destroyed,
}

/// A named group of locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    id: ZoneId,
    name: String,
    locations: Vec<LocationId>,
}

impl Zone {
    pub fn id(&self) -> ZoneId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn locations(&self) -> &[LocationId] {
        &self.locations
    }
}

/// A buildable site with six sectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    id: LocationId,
    zone: ZoneId,
    name: String,
    sectors: [SectorStatus; SECTOR_COUNT],
}

impl Location {
    pub fn id(&self) -> LocationId {
        self.id
    }

    pub fn zone(&self) -> ZoneId {
        self.zone
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sectors(&self) -> &[SectorStatus; SECTOR_COUNT] {
        &self.sectors
    }
}

/// Everything needed to start a construction. Costs are charged by the
/// caller before the world mutates any sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingPlan {
    pub name: String,
    pub build_turns: u32,
    pub costs: BTreeMap<ResourceType, i64>,
    /// Per-turn science rate granted while the building stands.
    pub science_bonus: Option<(Science, Fixed64)>,
    /// Per-turn running cost charged while the building stands.
    pub upkeep: Option<(ResourceType, i64)>,
}

/// A structure occupying sectors of one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    name: String,
    location: LocationId,
    sectors: Vec<u8>,
    /// Turns of construction left; zero means the building stands.
    turns_remaining: u32,
    science_bonus: Option<(Science, Fixed64)>,
    upkeep: Option<(ResourceType, i64)>,
}

impl Building {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> LocationId {
        self.location
    }

    pub fn sectors(&self) -> &[u8] {
        &self.sectors
    }

    pub fn turns_remaining(&self) -> u32 {
        self.turns_remaining
    }

    pub fn is_built(&self) -> bool {
        self.turns_remaining == 0
    }

    pub fn science_bonus(&self) -> Option<(Science, Fixed64)> {
        self.science_bonus
    }

    pub fn upkeep(&self) -> Option<(ResourceType, i64)> {
        self.upkeep
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldEvent {
    ConstructionStarted {
        building: BuildingKey,
        location: LocationId,
        year: Year,
    },
    ConstructionCompleted {
        building: BuildingKey,
        location: LocationId,
        year: Year,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("unknown zone {0:?}")]
    UnknownZone(ZoneId),
    #[error("unknown location {0:?}")]
    UnknownLocation(LocationId),
    #[error("unknown building {0:?}")]
    UnknownBuilding(BuildingKey),
    #[error("no sectors selected")]
    NoSectors,
    #[error("sector index {0} out of range")]
    SectorOutOfRange(u8),
    #[error("sector index {0} selected twice")]
    DuplicateSector(u8),
    #[error("sector {index} is {status:?}, not empty")]
    SectorOccupied { index: u8, status: SectorStatus },
    #[error("building plan has zero build turns")]
    ZeroBuildTurns,
}

/// The zone/location/building graph. Zones and locations are id-indexed
/// records; buildings live in a generational arena so demolished keys can
/// never alias a later building.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    zones: BTreeMap<ZoneId, Zone>,
    locations: BTreeMap<LocationId, Location>,
    buildings: SlotMap<BuildingKey, Building>,
    next_zone: u32,
    next_location: u32,
    #[serde(skip)]
    events: Vec<WorldEvent>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self {
            zones: BTreeMap::new(),
            locations: BTreeMap::new(),
            buildings: SlotMap::with_key(),
            next_zone: 0,
            next_location: 0,
            events: Vec::new(),
        }
    }

    pub fn add_zone(&mut self, name: &str) -> ZoneId {
        let id = ZoneId(self.next_zone);
        self.next_zone += 1;
        self.zones.insert(
            id,
            Zone {
                id,
                name: name.to_string(),
                locations: Vec::new(),
            },
        );
        id
    }

    pub fn add_location(&mut self, zone: ZoneId, name: &str) -> Result<LocationId, WorldError> {
        let zone_entry = self
            .zones
            .get_mut(&zone)
            .ok_or(WorldError::UnknownZone(zone))?;
        let id = LocationId(self.next_location);
        self.next_location += 1;
        zone_entry.locations.push(id);
        self.locations.insert(
            id,
            Location {
                id,
                zone,
                name: name.to_string(),
                sectors: [SectorStatus::Empty; SECTOR_COUNT],
            },
        );
        Ok(id)
    }

    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.get(&id)
    }

    pub fn location(&self, id: LocationId) -> Option<&Location> {
        self.locations.get(&id)
    }

    pub fn building(&self, key: BuildingKey) -> Option<&Building> {
        self.buildings.get(key)
    }

    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values()
    }

    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.locations.values()
    }

    pub fn buildings(&self) -> impl Iterator<Item = (BuildingKey, &Building)> {
        self.buildings.iter()
    }

    /// Take all pending events, leaving the buffer empty.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.events)
    }

    /// Validate a construction site without mutating it. `begin_construction`
    /// repeats these checks, so a caller that charges costs in between can
    /// rely on the follow-up call succeeding.
    pub fn check_site(&self, location: LocationId, sectors: &[u8]) -> Result<(), WorldError> {
        let loc = self
            .locations
            .get(&location)
            .ok_or(WorldError::UnknownLocation(location))?;
        if sectors.is_empty() {
            return Err(WorldError::NoSectors);
        }
        let mut seen = [false; SECTOR_COUNT];
        for &index in sectors {
            let slot = usize::from(index);
            if slot >= SECTOR_COUNT {
                return Err(WorldError::SectorOutOfRange(index));
            }
            if seen[slot] {
                return Err(WorldError::DuplicateSector(index));
            }
            seen[slot] = true;
            let status = loc.sectors[slot];
            if status != SectorStatus::Empty {
                return Err(WorldError::SectorOccupied { index, status });
            }
        }
        Ok(())
    }

    /// Claim the sectors and start the countdown.
    pub fn begin_construction(
        &mut self,
        location: LocationId,
        sectors: &[u8],
        plan: BuildingPlan,
        year: Year,
    ) -> Result<BuildingKey, WorldError> {
        self.check_site(location, sectors)?;
        if plan.build_turns == 0 {
            return Err(WorldError::ZeroBuildTurns);
        }
        let loc = self
            .locations
            .get_mut(&location)
            .ok_or(WorldError::UnknownLocation(location))?;
        for &index in sectors {
            loc.sectors[usize::from(index)] = SectorStatus::Constructing;
        }
        let key = self.buildings.insert(Building {
            name: plan.name,
            location,
            sectors: sectors.to_vec(),
            turns_remaining: plan.build_turns,
            science_bonus: plan.science_bonus,
            upkeep: plan.upkeep,
        });
        self.events.push(WorldEvent::ConstructionStarted {
            building: key,
            location,
            year,
        });
        Ok(key)
    }

    /// Remove a building and mark its sectors destroyed. Returns the removed
    /// building so the caller can revoke any standing effects.
    pub fn demolish(&mut self, key: BuildingKey) -> Result<Building, WorldError> {
        let building = self
            .buildings
            .remove(key)
            .ok_or(WorldError::UnknownBuilding(key))?;
        if let Some(loc) = self.locations.get_mut(&building.location) {
            for &index in &building.sectors {
                loc.sectors[usize::from(index)] = SectorStatus::Destroyed;
            }
        }
        Ok(building)
    }

    /// Advance every in-progress construction by one turn. Returns the keys
    /// of buildings completed this call so the caller can grant their
    /// standing effects.
    pub fn advance_constructions(&mut self, year: Year) -> Vec<BuildingKey> {
        let mut completed = Vec::new();
        for (key, building) in &mut self.buildings {
            if building.turns_remaining == 0 {
                continue;
            }
            building.turns_remaining -= 1;
            if building.turns_remaining == 0 {
                completed.push((key, building.location));
            }
        }
        let mut keys = Vec::with_capacity(completed.len());
        for (key, location) in completed {
            if let Some(loc) = self.locations.get_mut(&location) {
                if let Some(building) = self.buildings.get(key) {
                    for &index in building.sectors() {
                        loc.sectors[usize::from(index)] = SectorStatus::Built;
                    }
                }
            }
            self.events.push(WorldEvent::ConstructionCompleted {
                building: key,
                location,
                year,
            });
            keys.push(key);
        }
        keys
    }
}
