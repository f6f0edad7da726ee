//! Loading pipeline: reads data files, converts records, builds catalogs.
//!
//! Provides format detection (RON/JSON/TOML), file discovery, and
//! deserialization helpers, plus the document loaders that turn raw
//! [`schema`](crate::schema) records into validated catalog types.

use std::path::{Path, PathBuf};

use kuiper_core::catalog::{ActionCatalog, ActionDef, ActionDefBuilder, SponsorCatalog, SponsorDef};
use kuiper_core::fixed::f64_to_fixed64;
use kuiper_core::id::{ActionId, SponsorId, TechId};
use kuiper_core::mutation::{ResourceMutation, ScienceMutation};
use kuiper_techweb::{CostRange, TechDef, Tier};
use serde::de::DeserializeOwned;

use crate::schema::{ActionData, SponsorData, TechData, TechStatusData};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// One record failed validation during conversion.
    #[error("invalid record {id} in {file}: {detail}")]
    InvalidRecord {
        file: PathBuf,
        id: u32,
        detail: String,
    },

    /// The converted records do not form a valid catalog.
    #[error("invalid catalog in {file}: {detail}")]
    Catalog { file: PathBuf, detail: String },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

impl Format {
    /// Detect the format of a file based on its extension.
    pub fn from_path(path: &Path) -> Result<Format, DataLoadError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("ron") => Ok(Format::Ron),
            Some("toml") => Ok(Format::Toml),
            Some("json") => Ok(Format::Json),
            _ => Err(DataLoadError::UnsupportedFormat {
                file: path.to_path_buf(),
            }),
        }
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for a data file with the given base name (without
/// extension).
///
/// Looks for `{base_name}.ron`, `{base_name}.toml`, and `{base_name}.json`.
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// multiple formats exist for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let extensions = ["ron", "toml", "json"];
    let mut found: Option<PathBuf> = None;

    for ext in &extensions {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(ref existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing.clone(),
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

/// Like [`find_data_file`], but returns an error if no file is found.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Read a file and deserialize it according to its format (detected from
/// extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = Format::from_path(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| DataLoadError::Parse {
            file: path.to_path_buf(),
            detail: e.to_string(),
        }),
        Format::Json => serde_json::from_str(&content).map_err(|e| DataLoadError::Parse {
            file: path.to_path_buf(),
            detail: e.to_string(),
        }),
        Format::Toml => toml::from_str(&content).map_err(|e| DataLoadError::Parse {
            file: path.to_path_buf(),
            detail: e.to_string(),
        }),
    }
}

/// Deserialize a list from a file. For TOML files, extracts the array at
/// the given `toml_key` from the top-level table. For RON and JSON, the
/// document itself is the list.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    let format = Format::from_path(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| DataLoadError::Parse {
            file: path.to_path_buf(),
            detail: e.to_string(),
        }),
        Format::Json => serde_json::from_str(&content).map_err(|e| DataLoadError::Parse {
            file: path.to_path_buf(),
            detail: e.to_string(),
        }),
        Format::Toml => {
            let table: toml::Value =
                toml::from_str(&content).map_err(|e| DataLoadError::Parse {
                    file: path.to_path_buf(),
                    detail: e.to_string(),
                })?;
            let array = table
                .get(toml_key)
                .ok_or_else(|| DataLoadError::Parse {
                    file: path.to_path_buf(),
                    detail: format!("missing key '{toml_key}' in TOML file"),
                })?
                .clone();
            array
                .try_into()
                .map_err(|e: toml::de::Error| DataLoadError::Parse {
                    file: path.to_path_buf(),
                    detail: e.to_string(),
                })
        }
    }
}

// ===========================================================================
// Record conversion
// ===========================================================================

/// Convert one raw action record into a frozen template.
fn action_from_data(data: ActionData, path: &Path) -> Result<ActionDef, DataLoadError> {
    let id = data.id;
    let mut builder = ActionDefBuilder::new(ActionId(data.id), &data.name, data.duration)
        .description(&data.description);
    for (resource, amount) in data.costs {
        builder = builder.cost(resource, amount);
    }
    if let Some(m) = data.mutation {
        builder = builder.resource_mutation(ResourceMutation {
            resource: m.resource,
            kind: m.kind,
            amount_per_year: m.amount_per_year,
            completion_amount: m.completion_amount,
        });
    }
    if let Some(m) = data.science_mutation {
        builder = builder.science_mutation(ScienceMutation {
            science: m.science,
            kind: m.kind,
            amount: f64_to_fixed64(m.amount),
        });
    }
    builder.build().map_err(|e| DataLoadError::InvalidRecord {
        file: path.to_path_buf(),
        id,
        detail: e.to_string(),
    })
}

/// Convert one raw sponsor record. Rates become fixed point here.
fn sponsor_from_data(data: SponsorData) -> SponsorDef {
    SponsorDef {
        id: SponsorId(data.id),
        name: data.name,
        color: data.color,
        starting_resources: data.resources,
        starting_science_rates: data
            .science_rates
            .into_iter()
            .map(|(science, rate)| (science, f64_to_fixed64(rate)))
            .collect(),
        intro: data.intro,
    }
}

/// Convert one raw technology record.
fn tech_from_data(data: TechData, path: &Path) -> Result<TechDef, DataLoadError> {
    let tier = Tier::try_from(data.tier).map_err(|e| DataLoadError::InvalidRecord {
        file: path.to_path_buf(),
        id: data.id,
        detail: e.to_string(),
    })?;
    Ok(TechDef {
        id: TechId(data.id),
        title: data.title,
        description: data.description,
        tier,
        requires: data.requires.into_iter().map(TechId).collect(),
        costs: data
            .costs
            .into_iter()
            .map(|(science, range)| {
                (
                    science,
                    CostRange {
                        min: f64_to_fixed64(range.min),
                        max: f64_to_fixed64(range.max),
                    },
                )
            })
            .collect(),
        multiplier: f64_to_fixed64(data.multiplier),
        pre_researched: matches!(data.status, Some(TechStatusData::Researched)),
    })
}

// ===========================================================================
// Document loaders
// ===========================================================================

/// Load and validate an actions document.
pub fn load_actions(path: &Path) -> Result<ActionCatalog, DataLoadError> {
    let records: Vec<ActionData> = deserialize_list(path, "actions")?;
    let mut defs = Vec::with_capacity(records.len());
    for record in records {
        defs.push(action_from_data(record, path)?);
    }
    ActionCatalog::new(defs).map_err(|e| DataLoadError::Catalog {
        file: path.to_path_buf(),
        detail: e.to_string(),
    })
}

/// Load and validate a sponsors document.
pub fn load_sponsors(path: &Path) -> Result<SponsorCatalog, DataLoadError> {
    let records: Vec<SponsorData> = deserialize_list(path, "sponsors")?;
    let defs = records.into_iter().map(sponsor_from_data).collect();
    SponsorCatalog::new(defs).map_err(|e| DataLoadError::Catalog {
        file: path.to_path_buf(),
        detail: e.to_string(),
    })
}

/// Load a technology document. Graph validation (duplicates, dangling
/// prerequisites, cycles) happens when the web is built from these
/// definitions.
pub fn load_tech_defs(path: &Path) -> Result<Vec<TechDef>, DataLoadError> {
    let records: Vec<TechData> = deserialize_list(path, "techs")?;
    records
        .into_iter()
        .map(|record| tech_from_data(record, path))
        .collect()
}

/// Everything a campaign needs, loaded from one content directory.
#[derive(Debug, Clone)]
pub struct GameData {
    pub actions: ActionCatalog,
    pub sponsors: SponsorCatalog,
    pub tech_defs: Vec<TechDef>,
}

/// Load the `actions`, `sponsors`, and `techs` documents from a directory.
/// Each document may independently be RON, TOML, or JSON.
pub fn load_game_data(dir: &Path) -> Result<GameData, DataLoadError> {
    let actions = load_actions(&require_data_file(dir, "actions")?)?;
    let sponsors = load_sponsors(&require_data_file(dir, "sponsors")?)?;
    let tech_defs = load_tech_defs(&require_data_file(dir, "techs")?)?;
    Ok(GameData {
        actions,
        sponsors,
        tech_defs,
    })
}

// ===========================================================================
// Tests
// ===========================================================================
