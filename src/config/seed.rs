//! Lookup seeding from a TOML file.
//!
//! Reference tables (perspectives, comparison types, periodicities, aggregation
//! methods, hierarchy levels and organizational structures) have no editing UI;
//! they are loaded from `seed.toml` at startup. Seeding is idempotent: rows whose
//! code already exists are skipped, so the file can be re-applied on every boot.

use crate::{
    core::{
        lookup::{self, Lookup},
        organization::{self, NewStructure},
    },
    entities::{
        AggregationMethod, ComparisonType, HierarchyLevel, OrganizationalStructure, Periodicity,
        Perspective, aggregation_method, comparison_type, hierarchy_level, periodicity,
        perspective,
    },
    errors::{Error, Result},
};
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, TransactionTrait};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Structure of the whole seed file. Every section is optional.
#[derive(Debug, Default, Deserialize)]
pub struct SeedConfig {
    /// `[[perspectives]]`
    #[serde(default)]
    pub perspectives: Vec<PerspectiveSeed>,
    /// `[[comparison_types]]`
    #[serde(default)]
    pub comparison_types: Vec<ComparisonTypeSeed>,
    /// `[[periodicities]]`
    #[serde(default)]
    pub periodicities: Vec<PeriodicitySeed>,
    /// `[[aggregation_methods]]`
    #[serde(default)]
    pub aggregation_methods: Vec<AggregationMethodSeed>,
    /// `[[hierarchy_levels]]`
    #[serde(default)]
    pub hierarchy_levels: Vec<HierarchyLevelSeed>,
    /// `[[organizational_structures]]`, parents listed before children
    #[serde(default)]
    pub organizational_structures: Vec<StructureSeed>,
}

/// A perspective row
#[derive(Debug, Clone, Deserialize)]
pub struct PerspectiveSeed {
    /// Unique code
    pub code: String,
    /// Display name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Display colour, defaults to `#3498db`
    #[serde(default = "default_color")]
    pub color_hex: String,
    /// Sort position
    #[serde(default)]
    pub sort_order: i32,
    /// Optional icon name
    pub icon: Option<String>,
}

fn default_color() -> String {
    "#3498db".to_string()
}

/// A comparison type row
#[derive(Debug, Clone, Deserialize)]
pub struct ComparisonTypeSeed {
    /// Formula code (`TYPE1`..`TYPE4`)
    pub code: String,
    /// Display name
    pub name: String,
    /// Business meaning
    pub description: String,
    /// Human-readable formula
    pub evaluation_formula: String,
}

/// A periodicity row
#[derive(Debug, Clone, Deserialize)]
pub struct PeriodicitySeed {
    /// Unique code
    pub code: String,
    /// Display name
    pub name: String,
    /// Period length in days
    pub days: i32,
}

/// An aggregation method row
#[derive(Debug, Clone, Deserialize)]
pub struct AggregationMethodSeed {
    /// Unique code
    pub code: String,
    /// Display name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
}

/// A hierarchy level row
#[derive(Debug, Clone, Deserialize)]
pub struct HierarchyLevelSeed {
    /// Unique code
    pub code: String,
    /// Display name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Depth, 1 for the root level
    pub depth: i32,
}

/// An organizational structure row, referencing its level and parent by code
#[derive(Debug, Clone, Deserialize)]
pub struct StructureSeed {
    /// Unique code
    pub code: String,
    /// Display name
    pub name: String,
    /// Code of the hierarchy level
    pub level: String,
    /// Code of the parent structure
    pub parent: Option<String>,
    /// Defaults to true
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

/// Loads the seed file at `path`.
///
/// # Errors
/// Returns [`Error::Config`] if the file cannot be read or is not valid TOML
/// for [`SeedConfig`].
pub fn load_seed_config<P: AsRef<Path>>(path: P) -> Result<SeedConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read seed file {}: {e}", path.as_ref().display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse seed file: {e}"),
    })
}

/// Counts of rows inserted by [`seed_lookups`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    /// Newly inserted rows
    pub inserted: usize,
    /// Rows skipped because their code already existed
    pub skipped: usize,
}

async fn exists<E, C>(db: &C, code: &str, report: &mut SeedReport) -> Result<bool>
where
    E: Lookup,
    C: ConnectionTrait,
{
    if lookup::find_by_code::<E, C>(db, code).await?.is_some() {
        debug!("{} '{}' already exists. Skipping.", E::KIND, code);
        report.skipped += 1;
        Ok(true)
    } else {
        report.inserted += 1;
        Ok(false)
    }
}

/// Inserts every row of `config` whose code is not yet present, in one transaction.
#[allow(clippy::too_many_lines)] // One block per lookup table
#[instrument(skip(db, config))]
pub async fn seed_lookups<C>(db: &C, config: &SeedConfig) -> Result<SeedReport>
where
    C: TransactionTrait,
{
    let txn = db.begin().await?;
    let mut report = SeedReport::default();

    for seed in &config.perspectives {
        if exists::<Perspective, _>(&txn, &seed.code, &mut report).await? {
            continue;
        }
        perspective::ActiveModel {
            code: Set(seed.code.clone()),
            name: Set(seed.name.clone()),
            description: Set(seed.description.clone()),
            color_hex: Set(seed.color_hex.clone()),
            sort_order: Set(seed.sort_order),
            icon: Set(seed.icon.clone()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    for seed in &config.comparison_types {
        if exists::<ComparisonType, _>(&txn, &seed.code, &mut report).await? {
            continue;
        }
        comparison_type::ActiveModel {
            code: Set(seed.code.clone()),
            name: Set(seed.name.clone()),
            description: Set(seed.description.clone()),
            evaluation_formula: Set(seed.evaluation_formula.clone()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    for seed in &config.periodicities {
        if exists::<Periodicity, _>(&txn, &seed.code, &mut report).await? {
            continue;
        }
        periodicity::ActiveModel {
            code: Set(seed.code.clone()),
            name: Set(seed.name.clone()),
            days: Set(seed.days),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    for seed in &config.aggregation_methods {
        if exists::<AggregationMethod, _>(&txn, &seed.code, &mut report).await? {
            continue;
        }
        aggregation_method::ActiveModel {
            code: Set(seed.code.clone()),
            name: Set(seed.name.clone()),
            description: Set(seed.description.clone()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    for seed in &config.hierarchy_levels {
        if exists::<HierarchyLevel, _>(&txn, &seed.code, &mut report).await? {
            continue;
        }
        hierarchy_level::ActiveModel {
            code: Set(seed.code.clone()),
            name: Set(seed.name.clone()),
            description: Set(seed.description.clone()),
            depth: Set(seed.depth),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    for seed in &config.organizational_structures {
        if exists::<OrganizationalStructure, _>(&txn, &seed.code, &mut report).await? {
            continue;
        }
        let level = lookup::find_by_code::<HierarchyLevel, _>(&txn, &seed.level)
            .await?
            .ok_or_else(|| Error::Config {
                message: format!(
                    "Structure '{}' references unknown hierarchy level '{}'",
                    seed.code, seed.level
                ),
            })?;
        let parent_id = match &seed.parent {
            Some(parent_code) => Some(
                lookup::find_by_code::<OrganizationalStructure, _>(&txn, parent_code)
                    .await?
                    .ok_or_else(|| Error::Config {
                        message: format!(
                            "Structure '{}' references unknown parent '{parent_code}'",
                            seed.code
                        ),
                    })?
                    .id,
            ),
            None => None,
        };
        organization::create_structure(
            &txn,
            NewStructure {
                code: seed.code.clone(),
                name: seed.name.clone(),
                parent_id,
                level_id: level.id,
                active: seed.active,
            },
        )
        .await?;
    }

    txn.commit().await?;
    if report.skipped > 0 {
        warn!("Skipped {} seed rows that already exist.", report.skipped);
    }
    info!("Seeded {} lookup rows.", report.inserted);
    Ok(report)
}
