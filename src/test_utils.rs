//! Shared test utilities for the KPI manager.
//!
//! This module provides helpers for setting up an in-memory database with a
//! minimal set of lookup rows and creating indicators with sensible defaults.

use crate::{
    core::indicator::{self, NewIndicator},
    entities::{
        self, References, aggregation_method, comparison_type, hierarchy_level,
        organizational_structure, periodicity, perspective,
    },
    errors::Result,
};
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, Set};
use tracing_subscriber::EnvFilter;

/// Routes `tracing` output through the test harness. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Ids of the rows inserted by [`seed_test_lookups`].
#[derive(Clone, Copy, Debug)]
pub struct TestLookups {
    /// "Financial" perspective
    pub perspective: i64,
    /// `TYPE1` comparison type
    pub type1: i64,
    /// `TYPE2` comparison type
    pub type2: i64,
    /// `TYPE3` comparison type
    pub type3: i64,
    /// `TYPE4` comparison type
    pub type4: i64,
    /// Monthly periodicity
    pub periodicity: i64,
    /// Sum aggregation method
    pub aggregation: i64,
    /// Root hierarchy level
    pub level: i64,
    /// Active root structure
    pub structure: i64,
}

impl TestLookups {
    /// A [`NewIndicator`] with every required lookup filled in.
    /// Callers still set code, name, unit and thresholds.
    pub fn new_indicator(&self, comparison_type_id: i64) -> NewIndicator {
        NewIndicator {
            perspective_id: self.perspective,
            comparison_type_id,
            periodicity_id: self.periodicity,
            aggregation_method_id: self.aggregation,
            ..Default::default()
        }
    }
}

async fn insert_comparison_type<C>(db: &C, code: &str, name: &str) -> Result<i64>
where
    C: ConnectionTrait,
{
    let model = comparison_type::ActiveModel {
        code: Set(code.to_string()),
        name: Set(name.to_string()),
        description: Set(format!("{name} comparison")),
        evaluation_formula: Set(format!("{code} formula")),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(model.id)
}

/// Inserts one row into each lookup table plus the four comparison types.
///
/// # Defaults
/// * perspective: "Financial"
/// * comparison types: `TYPE1`..`TYPE4`
/// * periodicity: "Monthly" (30 days)
/// * aggregation method: "Sum"
/// * one hierarchy level and one active root structure
pub async fn seed_test_lookups<C>(db: &C) -> Result<TestLookups>
where
    C: ConnectionTrait,
{
    let perspective = perspective::ActiveModel {
        code: Set("FIN".to_string()),
        name: Set("Financial".to_string()),
        color_hex: Set("#3498db".to_string()),
        sort_order: Set(1),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let type1 = insert_comparison_type(db, "TYPE1", "Higher is better").await?;
    let type2 = insert_comparison_type(db, "TYPE2", "Lower is better").await?;
    let type3 = insert_comparison_type(db, "TYPE3", "Inner band").await?;
    let type4 = insert_comparison_type(db, "TYPE4", "Outer band").await?;

    let periodicity = periodicity::ActiveModel {
        code: Set("MONTHLY".to_string()),
        name: Set("Monthly".to_string()),
        days: Set(30),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let aggregation = aggregation_method::ActiveModel {
        code: Set("SUM".to_string()),
        name: Set("Sum".to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let level = hierarchy_level::ActiveModel {
        code: Set("COMPANY".to_string()),
        name: Set("Company".to_string()),
        depth: Set(1),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let structure = organizational_structure::ActiveModel {
        code: Set("HQ".to_string()),
        name: Set("Headquarters".to_string()),
        parent_id: Set(None),
        level_id: Set(level.id),
        active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(TestLookups {
        perspective: perspective.id,
        type1,
        type2,
        type3,
        type4,
        periodicity: periodicity.id,
        aggregation: aggregation.id,
        level: level.id,
        structure: structure.id,
    })
}

/// Creates a test indicator with sensible defaults.
///
/// # Defaults
/// * comparison type: `TYPE1` with ref1 = 100, ref2 = 50
/// * `current_value`: 75 (evaluates to `REGULAR`)
/// * `unit_of_measure`: "%"
pub async fn create_test_indicator<C>(
    db: &C,
    lookups: &TestLookups,
    code: &str,
) -> Result<entities::IndicatorModel>
where
    C: ConnectionTrait,
{
    indicator::create_indicator(
        db,
        NewIndicator {
            code: code.to_string(),
            name: format!("Indicator {code}"),
            unit_of_measure: "%".to_string(),
            current_value: Some(75.0),
            references: References::pair(100.0, 50.0),
            ..lookups.new_indicator(lookups.type1)
        },
    )
    .await
}
