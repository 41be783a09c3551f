//! Comparison type entity - The formula family used to evaluate an indicator.
//!
//! The `code` column selects the evaluation formula (`TYPE1`..`TYPE4`); the
//! remaining columns are descriptive text shown to users.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Comparison type database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comparison_types")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Formula code, e.g. `"TYPE1"`
    #[sea_orm(unique)]
    pub code: String,
    /// Display name
    pub name: String,
    /// What the comparison means in business terms
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// Human-readable statement of the formula
    #[sea_orm(column_type = "Text")]
    pub evaluation_formula: String,
}

/// Defines relationships between `ComparisonType` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One comparison type is used by many indicators
    #[sea_orm(has_many = "super::indicator::Entity")]
    Indicators,
}

impl Related<super::indicator::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Indicators.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
