//! Aggregation method entity - How child values roll up into a parent indicator.
//!
//! Only descriptive for now: no roll-up is computed from these rows.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Aggregation method database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "aggregation_methods")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Short unique code (e.g. `"SUM"`)
    #[sea_orm(unique)]
    pub code: String,
    /// Display name
    pub name: String,
    /// Optional explanation
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
}

/// Defines relationships between `AggregationMethod` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One aggregation method is used by many indicators
    #[sea_orm(has_many = "super::indicator::Entity")]
    Indicators,
}

impl Related<super::indicator::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Indicators.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
