//! Periodicity entity - How often an indicator is measured.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Periodicity database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "periodicities")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Short unique code (e.g. `"MONTHLY"`)
    #[sea_orm(unique)]
    pub code: String,
    /// Display name
    pub name: String,
    /// Length of one period in days
    pub days: i32,
}

/// Defines relationships between Periodicity and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One periodicity is used by many indicators
    #[sea_orm(has_many = "super::indicator::Entity")]
    Indicators,
}

impl Related<super::indicator::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Indicators.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
