//! Hierarchy level entity - Named depth in the organizational tree
//! (e.g. "Company", "Plant", "Line").

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Hierarchy level database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hierarchy_levels")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Short unique code
    #[sea_orm(unique)]
    pub code: String,
    /// Display name
    pub name: String,
    /// Optional explanation
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// Numeric depth, 1 being the root level
    pub depth: i32,
}

/// Defines relationships between `HierarchyLevel` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One level classifies many organizational structures
    #[sea_orm(has_many = "super::organizational_structure::Entity")]
    Structures,
}

impl Related<super::organizational_structure::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Structures.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
