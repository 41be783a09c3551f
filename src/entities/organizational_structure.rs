//! Organizational structure entity - A node in the company hierarchy.
//!
//! Nodes form their own tree through `parent_id` and are classified by a
//! [`HierarchyLevel`](super::hierarchy_level). Indicators and equipment may be
//! attached to a node.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Organizational structure database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "organizational_structures")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Short unique code
    #[sea_orm(unique)]
    pub code: String,
    /// Display name
    pub name: String,
    /// Parent node, None for a root
    pub parent_id: Option<i64>,
    /// Level this node sits at
    pub level_id: i64,
    /// Inactive nodes are kept for history but hidden from option lists
    #[sea_orm(default_value = true)]
    pub active: bool,
}

/// Defines relationships between `OrganizationalStructure` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each node may belong to a parent node
    #[sea_orm(belongs_to = "Entity", from = "Column::ParentId", to = "Column::Id")]
    Parent,
    /// Each node sits at one hierarchy level
    #[sea_orm(
        belongs_to = "super::hierarchy_level::Entity",
        from = "Column::LevelId",
        to = "super::hierarchy_level::Column::Id"
    )]
    Level,
    /// Indicators attached to this node
    #[sea_orm(has_many = "super::indicator::Entity")]
    Indicators,
    /// Equipment owned by this node
    #[sea_orm(has_many = "super::equipment::Entity")]
    Equipment,
}

impl Related<super::hierarchy_level::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Level.def()
    }
}

impl Related<super::indicator::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Indicators.def()
    }
}

impl Related<super::equipment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Equipment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
