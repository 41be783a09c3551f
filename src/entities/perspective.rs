//! Perspective entity - Business perspective an indicator is grouped under.
//!
//! Perspectives are lookup rows (e.g. "Financial", "Customer") seeded out-of-band.
//! They carry display hints used by the front end: a colour, an icon and a sort order.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Perspective database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "perspectives")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Short unique code (e.g. `"FIN"`)
    #[sea_orm(unique)]
    pub code: String,
    /// Display name
    pub name: String,
    /// Optional longer description
    pub description: Option<String>,
    /// Display colour as `#rrggbb`
    #[sea_orm(default_value = "#3498db")]
    pub color_hex: String,
    /// Position among perspectives when displayed
    #[sea_orm(default_value = 0)]
    pub sort_order: i32,
    /// Optional icon name
    pub icon: Option<String>,
}

/// Defines relationships between Perspective and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One perspective groups many indicators
    #[sea_orm(has_many = "super::indicator::Entity")]
    Indicators,
}

impl Related<super::indicator::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Indicators.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
