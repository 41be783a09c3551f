//! Equipment entity - A physical asset that indicators can be measured against.
//!
//! Each piece of equipment is owned by an organizational structure and may be
//! linked to any number of indicators through
//! [`indicator_equipment`](super::indicator_equipment).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Equipment database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "equipment")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Asset tag, unique across the company
    #[sea_orm(unique)]
    pub asset_code: String,
    /// Display name
    pub name: String,
    /// Free-form coordinates, e.g. `"-0.18,-78.47"`
    pub coordinates: Option<String>,
    /// Owning organizational structure
    pub structure_id: i64,
    /// Date the asset was acquired
    pub acquired_on: Option<Date>,
    /// Operational status (e.g. `"operational"`, `"maintenance"`)
    pub status: Option<String>,
    /// Date of the last maintenance
    pub last_maintenance_on: Option<Date>,
}

/// Defines relationships between Equipment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each piece of equipment belongs to one organizational structure
    #[sea_orm(
        belongs_to = "super::organizational_structure::Entity",
        from = "Column::StructureId",
        to = "super::organizational_structure::Column::Id"
    )]
    Structure,
    /// Junction rows linking this equipment to indicators
    #[sea_orm(has_many = "super::indicator_equipment::Entity")]
    IndicatorLinks,
}

impl Related<super::organizational_structure::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Structure.def()
    }
}

impl Related<super::indicator_equipment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IndicatorLinks.def()
    }
}

impl Related<super::indicator::Entity> for Entity {
    fn to() -> RelationDef {
        super::indicator_equipment::Relation::Indicator.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::indicator_equipment::Relation::Equipment.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
