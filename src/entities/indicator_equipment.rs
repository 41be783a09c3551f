//! Junction table between indicators and equipment.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Indicator/equipment association
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "indicator_equipment")]
pub struct Model {
    /// Linked indicator
    #[sea_orm(primary_key, auto_increment = false)]
    pub indicator_id: i64,
    /// Linked equipment
    #[sea_orm(primary_key, auto_increment = false)]
    pub equipment_id: i64,
    /// When the link was made
    pub associated_at: DateTimeUtc,
}

/// Both sides of the association
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The indicator side
    #[sea_orm(
        belongs_to = "super::indicator::Entity",
        from = "Column::IndicatorId",
        to = "super::indicator::Column::Id"
    )]
    Indicator,
    /// The equipment side
    #[sea_orm(
        belongs_to = "super::equipment::Entity",
        from = "Column::EquipmentId",
        to = "super::equipment::Column::Id"
    )]
    Equipment,
}

impl Related<super::indicator::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Indicator.def()
    }
}

impl Related<super::equipment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Equipment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
