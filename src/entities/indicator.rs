//! Indicator entity - The KPI record at the center of the data model.
//!
//! An indicator references four required lookups (perspective, comparison type,
//! periodicity, aggregation method), may be attached to an organizational
//! structure, may have a parent indicator, and may be linked to equipment.
//! Its latest evaluation is cached in `last_evaluation` / `last_evaluated_at`.

use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Reference thresholds used by the evaluation formulas.
///
/// Stored as a JSON object; absent keys deserialize to `None`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct References {
    /// First threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref1: Option<f64>,
    /// Second threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref2: Option<f64>,
    /// Third threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref3: Option<f64>,
    /// Fourth threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref4: Option<f64>,
}

impl References {
    /// Builds a full set of four thresholds.
    #[must_use]
    pub const fn all(ref1: f64, ref2: f64, ref3: f64, ref4: f64) -> Self {
        Self {
            ref1: Some(ref1),
            ref2: Some(ref2),
            ref3: Some(ref3),
            ref4: Some(ref4),
        }
    }

    /// Builds the two-threshold form used by `TYPE1` and `TYPE2`.
    #[must_use]
    pub const fn pair(ref1: f64, ref2: f64) -> Self {
        Self {
            ref1: Some(ref1),
            ref2: Some(ref2),
            ref3: None,
            ref4: None,
        }
    }

    /// Names of thresholds that are present but NaN or infinite.
    /// JSON cannot hold these, so they would be stored as missing.
    #[must_use]
    pub fn non_finite(&self) -> Vec<&'static str> {
        [
            ("ref1", self.ref1),
            ("ref2", self.ref2),
            ("ref3", self.ref3),
            ("ref4", self.ref4),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_some_and(|v| !v.is_finite()))
        .map(|(name, _)| name)
        .collect()
    }

    /// Names of the first `count` thresholds that are missing.
    #[must_use]
    pub fn missing(&self, count: usize) -> Vec<&'static str> {
        [
            ("ref1", self.ref1),
            ("ref2", self.ref2),
            ("ref3", self.ref3),
            ("ref4", self.ref4),
        ]
        .into_iter()
        .take(count)
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Indicator database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "indicators")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Unique business code (e.g. `"FIN-001"`)
    #[sea_orm(unique)]
    pub code: String,
    /// Display name
    pub name: String,

    /// Perspective the indicator is grouped under
    pub perspective_id: i64,
    /// Formula family used to evaluate the indicator
    pub comparison_type_id: i64,
    /// How often the indicator is measured
    pub periodicity_id: i64,
    /// How child values roll up into this indicator
    pub aggregation_method_id: i64,
    /// Optional organizational placement
    pub structure_id: Option<i64>,

    /// Unit the values are expressed in (e.g. `"%"`, `"USD"`)
    pub unit_of_measure: String,
    /// Latest measured value
    pub current_value: Option<f64>,
    /// Planned / target value
    pub planned_value: Option<f64>,
    /// Evaluation thresholds
    #[sea_orm(column_type = "Json", nullable)]
    pub references: Option<References>,

    /// Cached result of the last evaluation (status string)
    pub last_evaluation: Option<String>,
    /// When the cached evaluation was computed
    pub last_evaluated_at: Option<DateTimeUtc>,
    /// When false, evaluation refreshes are skipped
    #[sea_orm(default_value = true)]
    pub automatic_evaluation: bool,

    /// Free-form time dimension, e.g. `{"year": 2024, "quarter": "Q1"}`
    pub time_dimension: Option<Json>,
    /// Free-form geographic location
    pub geographic_location: Option<Json>,
    /// Cost center the indicator is charged to
    pub cost_center: Option<String>,

    /// Parent indicator in the KPI hierarchy
    pub parent_id: Option<i64>,

    /// When the indicator was created
    pub created_at: DateTimeUtc,
    /// When the indicator was last modified
    pub updated_at: DateTimeUtc,
    /// Who created the indicator
    pub created_by: Option<String>,
    /// Who last modified the indicator
    pub updated_by: Option<String>,
}

/// Defines relationships between Indicator and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each indicator belongs to one perspective
    #[sea_orm(
        belongs_to = "super::perspective::Entity",
        from = "Column::PerspectiveId",
        to = "super::perspective::Column::Id"
    )]
    Perspective,
    /// Each indicator uses one comparison type
    #[sea_orm(
        belongs_to = "super::comparison_type::Entity",
        from = "Column::ComparisonTypeId",
        to = "super::comparison_type::Column::Id"
    )]
    ComparisonType,
    /// Each indicator has one periodicity
    #[sea_orm(
        belongs_to = "super::periodicity::Entity",
        from = "Column::PeriodicityId",
        to = "super::periodicity::Column::Id"
    )]
    Periodicity,
    /// Each indicator has one aggregation method
    #[sea_orm(
        belongs_to = "super::aggregation_method::Entity",
        from = "Column::AggregationMethodId",
        to = "super::aggregation_method::Column::Id"
    )]
    AggregationMethod,
    /// Optional organizational placement
    #[sea_orm(
        belongs_to = "super::organizational_structure::Entity",
        from = "Column::StructureId",
        to = "super::organizational_structure::Column::Id"
    )]
    Structure,
    /// Optional parent indicator
    #[sea_orm(belongs_to = "Entity", from = "Column::ParentId", to = "Column::Id")]
    Parent,
    /// Junction rows linking this indicator to equipment
    #[sea_orm(has_many = "super::indicator_equipment::Entity")]
    EquipmentLinks,
}

impl Related<super::perspective::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Perspective.def()
    }
}

impl Related<super::comparison_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ComparisonType.def()
    }
}

impl Related<super::periodicity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Periodicity.def()
    }
}

impl Related<super::aggregation_method::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AggregationMethod.def()
    }
}

impl Related<super::organizational_structure::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Structure.def()
    }
}

impl Related<super::indicator_equipment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EquipmentLinks.def()
    }
}

impl Related<super::equipment::Entity> for Entity {
    fn to() -> RelationDef {
        super::indicator_equipment::Relation::Equipment.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::indicator_equipment::Relation::Indicator.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
