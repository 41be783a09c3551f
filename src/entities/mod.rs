//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod aggregation_method;
pub mod comparison_type;
pub mod equipment;
pub mod hierarchy_level;
pub mod indicator;
pub mod indicator_equipment;
pub mod organizational_structure;
pub mod periodicity;
pub mod perspective;

// Re-export specific types to avoid conflicts
pub use aggregation_method::{Entity as AggregationMethod, Model as AggregationMethodModel};
pub use comparison_type::{Entity as ComparisonType, Model as ComparisonTypeModel};
pub use equipment::{Entity as Equipment, Model as EquipmentModel};
pub use hierarchy_level::{Entity as HierarchyLevel, Model as HierarchyLevelModel};
pub use indicator::{Entity as Indicator, Model as IndicatorModel, References};
pub use indicator_equipment::{Entity as IndicatorEquipment, Model as IndicatorEquipmentModel};
pub use organizational_structure::{
    Entity as OrganizationalStructure, Model as OrganizationalStructureModel,
};
pub use periodicity::{Entity as Periodicity, Model as PeriodicityModel};
pub use perspective::{Entity as Perspective, Model as PerspectiveModel};
