//! Organizational structure business logic.
//!
//! Structures form a tree of company nodes (plants, areas, lines) classified by
//! hierarchy level. Nodes are created by seeding; indicators and equipment are
//! attached to them.

use crate::{
    core::lookup,
    entities::{HierarchyLevel, OrganizationalStructure, organizational_structure},
    errors::{Error, Result},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::info;

/// Everything needed to create an organizational structure node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewStructure {
    /// Unique code
    pub code: String,
    /// Display name
    pub name: String,
    /// Parent node, None for a root
    pub parent_id: Option<i64>,
    /// Hierarchy level
    pub level_id: i64,
    /// Whether the node shows up in option lists
    pub active: bool,
}

/// Creates a node after checking that its level and parent exist.
pub async fn create_structure<C>(
    db: &C,
    new: NewStructure,
) -> Result<organizational_structure::Model>
where
    C: ConnectionTrait,
{
    if new.code.trim().is_empty() || new.name.trim().is_empty() {
        return Err(Error::validation(
            "Organizational structure code and name cannot be empty",
        ));
    }

    lookup::ensure_exists::<HierarchyLevel, _>(db, new.level_id).await?;
    if let Some(parent_id) = new.parent_id {
        lookup::ensure_exists::<OrganizationalStructure, _>(db, parent_id).await?;
    }

    let model = organizational_structure::ActiveModel {
        code: Set(new.code.trim().to_string()),
        name: Set(new.name.trim().to_string()),
        parent_id: Set(new.parent_id),
        level_id: Set(new.level_id),
        active: Set(new.active),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(
        "Created organizational structure '{}' (ID: {})",
        model.code, model.id
    );
    Ok(model)
}

/// All nodes ordered by name.
pub async fn list_structures<C>(db: &C) -> Result<Vec<organizational_structure::Model>>
where
    C: ConnectionTrait,
{
    OrganizationalStructure::find()
        .order_by_asc(organizational_structure::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Direct children of a node ordered by name; root nodes when `parent_id` is None.
pub async fn children_of<C>(
    db: &C,
    parent_id: Option<i64>,
) -> Result<Vec<organizational_structure::Model>>
where
    C: ConnectionTrait,
{
    let filter = match parent_id {
        Some(id) => organizational_structure::Column::ParentId.eq(id),
        None => organizational_structure::Column::ParentId.is_null(),
    };
    OrganizationalStructure::find()
        .filter(filter)
        .order_by_asc(organizational_structure::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}
