//! Equipment business logic - physical assets and their links to indicators.
//!
//! Links live in the `indicator_equipment` junction table. Attaching is
//! idempotent and detaching a missing link is not an error.

use crate::{
    core::lookup,
    entities::{
        Equipment, Indicator, IndicatorEquipment, OrganizationalStructure, equipment, indicator,
        indicator_equipment,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{debug, info};

/// Everything needed to register a piece of equipment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewEquipment {
    /// Unique asset tag
    pub asset_code: String,
    /// Display name
    pub name: String,
    /// Free-form coordinates
    pub coordinates: Option<String>,
    /// Owning organizational structure
    pub structure_id: i64,
    /// Acquisition date
    pub acquired_on: Option<NaiveDate>,
    /// Operational status
    pub status: Option<String>,
    /// Last maintenance date
    pub last_maintenance_on: Option<NaiveDate>,
}

/// Registers a piece of equipment under an existing organizational structure.
pub async fn create_equipment<C>(db: &C, new: NewEquipment) -> Result<equipment::Model>
where
    C: ConnectionTrait,
{
    if new.asset_code.trim().is_empty() {
        return Err(Error::validation("Asset code cannot be empty"));
    }
    if new.name.trim().is_empty() {
        return Err(Error::validation("Equipment name cannot be empty"));
    }
    lookup::ensure_exists::<OrganizationalStructure, _>(db, new.structure_id).await?;

    let model = equipment::ActiveModel {
        asset_code: Set(new.asset_code.trim().to_string()),
        name: Set(new.name.trim().to_string()),
        coordinates: Set(new.coordinates),
        structure_id: Set(new.structure_id),
        acquired_on: Set(new.acquired_on),
        status: Set(new.status),
        last_maintenance_on: Set(new.last_maintenance_on),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Registered equipment '{}' (ID: {})", model.asset_code, model.id);
    Ok(model)
}

/// Links a piece of equipment to an indicator.
///
/// Returns `false` if the link already existed.
pub async fn attach_equipment<C>(db: &C, indicator_id: i64, equipment_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    Indicator::find_by_id(indicator_id)
        .one(db)
        .await?
        .ok_or(Error::IndicatorNotFound { id: indicator_id })?;
    Equipment::find_by_id(equipment_id)
        .one(db)
        .await?
        .ok_or(Error::LookupNotFound {
            kind: "Equipment",
            id: equipment_id,
        })?;

    if IndicatorEquipment::find_by_id((indicator_id, equipment_id))
        .one(db)
        .await?
        .is_some()
    {
        debug!(
            "Equipment {} already linked to indicator {}",
            equipment_id, indicator_id
        );
        return Ok(false);
    }

    indicator_equipment::ActiveModel {
        indicator_id: Set(indicator_id),
        equipment_id: Set(equipment_id),
        associated_at: Set(chrono::Utc::now()),
    }
    .insert(db)
    .await?;

    info!(
        "Linked equipment {} to indicator {}",
        equipment_id, indicator_id
    );
    Ok(true)
}

/// Removes a link. Returns `false` if there was nothing to remove.
pub async fn detach_equipment<C>(db: &C, indicator_id: i64, equipment_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    let result = IndicatorEquipment::delete_by_id((indicator_id, equipment_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Equipment linked to an indicator, ordered by asset code.
pub async fn equipment_for_indicator<C>(db: &C, indicator_id: i64) -> Result<Vec<equipment::Model>>
where
    C: ConnectionTrait,
{
    Equipment::find()
        .inner_join(IndicatorEquipment)
        .filter(indicator_equipment::Column::IndicatorId.eq(indicator_id))
        .order_by_asc(equipment::Column::AssetCode)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Indicators linked to a piece of equipment, ordered by code.
pub async fn indicators_for_equipment<C>(
    db: &C,
    equipment_id: i64,
) -> Result<Vec<indicator::Model>>
where
    C: ConnectionTrait,
{
    Indicator::find()
        .inner_join(IndicatorEquipment)
        .filter(indicator_equipment::Column::EquipmentId.eq(equipment_id))
        .order_by_asc(indicator::Column::Code)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    async fn pump(
        db: &sea_orm::DatabaseConnection,
        structure_id: i64,
        code: &str,
    ) -> Result<equipment::Model> {
        create_equipment(
            db,
            NewEquipment {
                asset_code: code.to_string(),
                name: format!("Pump {code}"),
                structure_id,
                acquired_on: NaiveDate::from_ymd_opt(2021, 3, 14),
                status: Some("operational".to_string()),
                ..Default::default()
            },
        )
        .await
    }

    #[tokio::test]
    async fn test_create_equipment_requires_structure() -> Result<()> {
        let db = setup_test_db().await?;
        let err = pump(&db, 12, "P-1").await.unwrap_err();
        assert!(matches!(err, Error::LookupNotFound { id: 12, .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_attach_and_detach() -> Result<()> {
        let db = setup_test_db().await?;
        let lookups = seed_test_lookups(&db).await?;
        let kpi = create_test_indicator(&db, &lookups, "KPI-1").await?;
        let p2 = pump(&db, lookups.structure, "P-2").await?;
        let p1 = pump(&db, lookups.structure, "P-1").await?;

        assert!(attach_equipment(&db, kpi.id, p2.id).await?);
        assert!(attach_equipment(&db, kpi.id, p1.id).await?);
        assert!(!attach_equipment(&db, kpi.id, p1.id).await?);

        let linked: Vec<_> = equipment_for_indicator(&db, kpi.id)
            .await?
            .into_iter()
            .map(|e| e.asset_code)
            .collect();
        assert_eq!(linked, vec!["P-1", "P-2"]);

        let kpis = indicators_for_equipment(&db, p1.id).await?;
        assert_eq!(kpis.len(), 1);
        assert_eq!(kpis[0].id, kpi.id);

        assert!(detach_equipment(&db, kpi.id, p1.id).await?);
        assert!(!detach_equipment(&db, kpi.id, p1.id).await?);
        assert_eq!(equipment_for_indicator(&db, kpi.id).await?.len(), 1);
        assert!(indicators_for_equipment(&db, p1.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_attach_unknown_rows() -> Result<()> {
        let db = setup_test_db().await?;
        let lookups = seed_test_lookups(&db).await?;
        let kpi = create_test_indicator(&db, &lookups, "KPI-1").await?;

        let err = attach_equipment(&db, kpi.id, 50).await.unwrap_err();
        assert!(matches!(err, Error::LookupNotFound { kind: "Equipment", id: 50 }));
        let err = attach_equipment(&db, 50, 1).await.unwrap_err();
        assert!(matches!(err, Error::IndicatorNotFound { id: 50 }));
        Ok(())
    }
}
