//! Indicator business logic - creation, editing and hierarchy management.
//!
//! All functions take any [`ConnectionTrait`] so callers can run them inside a
//! database transaction and roll everything back on error. Writes validate
//! their foreign keys and threshold requirements before touching the table,
//! and finish by refreshing the cached evaluation.

use crate::{
    core::{
        evaluation::{ComparisonKind, refresh_evaluation},
        lookup,
    },
    entities::{
        AggregationMethod, ComparisonType, Indicator, OrganizationalStructure, Periodicity,
        Perspective, References, indicator,
    },
    errors::{Error, Result},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, prelude::Json,
};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

/// Everything needed to create an indicator.
#[derive(Clone, Debug, PartialEq)]
pub struct NewIndicator {
    /// Unique business code
    pub code: String,
    /// Display name
    pub name: String,
    /// Required perspective
    pub perspective_id: i64,
    /// Required comparison type
    pub comparison_type_id: i64,
    /// Required periodicity
    pub periodicity_id: i64,
    /// Required aggregation method
    pub aggregation_method_id: i64,
    /// Optional organizational placement
    pub structure_id: Option<i64>,
    /// Unit of measure
    pub unit_of_measure: String,
    /// Current value
    pub current_value: Option<f64>,
    /// Planned value
    pub planned_value: Option<f64>,
    /// Evaluation thresholds
    pub references: References,
    /// Whether writes refresh the cached evaluation
    pub automatic_evaluation: bool,
    /// Time dimension metadata
    pub time_dimension: Option<Json>,
    /// Geographic metadata
    pub geographic_location: Option<Json>,
    /// Cost center
    pub cost_center: Option<String>,
    /// Parent indicator
    pub parent_id: Option<i64>,
    /// Author, recorded in both audit columns
    pub created_by: Option<String>,
}

impl Default for NewIndicator {
    fn default() -> Self {
        Self {
            code: String::new(),
            name: String::new(),
            perspective_id: 0,
            comparison_type_id: 0,
            periodicity_id: 0,
            aggregation_method_id: 0,
            structure_id: None,
            unit_of_measure: String::new(),
            current_value: None,
            planned_value: None,
            references: References::default(),
            automatic_evaluation: true,
            time_dimension: None,
            geographic_location: None,
            cost_center: None,
            parent_id: None,
            created_by: None,
        }
    }
}

/// A partial update. `None` leaves a column untouched; for nullable columns
/// `Some(None)` clears it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IndicatorChanges {
    /// New code
    pub code: Option<String>,
    /// New name
    pub name: Option<String>,
    /// New perspective
    pub perspective_id: Option<i64>,
    /// New comparison type
    pub comparison_type_id: Option<i64>,
    /// New periodicity
    pub periodicity_id: Option<i64>,
    /// New aggregation method
    pub aggregation_method_id: Option<i64>,
    /// New organizational placement
    pub structure_id: Option<Option<i64>>,
    /// New unit of measure
    pub unit_of_measure: Option<String>,
    /// New current value
    pub current_value: Option<Option<f64>>,
    /// New planned value
    pub planned_value: Option<Option<f64>>,
    /// New `ref1`
    pub ref1: Option<Option<f64>>,
    /// New `ref2`
    pub ref2: Option<Option<f64>>,
    /// New `ref3`
    pub ref3: Option<Option<f64>>,
    /// New `ref4`
    pub ref4: Option<Option<f64>>,
    /// New automatic-evaluation flag
    pub automatic_evaluation: Option<bool>,
    /// New time dimension
    pub time_dimension: Option<Option<Json>>,
    /// New geographic location
    pub geographic_location: Option<Option<Json>>,
    /// New cost center
    pub cost_center: Option<Option<String>>,
    /// New parent
    pub parent_id: Option<Option<i64>>,
    /// Editor, stored in `updated_by`
    pub updated_by: Option<String>,
}

impl IndicatorChanges {
    fn apply_references(&self, current: References) -> References {
        References {
            ref1: self.ref1.unwrap_or(current.ref1),
            ref2: self.ref2.unwrap_or(current.ref2),
            ref3: self.ref3.unwrap_or(current.ref3),
            ref4: self.ref4.unwrap_or(current.ref4),
        }
    }

    const fn touches_references(&self) -> bool {
        self.ref1.is_some() || self.ref2.is_some() || self.ref3.is_some() || self.ref4.is_some()
    }
}

fn required_text(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

/// Checks that `references` holds every threshold the comparison-type `code` needs.
///
/// Unknown codes are accepted here; they evaluate to `TIPO_NO_VALIDO` later.
pub fn check_references(code: &str, references: &References) -> Result<()> {
    if let Some(name) = references.non_finite().first() {
        return Err(Error::validation(format!("Threshold {name} must be a finite number")));
    }
    let Some(kind) = ComparisonKind::from_code(code) else {
        return Ok(());
    };
    let missing = references.missing(kind.required_references());
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "Missing required references for {code}: {}",
            missing.join(", ")
        )))
    }
}

async fn require_indicator<C>(db: &C, id: i64) -> Result<indicator::Model>
where
    C: ConnectionTrait,
{
    Indicator::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::IndicatorNotFound { id })
}

/// Creates an indicator after validating its references, then evaluates it.
///
/// Fails with [`Error::Validation`] when the comparison type is unknown or a
/// threshold it requires is missing; nothing is written in that case.
#[instrument(skip(db, new), fields(code = %new.code))]
pub async fn create_indicator<C>(db: &C, new: NewIndicator) -> Result<indicator::Model>
where
    C: ConnectionTrait,
{
    let code = required_text("Indicator code", &new.code)?;
    let name = required_text("Indicator name", &new.name)?;
    let unit_of_measure = required_text("Unit of measure", &new.unit_of_measure)?;

    let comparison_type = ComparisonType::find_by_id(new.comparison_type_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::validation("Invalid comparison type"))?;
    if let Err(e) = check_references(&comparison_type.code, &new.references) {
        warn!("Rejected indicator '{}': {}", code, e);
        return Err(e);
    }

    lookup::ensure_exists::<Perspective, _>(db, new.perspective_id).await?;
    lookup::ensure_exists::<Periodicity, _>(db, new.periodicity_id).await?;
    lookup::ensure_exists::<AggregationMethod, _>(db, new.aggregation_method_id).await?;
    if let Some(structure_id) = new.structure_id {
        lookup::ensure_exists::<OrganizationalStructure, _>(db, structure_id).await?;
    }
    if let Some(parent_id) = new.parent_id {
        require_indicator(db, parent_id).await?;
    }

    let now = chrono::Utc::now();
    let model = indicator::ActiveModel {
        code: Set(code),
        name: Set(name),
        perspective_id: Set(new.perspective_id),
        comparison_type_id: Set(comparison_type.id),
        periodicity_id: Set(new.periodicity_id),
        aggregation_method_id: Set(new.aggregation_method_id),
        structure_id: Set(new.structure_id),
        unit_of_measure: Set(unit_of_measure),
        current_value: Set(new.current_value),
        planned_value: Set(new.planned_value),
        references: Set(Some(new.references)),
        last_evaluation: Set(None),
        last_evaluated_at: Set(None),
        automatic_evaluation: Set(new.automatic_evaluation),
        time_dimension: Set(new.time_dimension),
        geographic_location: Set(new.geographic_location),
        cost_center: Set(new.cost_center),
        parent_id: Set(new.parent_id),
        created_at: Set(now),
        updated_at: Set(now),
        created_by: Set(new.created_by.clone()),
        updated_by: Set(new.created_by),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Created indicator '{}' (ID: {})", model.code, model.id);
    refresh_evaluation(db, model).await
}

/// All indicators, ordered by code.
pub async fn list_indicators<C>(db: &C) -> Result<Vec<indicator::Model>>
where
    C: ConnectionTrait,
{
    Indicator::find()
        .order_by_asc(indicator::Column::Code)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds an indicator by id.
pub async fn get_indicator<C>(db: &C, id: i64) -> Result<Option<indicator::Model>>
where
    C: ConnectionTrait,
{
    Indicator::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Applies a partial update to an indicator and refreshes its evaluation.
///
/// Only fields present in `changes` are written. `updated_at` always advances;
/// `created_at` is never touched. The resulting thresholds are re-checked
/// against the resulting comparison type, and a new parent goes through the
/// cycle check.
#[allow(clippy::too_many_lines)] // One branch per editable column
#[instrument(skip(db, changes))]
pub async fn update_indicator<C>(
    db: &C,
    id: i64,
    changes: IndicatorChanges,
) -> Result<indicator::Model>
where
    C: ConnectionTrait,
{
    let existing = require_indicator(db, id).await?;

    let touches_references = changes.touches_references();
    let references = changes.apply_references(existing.references.unwrap_or_default());
    let comparison_type_id = changes
        .comparison_type_id
        .unwrap_or(existing.comparison_type_id);
    if changes.comparison_type_id.is_some() || touches_references {
        let comparison_type = ComparisonType::find_by_id(comparison_type_id)
            .one(db)
            .await?
            .ok_or_else(|| Error::validation("Invalid comparison type"))?;
        check_references(&comparison_type.code, &references)?;
    }

    if let Some(perspective_id) = changes.perspective_id {
        lookup::ensure_exists::<Perspective, _>(db, perspective_id).await?;
    }
    if let Some(periodicity_id) = changes.periodicity_id {
        lookup::ensure_exists::<Periodicity, _>(db, periodicity_id).await?;
    }
    if let Some(aggregation_method_id) = changes.aggregation_method_id {
        lookup::ensure_exists::<AggregationMethod, _>(db, aggregation_method_id).await?;
    }
    if let Some(Some(structure_id)) = changes.structure_id {
        lookup::ensure_exists::<OrganizationalStructure, _>(db, structure_id).await?;
    }
    if let Some(Some(parent_id)) = changes.parent_id {
        ensure_acyclic(db, id, parent_id).await?;
    }

    let mut active = existing.into_active_model();
    if let Some(code) = changes.code {
        active.code = Set(required_text("Indicator code", &code)?);
    }
    if let Some(name) = changes.name {
        active.name = Set(required_text("Indicator name", &name)?);
    }
    if let Some(unit_of_measure) = changes.unit_of_measure {
        active.unit_of_measure = Set(required_text("Unit of measure", &unit_of_measure)?);
    }
    if let Some(perspective_id) = changes.perspective_id {
        active.perspective_id = Set(perspective_id);
    }
    if changes.comparison_type_id.is_some() {
        active.comparison_type_id = Set(comparison_type_id);
    }
    if let Some(periodicity_id) = changes.periodicity_id {
        active.periodicity_id = Set(periodicity_id);
    }
    if let Some(aggregation_method_id) = changes.aggregation_method_id {
        active.aggregation_method_id = Set(aggregation_method_id);
    }
    if let Some(structure_id) = changes.structure_id {
        active.structure_id = Set(structure_id);
    }
    if let Some(current_value) = changes.current_value {
        active.current_value = Set(current_value);
    }
    if let Some(planned_value) = changes.planned_value {
        active.planned_value = Set(planned_value);
    }
    if touches_references {
        active.references = Set(Some(references));
    }
    if let Some(automatic_evaluation) = changes.automatic_evaluation {
        active.automatic_evaluation = Set(automatic_evaluation);
    }
    if let Some(time_dimension) = changes.time_dimension {
        active.time_dimension = Set(time_dimension);
    }
    if let Some(geographic_location) = changes.geographic_location {
        active.geographic_location = Set(geographic_location);
    }
    if let Some(cost_center) = changes.cost_center {
        active.cost_center = Set(cost_center);
    }
    if let Some(parent_id) = changes.parent_id {
        active.parent_id = Set(parent_id);
    }
    if changes.updated_by.is_some() {
        active.updated_by = Set(changes.updated_by);
    }
    active.updated_at = Set(chrono::Utc::now());

    let updated = active.update(db).await?;
    info!("Updated indicator '{}' (ID: {})", updated.code, updated.id);
    refresh_evaluation(db, updated).await
}

/// Sets or clears an indicator's parent, rejecting assignments that would form a cycle.
pub async fn set_parent<C>(db: &C, id: i64, parent_id: Option<i64>) -> Result<indicator::Model>
where
    C: ConnectionTrait,
{
    update_indicator(
        db,
        id,
        IndicatorChanges {
            parent_id: Some(parent_id),
            ..Default::default()
        },
    )
    .await
}

/// Fails with [`Error::ParentCycle`] if making `parent_id` the parent of
/// `indicator_id` would close a loop.
pub async fn ensure_acyclic<C>(db: &C, indicator_id: i64, parent_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let cycle = Error::ParentCycle {
        indicator_id,
        parent_id,
    };
    if parent_id == indicator_id {
        return Err(cycle);
    }

    let mut current = require_indicator(db, parent_id).await?;
    let mut seen = HashSet::from([parent_id]);
    while let Some(next) = current.parent_id {
        if next == indicator_id {
            return Err(cycle);
        }
        if !seen.insert(next) {
            warn!("Existing parent chain above indicator {} loops at {}", parent_id, next);
            return Err(cycle);
        }
        match Indicator::find_by_id(next).one(db).await? {
            Some(row) => current = row,
            None => break,
        }
    }
    Ok(())
}

/// The parent chain of an indicator, nearest first.
pub async fn ancestors<C>(db: &C, id: i64) -> Result<Vec<indicator::Model>>
where
    C: ConnectionTrait,
{
    let start = require_indicator(db, id).await?;
    let mut chain = Vec::new();
    let mut seen = HashSet::from([id]);
    let mut next = start.parent_id;
    while let Some(parent_id) = next {
        if !seen.insert(parent_id) {
            break;
        }
        let Some(parent) = Indicator::find_by_id(parent_id).one(db).await? else {
            break;
        };
        next = parent.parent_id;
        chain.push(parent);
    }
    debug!("Indicator {} has {} ancestors", id, chain.len());
    Ok(chain)
}

/// Direct children of an indicator, ordered by code.
pub async fn children<C>(db: &C, id: i64) -> Result<Vec<indicator::Model>>
where
    C: ConnectionTrait,
{
    require_indicator(db, id).await?;
    Indicator::find()
        .filter(indicator::Column::ParentId.eq(id))
        .order_by_asc(indicator::Column::Code)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::PaginatorTrait;

    #[tokio::test]
    async fn test_create_evaluates_immediately() -> Result<()> {
        let db = setup_test_db().await?;
        let lookups = seed_test_lookups(&db).await?;

        let created = create_indicator(
            &db,
            NewIndicator {
                code: "  SAL-01 ".to_string(),
                name: "Sales".to_string(),
                unit_of_measure: "USD".to_string(),
                current_value: Some(100.0),
                references: References::pair(100.0, 50.0),
                created_by: Some("ana".to_string()),
                ..lookups.new_indicator(lookups.type1)
            },
        )
        .await?;

        assert_eq!(created.code, "SAL-01");
        assert_eq!(created.last_evaluation.as_deref(), Some("BIEN"));
        assert_eq!(created.created_at, created.updated_at);
        assert_eq!(created.created_by.as_deref(), Some("ana"));
        assert_eq!(created.updated_by.as_deref(), Some("ana"));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_banded_type() -> Result<()> {
        let db = setup_test_db().await?;
        let lookups = seed_test_lookups(&db).await?;

        let created = create_indicator(
            &db,
            NewIndicator {
                code: "TMP-01".to_string(),
                name: "Temperature".to_string(),
                unit_of_measure: "C".to_string(),
                current_value: Some(70.0),
                references: References::all(80.0, 60.0, 90.0, 40.0),
                ..lookups.new_indicator(lookups.type3)
            },
        )
        .await?;
        assert_eq!(created.last_evaluation.as_deref(), Some("BIEN"));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_rejects_missing_references_and_persists_nothing() -> Result<()> {
        let db = setup_test_db().await?;
        let lookups = seed_test_lookups(&db).await?;

        let result = create_indicator(
            &db,
            NewIndicator {
                code: "COST-01".to_string(),
                name: "Cost".to_string(),
                unit_of_measure: "USD".to_string(),
                current_value: Some(10.0),
                references: References {
                    ref1: Some(5.0),
                    ..Default::default()
                },
                ..lookups.new_indicator(lookups.type2)
            },
        )
        .await;

        let err = result.unwrap_err();
        assert!(matches!(err, Error::Validation { ref message } if message.contains("ref2")));
        assert_eq!(Indicator::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_banded_type_requires_four_references() -> Result<()> {
        let db = setup_test_db().await?;
        let lookups = seed_test_lookups(&db).await?;

        let err = create_indicator(
            &db,
            NewIndicator {
                code: "BAND-01".to_string(),
                name: "Band".to_string(),
                unit_of_measure: "%".to_string(),
                references: References::pair(1.0, 2.0),
                ..lookups.new_indicator(lookups.type4)
            },
        )
        .await
        .unwrap_err();
        assert!(
            matches!(err, Error::Validation { ref message } if message.ends_with("ref3, ref4"))
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_comparison_type() -> Result<()> {
        let db = setup_test_db().await?;
        let lookups = seed_test_lookups(&db).await?;

        let err = create_indicator(
            &db,
            NewIndicator {
                code: "X".to_string(),
                name: "X".to_string(),
                unit_of_measure: "%".to_string(),
                ..lookups.new_indicator(999)
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_rejects_missing_lookup_and_blank_fields() -> Result<()> {
        let db = setup_test_db().await?;
        let lookups = seed_test_lookups(&db).await?;

        let err = create_indicator(
            &db,
            NewIndicator {
                code: "X".to_string(),
                name: "X".to_string(),
                unit_of_measure: "%".to_string(),
                references: References::pair(1.0, 2.0),
                perspective_id: 77,
                ..lookups.new_indicator(lookups.type1)
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            Error::LookupNotFound {
                kind: "Perspective",
                id: 77
            }
        ));

        let err = create_indicator(
            &db,
            NewIndicator {
                code: "   ".to_string(),
                name: "X".to_string(),
                unit_of_measure: "%".to_string(),
                references: References::pair(1.0, 2.0),
                ..lookups.new_indicator(lookups.type1)
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_code_is_unique_violation() -> Result<()> {
        let db = setup_test_db().await?;
        let lookups = seed_test_lookups(&db).await?;
        create_test_indicator(&db, &lookups, "DUP").await?;

        let err = create_test_indicator(&db, &lookups, "DUP").await.unwrap_err();
        assert!(err.is_unique_violation());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_only_touches_submitted_fields() -> Result<()> {
        let db = setup_test_db().await?;
        let lookups = seed_test_lookups(&db).await?;
        let created = create_test_indicator(&db, &lookups, "KPI-1").await?;

        std::thread::sleep(std::time::Duration::from_millis(5));
        let updated = update_indicator(
            &db,
            created.id,
            IndicatorChanges {
                name: Some("Renamed".to_string()),
                updated_by: Some("luis".to_string()),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.code, created.code);
        assert_eq!(updated.current_value, created.current_value);
        assert_eq!(updated.references, created.references);
        assert_eq!(updated.unit_of_measure, created.unit_of_measure);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
        assert_eq!(updated.updated_by.as_deref(), Some("luis"));
        assert_eq!(updated.created_by, created.created_by);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_value_reevaluates_and_clears() -> Result<()> {
        let db = setup_test_db().await?;
        let lookups = seed_test_lookups(&db).await?;
        let created = create_test_indicator(&db, &lookups, "KPI-1").await?;

        let updated = update_indicator(
            &db,
            created.id,
            IndicatorChanges {
                current_value: Some(Some(40.0)),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.current_value, Some(40.0));
        assert_eq!(updated.last_evaluation.as_deref(), Some("MAL"));

        let cleared = update_indicator(
            &db,
            created.id,
            IndicatorChanges {
                current_value: Some(None),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(cleared.current_value, None);
        assert_eq!(cleared.last_evaluation.as_deref(), Some("SIN_VALOR"));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_rechecks_references_for_new_type() -> Result<()> {
        let db = setup_test_db().await?;
        let lookups = seed_test_lookups(&db).await?;
        let created = create_test_indicator(&db, &lookups, "KPI-1").await?;

        let err = update_indicator(
            &db,
            created.id,
            IndicatorChanges {
                comparison_type_id: Some(lookups.type3),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));

        let switched = update_indicator(
            &db,
            created.id,
            IndicatorChanges {
                comparison_type_id: Some(lookups.type3),
                ref3: Some(Some(110.0)),
                ref4: Some(Some(20.0)),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(switched.references, Some(References::all(100.0, 50.0, 110.0, 20.0)));
        // 75 lies in r2..r1
        assert_eq!(switched.last_evaluation.as_deref(), Some("BIEN"));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_indicator() -> Result<()> {
        let db = setup_test_db().await?;
        let err = update_indicator(&db, 5, IndicatorChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::IndicatorNotFound { id: 5 }));
        Ok(())
    }

    #[tokio::test]
    async fn test_parent_cycle_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let lookups = seed_test_lookups(&db).await?;
        let a = create_test_indicator(&db, &lookups, "A").await?;
        let b = create_test_indicator(&db, &lookups, "B").await?;
        let c = create_test_indicator(&db, &lookups, "C").await?;

        set_parent(&db, b.id, Some(a.id)).await?;
        set_parent(&db, c.id, Some(b.id)).await?;

        let err = set_parent(&db, a.id, Some(c.id)).await.unwrap_err();
        assert!(matches!(err, Error::ParentCycle { indicator_id, parent_id }
            if indicator_id == a.id && parent_id == c.id));

        let err = set_parent(&db, a.id, Some(a.id)).await.unwrap_err();
        assert!(matches!(err, Error::ParentCycle { .. }));

        // a is unchanged after the rejected writes
        assert_eq!(get_indicator(&db, a.id).await?.unwrap().parent_id, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_parent_must_exist() -> Result<()> {
        let db = setup_test_db().await?;
        let lookups = seed_test_lookups(&db).await?;
        let a = create_test_indicator(&db, &lookups, "A").await?;

        let err = set_parent(&db, a.id, Some(404)).await.unwrap_err();
        assert!(matches!(err, Error::IndicatorNotFound { id: 404 }));
        Ok(())
    }

    #[tokio::test]
    async fn test_ancestors_and_children() -> Result<()> {
        let db = setup_test_db().await?;
        let lookups = seed_test_lookups(&db).await?;
        let root = create_test_indicator(&db, &lookups, "ROOT").await?;
        let mid = create_test_indicator(&db, &lookups, "MID").await?;
        let leaf_b = create_test_indicator(&db, &lookups, "LEAF-B").await?;
        let leaf_a = create_test_indicator(&db, &lookups, "LEAF-A").await?;

        set_parent(&db, mid.id, Some(root.id)).await?;
        set_parent(&db, leaf_b.id, Some(mid.id)).await?;
        set_parent(&db, leaf_a.id, Some(mid.id)).await?;

        let chain: Vec<_> = ancestors(&db, leaf_a.id)
            .await?
            .into_iter()
            .map(|m| m.code)
            .collect();
        assert_eq!(chain, vec!["MID", "ROOT"]);

        let kids: Vec<_> = children(&db, mid.id)
            .await?
            .into_iter()
            .map(|m| m.code)
            .collect();
        assert_eq!(kids, vec!["LEAF-A", "LEAF-B"]);

        set_parent(&db, leaf_a.id, None).await?;
        assert_eq!(children(&db, mid.id).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_indicators_ordered_by_code() -> Result<()> {
        let db = setup_test_db().await?;
        let lookups = seed_test_lookups(&db).await?;
        create_test_indicator(&db, &lookups, "B").await?;
        create_test_indicator(&db, &lookups, "A").await?;

        let codes: Vec<_> = list_indicators(&db)
            .await?
            .into_iter()
            .map(|m| m.code)
            .collect();
        assert_eq!(codes, vec!["A", "B"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_rejects_non_finite_references() -> Result<()> {
        let db = setup_test_db().await?;
        let lookups = seed_test_lookups(&db).await?;

        let err = create_indicator(
            &db,
            NewIndicator {
                code: "BAND-INF".to_string(),
                name: "Band".to_string(),
                unit_of_measure: "%".to_string(),
                current_value: Some(70.0),
                references: References::all(80.0, 60.0, f64::INFINITY, f64::NAN),
                ..lookups.new_indicator(lookups.type3)
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Validation { ref message } if message.contains("ref3")));
        assert_eq!(Indicator::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_code_and_references_together() -> Result<()> {
        let db = setup_test_db().await?;
        let lookups = seed_test_lookups(&db).await?;
        let created = create_test_indicator(&db, &lookups, "KPI-1").await?;

        let updated = update_indicator(
            &db,
            created.id,
            IndicatorChanges {
                code: Some("KPI-1B".to_string()),
                name: Some("Renamed".to_string()),
                ref1: Some(Some(70.0)),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.code, "KPI-1B");
        assert_eq!(updated.references, Some(References::pair(70.0, 50.0)));
        // 75 now clears ref1
        assert_eq!(updated.last_evaluation.as_deref(), Some("BIEN"));
        Ok(())
    }

    #[test]
    fn test_check_references_accepts_unknown_codes() {
        assert!(check_references("CUSTOM", &References::default()).is_ok());
        assert!(check_references("TYPE1", &References::pair(1.0, 2.0)).is_ok());
        assert!(check_references("TYPE1", &References::default()).is_err());
    }
}
