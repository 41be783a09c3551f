//! Lookup tables - option lists and existence checks for reference data.
//!
//! Every table an indicator form selects from implements [`Lookup`], so the
//! same generic helpers build select options, check foreign keys before a
//! write, and resolve rows by code during seeding.

use crate::{
    entities::{
        AggregationMethod, ComparisonType, HierarchyLevel, Indicator, OrganizationalStructure,
        Periodicity, Perspective, aggregation_method, comparison_type, hierarchy_level, indicator,
        organizational_structure, periodicity, perspective,
    },
    errors::{Error, Result},
};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;

/// One entry of a select field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Choice {
    /// Row id submitted back by the form
    pub id: i64,
    /// Label shown to the user
    pub name: String,
}

/// A table that can feed a select field.
pub trait Lookup: EntityTrait {
    /// Name used in error messages
    const KIND: &'static str;

    /// Primary key column
    fn id_column() -> Self::Column;

    /// Column the options are sorted by
    fn name_column() -> Self::Column;

    /// Unique code column
    fn code_column() -> Self::Column;

    /// Converts a row into a select option.
    fn choice(model: &Self::Model) -> Choice;
}

macro_rules! impl_lookup {
    ($entity:ty, $module:ident, $kind:literal) => {
        impl Lookup for $entity {
            const KIND: &'static str = $kind;

            fn id_column() -> Self::Column {
                $module::Column::Id
            }

            fn name_column() -> Self::Column {
                $module::Column::Name
            }

            fn code_column() -> Self::Column {
                $module::Column::Code
            }

            fn choice(model: &Self::Model) -> Choice {
                Choice {
                    id: model.id,
                    name: model.name.clone(),
                }
            }
        }
    };
}

impl_lookup!(Perspective, perspective, "Perspective");
impl_lookup!(ComparisonType, comparison_type, "Comparison type");
impl_lookup!(Periodicity, periodicity, "Periodicity");
impl_lookup!(AggregationMethod, aggregation_method, "Aggregation method");
impl_lookup!(HierarchyLevel, hierarchy_level, "Hierarchy level");
impl_lookup!(
    OrganizationalStructure,
    organizational_structure,
    "Organizational structure"
);
impl_lookup!(Indicator, indicator, "Indicator");

/// All rows of `E` as select options, ordered by name.
pub async fn choices<E, C>(db: &C) -> Result<Vec<Choice>>
where
    E: Lookup,
    C: ConnectionTrait,
{
    let rows = E::find().order_by_asc(E::name_column()).all(db).await?;
    Ok(rows.iter().map(E::choice).collect())
}

/// Finds a row of `E` by its unique code.
pub async fn find_by_code<E, C>(db: &C, code: &str) -> Result<Option<E::Model>>
where
    E: Lookup,
    C: ConnectionTrait,
{
    E::find()
        .filter(E::code_column().eq(code))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Loads the row of `E` with the given id, failing with [`Error::LookupNotFound`].
pub async fn require<E, C>(db: &C, id: i64) -> Result<E::Model>
where
    E: Lookup,
    C: ConnectionTrait,
{
    E::find()
        .filter(E::id_column().eq(id))
        .one(db)
        .await?
        .ok_or(Error::LookupNotFound { kind: E::KIND, id })
}

/// Checks that a row of `E` with the given id exists.
pub async fn ensure_exists<E, C>(db: &C, id: i64) -> Result<()>
where
    E: Lookup,
    C: ConnectionTrait,
{
    require::<E, C>(db, id).await.map(|_| ())
}

/// Every option list the indicator create/edit forms need.
#[derive(Clone, Debug, Serialize)]
pub struct FormOptions {
    /// Perspective select
    pub perspectives: Vec<Choice>,
    /// Comparison type select
    pub comparison_types: Vec<Choice>,
    /// Periodicity select
    pub periodicities: Vec<Choice>,
    /// Aggregation method select
    pub aggregation_methods: Vec<Choice>,
    /// Organizational structure select (optional field, active nodes only)
    pub organizational_structures: Vec<Choice>,
    /// Parent indicator select (optional field)
    pub parent_indicators: Vec<Choice>,
}

impl FormOptions {
    /// Loads every option list.
    pub async fn load<C>(db: &C) -> Result<Self>
    where
        C: ConnectionTrait,
    {
        let organizational_structures = OrganizationalStructure::find()
            .filter(organizational_structure::Column::Active.eq(true))
            .order_by_asc(organizational_structure::Column::Name)
            .all(db)
            .await?
            .iter()
            .map(OrganizationalStructure::choice)
            .collect();

        Ok(Self {
            perspectives: choices::<Perspective, _>(db).await?,
            comparison_types: choices::<ComparisonType, _>(db).await?,
            periodicities: choices::<Periodicity, _>(db).await?,
            aggregation_methods: choices::<AggregationMethod, _>(db).await?,
            organizational_structures,
            parent_indicators: choices::<Indicator, _>(db).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{ActiveModelTrait, Set};

    #[tokio::test]
    async fn test_choices_are_sorted_by_name() -> Result<()> {
        let db = setup_test_db().await?;
        seed_test_lookups(&db).await?;
        perspective::ActiveModel {
            code: Set("ALPHA".to_string()),
            name: Set("Aardvark".to_string()),
            color_hex: Set("#000000".to_string()),
            sort_order: Set(0),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let options = choices::<Perspective, _>(&db).await?;
        let names: Vec<_> = options.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Aardvark", "Financial"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_require_reports_kind_and_id() -> Result<()> {
        let db = setup_test_db().await?;
        let err = require::<Periodicity, _>(&db, 42).await.unwrap_err();
        assert!(matches!(
            err,
            Error::LookupNotFound {
                kind: "Periodicity",
                id: 42
            }
        ));
        assert_eq!(err.to_string(), "Periodicity not found: 42");
        Ok(())
    }

    #[tokio::test]
    async fn test_find_by_code() -> Result<()> {
        let db = setup_test_db().await?;
        let lookups = seed_test_lookups(&db).await?;

        let found = find_by_code::<ComparisonType, _>(&db, "TYPE3").await?.unwrap();
        assert_eq!(found.id, lookups.type3);
        assert!(find_by_code::<ComparisonType, _>(&db, "TYPE9").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_form_options_hide_inactive_structures() -> Result<()> {
        let db = setup_test_db().await?;
        let lookups = seed_test_lookups(&db).await?;
        organizational_structure::ActiveModel {
            code: Set("OLD".to_string()),
            name: Set("Closed plant".to_string()),
            parent_id: Set(None),
            level_id: Set(lookups.level),
            active: Set(false),
            ..Default::default()
        }
        .insert(&db)
        .await?;
        create_test_indicator(&db, &lookups, "KPI-1").await?;

        let options = FormOptions::load(&db).await?;
        assert_eq!(options.perspectives.len(), 1);
        assert_eq!(options.comparison_types.len(), 4);
        assert_eq!(options.organizational_structures.len(), 1);
        assert_eq!(options.organizational_structures[0].id, lookups.structure);
        assert_eq!(options.parent_indicators.len(), 1);
        Ok(())
    }
}
