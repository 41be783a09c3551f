//! Indicator form payloads and their coercion into core types.
//!
//! Everything arrives as text from a URL-encoded body. Declarative checks run
//! through `validator`; numbers, ids and JSON text areas are then parsed field
//! by field so a bad value is reported by name.

use crate::{
    core::indicator::{IndicatorChanges, NewIndicator},
    entities::References,
    errors::{Error, Result},
};
use sea_orm::prelude::Json;
use serde::Deserialize;
use validator::{Validate, ValidationErrors};

/// Joins every field error message into one string.
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .values()
        .flat_map(|errs| {
            errs.iter()
                .filter_map(|e| e.message.as_ref().map(ToString::to_string))
        })
        .collect();
    messages.sort();
    messages.join("; ")
}

fn blank(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed == "None"
}

fn parse_float(field: &str, value: &str) -> Result<Option<f64>> {
    if blank(value) {
        return Ok(None);
    }
    let parsed = value
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::validation(format!("{field} must be a number")))?;
    if !parsed.is_finite() {
        return Err(Error::validation(format!("{field} must be a finite number")));
    }
    Ok(Some(parsed))
}

fn parse_id(field: &str, value: &str) -> Result<Option<i64>> {
    if blank(value) {
        return Ok(None);
    }
    value
        .trim()
        .parse::<i64>()
        .map(Some)
        .map_err(|_| Error::validation(format!("{field} must be a valid id")))
}

fn require_id(field: &str, value: &str) -> Result<i64> {
    parse_id(field, value)?.ok_or_else(|| Error::validation(format!("{field} is required")))
}

fn parse_json(field: &str, value: &str) -> Result<Option<Json>> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(value)
        .map(Some)
        .map_err(|e| Error::validation(format!("{field} must be valid JSON: {e}")))
}

fn parse_bool(field: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" | "y" => Ok(true),
        "off" | "false" | "0" | "no" | "n" | "" => Ok(false),
        _ => Err(Error::validation(format!("{field} must be true or false"))),
    }
}

fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Body of `POST /kpi/create`.
#[allow(missing_docs)]
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct IndicatorForm {
    #[validate(length(min = 1, max = 30, message = "Code is required (max 30 characters)"))]
    pub code: String,
    #[validate(length(min = 1, max = 100, message = "Name is required (max 100 characters)"))]
    pub name: String,
    pub perspective_id: String,
    pub comparison_type_id: String,
    pub periodicity_id: String,
    pub aggregation_method_id: String,
    pub structure_id: String,
    #[validate(length(
        min = 1,
        max = 20,
        message = "Unit of measure is required (max 20 characters)"
    ))]
    pub unit_of_measure: String,
    pub current_value: String,
    pub planned_value: String,
    pub ref1: String,
    pub ref2: String,
    pub ref3: String,
    pub ref4: String,
    /// Checkbox; absent means enabled
    pub automatic_evaluation: Option<String>,
    pub time_dimension: String,
    pub geographic_location: String,
    #[validate(length(max = 50, message = "Cost center is limited to 50 characters"))]
    pub cost_center: String,
    pub parent_id: String,
    #[validate(length(max = 50, message = "Author is limited to 50 characters"))]
    pub created_by: String,
}

impl IndicatorForm {
    /// Runs the declarative checks and coerces every field.
    pub fn into_new_indicator(self) -> Result<NewIndicator> {
        self.validate()
            .map_err(|e| Error::validation(format_validation_errors(&e)))?;

        Ok(NewIndicator {
            perspective_id: require_id("Perspective", &self.perspective_id)?,
            comparison_type_id: require_id("Comparison type", &self.comparison_type_id)?,
            periodicity_id: require_id("Periodicity", &self.periodicity_id)?,
            aggregation_method_id: require_id("Aggregation method", &self.aggregation_method_id)?,
            structure_id: parse_id("Organizational structure", &self.structure_id)?,
            current_value: parse_float("Current value", &self.current_value)?,
            planned_value: parse_float("Planned value", &self.planned_value)?,
            references: References {
                ref1: parse_float("Reference 1", &self.ref1)?,
                ref2: parse_float("Reference 2", &self.ref2)?,
                ref3: parse_float("Reference 3", &self.ref3)?,
                ref4: parse_float("Reference 4", &self.ref4)?,
            },
            automatic_evaluation: match &self.automatic_evaluation {
                Some(value) => parse_bool("Automatic evaluation", value)?,
                None => true,
            },
            time_dimension: parse_json("Time dimension", &self.time_dimension)?,
            geographic_location: parse_json("Geographic location", &self.geographic_location)?,
            cost_center: optional_text(&self.cost_center),
            parent_id: parse_id("Parent indicator", &self.parent_id)?,
            created_by: optional_text(&self.created_by),
            code: self.code,
            name: self.name,
            unit_of_measure: self.unit_of_measure,
        })
    }
}

/// Body of `POST /kpi/edit/{id}`. Absent fields are left unchanged; a blank
/// value clears a nullable column.
#[allow(missing_docs)]
#[derive(Debug, Default, Deserialize, Validate)]
pub struct IndicatorEditForm {
    #[validate(length(min = 1, max = 30, message = "Code cannot be blank (max 30 characters)"))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Name cannot be blank (max 100 characters)"))]
    pub name: Option<String>,
    pub perspective_id: Option<String>,
    pub comparison_type_id: Option<String>,
    pub periodicity_id: Option<String>,
    pub aggregation_method_id: Option<String>,
    pub structure_id: Option<String>,
    #[validate(length(
        min = 1,
        max = 20,
        message = "Unit of measure cannot be blank (max 20 characters)"
    ))]
    pub unit_of_measure: Option<String>,
    pub current_value: Option<String>,
    pub planned_value: Option<String>,
    pub ref1: Option<String>,
    pub ref2: Option<String>,
    pub ref3: Option<String>,
    pub ref4: Option<String>,
    pub automatic_evaluation: Option<String>,
    pub time_dimension: Option<String>,
    pub geographic_location: Option<String>,
    #[validate(length(max = 50, message = "Cost center is limited to 50 characters"))]
    pub cost_center: Option<String>,
    pub parent_id: Option<String>,
    #[validate(length(max = 50, message = "Editor is limited to 50 characters"))]
    pub updated_by: Option<String>,
}

fn each<T>(value: Option<&str>, parse: impl FnOnce(&str) -> Result<T>) -> Result<Option<T>> {
    value.map(parse).transpose()
}

impl IndicatorEditForm {
    /// Runs the declarative checks and coerces the submitted fields.
    pub fn into_changes(self) -> Result<IndicatorChanges> {
        self.validate()
            .map_err(|e| Error::validation(format_validation_errors(&e)))?;

        Ok(IndicatorChanges {
            perspective_id: each(self.perspective_id.as_deref(), |v| require_id("Perspective", v))?,
            comparison_type_id: each(self.comparison_type_id.as_deref(), |v| {
                require_id("Comparison type", v)
            })?,
            periodicity_id: each(self.periodicity_id.as_deref(), |v| require_id("Periodicity", v))?,
            aggregation_method_id: each(self.aggregation_method_id.as_deref(), |v| {
                require_id("Aggregation method", v)
            })?,
            structure_id: each(self.structure_id.as_deref(), |v| {
                parse_id("Organizational structure", v)
            })?,
            current_value: each(self.current_value.as_deref(), |v| {
                parse_float("Current value", v)
            })?,
            planned_value: each(self.planned_value.as_deref(), |v| {
                parse_float("Planned value", v)
            })?,
            ref1: each(self.ref1.as_deref(), |v| parse_float("Reference 1", v))?,
            ref2: each(self.ref2.as_deref(), |v| parse_float("Reference 2", v))?,
            ref3: each(self.ref3.as_deref(), |v| parse_float("Reference 3", v))?,
            ref4: each(self.ref4.as_deref(), |v| parse_float("Reference 4", v))?,
            automatic_evaluation: each(self.automatic_evaluation.as_deref(), |v| {
                parse_bool("Automatic evaluation", v)
            })?,
            time_dimension: each(self.time_dimension.as_deref(), |v| {
                parse_json("Time dimension", v)
            })?,
            geographic_location: each(self.geographic_location.as_deref(), |v| {
                parse_json("Geographic location", v)
            })?,
            cost_center: self.cost_center.as_deref().map(optional_text),
            parent_id: each(self.parent_id.as_deref(), |v| parse_id("Parent indicator", v))?,
            updated_by: self.updated_by.as_deref().and_then(optional_text),
            code: self.code,
            name: self.name,
            unit_of_measure: self.unit_of_measure,
        })
    }
}
