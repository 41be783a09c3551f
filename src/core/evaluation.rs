//! Indicator evaluation - classifies a KPI's current value against its thresholds.
//!
//! [`evaluate`] is a pure function of the value, the comparison-type code and the
//! reference thresholds. [`evaluate_indicator`] gathers those inputs for a stored
//! indicator and never fails: any problem loading them becomes
//! [`EvaluationStatus::Error`]. [`refresh_evaluation`] caches the result on the row
//! when automatic evaluation is enabled.

use crate::{
    entities::{ComparisonType, References, indicator},
    errors::{Error, Result},
};
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, IntoActiveModel, Set};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use tracing::{debug, instrument};

/// Formula family selected by a comparison type's code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonKind {
    /// `TYPE1`: higher is better, two thresholds
    HigherIsBetter,
    /// `TYPE2`: lower is better, two thresholds
    LowerIsBetter,
    /// `TYPE3`: banded, good band innermost
    InnerBand,
    /// `TYPE4`: banded, good band outermost
    OuterBand,
}

impl ComparisonKind {
    /// Parses a comparison-type code, returning None for unknown codes.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "TYPE1" => Some(Self::HigherIsBetter),
            "TYPE2" => Some(Self::LowerIsBetter),
            "TYPE3" => Some(Self::InnerBand),
            "TYPE4" => Some(Self::OuterBand),
            _ => None,
        }
    }

    /// The code stored in `comparison_types.code`.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::HigherIsBetter => "TYPE1",
            Self::LowerIsBetter => "TYPE2",
            Self::InnerBand => "TYPE3",
            Self::OuterBand => "TYPE4",
        }
    }

    /// How many leading thresholds (`ref1`..) must be present at creation time.
    #[must_use]
    pub const fn required_references(self) -> usize {
        match self {
            Self::HigherIsBetter | Self::LowerIsBetter => 2,
            Self::InnerBand | Self::OuterBand => 4,
        }
    }
}

/// Result of evaluating an indicator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvaluationStatus {
    /// `BIEN`
    Good,
    /// `REGULAR`
    Regular,
    /// `MAL`
    Bad,
    /// `FUERA_DE_RANGO`: banded types only, value outside every band
    OutOfRange,
    /// `SIN_VALOR`: no current value (or a value of zero)
    NoValue,
    /// `REFERENCIAS_INCOMPLETAS`: banded type missing a threshold
    IncompleteReferences,
    /// `TIPO_NO_VALIDO`: unrecognized comparison-type code
    InvalidType,
    /// `ERROR_EVALUACION: <message>`
    Error(String),
}

const ERROR_PREFIX: &str = "ERROR_EVALUACION: ";

impl EvaluationStatus {
    /// The stored string form.
    #[must_use]
    pub fn as_str(&self) -> std::borrow::Cow<'static, str> {
        use std::borrow::Cow;
        match self {
            Self::Good => Cow::Borrowed("BIEN"),
            Self::Regular => Cow::Borrowed("REGULAR"),
            Self::Bad => Cow::Borrowed("MAL"),
            Self::OutOfRange => Cow::Borrowed("FUERA_DE_RANGO"),
            Self::NoValue => Cow::Borrowed("SIN_VALOR"),
            Self::IncompleteReferences => Cow::Borrowed("REFERENCIAS_INCOMPLETAS"),
            Self::InvalidType => Cow::Borrowed("TIPO_NO_VALIDO"),
            Self::Error(message) => Cow::Owned(format!("{ERROR_PREFIX}{message}")),
        }
    }
}

impl fmt::Display for EvaluationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}

impl FromStr for EvaluationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "BIEN" => Ok(Self::Good),
            "REGULAR" => Ok(Self::Regular),
            "MAL" => Ok(Self::Bad),
            "FUERA_DE_RANGO" => Ok(Self::OutOfRange),
            "SIN_VALOR" => Ok(Self::NoValue),
            "REFERENCIAS_INCOMPLETAS" => Ok(Self::IncompleteReferences),
            "TIPO_NO_VALIDO" => Ok(Self::InvalidType),
            other => other
                .strip_prefix(ERROR_PREFIX)
                .map(|message| Self::Error(message.to_string()))
                .ok_or_else(|| Error::validation(format!("Unknown evaluation status '{other}'"))),
        }
    }
}

impl Serialize for EvaluationStatus {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.as_str())
    }
}

/// Classifies `current_value` according to the comparison-type `code` and thresholds.
///
/// A missing value and a value of exactly zero both yield
/// [`EvaluationStatus::NoValue`] before any formula is consulted.
/// `TYPE1`/`TYPE2` treat missing thresholds as 0; `TYPE3`/`TYPE4` need all four.
#[must_use]
pub fn evaluate(
    current_value: Option<f64>,
    code: &str,
    references: &References,
) -> EvaluationStatus {
    match measured(current_value) {
        Some(value) => classify(value, code, references),
        None => EvaluationStatus::NoValue,
    }
}

/// The value to classify, or None when the indicator has no usable reading.
#[allow(clippy::float_cmp)]
fn measured(current_value: Option<f64>) -> Option<f64> {
    current_value.filter(|value| *value != 0.0)
}

fn classify(value: f64, code: &str, references: &References) -> EvaluationStatus {
    let Some(kind) = ComparisonKind::from_code(code) else {
        return EvaluationStatus::InvalidType;
    };

    match kind {
        ComparisonKind::HigherIsBetter => {
            let (r1, r2) = (references.ref1.unwrap_or(0.0), references.ref2.unwrap_or(0.0));
            if value >= r1 {
                EvaluationStatus::Good
            } else if value > r2 {
                EvaluationStatus::Regular
            } else {
                EvaluationStatus::Bad
            }
        }
        ComparisonKind::LowerIsBetter => {
            let (r1, r2) = (references.ref1.unwrap_or(0.0), references.ref2.unwrap_or(0.0));
            if value <= r1 {
                EvaluationStatus::Good
            } else if value < r2 {
                EvaluationStatus::Regular
            } else {
                EvaluationStatus::Bad
            }
        }
        ComparisonKind::InnerBand | ComparisonKind::OuterBand => {
            let (Some(r1), Some(r2), Some(r3), Some(r4)) = (
                references.ref1,
                references.ref2,
                references.ref3,
                references.ref4,
            ) else {
                return EvaluationStatus::IncompleteReferences;
            };
            let inner = r2 <= value && value <= r1;
            let outer = r3 <= value && value <= r4;
            let between = (r1 < value && value < r3) || (r2 < value && value < r4);
            let (good, bad) = if kind == ComparisonKind::InnerBand {
                (inner, outer)
            } else {
                (outer, inner)
            };
            if good {
                EvaluationStatus::Good
            } else if between {
                EvaluationStatus::Regular
            } else if bad {
                EvaluationStatus::Bad
            } else {
                EvaluationStatus::OutOfRange
            }
        }
    }
}

/// Evaluates a stored indicator, loading its comparison type.
///
/// Never fails: a missing comparison type or database error becomes
/// [`EvaluationStatus::Error`].
pub async fn evaluate_indicator<C>(db: &C, indicator: &indicator::Model) -> EvaluationStatus
where
    C: ConnectionTrait,
{
    let Some(value) = measured(indicator.current_value) else {
        return EvaluationStatus::NoValue;
    };

    let comparison_type = match ComparisonType::find_by_id(indicator.comparison_type_id)
        .one(db)
        .await
    {
        Ok(Some(comparison_type)) => comparison_type,
        Ok(None) => {
            return EvaluationStatus::Error(format!(
                "comparison type {} not found",
                indicator.comparison_type_id
            ));
        }
        Err(e) => return EvaluationStatus::Error(e.to_string()),
    };

    classify(
        value,
        &comparison_type.code,
        &indicator.references.unwrap_or_default(),
    )
}

/// Re-evaluates an indicator and caches the status and timestamp on its row.
///
/// When `automatic_evaluation` is off, nothing is written and the indicator is
/// returned unchanged.
#[instrument(skip(db, indicator), fields(indicator_id = indicator.id))]
pub async fn refresh_evaluation<C>(db: &C, indicator: indicator::Model) -> Result<indicator::Model>
where
    C: ConnectionTrait,
{
    if !indicator.automatic_evaluation {
        debug!("Automatic evaluation disabled, skipping refresh");
        return Ok(indicator);
    }

    let status = evaluate_indicator(db, &indicator).await;
    store_evaluation(db, indicator, &status).await
}

/// Caches an already computed `status` on the indicator row and stamps the time.
#[instrument(skip(db, indicator), fields(indicator_id = indicator.id))]
pub async fn store_evaluation<C>(
    db: &C,
    indicator: indicator::Model,
    status: &EvaluationStatus,
) -> Result<indicator::Model>
where
    C: ConnectionTrait,
{
    debug!(%status, "Storing evaluation");
    let mut active = indicator.into_active_model();
    active.last_evaluation = Set(Some(status.to_string()));
    active.last_evaluated_at = Set(Some(chrono::Utc::now()));
    active.update(db).await.map_err(Into::into)
}
