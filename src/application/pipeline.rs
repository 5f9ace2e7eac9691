//! Feature pipeline: turns a customer profile into the model's input row.
//!
//! Steps, in order:
//! 1. derive `Policy_Age_Days` from the policy start date
//! 2. drop the start date column
//! 3. one-hot encode the categorical columns
//! 4. reconcile against the expected schema (fill missing with 0, drop
//!    unknown, reorder)
//!
//! Encoded columns the model never saw (e.g. a category that did not occur in
//! training) are dropped in step 4 without raising an error.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::domain::{
    CustomerProfile, ExpectedSchema, FeatureVector, PipelineError, RawRow, RawValue,
    COL_MARITAL_STATUS, COL_POLICY_START_DATE, COL_POLICY_TYPE,
};

/// Name of the derived policy age column.
pub const POLICY_AGE_DAYS: &str = "Policy_Age_Days";

/// Columns expanded into indicator columns, in encoding order.
pub const ONE_HOT_COLUMNS: [&str; 2] = [COL_MARITAL_STATUS, COL_POLICY_TYPE];

const SECONDS_PER_DAY: i64 = 86_400;

/// Whole days between midnight of `start` and `now`, rounded down.
///
/// Future start dates give negative ages.
#[must_use]
pub fn policy_age_days(start: NaiveDate, now: NaiveDateTime) -> i64 {
    let elapsed = now - start.and_time(NaiveTime::default());
    elapsed.num_seconds().div_euclid(SECONDS_PER_DAY)
}

/// Replace the start date column with `Policy_Age_Days`.
///
/// # Errors
/// Returns `PipelineError` if the date column is missing or not a date.
pub fn derive_policy_age(mut row: RawRow, now: NaiveDateTime) -> Result<RawRow, PipelineError> {
    let start = match row.remove(COL_POLICY_START_DATE) {
        Some(RawValue::Date(d)) => d,
        Some(other) => {
            return Err(PipelineError::TypeMismatch {
                column: COL_POLICY_START_DATE.to_string(),
                expected: "date",
                found: other.type_name(),
            })
        }
        None => return Err(PipelineError::MissingColumn(COL_POLICY_START_DATE.to_string())),
    };
    row.push(POLICY_AGE_DAYS, RawValue::Int(policy_age_days(start, now)));
    Ok(row)
}

/// Indicator column name for a category, e.g. `Marital Status_Married`.
#[must_use]
pub fn indicator_name(column: &str, category: &str) -> String {
    format!("{column}_{category}")
}

/// Replace each listed categorical column with one indicator for the
/// observed value. Unobserved categories are not produced.
///
/// # Errors
/// Returns `PipelineError` if a listed column is missing or not a category.
pub fn one_hot_encode(mut row: RawRow, columns: &[&str]) -> Result<RawRow, PipelineError> {
    for column in columns {
        match row.remove(column) {
            Some(RawValue::Category(category)) => {
                row.push(indicator_name(column, &category), RawValue::Bool(true));
            }
            Some(other) => {
                return Err(PipelineError::TypeMismatch {
                    column: (*column).to_string(),
                    expected: "category",
                    found: other.type_name(),
                })
            }
            None => return Err(PipelineError::MissingColumn((*column).to_string())),
        }
    }
    Ok(row)
}

/// Align a row with the schema: every schema column exactly once, in schema
/// order, absent ones set to 0, everything else dropped.
///
/// # Errors
/// Returns `PipelineError` if a schema column holds a non-numeric or
/// non-finite value.
pub fn reconcile(schema: &ExpectedSchema, row: &RawRow) -> Result<FeatureVector, PipelineError> {
    let mut values = Vec::with_capacity(schema.len());
    let mut filled = 0usize;

    for column in schema.columns() {
        let value = match row.get(column) {
            Some(raw) => raw.as_f64().ok_or_else(|| PipelineError::TypeMismatch {
                column: column.clone(),
                expected: "number",
                found: raw.type_name(),
            })?,
            None => {
                filled += 1;
                0.0
            }
        };
        if !value.is_finite() {
            return Err(PipelineError::NonFinite(column.clone()));
        }
        values.push(value);
    }

    let dropped: Vec<&str> = row
        .names()
        .into_iter()
        .filter(|name| schema.position(name).is_none())
        .collect();
    if !dropped.is_empty() {
        tracing::debug!("Dropping columns unknown to the model: {:?}", dropped);
    }
    tracing::debug!(
        "Reconciled row: {} columns, {} zero-filled",
        values.len(),
        filled
    );

    Ok(FeatureVector::from_parts(schema.columns().to_vec(), values))
}

/// The full transformation for one schema.
pub struct FeaturePipeline<'a> {
    schema: &'a ExpectedSchema,
}

impl<'a> FeaturePipeline<'a> {
    #[must_use]
    pub fn new(schema: &'a ExpectedSchema) -> Self {
        Self { schema }
    }

    /// Transform a submitted profile as of `now`.
    ///
    /// # Errors
    /// Returns `PipelineError` if any step fails.
    pub fn transform(
        &self,
        profile: &CustomerProfile,
        now: NaiveDateTime,
    ) -> Result<FeatureVector, PipelineError> {
        self.transform_row(profile.to_raw_row(), now)
    }

    /// Transform an arbitrary raw row as of `now`.
    ///
    /// # Errors
    /// Returns `PipelineError` if any step fails.
    pub fn transform_row(&self, row: RawRow, now: NaiveDateTime) -> Result<FeatureVector, PipelineError> {
        let row = derive_policy_age(row, now)?;
        let row = one_hot_encode(row, &ONE_HOT_COLUMNS)?;
        reconcile(self.schema, &row)
    }
}
