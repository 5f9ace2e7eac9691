//! Customer attributes collected by the quote form.
//!
//! Column names match the ones the premium model was trained on.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::features::{RawRow, RawValue};

pub const COL_AGE: &str = "Age";
pub const COL_ANNUAL_INCOME: &str = "Annual Income";
pub const COL_HEALTH_SCORE: &str = "Health Score";
pub const COL_CREDIT_SCORE: &str = "Credit Score";
pub const COL_VEHICLE_AGE: &str = "Vehicle Age";
pub const COL_INSURANCE_DURATION: &str = "Insurance Duration";
pub const COL_EXERCISE_FREQUENCY: &str = "Exercise Frequency";
pub const COL_PREVIOUS_CLAIMS: &str = "Previous Claims";
pub const COL_POLICY_START_DATE: &str = "Policy Start Date";
pub const COL_MARITAL_STATUS: &str = "Marital Status";
pub const COL_POLICY_TYPE: &str = "Policy Type";

/// Inclusive integer range accepted by a form control.
///
/// `max: None` means the control is only bounded below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntRange {
    pub min: i64,
    pub max: Option<i64>,
}

impl IntRange {
    #[must_use]
    pub const fn new(min: i64, max: i64) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    #[must_use]
    pub const fn at_least(min: i64) -> Self {
        Self { min, max: None }
    }

    /// Clamp a value into the range.
    #[must_use]
    pub fn clamp(&self, value: i64) -> i64 {
        let v = value.max(self.min);
        match self.max {
            Some(max) => v.min(max),
            None => v,
        }
    }

    #[must_use]
    pub fn contains(&self, value: i64) -> bool {
        value >= self.min && self.max.map_or(true, |max| value <= max)
    }
}

pub const AGE_RANGE: IntRange = IntRange::new(18, 100);
pub const ANNUAL_INCOME_RANGE: IntRange = IntRange::at_least(0);
pub const HEALTH_SCORE_RANGE: IntRange = IntRange::new(0, 100);
pub const CREDIT_SCORE_RANGE: IntRange = IntRange::new(300, 850);
pub const VEHICLE_AGE_RANGE: IntRange = IntRange::new(0, 30);
pub const INSURANCE_DURATION_RANGE: IntRange = IntRange::new(0, 30);
pub const EXERCISE_FREQUENCY_RANGE: IntRange = IntRange::new(0, 7);
pub const PREVIOUS_CLAIMS_RANGE: IntRange = IntRange::new(0, 10);

/// Insurance product tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PolicyType {
    #[default]
    Basic,
    Comprehensive,
    Premium,
}

impl PolicyType {
    pub const ALL: [PolicyType; 3] = [Self::Basic, Self::Comprehensive, Self::Premium];

    /// Category label as it appears in the training data.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Comprehensive => "Comprehensive",
            Self::Premium => "Premium",
        }
    }
}

/// Marital status of the policy holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MaritalStatus {
    #[default]
    Single,
    Married,
    Divorced,
}

impl MaritalStatus {
    pub const ALL: [MaritalStatus; 3] = [Self::Single, Self::Married, Self::Divorced];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::Married => "Married",
            Self::Divorced => "Divorced",
        }
    }
}

impl std::fmt::Display for PolicyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::fmt::Display for MaritalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One submitted quote request.
///
/// Built by the form on submit; ranges are guaranteed by the form controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub age: i64,
    pub annual_income: i64,
    pub health_score: i64,
    pub policy_type: PolicyType,
    pub credit_score: i64,
    pub marital_status: MaritalStatus,
    pub vehicle_age: i64,
    pub insurance_duration: i64,
    pub exercise_frequency: i64,
    pub previous_claims: i64,
    pub policy_start_date: NaiveDate,
}

impl Default for CustomerProfile {
    fn default() -> Self {
        Self {
            age: 35,
            annual_income: 50_000,
            health_score: 75,
            policy_type: PolicyType::Basic,
            credit_score: 700,
            marital_status: MaritalStatus::Single,
            vehicle_age: 5,
            insurance_duration: 3,
            exercise_frequency: 3,
            previous_claims: 1,
            policy_start_date: default_policy_start(),
        }
    }
}

/// Default start date shown by the form (2023-01-01).
#[must_use]
pub fn default_policy_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or(NaiveDate::MIN)
}

impl CustomerProfile {
    /// Lay the profile out as a raw row keyed by training column names.
    #[must_use]
    pub fn to_raw_row(&self) -> RawRow {
        let mut row = RawRow::new();
        row.push(COL_AGE, RawValue::Int(self.age));
        row.push(COL_ANNUAL_INCOME, RawValue::Int(self.annual_income));
        row.push(COL_HEALTH_SCORE, RawValue::Int(self.health_score));
        row.push(COL_CREDIT_SCORE, RawValue::Int(self.credit_score));
        row.push(COL_VEHICLE_AGE, RawValue::Int(self.vehicle_age));
        row.push(COL_INSURANCE_DURATION, RawValue::Int(self.insurance_duration));
        row.push(COL_EXERCISE_FREQUENCY, RawValue::Int(self.exercise_frequency));
        row.push(COL_PREVIOUS_CLAIMS, RawValue::Int(self.previous_claims));
        row.push(COL_POLICY_START_DATE, RawValue::Date(self.policy_start_date));
        row.push(
            COL_MARITAL_STATUS,
            RawValue::Category(self.marital_status.label().to_string()),
        );
        row.push(
            COL_POLICY_TYPE,
            RawValue::Category(self.policy_type.label().to_string()),
        );
        row
    }
}
