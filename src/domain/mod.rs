//! Domain layer: Core business types and logic.
//!
//! Plain data types for the quote flow: the customer profile entered in the
//! form, the feature-space types the model consumes, and the resulting quote.

mod customer;
mod features;
mod quote;

pub use customer::{
    default_policy_start, CustomerProfile, IntRange, MaritalStatus, PolicyType, AGE_RANGE,
    ANNUAL_INCOME_RANGE, COL_AGE, COL_ANNUAL_INCOME, COL_CREDIT_SCORE, COL_EXERCISE_FREQUENCY,
    COL_HEALTH_SCORE, COL_INSURANCE_DURATION, COL_MARITAL_STATUS, COL_POLICY_START_DATE,
    COL_POLICY_TYPE, COL_PREVIOUS_CLAIMS, COL_VEHICLE_AGE, CREDIT_SCORE_RANGE,
    EXERCISE_FREQUENCY_RANGE, HEALTH_SCORE_RANGE, INSURANCE_DURATION_RANGE,
    PREVIOUS_CLAIMS_RANGE, VEHICLE_AGE_RANGE,
};
pub use features::{ExpectedSchema, FeatureVector, PipelineError, RawRow, RawValue, SchemaError};
pub use quote::{
    format_currency, ConfidenceBand, PremiumQuote, ValidationMetrics, BAND_FRACTION, BAND_LABEL,
    VALIDATION_METRICS,
};
