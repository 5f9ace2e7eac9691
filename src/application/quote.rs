//! Quote service: Orchestrates one premium estimate.
//!
//! This service coordinates:
//! - Access to the cached model/schema pair
//! - The feature pipeline
//! - Model invocation
//! - Manual model reloads

use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::application::model_cache::ModelCache;
use crate::application::pipeline::FeaturePipeline;
use crate::domain::{CustomerProfile, PremiumQuote};
use crate::ports::{ArtifactStore, Regressor};
use crate::PremiumError;

/// Snapshot of the cache for status displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelStatus {
    pub loaded: bool,
    pub description: Option<String>,
    pub columns: usize,
    pub location: String,
}

/// Service for turning customer profiles into premium quotes.
pub struct QuoteService<S: ArtifactStore> {
    cache: Arc<ModelCache<S>>,
}

impl<S: ArtifactStore> QuoteService<S> {
    /// Create a new quote service over a shared cache.
    pub fn new(cache: Arc<ModelCache<S>>) -> Self {
        Self { cache }
    }

    /// Make sure the model is loaded (startup path).
    ///
    /// # Errors
    /// Returns `PremiumError::Load` if the artifacts cannot be loaded.
    pub fn initialize(&self) -> Result<(), PremiumError> {
        self.cache.get()?;
        Ok(())
    }

    /// Quote a profile using the current local time for the policy age.
    ///
    /// # Errors
    /// See [`QuoteService::quote_at`].
    pub fn quote(&self, profile: &CustomerProfile) -> Result<PremiumQuote, PremiumError> {
        self.quote_at(profile, chrono::Local::now().naive_local())
    }

    /// Quote a profile as of `now`.
    ///
    /// # Errors
    /// Returns `PremiumError::Load` if the model cannot be loaded, and
    /// `PremiumError::Pipeline` / `PremiumError::Model` if this one
    /// submission cannot be scored.
    pub fn quote_at(
        &self,
        profile: &CustomerProfile,
        now: NaiveDateTime,
    ) -> Result<PremiumQuote, PremiumError> {
        let artifacts = self.cache.get()?;

        tracing::debug!("Step 1: Building feature vector...");
        let features = FeaturePipeline::new(&artifacts.schema).transform(profile, now)?;

        tracing::debug!("Step 2: Scoring {} features...", features.len());
        let premium = artifacts.model.predict(features.values())?;

        let quote = PremiumQuote::new(premium);
        tracing::info!(
            "Quote complete: premium={:.2}, band=[{:.2}, {:.2}]",
            quote.premium,
            quote.band.lower,
            quote.band.upper
        );
        Ok(quote)
    }

    /// Clear the cache and load the artifacts again.
    ///
    /// # Errors
    /// Returns `PremiumError::Load` if the fresh load fails; the cache is
    /// left empty in that case.
    pub fn reload_model(&self) -> Result<(), PremiumError> {
        tracing::warn!("Reloading model artifacts...");
        let artifacts = self.cache.reload()?;
        tracing::info!("Model reloaded: {}", artifacts.model.describe());
        Ok(())
    }

    /// Current cache state, without triggering a load.
    #[must_use]
    pub fn model_status(&self) -> ModelStatus {
        let location = self.cache.location();
        match self.cache.cached() {
            Some(a) => ModelStatus {
                loaded: true,
                description: Some(a.model.describe()),
                columns: a.schema.len(),
                location,
            },
            None => ModelStatus {
                loaded: false,
                description: None,
                columns: 0,
                location,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::artifacts::{MODEL_FILE, SCHEMA_FILE};
    use crate::adapters::FileArtifactStore;
    use crate::application::model_cache::test_support::StubStore;
    use crate::domain::{MaritalStatus, PolicyType};
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn reference_profile() -> CustomerProfile {
        CustomerProfile {
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
            policy_start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        }
    }

    fn bundled_service() -> QuoteService<FileArtifactStore> {
        QuoteService::new(Arc::new(ModelCache::new(FileArtifactStore::new("models"))))
    }

    #[test]
    fn test_reference_profile_end_to_end() {
        let service = bundled_service();
        service.initialize().expect("bundled model should load");

        let quote = service.quote_at(&reference_profile(), now()).expect("quote");
        assert!((quote.premium - 1061.0).abs() < 1e-9);
        assert!((quote.band.lower - 0.9 * quote.premium).abs() < 1e-9);
        assert!((quote.band.upper - 1.1 * quote.premium).abs() < 1e-9);
        assert_eq!(quote.display_premium(), "$1,061.00");
        assert_eq!(quote.band.display_range(), "$955 - $1,167");

        // Same input, same artifacts: same answer.
        let again = service.quote_at(&reference_profile(), now()).unwrap();
        assert_eq!(quote, again);
    }

    #[test]
    fn test_married_profile_uses_married_indicator() {
        let service = bundled_service();
        let profile = CustomerProfile {
            marital_status: MaritalStatus::Married,
            ..reference_profile()
        };
        let quote = service.quote_at(&profile, now()).unwrap();
        assert!((quote.premium - 1057.25).abs() < 1e-9);
    }

    #[test]
    fn test_stub_model_sees_schema_ordered_row() {
        let store = StubStore::new(
            &["Policy Type_Premium", "Age", "Marital Status_Married"],
            100.0,
            vec![1000.0, 1.0, 10.0],
        );
        let service = QuoteService::new(Arc::new(ModelCache::new(store)));
        let profile = CustomerProfile {
            marital_status: MaritalStatus::Married,
            ..reference_profile()
        };
        let quote = service.quote_at(&profile, now()).unwrap();
        // 100 + 0*1000 + 35*1 + 1*10
        assert!((quote.premium - 145.0).abs() < 1e-9);
    }

    #[test]
    fn test_load_failure_is_fatal_and_never_predicts() {
        let temp = tempdir().expect("tempdir");
        std::fs::copy("models/expected_col.json", temp.path().join(SCHEMA_FILE)).unwrap();

        let service = QuoteService::new(Arc::new(ModelCache::new(FileArtifactStore::new(
            temp.path(),
        ))));
        let err = service.quote_at(&reference_profile(), now()).unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().starts_with("Model loading failed"));
        assert!(!service.model_status().loaded);
    }

    #[test]
    fn test_corrupt_schema_after_reload_is_fatal() {
        let temp = tempdir().expect("tempdir");
        std::fs::copy("models/new_insurance_model.json", temp.path().join(MODEL_FILE)).unwrap();
        std::fs::copy("models/expected_col.json", temp.path().join(SCHEMA_FILE)).unwrap();

        let service = QuoteService::new(Arc::new(ModelCache::new(FileArtifactStore::new(
            temp.path(),
        ))));
        service.quote_at(&reference_profile(), now()).expect("initial quote");

        std::fs::write(temp.path().join(SCHEMA_FILE), b"\x00garbage").unwrap();
        // Cached pair keeps serving until an explicit reload.
        assert!(service.quote_at(&reference_profile(), now()).is_ok());

        let err = service.reload_model().unwrap_err();
        assert!(err.is_fatal());
        let err = service.quote_at(&reference_profile(), now()).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_prediction_failure_is_recoverable() {
        // Model width disagrees with schema width: every prediction fails.
        let store = StubStore::new(&["Age", "Credit Score"], 0.0, vec![1.0]);
        let service = QuoteService::new(Arc::new(ModelCache::new(store)));

        let err = service.quote_at(&reference_profile(), now()).unwrap_err();
        assert!(!err.is_fatal());
        assert!(err.to_string().starts_with("Prediction failed"));
        assert!(service.model_status().loaded);
    }

    #[test]
    fn test_reload_swaps_model() {
        let store = StubStore::new(&["Age"], 0.0, vec![1.0]);
        let service = QuoteService::new(Arc::new(ModelCache::new(store)));
        service.initialize().unwrap();
        assert_eq!(
            service.model_status().description.as_deref(),
            Some("linear stub #1")
        );

        service.reload_model().unwrap();
        let status = service.model_status();
        assert!(status.loaded);
        assert_eq!(status.description.as_deref(), Some("linear stub #2"));
        assert_eq!(status.columns, 1);
    }
}
