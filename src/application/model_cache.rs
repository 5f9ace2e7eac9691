//! Process-wide cache for the model/schema pair.
//!
//! The pair is loaded lazily on first access and kept until explicitly
//! invalidated. Model and schema live behind a single `Arc`, so a reader
//! either sees the old pair or the new pair, never a mix of the two.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::ports::{ArtifactStore, LoadError, LoadedArtifacts, Regressor};

/// Shared handle to a loaded artifact pair.
pub type SharedArtifacts<M> = Arc<LoadedArtifacts<M>>;

/// Lazily-initialized, thread-safe holder for loaded artifacts.
pub struct ModelCache<S: ArtifactStore> {
    store: S,
    slot: RwLock<Option<SharedArtifacts<S::Model>>>,
    loads: AtomicUsize,
}

impl<S: ArtifactStore> ModelCache<S> {
    /// Create an empty cache. Nothing is read until the first `get`.
    pub fn new(store: S) -> Self {
        Self {
            store,
            slot: RwLock::new(None),
            loads: AtomicUsize::new(0),
        }
    }

    /// Return the cached pair, loading it first if the cache is empty.
    ///
    /// A failed load leaves the cache empty; the next call tries again.
    ///
    /// # Errors
    /// Returns `LoadError` if the artifacts cannot be loaded.
    pub fn get(&self) -> Result<SharedArtifacts<S::Model>, LoadError> {
        // The slot only ever holds a complete pair, so a poisoned lock is still consistent.
        if let Some(cached) = self
            .slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Ok(Arc::clone(cached));
        }

        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have loaded while we waited for the write lock.
        if let Some(cached) = slot.as_ref() {
            return Ok(Arc::clone(cached));
        }
        let loaded = self.load_from_store()?;
        *slot = Some(Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Drop the cached pair. The next `get` reloads from the store.
    pub fn invalidate(&self) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if slot.take().is_some() {
            tracing::info!("Model cache cleared");
        }
    }

    /// Clear the cache and load a fresh pair while holding the write lock.
    ///
    /// No reader can observe the cache between the clear and the reload.
    /// On failure the cache stays empty.
    ///
    /// # Errors
    /// Returns `LoadError` if the artifacts cannot be loaded.
    pub fn reload(&self) -> Result<SharedArtifacts<S::Model>, LoadError> {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
        let loaded = self.load_from_store()?;
        *slot = Some(Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Peek at the cached pair without triggering a load.
    #[must_use]
    pub fn cached(&self) -> Option<SharedArtifacts<S::Model>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(Arc::clone)
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.cached().is_some()
    }

    /// Number of successful loads from the store.
    #[must_use]
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn location(&self) -> String {
        self.store.location()
    }

    fn load_from_store(&self) -> Result<SharedArtifacts<S::Model>, LoadError> {
        tracing::info!("Loading model artifacts from {}", self.store.location());
        match self.store.load() {
            Ok(loaded) => {
                self.loads.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(
                    "Cached {} with {} columns",
                    loaded.model.describe(),
                    loaded.schema.len()
                );
                Ok(Arc::new(loaded))
            }
            Err(e) => {
                tracing::error!("Model loading failed: {}", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! In-memory store used by the application and UI tests.

    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use crate::domain::ExpectedSchema;
    use crate::ports::{ArtifactStore, LoadError, LoadedArtifacts, ModelError, Regressor};

    /// Linear model: intercept + sum(weight_i * x_i).
    #[derive(Debug, Clone)]
    pub struct LinearStub {
        pub intercept: f64,
        pub weights: Vec<f64>,
        /// Bumped per load so tests can tell generations apart.
        pub generation: usize,
    }

    impl Regressor for LinearStub {
        fn num_features(&self) -> usize {
            self.weights.len()
        }

        fn predict(&self, row: &[f64]) -> Result<f64, ModelError> {
            if row.len() != self.weights.len() {
                return Err(ModelError::FeatureCountMismatch {
                    expected: self.weights.len(),
                    got: row.len(),
                });
            }
            Ok(self.intercept
                + row
                    .iter()
                    .zip(&self.weights)
                    .map(|(x, w)| x * w)
                    .sum::<f64>())
        }

        fn describe(&self) -> String {
            format!("linear stub #{}", self.generation)
        }
    }

    /// Store that builds a `LinearStub` for a fixed schema and can be told to fail.
    pub struct StubStore {
        pub columns: Vec<String>,
        pub intercept: f64,
        pub weights: Vec<f64>,
        pub fail: AtomicBool,
        pub loads: AtomicUsize,
    }

    impl StubStore {
        pub fn new(columns: &[&str], intercept: f64, weights: Vec<f64>) -> Self {
            Self {
                columns: columns.iter().map(|c| c.to_string()).collect(),
                intercept,
                weights,
                fail: AtomicBool::new(false),
                loads: AtomicUsize::new(0),
            }
        }

        pub fn set_failing(&self, fail: bool) {
            self.fail.store(fail, Ordering::SeqCst);
        }
    }

    impl ArtifactStore for StubStore {
        type Model = LinearStub;

        fn load(&self) -> Result<LoadedArtifacts<LinearStub>, LoadError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(LoadError::Missing("stub/new_insurance_model.json".into()));
            }
            let generation = self.loads.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(LoadedArtifacts {
                model: LinearStub {
                    intercept: self.intercept,
                    weights: self.weights.clone(),
                    generation,
                },
                schema: ExpectedSchema::new(self.columns.clone())?,
            })
        }

        fn location(&self) -> String {
            "stub".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::StubStore;
    use super::*;
    use std::thread;

    fn cache() -> ModelCache<StubStore> {
        ModelCache::new(StubStore::new(&["a", "b"], 1.0, vec![1.0, 1.0]))
    }

    #[test]
    fn test_loads_once_and_reuses() {
        let cache = cache();
        assert!(!cache.is_loaded());

        let first = cache.get().expect("load");
        let second = cache.get().expect("cached");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.load_count(), 1);
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let cache = cache();
        let first = cache.get().unwrap();
        cache.invalidate();
        assert!(!cache.is_loaded());

        let second = cache.get().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.model.generation, 2);
        assert_eq!(cache.load_count(), 2);
    }

    #[test]
    fn test_failed_load_leaves_cache_empty() {
        let cache = cache();
        cache.store.set_failing(true);
        assert!(matches!(cache.get(), Err(LoadError::Missing(_))));
        assert!(!cache.is_loaded());

        cache.store.set_failing(false);
        assert!(cache.get().is_ok());
    }

    #[test]
    fn test_failed_reload_drops_previous_pair() {
        let cache = cache();
        cache.get().unwrap();

        cache.store.set_failing(true);
        assert!(cache.reload().is_err());
        assert!(cache.cached().is_none());
    }

    #[test]
    fn test_concurrent_readers_share_one_load() {
        let cache = Arc::new(cache());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.get().map(|a| a.model.generation))
            })
            .collect();

        for h in handles {
            assert_eq!(h.join().unwrap().unwrap(), 1);
        }
        assert_eq!(cache.load_count(), 1);
    }

    #[test]
    fn test_reload_under_contention_never_tears() {
        let cache = Arc::new(cache());
        cache.get().unwrap();

        let reloader = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for _ in 0..50 {
                    cache.reload().unwrap();
                }
            })
        };
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for _ in 0..200 {
                        let pair = cache.get().unwrap();
                        assert_eq!(pair.schema.len(), pair.model.num_features());
                    }
                })
            })
            .collect();

        reloader.join().unwrap();
        for r in readers {
            r.join().unwrap();
        }
        assert_eq!(cache.cached().unwrap().model.generation, cache.load_count());
    }
}
