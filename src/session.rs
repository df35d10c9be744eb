//! Session-scoped caches.
//!
//! Every interaction recomputes its statistics and lookups synchronously,
//! but the inputs are loaded at most once per session: the dataset and the
//! projection files from disk, the model tables from the record store. The
//! cache is an explicitly owned object handed to whatever drives the pages,
//! so tests construct a fresh one per case; the only invalidation is
//! [`Session::reload`] or dropping the session.

use std::path::Path;

use anyhow::Result;

use crate::data::loader::load_dataset;
use crate::data::model::Dataset;
use crate::error::DashboardError;
use crate::projection::ProjectionSet;
use crate::results::{fetch_models, ModelFamily, ModelResult};
use crate::store::RecordStore;

#[derive(Default)]
pub struct Session {
    dataset: Option<Dataset>,
    projection: Option<ProjectionSet>,
    linear_models: Option<Vec<ModelResult>>,
    xgboost_models: Option<Vec<ModelResult>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and cache the battery dataset.
    pub fn load_dataset(&mut self, path: &Path) -> Result<&Dataset> {
        let dataset = load_dataset(path)?;
        log::info!(
            "loaded {} batteries with {} columns",
            dataset.len(),
            dataset.column_names.len()
        );
        Ok(self.dataset.insert(dataset))
    }

    /// Inject an already-built dataset (tests, embedded callers).
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.dataset = Some(dataset);
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    /// Load and cache the projection coordinate/evaluation files.
    pub fn load_projection(&mut self, coords: &Path, evals: &Path) -> Result<&ProjectionSet> {
        let projection = ProjectionSet::load(coords, evals)?;
        Ok(self.projection.insert(projection))
    }

    pub fn projection(&self) -> Option<&ProjectionSet> {
        self.projection.as_ref()
    }

    /// The model table of one family, fetched from the store on first use
    /// and served from the cache afterwards (read-through, session-scoped).
    pub fn models(
        &mut self,
        store: &dyn RecordStore,
        family: ModelFamily,
    ) -> Result<&[ModelResult], DashboardError> {
        let slot = match family {
            ModelFamily::Linear => &mut self.linear_models,
            ModelFamily::Xgboost => &mut self.xgboost_models,
        };
        if slot.is_none() {
            log::debug!("fetching {} table", family.models_table());
            *slot = Some(fetch_models(store, family)?);
        }
        Ok(slot.as_deref().unwrap_or_default())
    }

    /// Drop every cache. The next access reloads from the sources.
    pub fn reload(&mut self) {
        self.dataset = None;
        self.projection = None;
        self.linear_models = None;
        self.xgboost_models = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::{json, Value as JsonValue};
    use std::cell::Cell;

    struct CountingStore {
        inner: MemoryStore,
        calls: Cell<usize>,
    }

    impl RecordStore for CountingStore {
        fn select_all(&self, table: &str) -> Result<Vec<JsonValue>, DashboardError> {
            self.calls.set(self.calls.get() + 1);
            self.inner.select_all(table)
        }

        fn select_eq(
            &self,
            table: &str,
            column: &str,
            value: &JsonValue,
        ) -> Result<Vec<JsonValue>, DashboardError> {
            self.inner.select_eq(table, column, value)
        }

        fn public_url(&self, bucket: &str, path: &str) -> String {
            self.inner.public_url(bucket, path)
        }
    }

    fn counting_store() -> CountingStore {
        let mut inner = MemoryStore::new();
        inner.insert(
            "regression_models",
            json!({
                "id": 1,
                "feature_subset": ["Battery Properties"],
                "response_variable": "CCH",
                "r_squared": 0.9,
                "rmse": 0.1,
                "mae": 0.05
            }),
        );
        CountingStore {
            inner,
            calls: Cell::new(0),
        }
    }

    #[test]
    fn model_table_is_fetched_once_per_session() {
        let store = counting_store();
        let mut session = Session::new();

        let first = session.models(&store, ModelFamily::Linear).unwrap().len();
        let second = session.models(&store, ModelFamily::Linear).unwrap().len();
        assert_eq!(first, 1);
        assert_eq!(second, 1);
        assert_eq!(store.calls.get(), 1);
    }

    #[test]
    fn reload_drops_the_caches() {
        let store = counting_store();
        let mut session = Session::new();

        session.models(&store, ModelFamily::Linear).unwrap();
        session.reload();
        session.models(&store, ModelFamily::Linear).unwrap();
        assert_eq!(store.calls.get(), 2);
    }

    #[test]
    fn families_are_cached_independently() {
        let store = counting_store();
        let mut session = Session::new();

        session.models(&store, ModelFamily::Linear).unwrap();
        let xgb = session.models(&store, ModelFamily::Xgboost).unwrap();
        assert!(xgb.is_empty());
        assert_eq!(store.calls.get(), 2);
    }
}
