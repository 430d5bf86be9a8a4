//! Loaded classifier handle and its load-once store.
//!
//! A [`ModelStore`] owns the loader and caches the loaded model behind an `Arc`. Requests
//! receive that `Arc` and read it without coordination; nothing mutates a loaded model.
//! Replacing the cached model is an explicit operation ([`ModelStore::reload`] or
//! [`ModelStore::invalidate`]) and never happens as a side effect of serving a request.

use crate::classifier::Classifier;
use crate::linear::LinearClassifier;
use crate::{RiskError, RiskResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Evaluation metrics recorded when the model was trained.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub roc_auc: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

/// Contents of the model metadata sidecar, passed through untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub metrics: ModelMetrics,
    pub training_date: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ModelInfo {
    /// Reads the sidecar at `path`.
    ///
    /// A missing file yields `None`. So does an unreadable or malformed one, with a warning;
    /// the sidecar is informational and never blocks serving.
    pub fn load_optional(path: &Path) -> Option<Self> {
        if !path.is_file() {
            return None;
        }

        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!("failed to read model metadata {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(info) => Some(info),
            Err(e) => {
                tracing::warn!("failed to parse model metadata {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// A classifier ready to serve, plus its optional metadata.
pub struct LoadedModel {
    classifier: Box<dyn Classifier>,
    info: Option<ModelInfo>,
}

impl LoadedModel {
    pub fn new(classifier: Box<dyn Classifier>, info: Option<ModelInfo>) -> Self {
        Self { classifier, info }
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn info(&self) -> Option<&ModelInfo> {
        self.info.as_ref()
    }
}

impl fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModel")
            .field("classes", &self.classifier.classes())
            .field("info", &self.info)
            .finish()
    }
}

/// Produces a [`LoadedModel`]. Called at most once per cache fill.
pub trait ModelLoader: Send + Sync {
    fn load(&self) -> RiskResult<LoadedModel>;
}

/// Loads a [`LinearClassifier`] artifact and its optional metadata sidecar from disk.
#[derive(Clone, Debug)]
pub struct FileModelLoader {
    model_path: PathBuf,
    info_path: Option<PathBuf>,
}

impl FileModelLoader {
    pub fn new(model_path: PathBuf, info_path: Option<PathBuf>) -> Self {
        Self {
            model_path,
            info_path,
        }
    }
}

impl ModelLoader for FileModelLoader {
    fn load(&self) -> RiskResult<LoadedModel> {
        if !self.model_path.is_file() {
            return Err(RiskError::ModelUnavailable(format!(
                "model artifact not found at {}",
                self.model_path.display()
            )));
        }

        let classifier = LinearClassifier::load(&self.model_path)?;
        let info = self
            .info_path
            .as_deref()
            .and_then(ModelInfo::load_optional);

        tracing::info!(
            "loaded model {} ({} classes, metadata: {})",
            self.model_path.display(),
            classifier.classes().len(),
            if info.is_some() { "present" } else { "absent" }
        );
        Ok(LoadedModel::new(Box::new(classifier), info))
    }
}

/// Load-once cache around a [`ModelLoader`].
pub struct ModelStore {
    loader: Box<dyn ModelLoader>,
    cached: RwLock<Option<Arc<LoadedModel>>>,
}

impl ModelStore {
    pub fn new(loader: impl ModelLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            cached: RwLock::new(None),
        }
    }

    /// Returns the cached model, loading it on first use.
    ///
    /// # Errors
    ///
    /// Returns the loader's error (normally [`RiskError::ModelUnavailable`]). The cache stays
    /// empty on failure, so a later call retries from scratch.
    pub fn get_or_load(&self) -> RiskResult<Arc<LoadedModel>> {
        if let Some(model) = self.current() {
            return Ok(model);
        }

        let mut slot = self.cached.write().map_err(|_| poisoned())?;
        // Another caller may have filled the slot while we waited for the lock.
        if let Some(model) = slot.as_ref() {
            return Ok(Arc::clone(model));
        }

        let model = Arc::new(self.loader.load()?);
        *slot = Some(Arc::clone(&model));
        Ok(model)
    }

    /// The cached model, if one is loaded.
    pub fn current(&self) -> Option<Arc<LoadedModel>> {
        self.cached.read().ok().and_then(|slot| slot.clone())
    }

    /// Loads a fresh model and swaps it in.
    ///
    /// The previous model keeps serving until the replacement has loaded successfully; on
    /// failure it stays cached. Requests already holding the old `Arc` are unaffected.
    pub fn reload(&self) -> RiskResult<Arc<LoadedModel>> {
        let model = Arc::new(self.loader.load()?);
        let mut slot = self.cached.write().map_err(|_| poisoned())?;
        *slot = Some(Arc::clone(&model));
        tracing::info!("model cache replaced");
        Ok(model)
    }

    /// Drops the cached model so the next [`ModelStore::get_or_load`] loads again.
    pub fn invalidate(&self) {
        if let Ok(mut slot) = self.cached.write() {
            *slot = None;
            tracing::info!("model cache invalidated");
        }
    }
}

fn poisoned() -> RiskError {
    RiskError::ModelUnavailable("model cache lock poisoned".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    const ARTIFACT: &str = r#"{
        "classes": ["Normal_Weight", "Obesity_Type_I"],
        "intercepts": [0.0, 0.0],
        "coefficients": [{}, {}]
    }"#;

    const INFO: &str = r#"{
        "metrics": {
            "accuracy": 0.932,
            "roc_auc": 0.997,
            "precision": 0.93,
            "recall": 0.932,
            "f1_score": 0.931
        },
        "training_date": "2024-11-02",
        "model_type": "random_forest"
    }"#;

    struct CountingLoader {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl ModelLoader for CountingLoader {
        fn load(&self) -> RiskResult<LoadedModel> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(RiskError::ModelUnavailable("boom".into()));
            }
            Ok(LoadedModel::new(
                Box::new(LinearClassifier::from_json_str(ARTIFACT)?),
                None,
            ))
        }
    }

    #[test]
    fn test_loads_once_and_caches() {
        let calls = Arc::new(AtomicUsize::new(0));
        let store = ModelStore::new(CountingLoader {
            calls: Arc::clone(&calls),
            fail: false,
        });

        assert!(store.current().is_none());
        let first = store.get_or_load().expect("load");
        let second = store.get_or_load().expect("cached");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_load_leaves_cache_empty() {
        let calls = Arc::new(AtomicUsize::new(0));
        let store = ModelStore::new(CountingLoader {
            calls: Arc::clone(&calls),
            fail: true,
        });

        let err = store.get_or_load().expect_err("should fail");
        assert!(matches!(err, RiskError::ModelUnavailable(_)));
        assert!(store.current().is_none());
    }

    #[test]
    fn test_reload_and_invalidate_are_explicit() {
        let calls = Arc::new(AtomicUsize::new(0));
        let store = ModelStore::new(CountingLoader {
            calls: Arc::clone(&calls),
            fail: false,
        });

        let first = store.get_or_load().unwrap();
        let reloaded = store.reload().unwrap();
        assert!(!Arc::ptr_eq(&first, &reloaded));
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        store.invalidate();
        assert!(store.current().is_none());
        store.get_or_load().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_concurrent_readers_share_one_model() {
        let calls = Arc::new(AtomicUsize::new(0));
        let store = Arc::new(ModelStore::new(CountingLoader {
            calls: Arc::clone(&calls),
            fail: false,
        }));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.get_or_load().map(|m| m.classifier().classes().len()))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), 2);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_file_loader_reads_model_and_sidecar() {
        let dir = TempDir::new().unwrap();
        let model_path = dir.path().join("model.json");
        let info_path = dir.path().join("model_info.json");
        fs::write(&model_path, ARTIFACT).unwrap();
        fs::write(&info_path, INFO).unwrap();

        let model = FileModelLoader::new(model_path, Some(info_path))
            .load()
            .expect("load");
        let info = model.info().expect("sidecar present");
        assert_eq!(info.metrics.roc_auc, 0.997);
        assert_eq!(info.training_date, "2024-11-02");
        assert_eq!(info.extra["model_type"], "random_forest");
    }

    #[test]
    fn test_file_loader_without_sidecar() {
        let dir = TempDir::new().unwrap();
        let model_path = dir.path().join("model.json");
        fs::write(&model_path, ARTIFACT).unwrap();

        let model = FileModelLoader::new(model_path, Some(dir.path().join("absent.json")))
            .load()
            .unwrap();
        assert!(model.info().is_none());
    }

    #[test]
    fn test_malformed_sidecar_is_ignored() {
        let dir = TempDir::new().unwrap();
        let info_path = dir.path().join("model_info.json");
        fs::write(&info_path, "{ not json").unwrap();
        assert!(ModelInfo::load_optional(&info_path).is_none());
    }

    #[test]
    fn test_missing_artifact_is_model_unavailable() {
        let dir = TempDir::new().unwrap();
        let err = FileModelLoader::new(dir.path().join("missing.json"), None)
            .load()
            .expect_err("missing artifact");
        assert!(matches!(err, RiskError::ModelUnavailable(msg) if msg.contains("not found")));
    }
}
