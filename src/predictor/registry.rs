use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use super::{AffinityPredictor, DenseModel, PredictorKind};
use crate::config::ModelsConfig;
use crate::error::ModelError;

/// Load state of a predictor slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// Nothing has asked for the predictor yet.
    Unloaded,
    Loaded,
    /// Load was attempted and failed; the slot serves the fallback.
    Failed(String),
}

/// Lazily loaded, initialize-once predictor.
#[derive(Debug)]
pub struct PredictorSlot {
    kind: PredictorKind,
    path: Option<PathBuf>,
    fallback: f64,
    cell: OnceLock<(AffinityPredictor, LoadStatus)>,
}

impl PredictorSlot {
    pub fn new(kind: PredictorKind, path: Option<PathBuf>, fallback: f64) -> Self {
        Self {
            kind,
            path,
            fallback,
            cell: OnceLock::new(),
        }
    }

    /// Slot that already holds a predictor. Nothing is read from disk.
    pub fn preloaded(predictor: AffinityPredictor) -> Self {
        let status = if predictor.is_available() {
            LoadStatus::Loaded
        } else {
            LoadStatus::Failed(ModelError::NotConfigured.to_string())
        };
        let slot = Self {
            kind: predictor.kind(),
            path: None,
            fallback: predictor.fallback(),
            cell: OnceLock::new(),
        };
        let _ = slot.cell.set((predictor, status));
        slot
    }

    pub fn kind(&self) -> PredictorKind {
        self.kind
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    pub fn status(&self) -> LoadStatus {
        self.cell
            .get()
            .map(|(_, status)| status.clone())
            .unwrap_or(LoadStatus::Unloaded)
    }

    /// The predictor, loading it on first use.
    pub fn get(&self) -> &AffinityPredictor {
        &self.cell.get_or_init(|| self.load()).0
    }

    fn load(&self) -> (AffinityPredictor, LoadStatus) {
        let result = match &self.path {
            Some(path) => {
                let start = Instant::now();
                DenseModel::load(path, self.kind).inspect(|model| {
                    tracing::info!(
                        kind = %self.kind,
                        path = %path.display(),
                        layers = model.layer_count(),
                        elapsed = %humantime::format_duration(start.elapsed()),
                        "loaded affinity model"
                    );
                })
            }
            None => Err(ModelError::NotConfigured),
        };

        match result {
            Ok(model) => (
                AffinityPredictor::new(self.kind, Arc::new(model)).with_fallback(self.fallback),
                LoadStatus::Loaded,
            ),
            Err(e) => {
                if matches!(e, ModelError::NotConfigured) {
                    tracing::info!(
                        kind = %self.kind,
                        "no affinity model configured, using fallback"
                    );
                } else {
                    tracing::warn!(
                        kind = %self.kind,
                        error = %e,
                        "failed to load affinity model, using fallback"
                    );
                }
                (
                    AffinityPredictor::unavailable(self.kind).with_fallback(self.fallback),
                    LoadStatus::Failed(e.to_string()),
                )
            }
        }
    }
}

/// The stem and branch predictors used by the engine.
#[derive(Debug)]
pub struct PredictorRegistry {
    stem: PredictorSlot,
    branch: PredictorSlot,
}

static GLOBAL: OnceLock<PredictorRegistry> = OnceLock::new();

impl PredictorRegistry {
    pub fn from_config(config: &ModelsConfig) -> Self {
        Self {
            stem: PredictorSlot::new(
                PredictorKind::Stem,
                config.stem.clone(),
                config.fallback_prediction,
            ),
            branch: PredictorSlot::new(
                PredictorKind::Branch,
                config.branch.clone(),
                config.fallback_prediction,
            ),
        }
    }

    pub fn with_predictors(stem: AffinityPredictor, branch: AffinityPredictor) -> Self {
        Self {
            stem: PredictorSlot::preloaded(stem),
            branch: PredictorSlot::preloaded(branch),
        }
    }

    /// Process-wide registry. The first caller's config wins; later calls
    /// return the same instance.
    pub fn global(config: &ModelsConfig) -> &'static PredictorRegistry {
        GLOBAL.get_or_init(|| Self::from_config(config))
    }

    pub fn stem(&self) -> &AffinityPredictor {
        self.stem.get()
    }

    pub fn branch(&self) -> &AffinityPredictor {
        self.branch.get()
    }

    pub fn slots(&self) -> [&PredictorSlot; 2] {
        [&self.stem, &self.branch]
    }

    /// Force both slots to load. Returns their status afterwards.
    pub fn warm_up(&self) -> [LoadStatus; 2] {
        self.stem.get();
        self.branch.get();
        [self.stem.status(), self.branch.status()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::test_support::constant;
    use crate::predictor::{DenseLayer, ModelFile, NEUTRAL_PREDICTION};
    use std::env;
    use std::fs;

    fn write_model(name: &str, kind: PredictorKind, value: f64) -> PathBuf {
        let path = env::temp_dir().join(name);
        let file = ModelFile {
            format_version: "1.0.0".to_string(),
            kind: Some(kind),
            layers: vec![DenseLayer {
                weights: vec![vec![0.0; kind.input_size()]],
                bias: vec![value],
                activation: Default::default(),
            }],
        };
        fs::write(&path, serde_json::to_string(&file).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_slot_is_unloaded_until_used() {
        let path = write_model("saju_match_test_slot_lazy.json", PredictorKind::Stem, 0.7);
        let slot = PredictorSlot::new(PredictorKind::Stem, Some(path.clone()), NEUTRAL_PREDICTION);
        assert_eq!(slot.status(), LoadStatus::Unloaded);

        assert_eq!(slot.get().predict(1, 2), 0.7);
        assert_eq!(slot.status(), LoadStatus::Loaded);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_slot_loads_once() {
        let path = write_model("saju_match_test_slot_once.json", PredictorKind::Branch, 0.4);
        let slot =
            PredictorSlot::new(PredictorKind::Branch, Some(path.clone()), NEUTRAL_PREDICTION);
        assert_eq!(slot.get().predict(1, 1), 0.4);

        // rewriting the file does not affect an already loaded slot
        let _ = fs::remove_file(&path);
        write_model("saju_match_test_slot_once.json", PredictorKind::Branch, 0.9);
        assert_eq!(slot.get().predict(1, 1), 0.4);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_degrades_to_fallback() {
        let path = env::temp_dir().join("saju_match_test_slot_missing.json");
        let _ = fs::remove_file(&path);
        let slot = PredictorSlot::new(PredictorKind::Stem, Some(path), 0.25);

        assert_eq!(slot.get().predict(3, 4), 0.25);
        assert!(matches!(slot.status(), LoadStatus::Failed(_)));
    }

    #[test]
    fn test_unconfigured_slot_fails_softly() {
        let slot = PredictorSlot::new(PredictorKind::Branch, None, NEUTRAL_PREDICTION);
        assert!(!slot.get().is_available());
        match slot.status() {
            LoadStatus::Failed(reason) => assert!(reason.contains("no model path")),
            other => panic!("unexpected status {:?}", other),
        }
    }

    #[test]
    fn test_registry_from_config_without_models() {
        let registry = PredictorRegistry::from_config(&ModelsConfig::default());
        assert_eq!(registry.stem().predict(1, 1), NEUTRAL_PREDICTION);
        assert_eq!(registry.branch().predict(1, 1), NEUTRAL_PREDICTION);
        let statuses = registry.warm_up();
        assert!(statuses
            .iter()
            .all(|s| matches!(s, LoadStatus::Failed(_))));
    }

    #[test]
    fn test_registry_with_predictors() {
        let registry = PredictorRegistry::with_predictors(
            constant(PredictorKind::Stem, 0.6),
            AffinityPredictor::unavailable(PredictorKind::Branch),
        );
        let [stem, branch] = registry.slots();
        assert_eq!(stem.status(), LoadStatus::Loaded);
        assert!(matches!(branch.status(), LoadStatus::Failed(_)));
        assert_eq!(registry.stem().predict(1, 1), 0.6);
    }
}
