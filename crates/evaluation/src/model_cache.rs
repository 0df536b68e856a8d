//! Persisted model artifacts keyed by algorithm and neighbourhood size

use receval_core::{Configuration, ModelHandle, ModelKey, ModelTrainer, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Resolves trained models, building each missing artifact once
///
/// An artifact present on disk is trusted as-is. Builds are written to a
/// staging file next to the artifact and renamed into place, so a crashed
/// build never leaves a file that looks valid.
pub struct ModelCache {
    model_dir: PathBuf,
    trainer: Arc<dyn ModelTrainer>,
    last: Option<(ModelKey, ModelHandle)>,
    builds_triggered: usize,
}

impl ModelCache {
    pub fn new(model_dir: impl Into<PathBuf>, trainer: Arc<dyn ModelTrainer>) -> Self {
        Self {
            model_dir: model_dir.into(),
            trainer,
            last: None,
            builds_triggered: 0,
        }
    }

    /// Location of the artifact for `key`
    pub fn artifact_path(&self, key: ModelKey) -> PathBuf {
        self.model_dir.join(key.artifact_file_name())
    }

    /// Number of builds this cache has asked the trainer for
    pub fn builds_triggered(&self) -> usize {
        self.builds_triggered
    }

    /// Return the model behind a configuration, training and persisting it first if needed
    ///
    /// Configurations that differ only in recommendation count share a model.
    pub async fn resolve(&mut self, configuration: &Configuration) -> Result<ModelHandle> {
        let key = configuration.model_key();
        if let Some((_, handle)) = self.last.as_ref().filter(|(cached, _)| *cached == key) {
            return Ok(Arc::clone(handle));
        }

        let path = self.artifact_path(key);
        if path.exists() {
            debug!(path = %path.display(), "Reusing model artifact for {key}");
        } else {
            self.build(key, &path).await?;
        }

        let handle = self.trainer.load(key, &path)?;
        self.last = Some((key, Arc::clone(&handle)));
        Ok(handle)
    }

    async fn build(&mut self, key: ModelKey, path: &Path) -> Result<()> {
        std::fs::create_dir_all(&self.model_dir)?;
        let staging = path.with_extension("json.partial");

        info!("No artifact for {key}, building");
        self.builds_triggered += 1;
        if let Err(e) = self.trainer.build(key, &staging).await {
            if staging.exists() {
                if let Err(cleanup) = std::fs::remove_file(&staging) {
                    warn!("Failed to remove partial artifact {}: {cleanup}", staging.display());
                }
            }
            return Err(e);
        }

        std::fs::rename(&staging, path)?;
        Ok(())
    }
}
