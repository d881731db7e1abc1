// src/config/loader.rs
//! Layered configuration loading.
//!
//! Sources are merged in order: built-in defaults, then an optional TOML
//! file, then `PPG__`-prefixed environment variables. The merged result is
//! validated before use.

use std::path::{Path, PathBuf};

use crate::config::PipelineConfig;
use crate::error::{PpgError, PpgResult};

/// Layered configuration loader.
pub struct ConfigLoader {
    file: Option<PathBuf>,
    env_prefix: String,
}

impl ConfigLoader {
    /// Loader with defaults and environment overrides only.
    pub fn new() -> Self {
        Self {
            file: None,
            env_prefix: "PPG".to_string(),
        }
    }

    /// Add a TOML file source.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Override the environment variable prefix (default `PPG`).
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load, merge, and validate the pipeline configuration.
    pub fn load(&self) -> PpgResult<PipelineConfig> {
        let defaults = PipelineConfig::default().to_toml()?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults,
            config::FileFormat::Toml,
        ));

        if let Some(path) = &self.file {
            builder = builder.add_source(config::File::from(path.as_path()));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(&self.env_prefix)
                .separator("__")
                .try_parsing(true),
        );

        let merged = builder
            .build()
            .map_err(|e| PpgError::config("loader", e.to_string()))?;

        let pipeline: PipelineConfig = merged
            .try_deserialize()
            .map_err(|e| PpgError::config("loader", e.to_string()))?;

        pipeline.validate()?;
        Ok(pipeline)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
