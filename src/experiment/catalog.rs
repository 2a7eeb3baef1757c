//! Experiment Catalog - resolves experiment names to their metadata
//!
//! The catalog is an external collaborator: the variant layer only needs
//! `find_experiment`. `MemoryCatalog` is the in-process implementation,
//! loadable from a JSON definition file.
//!
//! ## Definition format
//!
//! ```json
//! {
//!   "experiments": {
//!     "link_color": {
//!       "alternatives": ["blue", {"red": 2}],
//!       "goals": ["purchase"],
//!       "metadata": {"blue": {"text": "Buy now"}}
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::future::Future;
use std::path::Path;

use dashmap::DashMap;
use serde::Deserialize;
use tracing::info;

use super::{ExperimentRecord, NameSpec};
use crate::Result;

/// Lookup of experiment metadata by name.
pub trait ExperimentCatalog: Send + Sync {
    /// Find an experiment.
    ///
    /// Returns `None` if no experiment has this name.
    fn find_experiment(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<ExperimentRecord>>> + Send;
}

/// Experiment definitions, keyed by experiment name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogConfig {
    /// Definitions by experiment name
    #[serde(default)]
    pub experiments: BTreeMap<String, ExperimentDefinition>,
}

/// One experiment definition.
#[derive(Debug, Clone, Deserialize)]
pub struct ExperimentDefinition {
    /// Alternatives, control first
    pub alternatives: Vec<NameSpec>,
    /// Named goals
    #[serde(default)]
    pub goals: Vec<String>,
    /// Free-form metadata
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl CatalogConfig {
    /// Parse definitions from JSON text.
    ///
    /// # Errors
    ///
    /// Returns error if the text is not valid JSON or an alternative is malformed
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read definitions from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

/// In-memory catalog backed by `DashMap`.
///
/// # Example
///
/// ```rust
/// use trueno_ab::experiment::{ExperimentCatalog, MemoryCatalog};
///
/// # async fn example() -> trueno_ab::Result<()> {
/// let catalog = MemoryCatalog::from_json_str(
///     r#"{"experiments": {"link_color": {"alternatives": ["blue", "red"]}}}"#,
/// )?;
/// let experiment = catalog.find_experiment("link_color").await?.unwrap();
/// assert_eq!(experiment.control().name(), "blue");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    experiments: DashMap<String, ExperimentRecord>,
}

impl MemoryCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from parsed definitions.
    ///
    /// # Errors
    ///
    /// Returns error if a definition has no alternatives
    pub fn from_config(config: CatalogConfig) -> Result<Self> {
        let catalog = Self::new();
        for (name, definition) in config.experiments {
            let mut builder =
                ExperimentRecord::builder(name, definition.alternatives).goals(definition.goals);
            if let Some(metadata) = definition.metadata {
                builder = builder.metadata(metadata);
            }
            catalog.insert(builder.build()?);
        }
        info!(experiments = catalog.len(), "Experiment catalog loaded");
        Ok(catalog)
    }

    /// Build a catalog from JSON definition text.
    ///
    /// # Errors
    ///
    /// Returns error if the text cannot be parsed or a definition is invalid
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_config(CatalogConfig::from_json_str(json)?)
    }

    /// Build a catalog from a JSON definition file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or a definition is invalid
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_config(CatalogConfig::from_json_file(path)?)
    }

    /// Add or replace an experiment.
    pub fn insert(&self, experiment: ExperimentRecord) {
        self.experiments
            .insert(experiment.name().to_string(), experiment);
    }

    /// Remove an experiment, returning it if present.
    pub fn remove(&self, name: &str) -> Option<ExperimentRecord> {
        self.experiments.remove(name).map(|(_, record)| record)
    }

    /// Get the number of experiments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.experiments.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
    }
}

impl ExperimentCatalog for MemoryCatalog {
    async fn find_experiment(&self, name: &str) -> Result<Option<ExperimentRecord>> {
        Ok(self.experiments.get(name).map(|entry| entry.value().clone()))
    }
}
