//! Experiment Record - catalog metadata for one experiment

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::NameSpec;
use crate::{Error, Result};

/// Experiment Record describes a running A/B experiment.
///
/// Alternatives are ordered; the first one is the control that every other
/// alternative is compared against. Goals are the named conversion events
/// tracked in addition to the default (unnamed) goal.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExperimentRecord {
    name: String,
    alternatives: Vec<NameSpec>,
    goals: Vec<String>,
    created_at: DateTime<Utc>,
    metadata: Option<serde_json::Value>,
}

impl ExperimentRecord {
    /// Create an experiment record with no named goals.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidExperiment`] if `alternatives` is empty, or
    /// [`Error::InvalidAlternative`] if any alternative is malformed.
    pub fn new(name: impl Into<String>, alternatives: Vec<NameSpec>) -> Result<Self> {
        ExperimentRecordBuilder::new(name, alternatives).build()
    }

    /// Create a builder for constructing an experiment record with optional fields.
    #[must_use]
    pub fn builder(
        name: impl Into<String>,
        alternatives: Vec<NameSpec>,
    ) -> ExperimentRecordBuilder {
        ExperimentRecordBuilder::new(name, alternatives)
    }

    /// Get the experiment name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the alternatives, control first.
    #[must_use]
    pub fn alternatives(&self) -> &[NameSpec] {
        &self.alternatives
    }

    /// Get the control alternative.
    #[must_use]
    pub fn control(&self) -> &NameSpec {
        // Non-empty by construction
        &self.alternatives[0]
    }

    /// Get the named goals.
    #[must_use]
    pub fn goals(&self) -> &[String] {
        &self.goals
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Get the experiment metadata, if any.
    #[must_use]
    pub const fn metadata(&self) -> Option<&serde_json::Value> {
        self.metadata.as_ref()
    }
}

/// Builder for `ExperimentRecord`.
#[derive(Debug)]
pub struct ExperimentRecordBuilder {
    name: String,
    alternatives: Vec<NameSpec>,
    goals: Vec<String>,
    created_at: DateTime<Utc>,
    metadata: Option<serde_json::Value>,
}

impl ExperimentRecordBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(name: impl Into<String>, alternatives: Vec<NameSpec>) -> Self {
        Self {
            name: name.into(),
            alternatives,
            goals: Vec::new(),
            created_at: Utc::now(),
            metadata: None,
        }
    }

    /// Add a named goal.
    #[must_use]
    pub fn goal(mut self, goal: impl Into<String>) -> Self {
        self.goals.push(goal.into());
        self
    }

    /// Replace the named goals.
    #[must_use]
    pub fn goals<I, G>(mut self, goals: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: Into<String>,
    {
        self.goals = goals.into_iter().map(Into::into).collect();
        self
    }

    /// Set the experiment metadata.
    #[must_use]
    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Set a custom creation timestamp (useful for deserialization/testing).
    #[must_use]
    pub const fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Build the `ExperimentRecord`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidExperiment`] if there are no alternatives, or
    /// [`Error::InvalidAlternative`] if any alternative is malformed.
    pub fn build(self) -> Result<ExperimentRecord> {
        if self.alternatives.is_empty() {
            return Err(Error::InvalidExperiment(format!(
                "{}: at least one alternative is required",
                self.name
            )));
        }
        for alternative in &self.alternatives {
            alternative.validate()?;
        }

        Ok(ExperimentRecord {
            name: self.name,
            alternatives: self.alternatives,
            goals: self.goals,
            created_at: self.created_at,
            metadata: self.metadata,
        })
    }
}
