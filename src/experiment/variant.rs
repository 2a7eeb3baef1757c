//! Variant - counters and statistics for one alternative of an experiment
//!
//! Every alternative is stored as one counter-store record keyed
//! `"<experiment>:<alternative>"` with these fields:
//!
//! | Field | Contents |
//! |---|---|
//! | `participant_count` | users exposed to the alternative |
//! | `completed_count` | conversions on the default goal |
//! | `completed_count:<goal>` | conversions on a named goal |
//! | `p_winner` / `p_winner:<goal>` | externally computed probability of winning |
//! | `recorded_info` | JSON object of auxiliary values |
//!
//! ## Consistency
//!
//! Each method call is an independent store round-trip. Increments use the
//! store's atomic increment and never lose updates. Overwrites
//! (`set_*`, `record_extra_info`) are last-writer-wins. Derived values that
//! read more than one field (`conversion_rate`, `unfinished_count`, `stats`)
//! are not transactional and may combine values from different moments
//! while other callers are writing.

use std::fmt;
use std::sync::Arc;

use serde_json::{Number, Value};
use tracing::{debug, info, warn};

use super::stats::VariantStats;
use super::{ExperimentCatalog, ExperimentRecord, NameSpec};
use crate::kv::CounterStore;
use crate::significance::{self, ZScore};
use crate::{Error, Result};

const PARTICIPANT_COUNT: &str = "participant_count";
const COMPLETED_COUNT: &str = "completed_count";
const P_WINNER: &str = "p_winner";
const RECORDED_INFO: &str = "recorded_info";

/// Auxiliary values recorded against an alternative.
pub type ExtraInfo = serde_json::Map<String, Value>;

/// One alternative of an experiment, bound to a counter store and a catalog.
///
/// Cloning is cheap: the store and catalog are shared handles.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use trueno_ab::experiment::{MemoryCatalog, NameSpec, Variant};
/// use trueno_ab::kv::MemoryCounterStore;
///
/// # async fn example() -> trueno_ab::Result<()> {
/// let store = Arc::new(MemoryCounterStore::new());
/// let catalog = Arc::new(MemoryCatalog::from_json_str(
///     r#"{"experiments": {"link_color": {"alternatives": ["blue", "red"]}}}"#,
/// )?);
///
/// let red = Variant::new(NameSpec::plain("red"), "link_color", store, catalog);
/// red.save().await?;
/// red.increment_participation().await?;
/// red.increment_completion(None).await?;
///
/// assert!((red.conversion_rate(None).await? - 1.0).abs() < f64::EPSILON);
/// # Ok(())
/// # }
/// ```
pub struct Variant<S, C> {
    spec: NameSpec,
    experiment_name: String,
    key: String,
    store: Arc<S>,
    catalog: Arc<C>,
}

impl<S: CounterStore, C: ExperimentCatalog> Variant<S, C> {
    /// Create a handle for an alternative. The name is validated by
    /// [`Variant::validate`], which [`Variant::save`] runs before writing.
    #[must_use]
    pub fn new(
        spec: NameSpec,
        experiment_name: impl Into<String>,
        store: Arc<S>,
        catalog: Arc<C>,
    ) -> Self {
        let experiment_name = experiment_name.into();
        let key = format!("{experiment_name}:{}", spec.name());
        Self {
            spec,
            experiment_name,
            key,
            store,
            catalog,
        }
    }

    /// Create a handle from a raw definition value (`"name"` or `{"name": weight}`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAlternative`] if the value has the wrong shape
    pub fn from_raw(
        raw: &Value,
        experiment_name: impl Into<String>,
        store: Arc<S>,
        catalog: Arc<C>,
    ) -> Result<Self> {
        let spec = NameSpec::from_value(raw)?;
        Ok(Self::new(spec, experiment_name, store, catalog))
    }

    /// Get the alternative name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.spec.name()
    }

    /// Get the experiment name.
    #[must_use]
    pub fn experiment_name(&self) -> &str {
        &self.experiment_name
    }

    /// Get the sampling weight.
    #[must_use]
    pub const fn weight(&self) -> f64 {
        self.spec.weight()
    }

    /// Get the name as it was defined, plain or weighted.
    #[must_use]
    pub const fn spec(&self) -> &NameSpec {
        &self.spec
    }

    /// Get the counter-store key, `"<experiment>:<alternative>"`.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Check the name and weight.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAlternative`] for an empty plain name or a
    /// non-finite weight. A weighted name may use any key.
    pub fn validate(&self) -> Result<()> {
        self.spec.validate().map_err(|err| match err {
            Error::InvalidAlternative(reason) => {
                Error::InvalidAlternative(format!("{}: {reason}", self.experiment_name))
            }
            other => other,
        })
    }

    // ========================================================================
    // Participation
    // ========================================================================

    /// Get the number of participants. Missing reads as 0.
    ///
    /// # Errors
    ///
    /// Propagates counter store errors
    pub async fn participant_count(&self) -> Result<i64> {
        self.read_count(PARTICIPANT_COUNT).await
    }

    /// Overwrite the number of participants.
    ///
    /// # Errors
    ///
    /// Propagates counter store errors
    pub async fn set_participant_count(&self, count: i64) -> Result<()> {
        self.store
            .hash_set(&self.key, PARTICIPANT_COUNT, count.to_string())
            .await
    }

    /// Atomically add one participant.
    ///
    /// # Errors
    ///
    /// Propagates counter store errors
    pub async fn increment_participation(&self) -> Result<()> {
        let count = self
            .store
            .hash_increment_by(&self.key, PARTICIPANT_COUNT, 1)
            .await?;
        debug!(key = %self.key, count, "Participation recorded");
        Ok(())
    }

    // ========================================================================
    // Completion
    // ========================================================================

    /// Get the conversions for a goal (`None` is the default goal). Missing reads as 0.
    ///
    /// # Errors
    ///
    /// Propagates counter store errors
    pub async fn completed_count(&self, goal: Option<&str>) -> Result<i64> {
        self.read_count(&completed_field(goal)).await
    }

    /// Overwrite the conversions for a goal.
    ///
    /// # Errors
    ///
    /// Propagates counter store errors
    pub async fn set_completed_count(&self, count: i64, goal: Option<&str>) -> Result<()> {
        self.store
            .hash_set(&self.key, &completed_field(goal), count.to_string())
            .await
    }

    /// Atomically add one conversion for a goal.
    ///
    /// # Errors
    ///
    /// Propagates counter store errors
    pub async fn increment_completion(&self, goal: Option<&str>) -> Result<()> {
        let count = self
            .store
            .hash_increment_by(&self.key, &completed_field(goal), 1)
            .await?;
        debug!(key = %self.key, goal, count, "Completion recorded");
        Ok(())
    }

    /// Get the conversions over all goals.
    ///
    /// Without named goals this is the default goal's count. With named
    /// goals it is the default goal's count plus every named goal's count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExperimentNotFound`] if the catalog has no such
    /// experiment; propagates counter store errors
    pub async fn all_completed_count(&self) -> Result<i64> {
        let goals = self.goals().await?;
        let mut total = self.completed_count(None).await?;
        for goal in &goals {
            total = total.saturating_add(self.completed_count(Some(goal)).await?);
        }
        Ok(total)
    }

    /// Get participants that have not converted on any goal.
    ///
    /// Not clamped: negative when counters are inconsistent. Reads are not
    /// atomic with respect to each other.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExperimentNotFound`] if the catalog has no such
    /// experiment; propagates counter store errors
    pub async fn unfinished_count(&self) -> Result<i64> {
        let participants = self.participant_count().await?;
        let completed = self.all_completed_count().await?;
        Ok(participants.saturating_sub(completed))
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Get the conversion rate for a goal, `0.0` without participants.
    ///
    /// The two counters are read separately and may be momentarily out of
    /// step under concurrent updates.
    ///
    /// # Errors
    ///
    /// Propagates counter store errors
    #[allow(clippy::cast_precision_loss)]
    pub async fn conversion_rate(&self, goal: Option<&str>) -> Result<f64> {
        let participants = self.participant_count().await?;
        if participants == 0 {
            return Ok(0.0);
        }
        let completed = self.completed_count(goal).await?;
        Ok(completed as f64 / participants as f64)
    }

    /// Get the stored probability of winning for a goal. Missing or
    /// unparsable reads as `0.0`.
    ///
    /// # Errors
    ///
    /// Propagates counter store errors
    pub async fn p_winner(&self, goal: Option<&str>) -> Result<f64> {
        let raw = self.store.hash_get(&self.key, &p_winner_field(goal)).await?;
        Ok(raw
            .and_then(|value| value.trim().parse::<f64>().ok())
            .unwrap_or(0.0))
    }

    /// Overwrite the probability of winning for a goal.
    ///
    /// # Errors
    ///
    /// Propagates counter store errors
    pub async fn set_p_winner(&self, probability: f64, goal: Option<&str>) -> Result<()> {
        self.store
            .hash_set(&self.key, &p_winner_field(goal), probability.to_string())
            .await
    }

    /// Check whether this alternative is the experiment's control.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExperimentNotFound`] if the catalog has no such experiment
    pub async fn is_control(&self) -> Result<bool> {
        let experiment = self.experiment().await?;
        Ok(experiment.control().name() == self.name())
    }

    /// Get a handle for the experiment's control, sharing this store and catalog.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExperimentNotFound`] if the catalog has no such experiment
    pub async fn control(&self) -> Result<Self> {
        let experiment = self.experiment().await?;
        Ok(self.sibling(experiment.control().clone()))
    }

    /// Compare this alternative's conversion rate against the control's.
    ///
    /// [`ZScore::NotApplicable`] for the control itself, for conversion
    /// rates above 1.0 and for empty samples.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExperimentNotFound`] if the catalog has no such
    /// experiment; propagates counter store errors
    pub async fn z_score(&self, goal: Option<&str>) -> Result<ZScore> {
        let control = self.control().await?;
        if control.name() == self.name() {
            return Ok(ZScore::NotApplicable);
        }

        let rate_a = self.conversion_rate(goal).await?;
        let rate_c = control.conversion_rate(goal).await?;

        let n_a = self.participant_count().await?;
        let n_c = control.participant_count().await?;

        Ok(significance::z_score(
            rate_a,
            sample_size(n_a),
            rate_c,
            sample_size(n_c),
        ))
    }

    /// Take a snapshot of this alternative's figures for one goal.
    ///
    /// Assembled from independent reads; not a consistent point-in-time view.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExperimentNotFound`] if the catalog has no such
    /// experiment; propagates counter store errors
    pub async fn stats(&self, goal: Option<&str>) -> Result<VariantStats> {
        let z_score = self.z_score(goal).await?;
        Ok(VariantStats {
            experiment: self.experiment_name.clone(),
            alternative: self.name().to_string(),
            goal: goal.map(str::to_string),
            is_control: self.is_control().await?,
            participant_count: self.participant_count().await?,
            completed_count: self.completed_count(goal).await?,
            unfinished_count: self.unfinished_count().await?,
            conversion_rate: self.conversion_rate(goal).await?,
            p_winner: self.p_winner(goal).await?,
            z_score,
            confidence: z_score.confidence(),
            extra_info: self.extra_info().await?,
        })
    }

    // ========================================================================
    // Recorded info
    // ========================================================================

    /// Get the recorded auxiliary values.
    ///
    /// Absent, blank or malformed data reads as an empty map.
    ///
    /// # Errors
    ///
    /// Propagates counter store errors
    pub async fn extra_info(&self) -> Result<ExtraInfo> {
        let raw = self.store.hash_get(&self.key, RECORDED_INFO).await?;
        let Some(raw) = raw.filter(|data| data.len() > 1) else {
            return Ok(ExtraInfo::new());
        };

        match parse_extra_info(&raw) {
            Ok(info) => Ok(info),
            Err(err) => {
                warn!(key = %self.key, error = %err, "Ignoring unreadable recorded info");
                Ok(ExtraInfo::new())
            }
        }
    }

    /// Record an auxiliary value.
    ///
    /// Numbers are added to the existing numeric entry (missing counts as
    /// 0); any other value replaces the entry. The whole map is written back
    /// (last-writer-wins).
    ///
    /// # Errors
    ///
    /// Propagates counter store errors
    pub async fn record_extra_info(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        let mut info = self.extra_info().await?;

        let entry = match value.into() {
            Value::Number(delta) => {
                let current = match info.get(key) {
                    Some(Value::Number(current)) => Some(current),
                    _ => None,
                };
                Value::Number(add_numbers(current, &delta))
            }
            other => other,
        };
        info.insert(key.to_string(), entry);

        self.store
            .hash_set(&self.key, RECORDED_INFO, serde_json::to_string(&info)?)
            .await
    }

    /// Add 1 to an auxiliary counter.
    ///
    /// # Errors
    ///
    /// Propagates counter store errors
    pub async fn tally_extra_info(&self, key: &str) -> Result<()> {
        self.record_extra_info(key, 1).await
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Initialize the record without touching fields that already exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAlternative`] before any write if the name is
    /// invalid; propagates counter store errors
    pub async fn save(&self) -> Result<()> {
        self.validate()?;

        let p_winner = self.p_winner(None).await?;
        let fields = [
            (PARTICIPANT_COUNT, "0".to_string()),
            (COMPLETED_COUNT, "0".to_string()),
            (P_WINNER, p_winner.to_string()),
            (RECORDED_INFO, "{}".to_string()),
        ];
        for (field, value) in fields {
            self.store
                .hash_set_if_absent(&self.key, field, value)
                .await?;
        }

        info!(key = %self.key, "Variant saved");
        Ok(())
    }

    /// Zero every counter and clear recorded info. `p_winner` is kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExperimentNotFound`] before any write if the catalog
    /// has no such experiment; propagates counter store errors
    pub async fn reset(&self) -> Result<()> {
        let goals = self.goals().await?;

        self.store
            .hash_multi_set(
                &self.key,
                vec![
                    (PARTICIPANT_COUNT.to_string(), "0".to_string()),
                    (COMPLETED_COUNT.to_string(), "0".to_string()),
                    (RECORDED_INFO.to_string(), String::new()),
                ],
            )
            .await?;
        for goal in &goals {
            self.store
                .hash_set(&self.key, &completed_field(Some(goal)), "0".to_string())
                .await?;
        }

        info!(key = %self.key, goals = goals.len(), "Variant reset");
        Ok(())
    }

    /// Remove the record and all its fields.
    ///
    /// # Errors
    ///
    /// Propagates counter store errors
    pub async fn delete(&self) -> Result<()> {
        self.store.delete(&self.key).await?;
        info!(key = %self.key, "Variant deleted");
        Ok(())
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    /// Get the experiment's named goals.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExperimentNotFound`] if the catalog has no such experiment
    pub async fn goals(&self) -> Result<Vec<String>> {
        Ok(self.experiment().await?.goals().to_vec())
    }

    async fn experiment(&self) -> Result<ExperimentRecord> {
        self.catalog
            .find_experiment(&self.experiment_name)
            .await?
            .ok_or_else(|| Error::ExperimentNotFound(self.experiment_name.clone()))
    }

    fn sibling(&self, spec: NameSpec) -> Self {
        Self::new(
            spec,
            self.experiment_name.clone(),
            Arc::clone(&self.store),
            Arc::clone(&self.catalog),
        )
    }

    async fn read_count(&self, field: &str) -> Result<i64> {
        let raw = self.store.hash_get(&self.key, field).await?;
        Ok(raw
            .and_then(|value| value.trim().parse::<i64>().ok())
            .unwrap_or(0))
    }
}

impl<S, C> Clone for Variant<S, C> {
    fn clone(&self) -> Self {
        Self {
            spec: self.spec.clone(),
            experiment_name: self.experiment_name.clone(),
            key: self.key.clone(),
            store: Arc::clone(&self.store),
            catalog: Arc::clone(&self.catalog),
        }
    }
}

impl<S, C> fmt::Debug for Variant<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variant")
            .field("spec", &self.spec)
            .field("experiment_name", &self.experiment_name)
            .finish_non_exhaustive()
    }
}

impl<S: CounterStore, C: ExperimentCatalog> fmt::Display for Variant<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn completed_field(goal: Option<&str>) -> String {
    goal.map_or_else(
        || COMPLETED_COUNT.to_string(),
        |goal| format!("{COMPLETED_COUNT}:{goal}"),
    )
}

fn p_winner_field(goal: Option<&str>) -> String {
    goal.map_or_else(
        || P_WINNER.to_string(),
        |goal| format!("{P_WINNER}:{goal}"),
    )
}

/// Negative counts are treated as an empty sample.
fn sample_size(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

fn parse_extra_info(raw: &str) -> Result<ExtraInfo> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(info)) => Ok(info),
        Ok(other) => Err(Error::MalformedAuxiliaryData(format!(
            "expected a JSON object, found {other}"
        ))),
        Err(err) => Err(Error::MalformedAuxiliaryData(err.to_string())),
    }
}

fn add_numbers(current: Option<&Number>, delta: &Number) -> Number {
    let Some(current) = current else {
        return delta.clone();
    };
    if let (Some(a), Some(b)) = (current.as_i64(), delta.as_i64()) {
        if let Some(sum) = a.checked_add(b) {
            return Number::from(sum);
        }
    }
    match (current.as_f64(), delta.as_f64()) {
        (Some(a), Some(b)) => Number::from_f64(a + b).unwrap_or_else(|| delta.clone()),
        _ => delta.clone(),
    }
}
