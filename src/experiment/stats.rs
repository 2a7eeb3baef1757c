//! Variant Stats - serializable per-goal snapshot of one alternative

use serde::Serialize;

use super::variant::ExtraInfo;
use crate::significance::{Confidence, ZScore};

/// Figures for one alternative and one goal, as shown on a results page.
///
/// Produced by [`super::Variant::stats`]. The fields are read one at a time,
/// so under concurrent traffic they may not describe a single instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantStats {
    /// Experiment name
    pub experiment: String,
    /// Alternative name
    pub alternative: String,
    /// Goal, `None` for the default goal
    pub goal: Option<String>,
    /// Whether this alternative is the control
    pub is_control: bool,
    /// Participants
    pub participant_count: i64,
    /// Conversions on `goal`
    pub completed_count: i64,
    /// Participants without a conversion on any goal
    pub unfinished_count: i64,
    /// Conversions / participants on `goal`
    pub conversion_rate: f64,
    /// Stored probability of winning on `goal`
    pub p_winner: f64,
    /// Z statistic against the control (`"N/A"` when not applicable)
    pub z_score: ZScore,
    /// Confidence band of `z_score`
    pub confidence: Option<Confidence>,
    /// Recorded auxiliary values
    pub extra_info: ExtraInfo,
}

impl VariantStats {
    /// Check whether the alternative differs from the control at 95% or better.
    #[must_use]
    pub fn is_significant(&self) -> bool {
        self.confidence.is_some_and(|band| band.is_significant())
    }
}
