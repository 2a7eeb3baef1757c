//! Two-proportion z-test for comparing conversion rates.
//!
//! ## Formula
//!
//! ```text
//! pooled = (p_a * n_a + p_c * n_c) / (n_a + n_c)
//! se     = sqrt(pooled * (1 - pooled) * (1/n_a + 1/n_c))
//! z      = (p_a - p_c) / se
//! ```
//!
//! `A` is the candidate alternative, `C` the control. A positive z means the
//! candidate converts better than the control.
//!
//! ## Domain
//!
//! The statistic is undefined for conversion rates above 1.0, for empty
//! samples, and when the pooled standard error is zero (both arms at 0% or
//! both at 100%). All of these yield [`ZScore::NotApplicable`] instead of a
//! `NaN` or an infinity, so callers never have to test floats for finiteness.
//!
//! ## Example
//!
//! ```rust
//! use trueno_ab::significance::{z_score, Confidence};
//!
//! let z = z_score(0.10, 1000, 0.08, 1000);
//! assert!(z.value().unwrap() > 1.5);
//! assert_eq!(z.confidence(), Some(Confidence::Insufficient));
//! ```

use serde::{Serialize, Serializer};
use std::fmt;

/// Marker rendered for comparisons that have no z-score.
pub const NOT_APPLICABLE: &str = "N/A";

/// Outcome of a significance calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZScore {
    /// Finite z statistic
    Score(f64),
    /// Comparison is meaningless (self-comparison, invalid rate, empty sample)
    NotApplicable,
}

impl ZScore {
    /// Get the statistic, if there is one.
    #[must_use]
    pub const fn value(&self) -> Option<f64> {
        match self {
            Self::Score(z) => Some(*z),
            Self::NotApplicable => None,
        }
    }

    /// Check whether a statistic was computed.
    #[must_use]
    pub const fn is_applicable(&self) -> bool {
        matches!(self, Self::Score(_))
    }

    /// Confidence band for this score, `None` when not applicable.
    #[must_use]
    pub fn confidence(&self) -> Option<Confidence> {
        self.value().map(Confidence::from_z)
    }
}

impl fmt::Display for ZScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Score(z) => write!(f, "{z}"),
            Self::NotApplicable => f.write_str(NOT_APPLICABLE),
        }
    }
}

impl Serialize for ZScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Score(z) => serializer.serialize_f64(*z),
            Self::NotApplicable => serializer.serialize_str(NOT_APPLICABLE),
        }
    }
}

/// Two-sided confidence band for a z statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// |z| < 1.65
    Insufficient,
    /// |z| >= 1.65
    Ninety,
    /// |z| >= 1.96
    NinetyFive,
    /// |z| >= 2.58
    NinetyNine,
}

impl Confidence {
    /// Band a z statistic. `|z|` is rounded to three decimals first.
    #[must_use]
    pub fn from_z(z: f64) -> Self {
        let z = (z.abs() * 1000.0).round() / 1000.0;
        if z >= 2.58 {
            Self::NinetyNine
        } else if z >= 1.96 {
            Self::NinetyFive
        } else if z >= 1.65 {
            Self::Ninety
        } else {
            Self::Insufficient
        }
    }

    /// Check whether the band is at least 95%.
    #[must_use]
    pub const fn is_significant(&self) -> bool {
        matches!(self, Self::NinetyFive | Self::NinetyNine)
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Insufficient => "Insufficient confidence",
            Self::Ninety => "90% confidence",
            Self::NinetyFive => "95% confidence",
            Self::NinetyNine => "99% confidence",
        };
        f.write_str(label)
    }
}

/// Compute the pooled two-proportion z statistic.
///
/// # Arguments
///
/// * `rate_a` - Candidate conversion rate
/// * `n_a` - Candidate participants
/// * `rate_c` - Control conversion rate
/// * `n_c` - Control participants
///
/// # Returns
///
/// [`ZScore::NotApplicable`] when a rate exceeds 1.0 (or is `NaN`), when a
/// sample is empty, or when the standard error is zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn z_score(rate_a: f64, n_a: u64, rate_c: f64, n_c: u64) -> ZScore {
    if is_invalid_rate(rate_a) || is_invalid_rate(rate_c) {
        return ZScore::NotApplicable;
    }
    if n_a == 0 || n_c == 0 {
        return ZScore::NotApplicable;
    }

    let n_a = n_a as f64;
    let n_c = n_c as f64;

    let pooled = rate_a.mul_add(n_a, rate_c * n_c) / (n_a + n_c);
    let se = (pooled * (1.0 - pooled) * (1.0 / n_a + 1.0 / n_c)).sqrt();

    let z = (rate_a - rate_c) / se;
    if z.is_finite() {
        ZScore::Score(z)
    } else {
        ZScore::NotApplicable
    }
}

fn is_invalid_rate(rate: f64) -> bool {
    rate.is_nan() || rate > 1.0
}
