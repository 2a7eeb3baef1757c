//! Alternative names - plain or weighted

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::{Error, Result};

/// Default sampling weight of a plain alternative.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Name of an alternative, as written in an experiment definition.
///
/// Definitions accept either a bare string (`"blue"`) or a single-entry map
/// carrying a sampling weight (`{"blue": 2.5}`). The weight only matters to
/// upstream allocation; statistics ignore it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub enum NameSpec {
    /// Bare name with the default weight
    Plain(String),
    /// Name with an explicit weight
    Weighted {
        /// Alternative name
        name: String,
        /// Relative sampling weight
        weight: f64,
    },
}

impl NameSpec {
    /// Create a plain name. Not validated until [`NameSpec::validate`].
    #[must_use]
    pub fn plain(name: impl Into<String>) -> Self {
        Self::Plain(name.into())
    }

    /// Create a weighted name. Not validated until [`NameSpec::validate`].
    #[must_use]
    pub fn weighted(name: impl Into<String>, weight: f64) -> Self {
        Self::Weighted {
            name: name.into(),
            weight,
        }
    }

    /// Parse a raw definition value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAlternative`] unless `raw` is a non-empty
    /// string, or a map with exactly one entry whose value is a number or a
    /// string that parses as a finite number.
    pub fn from_value(raw: &Value) -> Result<Self> {
        let spec = match raw {
            Value::String(name) => Self::Plain(name.clone()),
            Value::Object(map) if map.len() == 1 => {
                let Some((name, weight)) = map.iter().next() else {
                    return Err(invalid(raw));
                };
                let weight = parse_weight(weight).ok_or_else(|| invalid(raw))?;
                Self::weighted(name.clone(), weight)
            }
            _ => return Err(invalid(raw)),
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Check the shape of the name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAlternative`] for an empty plain name or a
    /// non-finite weight.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Plain(name) if name.is_empty() => Err(Error::InvalidAlternative(
                "alternative name must not be empty".to_string(),
            )),
            Self::Weighted { name, weight } if !weight.is_finite() => Err(
                Error::InvalidAlternative(format!("{name}: weight {weight} is not a finite number")),
            ),
            _ => Ok(()),
        }
    }

    /// Get the alternative name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Plain(name) | Self::Weighted { name, .. } => name,
        }
    }

    /// Get the sampling weight.
    #[must_use]
    pub const fn weight(&self) -> f64 {
        match self {
            Self::Plain(_) => DEFAULT_WEIGHT,
            Self::Weighted { weight, .. } => *weight,
        }
    }
}

impl TryFrom<Value> for NameSpec {
    type Error = Error;

    fn try_from(raw: Value) -> Result<Self> {
        Self::from_value(&raw)
    }
}

impl Serialize for NameSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Plain(name) => serializer.serialize_str(name),
            Self::Weighted { name, weight } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(name, weight)?;
                map.end()
            }
        }
    }
}

/// Numeric strings follow Rust float syntax: `"3."` and `"1e3"` parse,
/// while digit separators (`"1_000"`) and hex (`"0x1A"`) are rejected.
fn parse_weight(raw: &Value) -> Option<f64> {
    let weight = match raw {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    weight.is_finite().then_some(weight)
}

fn invalid(raw: &Value) -> Error {
    Error::InvalidAlternative(format!("unsupported definition {raw}"))
}
