//! # Trueno-AB: Concurrent A/B Experiment Statistics
//!
//! **Version**: 0.1.0
//!
//! Trueno-AB tracks participation and conversions for every alternative of
//! an A/B experiment and tells you whether an alternative beats the control.
//!
//! ## Design Principles (Toyota Way Aligned)
//!
//! - **Jidoka**: Counters use the store's atomic increment, never read-modify-write
//! - **Poka-Yoke safety**: `save` is set-if-absent, so a late initializer cannot wipe live data
//! - **Genchi Genbutsu**: Invalid comparisons surface as `N/A`, not as `NaN`
//! - **Respect for People**: No globals; the store and catalog are injected
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use trueno_ab::experiment::{MemoryCatalog, NameSpec, Variant};
//! use trueno_ab::kv::MemoryCounterStore;
//!
//! # async fn example() -> trueno_ab::Result<()> {
//! let store = Arc::new(MemoryCounterStore::new());
//! let catalog = Arc::new(MemoryCatalog::from_json_file("experiments.json")?);
//!
//! let red = Variant::new(NameSpec::plain("red"), "link_color", store, catalog);
//! red.save().await?;
//! red.increment_participation().await?;
//!
//! let stats = red.stats(None).await?;
//! println!("{}: {} ({:?})", stats.alternative, stats.z_score, stats.confidence);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod error;
pub mod experiment;
pub mod kv;
pub mod logging;
pub mod significance;

pub use error::{Error, Result};
