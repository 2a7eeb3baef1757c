//! A/B Experiment Tracking
//!
//! Per-alternative participation and conversion counters, kept in a
//! [`crate::kv::CounterStore`], plus the catalog contract used to find an
//! experiment's goals and control.
//!
//! ## Schema Overview
//!
//! ```text
//! ExperimentRecord (catalog) ──< NameSpec (alternatives, control first)
//!        │
//!        └── goals: [String]
//!
//! Variant ──> CounterStore record "<experiment>:<alternative>"
//!               ├── participant_count
//!               ├── completed_count[:<goal>]
//!               ├── p_winner[:<goal>]
//!               └── recorded_info
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use trueno_ab::experiment::{MemoryCatalog, NameSpec, Variant};
//! use trueno_ab::kv::MemoryCounterStore;
//!
//! # async fn example() -> trueno_ab::Result<()> {
//! let store = Arc::new(MemoryCounterStore::new());
//! let catalog = Arc::new(MemoryCatalog::from_json_str(
//!     r#"{"experiments": {"link_color": {"alternatives": ["blue", "red"], "goals": ["buy"]}}}"#,
//! )?);
//!
//! let red = Variant::new(NameSpec::plain("red"), "link_color", store, catalog);
//! red.save().await?;
//! red.increment_participation().await?;
//! red.increment_completion(Some("buy")).await?;
//!
//! let z = red.z_score(Some("buy")).await?;
//! println!("red vs control: {z}");
//! # Ok(())
//! # }
//! ```

mod catalog;
mod name;
mod record;
mod stats;
mod variant;

pub use catalog::{CatalogConfig, ExperimentCatalog, ExperimentDefinition, MemoryCatalog};
pub use name::{NameSpec, DEFAULT_WEIGHT};
pub use record::{ExperimentRecord, ExperimentRecordBuilder};
pub use stats::VariantStats;
pub use variant::{ExtraInfo, Variant};
