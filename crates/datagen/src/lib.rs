//! Synthetic environmental test data.
//!
//! This crate provides:
//! - **Generator**: uniform sampling within the standard limits, with
//!   deterministic seeding
//! - **Labeling**: the additive training-label rule (distinct from the
//!   display rule in the `risk` crate)
//! - **Analysis**: dataset distribution and trend summaries
//!
//! # Usage
//!
//! ```ignore
//! use datagen::{GeneratorConfig, SyntheticDataGenerator};
//!
//! let mut generator = SyntheticDataGenerator::new(GeneratorConfig::default(), 42);
//! let (features, labels) = generator.generate_training(5000);
//! ```

pub mod analysis;
pub mod config;
pub mod generator;
pub mod labeling;

pub use analysis::{DatasetSummary, DurationStats, ScoreStats, summarize};
pub use config::{FAIL_THRESHOLD, GeneratorConfig};
pub use generator::SyntheticDataGenerator;
pub use labeling::{base_label_score, high_risk_count, label_score};
