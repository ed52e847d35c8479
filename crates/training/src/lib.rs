//! Training pipeline, model selection and hyperparameter search.
//!
//! - [`ModelTrainer`]: generate data, train every model type, keep the best
//!   by held-out F1, evaluate, report and persist
//! - [`hyperparameter_tuning`]: cross-validated grid search for one type
//!
//! # Usage
//!
//! ```ignore
//! use training::{ModelTrainer, TrainerConfig};
//!
//! let mut trainer = ModelTrainer::new(TrainerConfig::default());
//! let outcome = trainer.full_training_pipeline(5000)?;
//! println!("{}", outcome.report);
//! ```

pub mod config;
pub mod error;
pub mod report;
pub mod trainer;
pub mod tuning;

pub use config::{DEFAULT_MODEL_PATH, DEFAULT_REPORT_PATH, DEFAULT_SAMPLES, TrainerConfig};
pub use error::{TrainingError, TrainingResult};
pub use report::TrainingReport;
pub use trainer::{ModelEvaluation, ModelTrainer, TrainingOutcome, select_best};
pub use tuning::{CandidateScore, ParamGrid, TuningOutcome, hyperparameter_tuning, tune_with_grid};
