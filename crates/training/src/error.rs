//! Training pipeline errors.

use models::ModelError;

/// Errors from the training pipeline and hyperparameter search.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    /// Fitting, evaluation or persistence of a classifier failed.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Writing the training report failed.
    #[error("Report I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A pipeline was asked to train on no data.
    #[error("Cannot train on {0} samples")]
    NoSamples(usize),

    /// Model selection ran with no trained candidates.
    #[error("No candidate models to select from")]
    NoCandidates,

    /// Grid yielded no fittable candidate.
    #[error("Parameter grid for {0} has no valid candidates")]
    EmptyGrid(types::ModelType),
}

/// Result alias for this crate.
pub type TrainingResult<T> = Result<T, TrainingError>;
