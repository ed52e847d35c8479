//! Error type for classifier training, inference and persistence.

use std::path::PathBuf;

use types::ParseModelTypeError;

/// Classifier error.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Unknown model type tag.
    #[error(transparent)]
    InvalidModelType(#[from] ParseModelTypeError),

    /// Predict, importance or save called before train/load.
    #[error("Model is not trained")]
    NotTrained,

    /// Load from a path that does not exist.
    #[error("Model file not found: {}", .0.display())]
    ModelFileNotFound(PathBuf),

    /// Training labels contain fewer than two classes.
    #[error("Training labels contain {classes} class(es); need PASS and FAIL")]
    DegenerateLabelSet { classes: usize },

    /// Too few rows to split or fold, or mismatched lengths.
    #[error("Insufficient samples: {0}")]
    InsufficientSamples(String),

    /// A feature value is NaN or infinite.
    #[error("Feature '{feature}' is not a finite number: {value}")]
    NonFiniteFeature { feature: &'static str, value: f64 },

    /// Hyperparameter combination the learner cannot fit.
    #[error("Invalid hyperparameters: {0}")]
    InvalidHyperparameters(String),

    /// Bundle parsed but is internally inconsistent, or could not be parsed.
    #[error("Corrupt model file {}: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result alias for this crate.
pub type ModelResult<T> = Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(ModelError::NotTrained.to_string(), "Model is not trained");
        let err = ModelError::DegenerateLabelSet { classes: 1 };
        assert!(err.to_string().contains("1 class"));
        let err = ModelError::ModelFileNotFound(PathBuf::from("models/risk.json"));
        assert_eq!(err.to_string(), "Model file not found: models/risk.json");
        let err = ModelError::NonFiniteFeature {
            feature: "temperature",
            value: f64::NAN,
        };
        assert_eq!(err.to_string(), "Feature 'temperature' is not a finite number: NaN");
    }

    #[test]
    fn test_from_parse_error() {
        let err: ModelError = "svm".parse::<types::ModelType>().unwrap_err().into();
        assert!(matches!(err, ModelError::InvalidModelType(_)));
    }
}
