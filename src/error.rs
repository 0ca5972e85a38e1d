use thiserror::Error;

/// Failures raised by the scoring core (aggregation, labelling, tree, binning).
///
/// Every variant is returned synchronously; no operation returns partial
/// results alongside an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimatorError {
    /// Empty record set, zero columns, ragged rows, length mismatches, or a bad
    /// configuration value.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// `predict` was called on a classifier that has never been fitted.
    #[error("risk model has not been fitted; call fit before predict")]
    ModelNotFitted,

    /// Fitted bin edges were requested before `fit_bins` ran.
    #[error("bin edges have not been fitted; call fit_bins before apply_bins")]
    BinsNotFitted,
}

impl EstimatorError {
    pub fn invalid(message: impl Into<String>) -> Self {
        EstimatorError::InvalidInput(message.into())
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<EstimatorError> for AppError {
    fn from(err: EstimatorError) -> Self {
        let exit_code = match err {
            EstimatorError::InvalidInput(_) => 2,
            EstimatorError::ModelNotFitted | EstimatorError::BinsNotFitted => 3,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
