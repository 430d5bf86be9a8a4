#[derive(Debug, thiserror::Error)]
pub enum RiskError {
    #[error("classifier model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("{field} = {value} is outside the declared domain {domain}")]
    OutOfDomain {
        field: &'static str,
        value: String,
        domain: &'static str,
    },
    #[error("unrecognised {field} selection: {value:?}")]
    InvalidCategory { field: &'static str, value: String },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("classifier returned a label absent from the severity table: {0:?}")]
    UnknownClass(String),
    #[error("classifier violated its output contract: {0}")]
    ClassifierContract(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RiskError {
    /// Returns `true` for errors a caller can recover from by resubmitting corrected input.
    ///
    /// Startup conditions (`ModelUnavailable`, `InvalidConfig`) and classifier consistency
    /// failures are not request errors.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            RiskError::OutOfDomain { .. }
                | RiskError::InvalidCategory { .. }
                | RiskError::InvalidInput(_)
        )
    }

    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            RiskError::ModelUnavailable(_) => "ModelUnavailable",
            RiskError::OutOfDomain { .. } => "OutOfDomain",
            RiskError::InvalidCategory { .. } => "InvalidCategory",
            RiskError::InvalidInput(_) => "InvalidInput",
            RiskError::UnknownClass(_) => "UnknownClass",
            RiskError::ClassifierContract(_) => "ClassifierContract",
            RiskError::InvalidConfig(_) => "InvalidConfig",
        }
    }
}

pub type RiskResult<T> = std::result::Result<T, RiskError>;
