use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Geocoder responded with HTTP {status}: {body}")]
    GeocodeStatusError { status: u16, body: String },

    #[error("Malformed geocoder response: {message}")]
    MalformedResponseError { message: String },

    #[error("Geocoding timed out after {elapsed:?}")]
    TimeoutError { elapsed: Duration },

    #[error("Batch aborted after geocoding '{address}' failed: {source}")]
    BatchAborted {
        address: String,
        #[source]
        source: Box<EtlError>,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Network,
    Data,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            EtlError::CsvError(_) | EtlError::IoError(_) => ErrorCategory::Input,
            EtlError::ApiError(_)
            | EtlError::GeocodeStatusError { .. }
            | EtlError::TimeoutError { .. } => ErrorCategory::Network,
            EtlError::MalformedResponseError { .. } | EtlError::SerializationError(_) => {
                ErrorCategory::Data
            }
            EtlError::BatchAborted { source, .. } => source.category(),
            EtlError::ProcessingError { .. } => ErrorCategory::Internal,
        }
    }

    /// Drives the process exit code of the binary.
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Network | ErrorCategory::Data => ErrorSeverity::Medium,
            ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::MissingConfigError { field } => {
                format!("The setting '{}' is required but was not provided", field)
            }
            EtlError::InvalidConfigValueError { field, reason, .. } => {
                format!("The setting '{}' is invalid: {}", field, reason)
            }
            EtlError::CsvError(e) => format!("The input file is not valid CSV: {}", e),
            EtlError::IoError(e) => format!("The input file could not be read: {}", e),
            EtlError::BatchAborted { address, source } => format!(
                "Geocoding stopped because '{}' could not be resolved: {}",
                address, source
            ),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check PELIAS_HOST_NAME / PELIAS_API_KEY (or .env) and the command line flags"
            }
            ErrorCategory::Input => "Make sure the file exists and is a CSV with a header row",
            ErrorCategory::Network => {
                "Check connectivity to the geocoder, or lower --rate-limit / --concurrent-requests"
            }
            ErrorCategory::Data => "The geocoder returned an unexpected payload; verify the host",
            ErrorCategory::Internal => "Re-run with --verbose and report the log output",
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
