use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Malformed gradebook document at {path}: {reason}")]
    Structural { path: String, reason: String },

    #[error("Invalid due date '{value}': {reason}")]
    DateParse { value: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Portal returned {status}: {message}")]
    PortalError { status: u16, message: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Email delivery failed: {message}")]
    EmailError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Document,
    Network,
    Storage,
    Configuration,
    Notification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ReportError {
    pub fn structural(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Structural {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn date_parse(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DateParse {
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Structural { .. } | Self::DateParse { .. } | Self::SerializationError(_) => {
                ErrorCategory::Document
            }
            Self::ApiError(_) | Self::PortalError { .. } => ErrorCategory::Network,
            Self::IoError(_) => ErrorCategory::Storage,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::EmailError { .. } => ErrorCategory::Notification,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Notification => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Document => ErrorSeverity::High,
            ErrorCategory::Storage | ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::Structural { .. } => {
                "The portal returned an unexpected gradebook shape; inspect the document with --document"
            }
            Self::DateParse { .. } => {
                "A due date is not in MM/DD/YYYY form; run the full report instead of the windowed one"
            }
            Self::IoError(_) => "Check that the output directory exists and is writable",
            Self::ApiError(_) => "Check network connectivity and the portal endpoint",
            Self::PortalError { status, .. } if *status == 401 || *status == 403 => {
                "Check the username and password in the credentials file"
            }
            Self::PortalError { .. } => "The portal rejected the request; try again later",
            Self::SerializationError(_) => "The document or credentials file is not valid JSON",
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => "Fix the configuration file and re-run",
            Self::EmailError { .. } => "Check the email endpoint and API key; reports were still written",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Document => format!("Could not read the gradebook: {}", self),
            ErrorCategory::Network => format!("Could not reach the grade portal: {}", self),
            ErrorCategory::Storage => format!("Could not write the report: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Notification => format!("Could not send the report email: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
