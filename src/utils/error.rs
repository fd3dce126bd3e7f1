use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApplyError {
    #[error("SMTP transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfig { field: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Audit log error: {message}")]
    AuditLog { message: String },
}

pub type Result<T> = std::result::Result<T, ApplyError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Validation,
    Network,
    Io,
}

impl ApplyError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ApplyError::Config { .. }
            | ApplyError::MissingConfig { .. }
            | ApplyError::InvalidConfigValue { .. } => ErrorCategory::Configuration,
            ApplyError::Validation { .. } => ErrorCategory::Validation,
            ApplyError::Smtp(_) | ApplyError::Http(_) | ApplyError::Address(_) => {
                ErrorCategory::Network
            }
            ApplyError::Csv(_) | ApplyError::Io(_) | ApplyError::AuditLog { .. } => {
                ErrorCategory::Io
            }
        }
    }

    /// Anything that escapes to `main` aborts the run; severity only decides
    /// the exit code.
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::Critical,
            ErrorCategory::Validation => ErrorSeverity::Medium,
            ErrorCategory::Network => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::High,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ApplyError::Config { message } => format!("Configuration problem: {message}"),
            ApplyError::MissingConfig { field } => {
                format!("Required configuration field '{field}' is missing")
            }
            ApplyError::InvalidConfigValue { field, reason, .. } => {
                format!("Configuration field '{field}' is invalid: {reason}")
            }
            ApplyError::Validation { message } => format!("Invalid input: {message}"),
            ApplyError::AuditLog { message } => {
                format!("The application log could not be written: {message}")
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check config.toml: SMTP credentials, template strings and attachment paths"
            }
            ErrorCategory::Validation => {
                "Check the roster CSV: header row plus company, contact_email, apply_url, contact_name, intro_note"
            }
            ErrorCategory::Network => {
                "Check network connectivity and SMTP account settings, then rerun; completed sends are not repeated"
            }
            ErrorCategory::Io => {
                "Check that the log path is writable; rerunning is safe once the log is intact"
            }
        }
    }
}
