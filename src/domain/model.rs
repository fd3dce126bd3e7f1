use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One target organization from the roster.
///
/// Invariant: at least one of `contact_email` / `apply_url` is present.
/// Rows violating it are rejected by [`Company::validate`] before processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    pub name: String,
    pub contact_email: Option<String>,
    pub apply_url: Option<String>,
    pub contact_name: Option<String>,
    pub intro_note: Option<String>,
}

impl Company {
    pub fn has_email(&self) -> bool {
        self.contact_email.as_deref().is_some_and(|s| !s.is_empty())
    }

    pub fn has_apply_url(&self) -> bool {
        self.apply_url.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Check the required-field invariant. Pure; the caller decides whether
    /// to log and skip.
    pub fn validate(&self) -> crate::utils::error::Result<()> {
        if self.name.is_empty() {
            return Err(crate::utils::error::ApplyError::Validation {
                message: "missing company name".to_string(),
            });
        }
        if !self.has_email() && !self.has_apply_url() {
            return Err(crate::utils::error::ApplyError::Validation {
                message: "missing contact_email and apply_url".to_string(),
            });
        }
        Ok(())
    }
}

/// Outreach mechanism for a company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Form,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Email => write!(f, "email"),
            Channel::Form => write!(f, "form"),
        }
    }
}

/// Which channels a run is asked to exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Email,
    Form,
    Both,
}

impl Mode {
    pub fn wants(&self, channel: Channel) -> bool {
        match self {
            Mode::Both => true,
            Mode::Email => channel == Channel::Email,
            Mode::Form => channel == Channel::Form,
        }
    }
}

/// Terminal outcome of one channel attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    Succeeded,
    Failed,
    Skipped,
    DryRun,
}

impl fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptStatus::Succeeded => write!(f, "succeeded"),
            AttemptStatus::Failed => write!(f, "failed"),
            AttemptStatus::Skipped => write!(f, "skipped"),
            AttemptStatus::DryRun => write!(f, "dry_run"),
        }
    }
}

/// One audit log record. Immutable once created; the log only grows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationAttempt {
    pub timestamp: DateTime<Utc>,
    pub company: String,
    pub channel: Channel,
    pub status: AttemptStatus,
    pub detail: String,
}

impl ApplicationAttempt {
    pub fn new(
        company: impl Into<String>,
        channel: Channel,
        status: AttemptStatus,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            company: company.into(),
            channel,
            status,
            detail: detail.into(),
        }
    }
}

/// Fully rendered content handed to an adapter. The subject is only set for
/// channels that carry one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutreachContent {
    pub subject: Option<String>,
    pub body: String,
}

/// Successful adapter outcome with a human-readable detail for the log.
#[derive(Debug, Clone, Default)]
pub struct Delivery {
    pub detail: String,
}

impl Delivery {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Adapter failure, classified by the adapter itself. The engine only ever
/// branches on the variant, never on the cause.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("{0}")]
    Retryable(String),
    #[error("{0}")]
    Fatal(String),
}
