use crate::core::engine::{InapplicablePolicy, RetryPolicy};
use crate::domain::model::{Channel, Mode};
use crate::utils::error::{ApplyError, Result};
use crate::utils::validation::{
    validate_file_exists, validate_non_empty_string, validate_positive_number, validate_range,
    validate_url, Validate,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_LOG_CSV: &str = "./logs/applications_log.csv";
pub const DEFAULT_SALUTATION: &str = "the hiring team";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub identity: IdentityConfig,
    pub files: FilesConfig,
    pub smtp: Option<SmtpConfig>,
    #[serde(default)]
    pub templates: TemplatesConfig,
    pub form: Option<FormConfig>,
    pub retry: Option<RetryConfig>,
    pub logging: Option<LoggingConfig>,
    pub policy: Option<PolicyConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub city: Option<String>,
    pub portfolio_url: Option<String>,
    pub linkedin_url: Option<String>,
}

impl IdentityConfig {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    pub cv_path: String,
    pub cover_letter_path: Option<String>,
    pub flyer_path: Option<String>,
}

impl FilesConfig {
    /// Configured attachments as (slot, path), CV first.
    pub fn attachment_paths(&self) -> Vec<(&'static str, &str)> {
        let mut paths = vec![("cv", self.cv_path.as_str())];
        if let Some(p) = self.cover_letter_path.as_deref() {
            paths.push(("cover_letter", p));
        }
        if let Some(p) = self.flyer_path.as_deref() {
            paths.push(("flyer", p));
        }
        paths
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    pub username: String,
    pub app_password: String,
    pub from_name: Option<String>,
}

fn default_smtp_port() -> u16 {
    465
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    pub email_subject: String,
    pub email_body: String,
    pub form_message: String,
    pub generic_salutation: String,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            email_subject: String::new(),
            email_body: String::new(),
            form_message: String::new(),
            generic_salutation: DEFAULT_SALUTATION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormConfig {
    /// Logical slot -> form input name, opaque policy data for the form
    /// adapter. Unmapped slots use the slot name itself.
    #[serde(default)]
    pub selectors: HashMap<String, String>,
    pub timeout_seconds: Option<u64>,
    pub success_markers: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: Option<u32>,
    pub backoff_seconds: Option<f64>,
    pub exponential: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    pub output_csv: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicyConfig {
    pub on_inapplicable: Option<InapplicablePolicy>,
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| ApplyError::Config {
            message: format!(
                "cannot read config file '{}': {}",
                path.as_ref().display(),
                e
            ),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content);
        toml::from_str(&processed).map_err(|e| ApplyError::Config {
            message: format!("TOML parsing error: {}", e),
        })
    }

    pub fn smtp(&self) -> Result<&SmtpConfig> {
        self.smtp.as_ref().ok_or(ApplyError::MissingConfig {
            field: "smtp".to_string(),
        })
    }

    pub fn log_path(&self) -> PathBuf {
        self.logging
            .as_ref()
            .and_then(|l| l.output_csv.as_deref())
            .unwrap_or(DEFAULT_LOG_CSV)
            .into()
    }

    pub fn generic_salutation(&self) -> &str {
        &self.templates.generic_salutation
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let retry = self.retry.clone().unwrap_or_default();
        let defaults = RetryPolicy::default();
        RetryPolicy {
            max_attempts: retry.max_attempts.unwrap_or(defaults.max_attempts),
            backoff: retry
                .backoff_seconds
                .map(|s| Duration::from_secs_f64(s.max(0.0)))
                .unwrap_or(defaults.backoff),
            exponential: retry.exponential.unwrap_or(defaults.exponential),
        }
    }

    pub fn on_inapplicable(&self) -> InapplicablePolicy {
        self.policy
            .as_ref()
            .and_then(|p| p.on_inapplicable)
            .unwrap_or_default()
    }

    pub fn form_timeout(&self) -> Duration {
        let secs = self
            .form
            .as_ref()
            .and_then(|f| f.timeout_seconds)
            .unwrap_or(20);
        Duration::from_secs(secs)
    }

    pub fn form_field_name<'a>(&'a self, slot: &'a str) -> &'a str {
        self.form
            .as_ref()
            .and_then(|f| f.selectors.get(slot))
            .map(String::as_str)
            .unwrap_or(slot)
    }

    pub fn form_success_markers(&self) -> Vec<String> {
        self.form
            .as_ref()
            .and_then(|f| f.success_markers.clone())
            .unwrap_or_else(|| {
                ["thank you", "merci", "received", "bien reçu", "submitted"]
                    .into_iter()
                    .map(String::from)
                    .collect()
            })
    }

    /// Startup validation. Channel-specific sections are only required when
    /// the requested mode can reach that channel.
    pub fn validate_for(&self, mode: Mode) -> Result<()> {
        self.identity.validate()?;
        self.files.validate()?;
        if let Some(retry) = &self.retry {
            retry.validate()?;
        }

        if mode.wants(Channel::Email) {
            let smtp = self.smtp()?;
            smtp.validate()?;
            validate_non_empty_string("templates.email_subject", &self.templates.email_subject)?;
            validate_non_empty_string("templates.email_body", &self.templates.email_body)?;
        }

        if mode.wants(Channel::Form) {
            validate_non_empty_string("templates.form_message", &self.templates.form_message)?;
        }

        Ok(())
    }
}

impl Validate for IdentityConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("identity.first_name", &self.first_name)?;
        validate_non_empty_string("identity.last_name", &self.last_name)?;
        validate_non_empty_string("identity.email", &self.email)?;
        validate_non_empty_string("identity.phone", &self.phone)?;
        if let Some(url) = self.portfolio_url.as_deref() {
            validate_url("identity.portfolio_url", url)?;
        }
        if let Some(url) = self.linkedin_url.as_deref() {
            validate_url("identity.linkedin_url", url)?;
        }
        Ok(())
    }
}

impl Validate for FilesConfig {
    fn validate(&self) -> Result<()> {
        validate_file_exists("files.cv_path", &self.cv_path)?;
        if let Some(path) = self.cover_letter_path.as_deref() {
            validate_file_exists("files.cover_letter_path", path)?;
        }
        if let Some(path) = self.flyer_path.as_deref() {
            validate_file_exists("files.flyer_path", path)?;
        }
        Ok(())
    }
}

impl Validate for SmtpConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("smtp.host", &self.host)?;
        validate_range("smtp.port", self.port, 1, 65535)?;
        validate_non_empty_string("smtp.username", &self.username)?;
        validate_non_empty_string("smtp.app_password", &self.app_password)?;
        Ok(())
    }
}

impl Validate for RetryConfig {
    fn validate(&self) -> Result<()> {
        if let Some(max_attempts) = self.max_attempts {
            validate_positive_number("retry.max_attempts", max_attempts, 1)?;
        }
        if let Some(backoff) = self.backoff_seconds {
            if !backoff.is_finite() || backoff < 0.0 {
                return Err(ApplyError::InvalidConfigValue {
                    field: "retry.backoff_seconds".to_string(),
                    value: backoff.to_string(),
                    reason: "Backoff must be a non-negative number of seconds".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Replace `${VAR_NAME}` with the environment value, leaving unknown
/// variables in place.
fn substitute_env_vars(content: &str) -> String {
    let re = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();
    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    })
    .to_string()
}
