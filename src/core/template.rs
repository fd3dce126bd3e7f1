use crate::config::AppConfig;
use crate::domain::model::{Channel, Company, OutreachContent};
use regex::Regex;
use std::collections::HashMap;
use thiserror::Error;

/// A placeholder with no company value, no identity value and no fallback.
/// Channel-local: the engine records the affected channel as failed and moves on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unresolved placeholder '{{{placeholder}}}'")]
pub struct TemplateError {
    pub placeholder: String,
}

/// Merges configured templates with identity and per-company fields.
///
/// Placeholder syntax is `{name}`. `{contact_name_or_team}` falls back to the
/// configured generic salutation when the roster has no contact name, and
/// `{intro_note}` renders as an empty segment when absent; any other
/// unresolved placeholder is an error.
pub struct ContentRenderer {
    base_vars: HashMap<String, String>,
    email_subject: String,
    email_body: String,
    form_message: String,
    salutation: String,
}

impl ContentRenderer {
    pub fn new(
        base_vars: HashMap<String, String>,
        email_subject: impl Into<String>,
        email_body: impl Into<String>,
        form_message: impl Into<String>,
        salutation: impl Into<String>,
    ) -> Self {
        Self {
            base_vars,
            email_subject: email_subject.into(),
            email_body: email_body.into(),
            form_message: form_message.into(),
            salutation: salutation.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let identity = &config.identity;
        let mut base_vars = HashMap::new();
        base_vars.insert("first_name".to_string(), identity.first_name.clone());
        base_vars.insert("last_name".to_string(), identity.last_name.clone());
        base_vars.insert("email".to_string(), identity.email.clone());
        base_vars.insert("phone".to_string(), identity.phone.clone());
        base_vars.insert(
            "city".to_string(),
            identity.city.clone().unwrap_or_default(),
        );
        base_vars.insert(
            "portfolio_url".to_string(),
            identity.portfolio_url.clone().unwrap_or_default(),
        );
        base_vars.insert(
            "linkedin_url".to_string(),
            identity.linkedin_url.clone().unwrap_or_default(),
        );

        Self::new(
            base_vars,
            &config.templates.email_subject,
            &config.templates.email_body,
            &config.templates.form_message,
            config.generic_salutation(),
        )
    }

    pub fn render(
        &self,
        channel: Channel,
        company: &Company,
    ) -> Result<OutreachContent, TemplateError> {
        let vars = self.vars_for(company);
        match channel {
            Channel::Email => Ok(OutreachContent {
                subject: Some(render_str(&self.email_subject, &vars)?),
                body: render_str(&self.email_body, &vars)?,
            }),
            Channel::Form => Ok(OutreachContent {
                subject: None,
                body: render_str(&self.form_message, &vars)?,
            }),
        }
    }

    fn vars_for(&self, company: &Company) -> HashMap<String, String> {
        let mut vars = self.base_vars.clone();
        vars.insert("company".to_string(), company.name.clone());

        let contact_name = company.contact_name.clone().unwrap_or_default();
        let contact_name_or_team = if contact_name.trim().is_empty() {
            self.salutation.clone()
        } else {
            contact_name.clone()
        };
        vars.insert("contact_name".to_string(), contact_name);
        vars.insert("contact_name_or_team".to_string(), contact_name_or_team);

        // Absent intro note is an empty segment, never an error.
        vars.insert(
            "intro_note".to_string(),
            company.intro_note.clone().unwrap_or_default(),
        );
        vars
    }
}

/// Substitute `{name}` placeholders from `vars`.
fn render_str(template: &str, vars: &HashMap<String, String>) -> Result<String, TemplateError> {
    let re = Regex::new(r"\{([A-Za-z0-9_]+)\}").unwrap();

    for caps in re.captures_iter(template) {
        if !vars.contains_key(&caps[1]) {
            return Err(TemplateError {
                placeholder: caps[1].to_string(),
            });
        }
    }

    let rendered = re.replace_all(template, |caps: &regex::Captures| vars[&caps[1]].clone());
    Ok(rendered.into_owned())
}
