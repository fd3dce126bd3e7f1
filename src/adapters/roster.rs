//! Roster source: the companies CSV.

use crate::domain::model::Company;
use crate::utils::error::{ApplyError, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(default)]
    company: String,
    #[serde(default)]
    contact_email: String,
    #[serde(default)]
    apply_url: String,
    #[serde(default)]
    contact_name: String,
    #[serde(default)]
    intro_note: String,
}

impl From<RosterRow> for Company {
    fn from(row: RosterRow) -> Self {
        Company {
            name: row.company.trim().to_string(),
            contact_email: clean(row.contact_email),
            apply_url: clean(row.apply_url),
            contact_name: clean(row.contact_name),
            intro_note: clean(row.intro_note),
        }
    }
}

fn clean(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Read and validate the roster. Rows failing validation are logged and
/// skipped here; they never reach the engine.
pub fn read_companies(path: &Path) -> Result<Vec<Company>> {
    if !path.is_file() {
        return Err(ApplyError::Config {
            message: format!(
                "roster file '{}' not found; expected a CSV with header company, contact_email, apply_url, contact_name, intro_note",
                path.display()
            ),
        });
    }

    let mut reader = csv::Reader::from_path(path)?;
    let mut companies = Vec::new();
    let mut rejected = 0usize;

    for row in reader.deserialize::<RosterRow>() {
        let company: Company = row?.into();
        match company.validate() {
            Ok(()) => companies.push(company),
            Err(e) => {
                rejected += 1;
                tracing::warn!("⚠️ Skipping roster row '{}': {}", company.name, e);
            }
        }
    }

    if rejected > 0 {
        tracing::warn!("{} roster row(s) rejected by validation", rejected);
    }
    tracing::info!("📋 Loaded {} companies from {}", companies.len(), path.display());
    Ok(companies)
}
