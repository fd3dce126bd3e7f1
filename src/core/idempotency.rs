use crate::domain::model::{ApplicationAttempt, AttemptStatus, Channel};
use std::collections::HashSet;

/// Tracks which `(company, channel)` pairs already have a Succeeded record.
///
/// Built from the audit log at startup and kept current as the run appends,
/// so a rerun with unchanged input never repeats a real send.
#[derive(Debug, Default)]
pub struct IdempotencyGuard {
    succeeded: HashSet<(String, Channel)>,
}

impl IdempotencyGuard {
    pub fn from_history(history: &[ApplicationAttempt]) -> Self {
        let succeeded = history
            .iter()
            .filter(|a| a.status == AttemptStatus::Succeeded)
            .map(|a| (a.company.clone(), a.channel))
            .collect();
        Self { succeeded }
    }

    pub fn already_succeeded(&self, company: &str, channel: Channel) -> bool {
        self.succeeded.contains(&(company.to_string(), channel))
    }

    pub fn mark_succeeded(&mut self, company: &str, channel: Channel) {
        self.succeeded.insert((company.to_string(), channel));
    }
}
