use crate::domain::model::{Channel, Company, Mode};

/// Whether a requested channel can actually be attempted for a company.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applicability {
    Applicable,
    /// Requested by mode but the backing field (contact_email / apply_url)
    /// is empty. Accounted for in the log, never silently dropped.
    MissingField,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedChannel {
    pub channel: Channel,
    pub applicability: Applicability,
}

/// Map a company plus the requested mode to the ordered channel plan.
///
/// Every channel the mode requests appears in the plan exactly once, email
/// before form. Channels the mode does not request are absent entirely.
pub fn resolve_channels(mode: Mode, company: &Company) -> Vec<PlannedChannel> {
    let mut plan = Vec::with_capacity(2);

    if mode.wants(Channel::Email) {
        plan.push(PlannedChannel {
            channel: Channel::Email,
            applicability: if company.has_email() {
                Applicability::Applicable
            } else {
                Applicability::MissingField
            },
        });
    }

    if mode.wants(Channel::Form) {
        plan.push(PlannedChannel {
            channel: Channel::Form,
            applicability: if company.has_apply_url() {
                Applicability::Applicable
            } else {
                Applicability::MissingField
            },
        });
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company(email: Option<&str>, url: Option<&str>) -> Company {
        Company {
            name: "ACME".to_string(),
            contact_email: email.map(String::from),
            apply_url: url.map(String::from),
            contact_name: None,
            intro_note: None,
        }
    }

    #[test]
    fn both_mode_plans_email_before_form() {
        let plan = resolve_channels(
            Mode::Both,
            &company(Some("jobs@acme.com"), Some("https://acme.com/apply")),
        );
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].channel, Channel::Email);
        assert_eq!(plan[0].applicability, Applicability::Applicable);
        assert_eq!(plan[1].channel, Channel::Form);
        assert_eq!(plan[1].applicability, Applicability::Applicable);
    }

    #[test]
    fn missing_apply_url_is_planned_as_missing_field() {
        let plan = resolve_channels(Mode::Both, &company(Some("jobs@acme.com"), None));
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[1].channel, Channel::Form);
        assert_eq!(plan[1].applicability, Applicability::MissingField);
    }

    #[test]
    fn email_mode_never_plans_form() {
        let plan = resolve_channels(
            Mode::Email,
            &company(None, Some("https://betasoft.com/apply")),
        );
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].channel, Channel::Email);
        assert_eq!(plan[0].applicability, Applicability::MissingField);
    }

    #[test]
    fn form_mode_never_plans_email() {
        let plan = resolve_channels(
            Mode::Form,
            &company(Some("jobs@acme.com"), Some("https://acme.com/apply")),
        );
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].channel, Channel::Form);
    }

    #[test]
    fn blank_fields_count_as_missing() {
        let plan = resolve_channels(Mode::Both, &company(Some(""), Some("")));
        assert!(plan
            .iter()
            .all(|p| p.applicability == Applicability::MissingField));
    }
}
