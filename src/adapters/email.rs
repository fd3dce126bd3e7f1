//! Email channel: outbound SMTP via lettre, with the startup-loaded
//! attachment set appended to every message.

use crate::adapters::attachments::AttachmentSet;
use crate::config::{IdentityConfig, SmtpConfig};
use crate::domain::model::{AdapterError, Channel, Company, Delivery, OutreachContent};
use crate::domain::ports::ChannelAdapter;
use crate::utils::error::Result;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::sync::Arc;

pub struct SmtpMailer {
    transport: SmtpTransport,
    from: Mailbox,
    attachments: Arc<AttachmentSet>,
}

impl SmtpMailer {
    pub fn new(
        smtp: &SmtpConfig,
        identity: &IdentityConfig,
        attachments: Arc<AttachmentSet>,
    ) -> Result<Self> {
        let from_name = smtp
            .from_name
            .clone()
            .unwrap_or_else(|| identity.full_name());
        let from: Mailbox = format!("{} <{}>", from_name, smtp.username).parse()?;

        let transport = SmtpTransport::relay(&smtp.host)?
            .port(smtp.port)
            .credentials(Credentials::new(
                smtp.username.clone(),
                smtp.app_password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from,
            attachments,
        })
    }

    fn build_message(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> std::result::Result<Message, AdapterError> {
        let to: Mailbox = recipient
            .parse()
            .map_err(|e| AdapterError::Fatal(format!("invalid recipient address: {e}")))?;

        let text = SinglePart::builder()
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string());
        let mut parts = MultiPart::mixed().singlepart(text);
        for file in &self.attachments.files {
            let content_type = ContentType::parse(file.content_type)
                .map_err(|e| AdapterError::Fatal(format!("attachment content type: {e}")))?;
            parts = parts.singlepart(
                Attachment::new(file.filename.clone()).body(file.bytes.clone(), content_type),
            );
        }

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .multipart(parts)
            .map_err(|e| AdapterError::Fatal(format!("failed to build email: {e}")))
    }
}

#[async_trait]
impl ChannelAdapter for SmtpMailer {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    async fn deliver(
        &self,
        company: &Company,
        content: &OutreachContent,
    ) -> std::result::Result<Delivery, AdapterError> {
        let recipient = company
            .contact_email
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AdapterError::Fatal("no contact email on record".to_string()))?;

        let subject = content.subject.as_deref().unwrap_or_default();
        let message = self.build_message(recipient, subject, &content.body)?;

        match self.transport.send(&message) {
            Ok(_) => Ok(Delivery::new(format!("to {recipient}"))),
            // Permanent SMTP rejections (auth, policy) are not worth retrying.
            Err(e) if e.is_permanent() => Err(AdapterError::Fatal(format!("smtp: {e}"))),
            Err(e) => Err(AdapterError::Retryable(format!("smtp: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::attachments::AttachmentFile;

    fn smtp_config() -> SmtpConfig {
        SmtpConfig {
            host: "smtp.test.com".to_string(),
            port: 465,
            username: "jane@doe.dev".to_string(),
            app_password: "secret".to_string(),
            from_name: None,
        }
    }

    fn identity() -> IdentityConfig {
        IdentityConfig {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "jane@doe.dev".to_string(),
            phone: "+33 6 00 00 00 00".to_string(),
            city: None,
            portfolio_url: None,
            linkedin_url: None,
        }
    }

    fn attachments() -> Arc<AttachmentSet> {
        Arc::new(AttachmentSet {
            files: vec![AttachmentFile {
                slot: "cv",
                filename: "CV.pdf".to_string(),
                content_type: "application/pdf",
                bytes: b"pdf bytes".to_vec(),
            }],
        })
    }

    #[test]
    fn mailer_uses_identity_as_default_from_name() {
        let mailer = SmtpMailer::new(&smtp_config(), &identity(), attachments()).unwrap();
        assert_eq!(mailer.channel(), Channel::Email);
        assert_eq!(mailer.from.to_string(), "Jane Doe <jane@doe.dev>");
    }

    #[test]
    fn message_carries_body_and_attachment() {
        let mailer = SmtpMailer::new(&smtp_config(), &identity(), attachments()).unwrap();
        let message = mailer
            .build_message("jobs@acme.com", "Application — ACME", "Hello the hiring team,")
            .unwrap();

        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(formatted.contains("Subject: =?utf-8?") || formatted.contains("Subject: Application"));
        assert!(formatted.contains("CV.pdf"));
        assert!(formatted.contains("Hello the hiring team,"));
    }

    #[test]
    fn invalid_recipient_is_fatal() {
        let mailer = SmtpMailer::new(&smtp_config(), &identity(), attachments()).unwrap();
        let err = mailer
            .build_message("not-an-address", "s", "b")
            .unwrap_err();
        assert!(matches!(err, AdapterError::Fatal(_)));
    }
}
