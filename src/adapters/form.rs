//! Form channel: submits application forms as multipart POST requests.
//!
//! Site-specific knowledge (field names, success markers, timeout) is plain
//! configuration data; nothing here branches on site identity.

use crate::adapters::attachments::AttachmentSet;
use crate::config::AppConfig;
use crate::domain::model::{AdapterError, Channel, Company, Delivery, OutreachContent};
use crate::domain::ports::ChannelAdapter;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;

pub struct HttpFormSubmitter {
    client: Client,
    selectors: HashMap<String, String>,
    full_name: String,
    email: String,
    phone: String,
    success_markers: Vec<String>,
    attachments: Arc<AttachmentSet>,
}

impl HttpFormSubmitter {
    pub fn new(config: &AppConfig, attachments: Arc<AttachmentSet>) -> Result<Self> {
        let client = Client::builder().timeout(config.form_timeout()).build()?;
        let selectors = config
            .form
            .as_ref()
            .map(|f| f.selectors.clone())
            .unwrap_or_default();
        let success_markers = config
            .form_success_markers()
            .into_iter()
            .map(|m| m.to_lowercase())
            .collect();

        Ok(Self {
            client,
            selectors,
            full_name: config.identity.full_name(),
            email: config.identity.email.clone(),
            phone: config.identity.phone.clone(),
            success_markers,
            attachments,
        })
    }

    fn field(&self, slot: &str) -> String {
        self.selectors
            .get(slot)
            .cloned()
            .unwrap_or_else(|| slot.to_string())
    }

    fn build_form(&self, content: &OutreachContent) -> std::result::Result<Form, AdapterError> {
        let mut form = Form::new()
            .text(self.field("name"), self.full_name.clone())
            .text(self.field("email"), self.email.clone())
            .text(self.field("phone"), self.phone.clone())
            .text(self.field("message"), content.body.clone());

        for file in &self.attachments.files {
            let part = Part::bytes(file.bytes.clone())
                .file_name(file.filename.clone())
                .mime_str(file.content_type)
                .map_err(|e| AdapterError::Fatal(format!("attachment content type: {e}")))?;
            form = form.part(self.field(file.slot), part);
        }
        Ok(form)
    }
}

#[async_trait]
impl ChannelAdapter for HttpFormSubmitter {
    fn channel(&self) -> Channel {
        Channel::Form
    }

    async fn deliver(
        &self,
        company: &Company,
        content: &OutreachContent,
    ) -> std::result::Result<Delivery, AdapterError> {
        let url = company
            .apply_url
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AdapterError::Fatal("no apply url on record".to_string()))?;

        let form = self.build_form(content)?;
        let response = match self.client.post(url).multipart(form).send().await {
            Ok(response) => response,
            Err(e) if e.is_builder() => {
                return Err(AdapterError::Fatal(format!("invalid apply url: {e}")))
            }
            Err(e) if e.is_timeout() => {
                return Err(AdapterError::Retryable(format!("request timed out: {e}")))
            }
            Err(e) => return Err(AdapterError::Retryable(format!("request failed: {e}"))),
        };

        let status = response.status();
        if status.is_success() {
            let body = response.text().await.unwrap_or_default().to_lowercase();
            if self.success_markers.iter().any(|m| body.contains(m)) {
                Ok(Delivery::new("success detected"))
            } else {
                Ok(Delivery::new(format!("submitted (status {status})")))
            }
        } else if status.is_server_error()
            || status == reqwest::StatusCode::REQUEST_TIMEOUT
            || status == reqwest::StatusCode::TOO_MANY_REQUESTS
        {
            Err(AdapterError::Retryable(format!(
                "server answered {status}"
            )))
        } else {
            Err(AdapterError::Fatal(format!("server answered {status}")))
        }
    }
}
