use crate::core::{Mailer, RenderedReport};
use crate::domain::model::EmailMessage;
use crate::utils::error::{ReportError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const LINE_BREAK: &str = "<br>";
const NON_BREAKING_SPACE: &str = "&nbsp;";

/// Keeps the fixed-width layout intact in an HTML mail body.
pub fn to_html_body(text: &str) -> String {
    text.replace('\n', LINE_BREAK).replace(' ', NON_BREAKING_SPACE)
}

/// Posts rendered reports to an HTTP mail relay as `{subject, to, html}`.
pub struct WebhookMailer {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    subject: String,
    recipients: Vec<String>,
}

impl WebhookMailer {
    pub fn new(
        endpoint: String,
        api_key: Option<String>,
        subject: String,
        recipients: Vec<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
            subject,
            recipients,
        })
    }

    /// `{student}` and `{mode}` in the subject are filled from the report.
    pub fn message_for(&self, report: &RenderedReport) -> EmailMessage {
        EmailMessage {
            subject: self
                .subject
                .replace("{student}", &report.student)
                .replace("{mode}", report.mode.label()),
            to: self.recipients.clone(),
            html: to_html_body(&report.text),
        }
    }
}

#[async_trait]
impl Mailer for WebhookMailer {
    async fn send(&self, report: &RenderedReport) -> Result<()> {
        let message = self.message_for(report);
        tracing::debug!(
            "Sending '{}' to {} recipient(s)",
            message.subject,
            message.to.len()
        );

        let mut request = self.client.post(&self.endpoint).json(&message);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| ReportError::EmailError {
            message: e.to_string(),
        })?;
        if !response.status().is_success() {
            return Err(ReportError::EmailError {
                message: format!("mail relay returned {}", response.status()),
            });
        }
        Ok(())
    }
}
