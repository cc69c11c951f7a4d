use crate::core::{DocumentSource, RawDocument};
use crate::domain::model::StudentAccount;
use crate::utils::error::{ReportError, Result};
use reqwest::Client;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://{domain}/gradebook";

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Fetches gradebooks from the portal's JSON endpoint. The endpoint is a
/// template; `{domain}` is replaced with the account's portal domain.
pub struct HttpDocumentSource {
    client: Client,
    endpoint: String,
}

impl HttpDocumentSource {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint_for(&self, account: &StudentAccount) -> String {
        self.endpoint.replace("{domain}", &account.domain)
    }
}

impl DocumentSource for HttpDocumentSource {
    async fn fetch(&self, account: &StudentAccount) -> Result<RawDocument> {
        let url = self.endpoint_for(account);
        tracing::debug!("Making portal request to: {}", url);

        let response = self
            .client
            .post(&url)
            .json(&LoginRequest {
                username: &account.username,
                password: &account.password,
            })
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Portal response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReportError::PortalError {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let document: serde_json::Value = response.json().await?;
        Ok(RawDocument::new(document))
    }
}

/// Serves a gradebook saved to disk, whatever the account.
pub struct FileDocumentSource {
    path: PathBuf,
}

impl FileDocumentSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DocumentSource for FileDocumentSource {
    async fn fetch(&self, _account: &StudentAccount) -> Result<RawDocument> {
        tracing::debug!("Reading gradebook from {}", self.path.display());
        let content = tokio::fs::read_to_string(&self.path).await?;
        RawDocument::from_json_str(&content)
    }
}
