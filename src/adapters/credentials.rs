use crate::core::CredentialSource;
use crate::domain::model::StudentAccount;
use crate::utils::error::{ReportError, Result};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// Credentials file shaped as
/// `{"<student>": {"username": "...", "password": "...", "domain": "..."}}`.
/// Students are processed in the order they appear in the file.
#[derive(Debug, Clone)]
pub struct JsonCredentialStore {
    path: PathBuf,
}

impl JsonCredentialStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn parse(content: &str) -> Result<IndexMap<String, StudentAccount>> {
        let accounts: IndexMap<String, StudentAccount> = serde_json::from_str(content)?;
        for (student, account) in &accounts {
            if student.trim().is_empty() {
                return Err(ReportError::ConfigValidationError {
                    field: "credentials".to_string(),
                    message: "student names cannot be empty".to_string(),
                });
            }
            if account.domain.trim().is_empty() {
                return Err(ReportError::ConfigValidationError {
                    field: format!("credentials.{student}.domain"),
                    message: "portal domain cannot be empty".to_string(),
                });
            }
        }
        Ok(accounts)
    }
}

impl CredentialSource for JsonCredentialStore {
    fn accounts(&self) -> Result<IndexMap<String, StudentAccount>> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| ReportError::ConfigError {
            message: format!("cannot read credentials file {}: {}", self.path.display(), e),
        })?;
        let accounts = Self::parse(&content)?;
        tracing::debug!(
            "Loaded {} account(s) from {}",
            accounts.len(),
            self.path.display()
        );
        Ok(accounts)
    }
}
