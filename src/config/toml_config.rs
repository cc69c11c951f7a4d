use crate::adapters::portal::DEFAULT_ENDPOINT;
use crate::core::renderer::LayoutConfig;
use crate::domain::model::ReportMode;
use crate::utils::error::{ReportError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub portal: PortalConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub report: ReportSection,
    pub email: Option<EmailConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub endpoint: String,
    pub timeout_seconds: u64,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub path: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            path: "credentials.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSection {
    pub output_path: String,
    pub full: bool,
    /// Enables the windowed report when set.
    pub lookback_days: Option<u32>,
    pub layout: LayoutConfig,
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            output_path: ".".to_string(),
            full: true,
            lookback_days: None,
            layout: LayoutConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub endpoint: String,
    pub recipients: Vec<String>,
    #[serde(default = "default_subject")]
    pub subject: String,
    pub api_key: Option<String>,
}

fn default_subject() -> String {
    "Grade report for {student}".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub json: bool,
}

impl ReportConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ReportError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ReportError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unset variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| ReportError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Reports to produce per student, full first.
    pub fn modes(&self) -> Vec<ReportMode> {
        let mut modes = Vec::new();
        if self.report.full {
            modes.push(ReportMode::Full);
        }
        if let Some(lookback_days) = self.report.lookback_days {
            modes.push(ReportMode::Windowed { lookback_days });
        }
        modes
    }

    pub fn portal_timeout(&self) -> Duration {
        Duration::from_secs(self.portal.timeout_seconds)
    }

    pub fn json_logging(&self) -> bool {
        self.logging.as_ref().map(|l| l.json).unwrap_or(false)
    }
}

impl Validate for ReportConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url_template("portal.endpoint", &self.portal.endpoint)?;
        validation::validate_positive_number(
            "portal.timeout_seconds",
            self.portal.timeout_seconds as usize,
            1,
        )?;
        validation::validate_path("credentials.path", &self.credentials.path)?;
        validation::validate_path("report.output_path", &self.report.output_path)?;

        if let Some(lookback_days) = self.report.lookback_days {
            validation::validate_range("report.lookback_days", lookback_days, 0, 366)?;
        }
        if self.modes().is_empty() {
            return Err(ReportError::ConfigValidationError {
                field: "report".to_string(),
                message: "enable the full report or set lookback_days".to_string(),
            });
        }
        self.report.layout.validate()?;

        if let Some(email) = &self.email {
            validation::validate_url("email.endpoint", &email.endpoint)?;
            if email.recipients.is_empty() {
                return Err(ReportError::MissingConfigError {
                    field: "email.recipients".to_string(),
                });
            }
            for recipient in &email.recipients {
                validation::validate_non_empty_string("email.recipients", recipient)?;
            }
        }

        Ok(())
    }
}
