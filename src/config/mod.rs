pub mod toml_config;

pub use toml_config::ReportConfig;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "gradebook-report")]
#[command(about = "Fixed-width grade reports from a school grade portal")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "gradebook-report.toml")]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Also produce the windowed report, looking back this many days
    #[arg(long)]
    pub lookback_days: Option<u32>,

    /// Render from a saved gradebook JSON file instead of the portal
    #[arg(long)]
    pub document: Option<String>,

    /// Print reports to stdout instead of writing or emailing them
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(feature = "cli")]
impl CliArgs {
    /// Command-line flags win over the file.
    pub fn apply_overrides(&self, config: &mut ReportConfig) {
        if let Some(lookback_days) = self.lookback_days {
            config.report.lookback_days = Some(lookback_days);
        }
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;
    use crate::domain::model::ReportMode;

    #[test]
    fn test_lookback_override() {
        let args = CliArgs::parse_from(["gradebook-report", "--lookback-days", "7", "--dry-run"]);
        let mut config = ReportConfig::default();
        config.report.full = true;

        args.apply_overrides(&mut config);

        assert!(args.dry_run);
        assert_eq!(
            config.modes(),
            vec![ReportMode::Full, ReportMode::Windowed { lookback_days: 7 }]
        );
    }
}
