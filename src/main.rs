use clap::Parser;
use gradebook_report::core::{CredentialSource, DocumentSource};
use gradebook_report::domain::model::{RunSummary, StudentAccount};
use gradebook_report::utils::error::ErrorSeverity;
use gradebook_report::utils::{logger, validation::Validate};
use gradebook_report::{
    CliArgs, FileDocumentSource, GradebookPipeline, HttpDocumentSource, JsonCredentialStore,
    LocalStorage, ReportConfig, ReportEngine, ReportError, ReportRenderer, WebhookMailer,
};
use indexmap::IndexMap;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    let mut config = match ReportConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };
    args.apply_overrides(&mut config);

    if config.json_logging() {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting gradebook-report");
    tracing::debug!("CLI args: {:?}", args);

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    match run(&args, &config).await {
        Ok(summary) => {
            for preview in &summary.previews {
                print!("{}", preview.text);
            }
            for path in &summary.written {
                println!("📁 {}", path);
            }
            for failure in &summary.failures {
                eprintln!("❌ {}: {}", failure.student, failure.message);
            }
            if !summary.is_clean() {
                std::process::exit(1);
            }
        }
        Err(e) => {
            tracing::error!(
                "Report run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }
}

async fn run(args: &CliArgs, config: &ReportConfig) -> Result<RunSummary, ReportError> {
    let accounts = JsonCredentialStore::new(&config.credentials.path).accounts()?;

    match &args.document {
        Some(path) => {
            tracing::info!("Rendering from saved document {}", path);
            generate(FileDocumentSource::new(path), args, config, &accounts).await
        }
        None => {
            let source =
                HttpDocumentSource::new(config.portal.endpoint.clone(), config.portal_timeout())?;
            generate(source, args, config, &accounts).await
        }
    }
}

async fn generate<D: DocumentSource>(
    source: D,
    args: &CliArgs,
    config: &ReportConfig,
    accounts: &IndexMap<String, StudentAccount>,
) -> Result<RunSummary, ReportError> {
    let storage = LocalStorage::new(config.report.output_path.clone());
    let renderer = ReportRenderer::new(config.report.layout);
    let pipeline = GradebookPipeline::new(
        source,
        storage,
        renderer,
        config.report.output_path.clone(),
    );

    let mut engine = ReportEngine::new(pipeline, config.modes()).with_dry_run(args.dry_run);
    if let Some(email) = &config.email {
        let mailer = WebhookMailer::new(
            email.endpoint.clone(),
            email.api_key.clone(),
            email.subject.clone(),
            email.recipients.clone(),
            config.portal_timeout(),
        )?;
        engine = engine.with_mailer(Arc::new(mailer));
    }

    Ok(engine.run(accounts).await)
}
