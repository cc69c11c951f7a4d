use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn report_filter(verbose: bool) -> EnvFilter {
    let default_directive = if verbose {
        "gradebook_report=debug,info"
    } else {
        "gradebook_report=info"
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Human-readable output for interactive runs.
pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(report_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

fn json_subscriber(verbose: bool) -> impl tracing::Subscriber + Send + Sync + 'static {
    tracing_subscriber::registry().with(report_filter(verbose)).with(
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(false)
            .with_current_span(false),
    )
}

/// JSON lines for unattended runs (cron, schedulers) where logs are shipped elsewhere.
pub fn init_json_logger(verbose: bool) {
    json_subscriber(verbose).init();
}
