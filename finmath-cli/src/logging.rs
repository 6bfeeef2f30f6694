use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Priority: RUST_LOG env var > --verbose flag > default (warn).
/// Logs go to stderr so the report on stdout stays clean.
pub fn init(verbose: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}
