use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Diagnostics go to stderr so stdout keeps the plain progress lines.
/// The filter is fixed; no environment variables are consulted.
pub fn init_logging() {
    let console_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new("lead_normalizer=info"))
        .with(console_layer)
        .try_init();
}
