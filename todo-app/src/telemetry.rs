use tracing_subscriber::EnvFilter;

/// Initialise the tracing subscriber. Log level comes from `RUST_LOG`,
/// defaulting to `info`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}
