use tracing_subscriber::EnvFilter;

/// Installs a test-friendly `tracing` subscriber once per test binary.
///
/// Honours `RUST_LOG`, defaulting to `info`. Later calls are no-ops.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
