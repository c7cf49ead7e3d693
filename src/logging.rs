use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "FINTRACK_LOG";

/// Send log output to stderr so it never mixes with command output.
///
/// The filter comes from `FINTRACK_LOG` (e.g. `debug`, `fintrack=trace`) and
/// defaults to `warn`.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber may already be installed, e.g. by a test harness.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
