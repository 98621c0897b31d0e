use once_cell::sync::OnceCell;
use tracing_subscriber::{EnvFilter, fmt};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Install the process-wide subscriber. Later calls are no-ops.
///
/// Filtering follows `RUST_LOG`, falling back to `info`.
pub fn init_logger(service_name: &'static str) {
    LOGGER_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        // try_init: a test harness may already own the global subscriber
        let installed = fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true)
            .with_span_events(fmt::format::FmtSpan::CLOSE)
            .try_init()
            .is_ok();

        tracing::info!(service = service_name, installed, "logger initialized");
    });
}
