use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "info,actix_web=info,actix_server=warn";

/// Install the process-wide subscriber.
///
/// `RUST_LOG` overrides the default filter. Output is JSON unless
/// `SPYSTER_LOG_FORMAT=compact`, which is easier to read in a terminal.
pub fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let compact = std::env::var("SPYSTER_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("compact"))
        .unwrap_or(false);

    let json_layer = (!compact).then(|| {
        fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_ansi(false)
            .json()
    });
    let compact_layer = compact.then(|| fmt::layer().with_target(true).compact());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(compact_layer)
        .init();
}
