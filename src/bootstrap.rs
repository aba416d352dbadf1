//! Tracing subscriber bootstrap (§6.2).

/// Per-crate directives layered on top of the base level, so the transfer
/// path stays verbose even when the rest of the binary is quieted down.
const CRATE_DIRECTIVES: &[&str] = &["pc_net=debug", "pc_transfer=debug"];

fn base_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn build_env_filter() -> tracing_subscriber::EnvFilter {
    if let Ok(from_env) = tracing_subscriber::EnvFilter::try_from_default_env() {
        return from_env;
    }
    CRATE_DIRECTIVES
        .iter()
        .fold(tracing_subscriber::EnvFilter::new(base_level()), |filter, directive| {
            filter.add_directive(directive.parse().expect("directive is a compile-time constant"))
        })
}

/// Installs the global `tracing` subscriber. Must be called once, before any
/// other part of the service logs.
pub fn init_tracing_subscriber() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(build_env_filter())
        .with_timer(tracing_subscriber::fmt::time::ChronoUtc::new("%Y-%m-%d %H:%M:%S%.3f".to_string()))
        .with_file(true)
        .with_line_number(true)
        .with_ansi(!cfg!(test))
        .try_init()
}
