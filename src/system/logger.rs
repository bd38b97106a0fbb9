use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Installs the global subscriber. `CHAKLOAD_LOG` wins over `RUST_LOG`;
/// without either, `verbose` selects `debug` and otherwise `default_level`.
pub fn init_logging(verbose: bool, no_color: bool, default_level: &str) {
    let fallback = if verbose { "debug" } else { default_level };
    let filter = std::env::var("CHAKLOAD_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .map_or_else(
            |_| EnvFilter::new(fallback),
            |value| EnvFilter::try_new(value).unwrap_or_else(|_| EnvFilter::new(fallback)),
        );

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_logging_is_idempotent() {
        init_logging(false, true, "warn");
        init_logging(true, true, "info");
    }
}
