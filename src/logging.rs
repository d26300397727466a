use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the stderr subscriber. `RUST_LOG` wins over the configured level;
/// `verbose` forces debug for this crate.
pub fn init_logging(level: &str, verbose: bool) {
    let level = if verbose { "debug" } else { level };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("stockctl={level},warn").into());

    // A subscriber may already be installed when embedded or under test.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
