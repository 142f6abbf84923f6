use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

/// Initializes `tracing` logging with options from the environment variable
/// given in the `env` parameter.
///
/// Generators are expected to use their own name plus `_LOG`, e.g.
/// `KG_TRAEFIK2_LOG`. If the variable is unset or invalid, the maximum log
/// level is INFO.
///
/// Logs are written to stderr, stdout is reserved for the generated documents.
pub fn initialize_logging(env: &str, app_name: &str) {
    let filter = EnvFilter::try_from_env(env)
        .unwrap_or_else(|_| EnvFilter::new(tracing::Level::INFO.to_string()));

    let fmt = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    Registry::default().with(filter).with(fmt).init();

    tracing::debug!(app_name, "logging initialized");
}
