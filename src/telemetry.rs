use tracing::Subscriber;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// JSON-formatted subscriber filtered by RUST_LOG (falls back to `default_filter`)
pub fn get_subscriber(default_filter: &str) -> impl Subscriber + Send + Sync {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let formatting_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .json();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(formatting_layer)
}

/// Install the structured logger; call once at startup
pub fn init_telemetry() {
    get_subscriber("info").init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscriber_can_be_scoped() {
        let subscriber = get_subscriber("debug");
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("telemetry smoke event");
        });
    }
}
