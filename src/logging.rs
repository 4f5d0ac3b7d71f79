use time::macros::format_description;
use tracing_error::ErrorLayer;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

static SUBSCRIBER_INIT: std::sync::Once = std::sync::Once::new();

/// Configure and initialize logging for the application
pub fn init() {
    SUBSCRIBER_INIT.call_once(|| {
        // Allow RUST_LOG to override levels; default to info for our crate and warn elsewhere
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("warn,{name}=info", name = env!("CARGO_CRATE_NAME"))));

        let timer = UtcTime::new(format_description!("[hour]:[minute]:[second].[subsecond digits:3]"));

        let subscriber = tracing_subscriber::fmt()
            .with_target(true)
            .with_timer(timer)
            .with_env_filter(filter)
            .finish()
            .with(ErrorLayer::default());

        tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
    });
}
