pub mod config;
pub mod digest;
pub mod platform;
pub mod reddit;
pub mod relay;
pub mod scheduler;
pub mod translate;

#[cfg(test)]
pub(crate) mod testing;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the fmt subscriber, filtered by `RUST_LOG`.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,reddit_relay=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
