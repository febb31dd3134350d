//! Structured logging setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when neither `RUST_LOG` nor configuration says otherwise.
pub fn default_filter(level: &str) -> String {
    format!("response_interceptor={level},tower_http={level}")
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. Calling this twice is harmless.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(level)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(
            default_filter("debug"),
            "response_interceptor=debug,tower_http=debug"
        );
    }

    #[test]
    fn test_init_twice() {
        init_tracing("info");
        init_tracing("debug");
    }
}
