//! Tracing subscriber setup

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::CliConfig;

/// Install the global subscriber.
///
/// `RUST_LOG` wins; otherwise the level follows `-v`/`-q`. Output goes to
/// stderr so stdout and the native-messaging channel stay clean. A second
/// call is a no-op.
pub fn init_tracing(config: &CliConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.verbosity.log_level()));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.verbosity.is_debug())
        .with_ansi(config.color.should_color());

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .try_init();
}
