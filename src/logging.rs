use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Logs go to stderr; stdout belongs to command output and audit lines.
pub fn init(json: bool, verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let fmt_layer = if json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().with_writer(std::io::stderr).with_target(false).boxed()
    };
    // a second init (tests, embedders) keeps the first subscriber
    let _ = tracing_subscriber::registry().with(filter).with(fmt_layer).try_init();
}
