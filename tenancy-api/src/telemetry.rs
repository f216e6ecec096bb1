use std::env;
use tracing_subscriber::{layer::SubscriberExt, registry, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_FILTER: &str = "tenancy_api=debug,tenancy_orchestrator=debug,tower_http=debug";

/// Installs the global subscriber.
///
/// `RUST_LOG` overrides the default filter; `LOG_FORMAT=json` switches to
/// one JSON object per line.
pub fn init_subscriber() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let is_json = env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    let subscriber = registry().with(env_filter);
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);
    if is_json {
        subscriber.with(fmt_layer.json()).init();
    } else {
        subscriber.with(fmt_layer).init();
    }
}
