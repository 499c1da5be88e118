use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "portfolio_backend=info,portfolio_backend_lib=info,tower_http=info";

/// Install the fmt subscriber, honouring `RUST_LOG` when it is set.
///
/// Also bridges `log` records from the store and cache modules. Does nothing
/// if a subscriber is already installed.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_err()
    {
        log::debug!("Tracing subscriber already installed");
    }
}
