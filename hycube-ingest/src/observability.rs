use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "hycube_ingest=info,hycube_client=info,poll_once=info";

/// `RUST_LOG` wins over the default filter when set.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
