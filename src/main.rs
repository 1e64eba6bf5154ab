use clap::Parser;
use tracing_subscriber::EnvFilter;

use radicon_zenoh_runtime::config::Options;

#[tokio::main]
async fn main() {
    let opts = Options::parse();

    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    // Only returns by never returning: either spins forever or halts
    match radicon_zenoh_runtime::runtime::run(opts).await {}
}
