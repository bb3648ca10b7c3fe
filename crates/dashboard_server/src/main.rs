use clap::Parser;
use dashboard_server::ServerArgs;
use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = ServerArgs::parse();
    if let Err(err) = dashboard_server::run(&args) {
        tracing::error!(error = %err, "dashboard server failed");
        std::process::exit(1);
    }
}
