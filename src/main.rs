mod cli;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("disaster_alerts=info")),
        )
        .init();

    let config = match cli::run() {
        cli::RunOutcome::Serve(config) => config,
        cli::RunOutcome::Exit(code) => std::process::exit(code),
    };

    if let Err(err) = disaster_alerts::serve(config).await {
        tracing::error!(error = %err, "server stopped");
        std::process::exit(1);
    }
}
