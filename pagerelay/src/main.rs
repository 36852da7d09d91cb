//! Service entry point: logging, config, client, listener.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use pagerelay::{router, AppState, HttpFetcher, RelayConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pagerelay=info,tower_http=warn")),
        )
        .init();

    let config = Arc::new(RelayConfig::from_env());
    let fetcher = Arc::new(HttpFetcher::new(&config)?);
    let state = AppState {
        fetcher,
        config: Arc::clone(&config),
    };

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "pagerelay listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
