use std::sync::Arc;

use triagecare::api::server::start_api_server;
use triagecare::api::types::ApiContext;
use triagecare::config;
use triagecare::generation::GenerationClient;

#[tokio::main]
async fn main() {
    triagecare::init_tracing();
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let generator = Arc::new(GenerationClient::from_env());
    tracing::info!(
        backend = %generator.base_url(),
        model = %generator.model(),
        "generation backend configured"
    );

    let ctx = ApiContext::new(generator);
    let mut server = start_api_server(ctx, config::DEFAULT_BIND_ADDR)
        .await
        .expect("Failed to start API server");

    tracing::info!("listening on http://{}", server.addr);

    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for shutdown signal");
    server.shutdown();
    server.wait().await;
}
