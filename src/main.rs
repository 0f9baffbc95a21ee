use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use fruit_dojo::config;
use fruit_dojo::leaderboard::store::LeaderboardStore;
use fruit_dojo::server::http;
use fruit_dojo::server::rate_limit::RateLimiter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = config::leaderboard_path();
    tracing::info!(path = %path.display(), "leaderboard store ready");
    let store = Arc::new(LeaderboardStore::new(path));

    let limiter = Arc::new(RateLimiter::new(
        Duration::from_secs(config::RATE_WINDOW_SECS),
        config::RATE_MAX_REQUESTS,
    ));
    let allowed_origins = config::allowed_origins();
    if !allowed_origins.is_empty() {
        tracing::info!(origins = ?allowed_origins, "CORS allow-list active");
    }

    let app = http::api_router(store, allowed_origins, limiter);

    let addr = format!("0.0.0.0:{}", config::server_port());
    tracing::info!(%addr, prefix = config::API_PREFIX, "leaderboard API listening");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind server port");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("server error");
}
