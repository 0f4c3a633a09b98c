use anyhow::Context;
use potentia_common::config::Config;
use potentia_web::router::build_router;
use potentia_web::state::AppState;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load()?;
    let bind_addr = config.bind_addr.clone();

    // Loads the model artifact up front; a broken artifact aborts
    // startup instead of failing the first request.
    let state = AppState::new(config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!(addr = %bind_addr, "potentia server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
