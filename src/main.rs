use axum::extract::DefaultBodyLimit;
use hr_portal::{
    config::{get_config, init_config},
    middleware::cors::portal_cors,
    models::draft::MAX_VIDEO_BYTES,
    routes, AppState,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    init_config()?;
    let config = get_config()?;

    let app_state = AppState::new(config).await?;
    info!(
        api_base_url = %config.api_base_url,
        storage_dir = %config.storage_dir.display(),
        "Portal state ready"
    );

    // Drafts of idle wizards stay on disk and are reloaded on their next request.
    {
        let wizards = app_state.wizards.clone();
        let max_idle = Duration::from_secs(config.wizard_idle_secs);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(60)).await;
                wizards.evict_idle(max_idle).await;
            }
        });
    }

    let app = routes::app(app_state, config)
        .layer(portal_cors())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_VIDEO_BYTES + 10 * 1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
