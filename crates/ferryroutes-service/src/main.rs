use std::net::SocketAddr;

use anyhow::Context;
use tracing::{error, info};

use ferryroutes_service::{cors_layer, router, ServiceConfig};
use ferryroutes_service_shared::{
    init_logging, init_metrics, AppState, ChatConfig, LoggingConfig, MetricsConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let logging_config = LoggingConfig::from_env().with_service("ferryroutes-service");
    init_logging(&logging_config);

    let metrics_config = MetricsConfig::from_env();
    if let Err(e) = init_metrics(&metrics_config) {
        // Metrics are optional
        tracing::warn!(error = %e, "failed to initialize metrics, continuing without metrics");
    }

    let config = ServiceConfig {
        metrics_path: metrics_config.path.clone(),
        ..ServiceConfig::from_env()
    };
    let chat_config = ChatConfig::from_env();
    info!(
        data_path = %config.data_path.display(),
        port = config.port,
        cors_origin = %config.cors_allow_origin,
        chat = ?chat_config,
        "starting ferry route service"
    );

    let chat_model = chat_config
        .build_model()
        .context("failed to build chat client")?;
    if chat_model.is_none() {
        tracing::warn!("GROQ_API_KEY not set; /api/v1/chat will answer 503");
    }

    let state = AppState::load(&config.data_path)
        .map_err(|e| {
            error!(error = %e, path = %config.data_path.display(), "failed to load route store");
            e
        })
        .context("failed to load route store")?
        .with_chat(chat_model, chat_config.history_turns);

    info!(
        routes = state.store().all_routes().len(),
        prices = state.store().all_prices().len(),
        schedule_entries = state.store().all_dates().len(),
        "route store loaded"
    );

    let cors = cors_layer(&config.cors_allow_origin).with_context(|| {
        format!(
            "CORS_ALLOW_ORIGIN is not a valid origin: {}",
            config.cors_allow_origin
        )
    })?;
    let app = router(state, &config, cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(addr = %addr, "listening on");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
