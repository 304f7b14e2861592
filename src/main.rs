//! Guardian Control - robot guardian service
//!
//! Main entry point: resolves the robot, starts the tick scheduler and serves
//! the command API.

use anyhow::Context;
use guardian_control::{
    alert_signal::{AlertSignal, ProcessAudioPlayer},
    config::GuardianConfig,
    guardian_loop::GuardianLoop,
    hardware::{DependencyProvider, RobotGateway},
    state::{AppConfig, AppState},
    tick_scheduler::TickScheduler,
    web_api,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "guardian_control=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Guardian Control v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = AppConfig::default();
    tracing::info!(
        gateway_url = %config.gateway_url,
        attributes = %config.guardian_config_path.display(),
        tick_interval_ms = config.tick_interval_ms,
        "Configuration loaded"
    );

    let raw = tokio::fs::read_to_string(&config.guardian_config_path)
        .await
        .with_context(|| {
            format!(
                "failed to read attributes from {}",
                config.guardian_config_path.display()
            )
        })?;
    let attributes: serde_json::Value =
        serde_json::from_str(&raw).context("attributes file is not valid JSON")?;
    let guardian_config = GuardianConfig::from_attributes(&attributes)?;

    // Resolve robot collaborators
    let gateway = Arc::new(RobotGateway::new(
        &config.gateway_url,
        &config.api_key,
        &config.api_key_id,
    )?);
    let deps = gateway.dependencies().await?;
    tracing::info!(resources = ?deps.names(), "Robot resources listed");

    let player = ProcessAudioPlayer::new(
        config.audio_player.clone(),
        config.audio_args.clone(),
        config.audio_file.clone(),
    );
    tracing::info!(
        player = %config.audio_player,
        file = %player.file().display(),
        "Alert audio configured"
    );
    let alert = AlertSignal::new(Arc::new(player));

    let guardian = GuardianLoop::initialize(&guardian_config, &deps, alert).await?;
    tracing::info!(
        camera = %guardian_config.camera_name,
        frame_width = guardian.frame_width(),
        "Guardian loop initialized"
    );
    let guardian = Arc::new(Mutex::new(guardian));

    if config.autostart {
        guardian.lock().await.toggle().await?;
    }

    let scheduler = Arc::new(TickScheduler::new(
        guardian.clone(),
        Duration::from_millis(config.tick_interval_ms),
    ));
    scheduler.start().await;

    let state = AppState {
        guardian: guardian.clone(),
        scheduler: scheduler.clone(),
        dependencies: gateway,
        started_at: chrono::Utc::now(),
    };

    let app = web_api::create_router(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    // Leave the robot dark and silent
    scheduler.stop().await;
    let mut guardian = guardian.lock().await;
    if guardian.is_running() {
        guardian.toggle().await?;
    }
    tracing::info!("Guardian Control stopped");

    Ok(())
}
