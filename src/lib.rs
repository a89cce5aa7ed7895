use crate::adapters::{HttpBackend, ProvisionedPushPlatform, TokioTimeProvider};
use crate::error::StartupError;
use crate::push::NotificationSubscriber;
use crate::sync::{SyncController, spawn_polling_feed};

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod ports;
pub mod push;
pub mod state;
pub mod store;
pub mod sync;
pub mod types;

pub use app::app;

/// Loads every configured category, keeps it live and serves the local API
/// until Ctrl-C.
pub async fn serve(config: config::AppConfig) -> Result<(), StartupError> {
    let backend = HttpBackend::new(&config.base_url)?;
    let platform = ProvisionedPushPlatform::from_config(&config.push);
    let notifications = Arc::new(NotificationSubscriber::new(
        platform.clone(),
        platform,
        backend.clone(),
        config.vapid_public_key.as_deref(),
    ));

    let mut categories = HashMap::new();
    let mut controllers = Vec::new();
    for category in &config.categories {
        let channel = spawn_polling_feed(
            category.clone(),
            backend.clone(),
            TokioTimeProvider,
            config.poll_interval,
        );
        let controller = SyncController::new(
            category.clone(),
            backend.clone(),
            TokioTimeProvider,
            channel,
            notifications.watch_status(),
        );
        categories.insert(category.clone(), controller.handle());
        controllers.push(tokio::spawn(controller.run()));
    }

    let state = state::AppState {
        page_size: config.page_size,
        categories: Arc::new(categories),
        notifications,
    };

    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .map_err(|source| StartupError::Bind {
            addr: config.listen,
            source,
        })?;
    info!(addr = %config.listen, "listening");
    let result = axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(StartupError::Serve);

    for controller in controllers {
        controller.abort();
    }
    result
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
