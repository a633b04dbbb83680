//! Main application run loop

use std::future::Future;
use std::sync::Arc;

use tracing::{error, info};

use crate::app::options::AppOptions;
use crate::app::state::AppState;
use crate::errors::ServiceError;
use crate::server::serve::serve;
use crate::storage::settings::Settings;

/// Run the Launchpad service until the shutdown signal resolves
pub async fn run(
    settings: Settings,
    options: AppOptions,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServiceError> {
    info!("Initializing Launchpad...");

    let state = Arc::new(AppState::init(settings, &options).await?);
    let store = state.store.clone();

    let server_handle = match serve(&options.server, state, shutdown_signal).await {
        Ok(handle) => handle,
        Err(e) => {
            error!("Failed to start server: {}", e);
            store.close().await;
            return Err(e);
        }
    };

    let result = match server_handle.await {
        Ok(result) => result,
        Err(e) => Err(ServiceError::ServerError(format!("Server task failed: {e}"))),
    };

    info!("Server stopped, closing store...");
    store.close().await;
    result
}
