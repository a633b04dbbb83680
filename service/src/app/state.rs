//! Application state management

use std::sync::Arc;

use tracing::info;

use crate::app::options::{AppOptions, SourceRepo};
use crate::authn::token_cipher::TokenCipher;
use crate::errors::ServiceError;
use crate::http::platform::{OAuthCredentials, PlatformClient};
use crate::http::source::SourceClient;
use crate::storage::memory::MemoryStore;
use crate::storage::postgres::PostgresStore;
use crate::storage::settings::{DatabaseSettings, Settings};
use crate::storage::Store;

/// State shared by every request handler
pub struct AppState {
    /// Account and installation storage
    pub store: Arc<dyn Store>,

    /// Deployment platform API
    pub platform: Arc<PlatformClient>,

    /// Source hosting API
    pub source: Arc<SourceClient>,

    /// Access token encryption
    pub cipher: Arc<TokenCipher>,

    /// Public base URL of the web app
    pub app_base_url: String,

    /// Repository deployments are built from
    pub source_repo: SourceRepo,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        platform: Arc<PlatformClient>,
        source: Arc<SourceClient>,
        cipher: Arc<TokenCipher>,
        app_base_url: String,
        source_repo: SourceRepo,
    ) -> Self {
        Self {
            store,
            platform,
            source,
            cipher,
            app_base_url,
            source_repo,
        }
    }

    /// Build the state from settings, connecting to the database
    pub async fn init(settings: Settings, options: &AppOptions) -> Result<Self, ServiceError> {
        let store = connect_store(&settings.database).await?;
        let cipher = TokenCipher::new(&settings.encryption_key)?;
        let source_repo = SourceRepo::from(&settings.source);

        let platform = PlatformClient::new(
            &settings.platform.api_url,
            OAuthCredentials {
                client_id: settings.platform.client_id,
                client_secret: settings.platform.client_secret,
                redirect_uri: settings.platform.redirect_uri,
            },
            &options.http,
        )?;
        let source = SourceClient::new(
            &settings.source.api_url,
            settings.source.api_token,
            &options.http,
        )?;

        Ok(Self::new(
            store,
            Arc::new(platform),
            Arc::new(source),
            Arc::new(cipher),
            settings.app_base_url,
            source_repo,
        ))
    }
}

/// Open the store selected by the database URL
pub async fn connect_store(database: &DatabaseSettings) -> Result<Arc<dyn Store>, ServiceError> {
    if database.is_memory() {
        info!("Using in-memory store, data will not survive a restart");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = PostgresStore::connect(&database.url, database.max_connections).await?;
    Ok(Arc::new(store))
}
