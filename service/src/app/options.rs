//! Application configuration options

use crate::http::client::HttpOptions;
use crate::storage::settings::{ServerSettings, Settings, SourceSettings};

/// Main application options
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    /// Server configuration
    pub server: ServerOptions,

    /// Outbound HTTP client options
    pub http: HttpOptions,
}

impl AppOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            server: ServerOptions::from(&settings.server),
            http: HttpOptions::default(),
        }
    }
}

/// HTTP server options
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerOptions {
    fn default() -> Self {
        ServerOptions::from(&ServerSettings::default())
    }
}

impl From<&ServerSettings> for ServerOptions {
    fn from(settings: &ServerSettings) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.port,
        }
    }
}

/// Repository every deployment is built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRepo {
    /// `owner/name`
    pub full_name: String,

    /// Known numeric id, skips the lookup when set
    pub repo_id: Option<u64>,

    pub git_ref: String,
}

impl From<&SourceSettings> for SourceRepo {
    fn from(settings: &SourceSettings) -> Self {
        Self {
            full_name: settings.repo.clone(),
            repo_id: settings.repo_id,
            git_ref: settings.git_ref.clone(),
        }
    }
}
