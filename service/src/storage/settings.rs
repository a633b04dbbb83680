//! Service settings, read from environment variables

use std::path::PathBuf;

use secrecy::SecretString;

use crate::errors::ServiceError;
use crate::logs::LogLevel;

/// Database URL selecting the in-memory store
pub const MEMORY_DATABASE_URL: &str = "memory:";

/// Service settings
#[derive(Debug)]
pub struct Settings {
    pub log_level: LogLevel,
    pub log_json: bool,
    pub log_dir: Option<PathBuf>,

    pub server: ServerSettings,
    pub platform: PlatformSettings,
    pub source: SourceSettings,
    pub database: DatabaseSettings,

    /// Public base URL of the web app hosting the configuration page
    pub app_base_url: String,

    /// Secret the stored access tokens are encrypted with
    pub encryption_key: SecretString,
}

/// Listener settings
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Deployment platform OAuth and API settings
#[derive(Debug)]
pub struct PlatformSettings {
    pub api_url: String,
    pub client_id: String,
    pub client_secret: SecretString,
    pub redirect_uri: String,
}

/// Source repository the deployment is built from
#[derive(Debug)]
pub struct SourceSettings {
    pub api_url: String,
    pub api_token: Option<SecretString>,

    /// Repository path, `owner/name`
    pub repo: String,

    /// Numeric repository id; looked up from `repo` when absent
    pub repo_id: Option<u64>,

    /// Branch or tag to deploy
    pub git_ref: String,
}

/// Database connection settings
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseSettings {
    pub fn is_memory(&self) -> bool {
        self.url == MEMORY_DATABASE_URL
    }
}

fn default_platform_api_url() -> String {
    "https://api.vercel.com".to_string()
}

fn default_source_api_url() -> String {
    "https://api.github.com".to_string()
}

impl Settings {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self, ServiceError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through a variable lookup function
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ServiceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };

        let server = ServerSettings {
            host: vars
                .optional("HOST")
                .unwrap_or_else(|| ServerSettings::default().host),
            port: vars.parsed("PORT")?.unwrap_or(ServerSettings::default().port),
        };

        let log_level = match vars.optional("LOG_LEVEL") {
            Some(level) => level.parse().map_err(ServiceError::ConfigError)?,
            None => LogLevel::default(),
        };

        Ok(Self {
            log_level,
            log_json: vars.parsed("LOG_JSON")?.unwrap_or(false),
            log_dir: vars.optional("LOG_DIR").map(PathBuf::from),
            server,
            platform: PlatformSettings {
                api_url: vars
                    .optional("PLATFORM_API_URL")
                    .unwrap_or_else(default_platform_api_url),
                client_id: vars.required("PLATFORM_CLIENT_ID")?,
                client_secret: SecretString::from(vars.required("PLATFORM_CLIENT_SECRET")?),
                redirect_uri: vars.required("PLATFORM_REDIRECT_URI")?,
            },
            source: SourceSettings {
                api_url: vars
                    .optional("SOURCE_API_URL")
                    .unwrap_or_else(default_source_api_url),
                api_token: vars.optional("SOURCE_API_TOKEN").map(SecretString::from),
                repo: vars.required("SOURCE_REPO")?,
                repo_id: vars.parsed("SOURCE_REPO_ID")?,
                git_ref: vars
                    .optional("SOURCE_REPO_REF")
                    .unwrap_or_else(|| "main".to_string()),
            },
            database: DatabaseSettings {
                url: vars.required("DATABASE_URL")?,
                max_connections: vars.parsed("DATABASE_MAX_CONNECTIONS")?.unwrap_or(5),
            },
            app_base_url: vars
                .required("APP_BASE_URL")?
                .trim_end_matches('/')
                .to_string(),
            encryption_key: SecretString::from(vars.required("ENCRYPTION_KEY")?),
        })
    }
}

struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Non-blank value, trimmed
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ServiceError> {
        self.optional(key)
            .ok_or_else(|| ServiceError::ConfigError(format!("{} is not set", key)))
    }

    fn parsed<T>(&self, key: &str) -> Result<Option<T>, ServiceError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key)
            .map(|v| {
                v.parse::<T>()
                    .map_err(|e| ServiceError::ConfigError(format!("{} is invalid: {}", key, e)))
            })
            .transpose()
    }
}
