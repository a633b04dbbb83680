//! Launchpad API models

use serde::{Deserialize, Serialize};

/// Health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Version response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionResponse {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// OAuth callback query parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthCallbackQuery {
    #[serde(default)]
    pub code: Option<String>,
    /// Continuation URL handed back to the configuration page
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub configuration_id: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
}

/// Deploy request, as received
///
/// Every field is optional on the wire so that missing fields are reported
/// together by [`DeployRequest::validate`] instead of one at a time by the
/// JSON decoder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployRequest {
    #[serde(default)]
    pub configuration_id: Option<String>,
    #[serde(default)]
    pub credentials: Option<DeployCredentials>,
    #[serde(default)]
    pub project_name: Option<String>,
}

/// Credentials forwarded to the deployed project as environment variables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployCredentials {
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub database_service_key: Option<String>,
}

/// A deploy request that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidDeployRequest {
    pub configuration_id: String,
    pub openai_api_key: String,
    pub database_url: String,
    pub database_service_key: Option<String>,
    pub project_name: Option<String>,
}

impl DeployRequest {
    /// Check required fields, collecting one error per problem
    pub fn validate(self) -> Result<ValidDeployRequest, Vec<FieldError>> {
        let mut errors = Vec::new();

        let configuration_id = required(self.configuration_id, "configurationId", &mut errors);

        let (openai_api_key, database_url, database_service_key) = match self.credentials {
            Some(credentials) => (
                required(credentials.openai_api_key, "credentials.openaiApiKey", &mut errors),
                required(credentials.database_url, "credentials.databaseUrl", &mut errors),
                non_blank(credentials.database_service_key),
            ),
            None => {
                errors.push(FieldError::new("credentials", "is required"));
                (None, None, None)
            }
        };

        match (configuration_id, openai_api_key, database_url) {
            (Some(configuration_id), Some(openai_api_key), Some(database_url)) if errors.is_empty() => {
                Ok(ValidDeployRequest {
                    configuration_id,
                    openai_api_key,
                    database_url,
                    database_service_key,
                    project_name: non_blank(self.project_name),
                })
            }
            _ => Err(errors),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: Option<String>, field: &str, errors: &mut Vec<FieldError>) -> Option<String> {
    match value {
        None => {
            errors.push(FieldError::new(field, "is required"));
            None
        }
        Some(v) if v.trim().is_empty() => {
            errors.push(FieldError::new(field, "must not be empty"));
            None
        }
        Some(v) => Some(v.trim().to_string()),
    }
}

/// Deploy response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployResponse {
    pub deployment_id: String,
    pub url: String,
    pub project_name: String,
    /// Shared secret the deployed app expects on its migration endpoint
    pub migration_secret: String,
}

/// Field level validation problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}
