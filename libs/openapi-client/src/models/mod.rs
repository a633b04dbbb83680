//! Platform and source hosting API models

use serde::{Deserialize, Serialize};

/// OAuth code exchange response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenExchangeResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Integration configuration the token was issued for
    #[serde(default)]
    pub installation_id: Option<String>,
    pub user_id: String,
    #[serde(default)]
    pub team_id: Option<String>,
}

/// Integration configuration, as returned by the configuration lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationConfiguration {
    pub id: String,
    /// Projects the user explicitly granted access to
    #[serde(default)]
    pub projects: Option<Vec<String>>,
    /// "all" or "selected"
    #[serde(default)]
    pub project_selection: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Platform project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

/// Project listing response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectList {
    #[serde(default)]
    pub projects: Vec<Project>,
}

/// Deployment target an environment variable applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvTarget {
    Production,
    Preview,
    Development,
}

impl EnvTarget {
    pub const ALL: [EnvTarget; 3] = [EnvTarget::Production, EnvTarget::Preview, EnvTarget::Development];
}

/// Environment variable storage type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvVarType {
    Encrypted,
}

/// Environment variable creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEnvVarRequest {
    pub key: String,
    pub value: String,
    #[serde(rename = "type")]
    pub kind: EnvVarType,
    pub target: Vec<EnvTarget>,
}

impl CreateEnvVarRequest {
    /// An encrypted variable visible to every deployment target
    pub fn encrypted(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            kind: EnvVarType::Encrypted,
            target: EnvTarget::ALL.to_vec(),
        }
    }
}

/// Git source of a deployment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitSource {
    #[serde(rename = "type")]
    pub provider: String,
    pub repo_id: u64,
    #[serde(rename = "ref")]
    pub git_ref: String,
}

impl GitSource {
    pub fn github(repo_id: u64, git_ref: impl Into<String>) -> Self {
        Self {
            provider: "github".to_string(),
            repo_id,
            git_ref: git_ref.into(),
        }
    }
}

/// Deployment creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeploymentRequest {
    pub name: String,
    pub project: String,
    pub target: String,
    pub git_source: GitSource,
}

/// Deployment returned by the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deployment {
    pub id: String,
    /// Hostname without scheme
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Source hosting repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub full_name: String,
    #[serde(default)]
    pub default_branch: Option<String>,
}
