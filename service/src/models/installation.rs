//! Account and installation records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A platform identity connected over OAuth
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,

    /// Platform user id, unique per account
    pub remote_user_id: String,

    pub team_id: Option<String>,

    /// Encrypted access token envelope
    pub access_token: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values written when an account is connected or reconnected
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub remote_user_id: String,
    pub team_id: Option<String>,
    pub access_token: String,
}

/// Installation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallationStatus {
    Pending,
    Installed,
    Failed,
}

impl InstallationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstallationStatus::Pending => "pending",
            InstallationStatus::Installed => "installed",
            InstallationStatus::Failed => "failed",
        }
    }
}

impl std::str::FromStr for InstallationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InstallationStatus::Pending),
            "installed" => Ok(InstallationStatus::Installed),
            "failed" => Ok(InstallationStatus::Failed),
            _ => Err(format!("Invalid installation status: {}", s)),
        }
    }
}

impl std::fmt::Display for InstallationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One deployment attempt for an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installation {
    pub id: Uuid,
    pub account_id: Uuid,

    /// Platform integration configuration id, unique
    pub configuration_id: String,

    pub status: InstallationStatus,
    pub project_id: Option<String>,
    pub project_name: Option<String>,
    pub deployment_id: Option<String>,
    pub deployment_url: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial installation update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct InstallationUpdate {
    pub status: Option<InstallationStatus>,
    pub project_id: Option<String>,
    pub project_name: Option<String>,
    pub deployment_id: Option<String>,
    pub deployment_url: Option<String>,
}

impl InstallationUpdate {
    /// Apply this update to an in-memory record
    pub fn apply(self, installation: &mut Installation) {
        if let Some(status) = self.status {
            installation.status = status;
        }
        if let Some(project_id) = self.project_id {
            installation.project_id = Some(project_id);
        }
        if let Some(project_name) = self.project_name {
            installation.project_name = Some(project_name);
        }
        if let Some(deployment_id) = self.deployment_id {
            installation.deployment_id = Some(deployment_id);
        }
        if let Some(deployment_url) = self.deployment_url {
            installation.deployment_url = Some(deployment_url);
        }
        installation.updated_at = Utc::now();
    }
}
