//! Deployment trigger
//!
//! Resolves the target project, pushes the user's credentials as environment
//! variables and creates a production deployment from the template
//! repository. Any failing step aborts the whole operation; variables that
//! were already created stay on the project.

use std::collections::BTreeMap;

use openapi_client::models::GitSource;
use openapi_server::models::{DeployResponse, ValidDeployRequest};
use tracing::{info, warn};

use crate::app::options::SourceRepo;
use crate::app::state::AppState;
use crate::errors::ServiceError;
use crate::http::source::SourceClient;
use crate::models::installation::{InstallationStatus, InstallationUpdate};
use crate::utils::generate_secret;

pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const DATABASE_SERVICE_KEY_VAR: &str = "DATABASE_SERVICE_KEY";
pub const MIGRATION_SECRET_VAR: &str = "MIGRATION_SECRET";

/// Trigger a deployment for a stored installation
pub async fn trigger(
    state: &AppState,
    request: ValidDeployRequest,
) -> Result<DeployResponse, ServiceError> {
    let installation = state
        .store
        .get_installation_by_configuration(&request.configuration_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Installation not found.".to_string()))?;

    let account = state
        .store
        .get_account(installation.account_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Account not found.".to_string()))?;

    let token = state.cipher.decrypt(&account.access_token).map_err(|e| {
        warn!("Stored token for account {} is unusable: {}", account.id, e);
        ServiceError::NotFound("Access token not found.".to_string())
    })?;
    let team_id = account.team_id.as_deref();

    let project = state
        .platform
        .resolve_project(&token, team_id, &installation.configuration_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("No project found for this account.".to_string()))?;
    info!("Deploying to project {} ({})", project.name, project.id);

    state
        .store
        .update_installation(
            installation.id,
            InstallationUpdate {
                project_id: Some(project.id.clone()),
                project_name: Some(project.name.clone()),
                ..Default::default()
            },
        )
        .await?;

    let migration_secret = generate_secret();
    let vars = build_env_vars(&request, &migration_secret);
    state
        .platform
        .set_env_vars(&token, team_id, &project.id, &vars)
        .await?;

    let repo_id = resolve_repo_id(&state.source, &state.source_repo).await?;
    let deployment_name = request
        .project_name
        .clone()
        .unwrap_or_else(|| project.name.clone());

    let deployment = state
        .platform
        .create_deployment(
            &token,
            team_id,
            &deployment_name,
            &project.id,
            GitSource::github(repo_id, state.source_repo.git_ref.clone()),
        )
        .await?;
    let url = deployment_url(&deployment.url);

    state
        .store
        .update_installation(
            installation.id,
            InstallationUpdate {
                status: Some(InstallationStatus::Installed),
                deployment_id: Some(deployment.id.clone()),
                deployment_url: Some(url.clone()),
                ..Default::default()
            },
        )
        .await?;

    Ok(DeployResponse {
        deployment_id: deployment.id,
        url,
        project_name: deployment_name,
        migration_secret,
    })
}

/// Environment variables pushed to the project
pub fn build_env_vars(request: &ValidDeployRequest, migration_secret: &str) -> BTreeMap<String, String> {
    let mut vars = BTreeMap::new();
    vars.insert(OPENAI_API_KEY_VAR.to_string(), request.openai_api_key.clone());
    vars.insert(DATABASE_URL_VAR.to_string(), request.database_url.clone());
    if let Some(key) = &request.database_service_key {
        vars.insert(DATABASE_SERVICE_KEY_VAR.to_string(), key.clone());
    }
    vars.insert(MIGRATION_SECRET_VAR.to_string(), migration_secret.to_string());
    vars
}

async fn resolve_repo_id(source: &SourceClient, repo: &SourceRepo) -> Result<u64, ServiceError> {
    if let Some(id) = repo.repo_id {
        return Ok(id);
    }
    let repository = source.get_repository(&repo.full_name).await?;
    Ok(repository.id)
}

/// The platform reports bare hostnames
fn deployment_url(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}
