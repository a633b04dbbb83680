//! Deployment platform API client

use openapi_client::models::{
    CreateDeploymentRequest, Deployment, GitSource, IntegrationConfiguration, Project,
    ProjectList, TokenExchangeResponse,
};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, info};

use crate::errors::ServiceError;
use crate::http::client::{HttpClient, HttpOptions};
use crate::http::errors::ApiError;

/// OAuth application credentials registered with the platform
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
    pub redirect_uri: String,
}

/// Client for the deployment platform REST API
pub struct PlatformClient {
    pub(crate) http: HttpClient,
    oauth: OAuthCredentials,
}

#[derive(Serialize)]
struct TokenExchangeForm<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
    redirect_uri: &'a str,
}

/// Query parameters scoping a call to the account's team, if any
pub(crate) fn team_query(team_id: Option<&str>) -> Vec<(&'static str, &str)> {
    team_id.map(|id| vec![("teamId", id)]).unwrap_or_default()
}

impl PlatformClient {
    pub fn new(
        base_url: &str,
        oauth: OAuthCredentials,
        options: &HttpOptions,
    ) -> Result<Self, ServiceError> {
        Ok(Self {
            http: HttpClient::new(base_url, options)?,
            oauth,
        })
    }

    /// Exchange an OAuth authorization code for an access token
    pub async fn exchange_code(&self, code: &str) -> Result<TokenExchangeResponse, ApiError> {
        let form = TokenExchangeForm {
            client_id: &self.oauth.client_id,
            client_secret: self.oauth.client_secret.expose_secret(),
            code,
            redirect_uri: &self.oauth.redirect_uri,
        };
        let response: TokenExchangeResponse =
            self.http.post_form("/v2/oauth/access_token", &form).await?;
        info!(
            "Exchanged OAuth code for user {} (team: {:?})",
            response.user_id, response.team_id
        );
        Ok(response)
    }

    /// Look up an integration configuration
    pub async fn get_configuration(
        &self,
        token: &str,
        team_id: Option<&str>,
        configuration_id: &str,
    ) -> Result<IntegrationConfiguration, ApiError> {
        let path = format!("/v1/integrations/configuration/{}", configuration_id);
        self.http.get(&path, &team_query(team_id), token).await
    }

    /// List the projects visible to the token
    pub async fn list_projects(
        &self,
        token: &str,
        team_id: Option<&str>,
    ) -> Result<Vec<Project>, ApiError> {
        let response: ProjectList = self
            .http
            .get("/v9/projects", &team_query(team_id), token)
            .await?;
        Ok(response.projects)
    }

    /// Get a single project by id or name
    pub async fn get_project(
        &self,
        token: &str,
        team_id: Option<&str>,
        id_or_name: &str,
    ) -> Result<Project, ApiError> {
        let path = format!("/v9/projects/{}", id_or_name);
        self.http.get(&path, &team_query(team_id), token).await
    }

    /// Pick the project a deployment targets
    ///
    /// The first project explicitly selected in the integration configuration
    /// wins; otherwise the first project the account owns. Order is whatever
    /// the platform returns.
    pub async fn resolve_project(
        &self,
        token: &str,
        team_id: Option<&str>,
        configuration_id: &str,
    ) -> Result<Option<Project>, ApiError> {
        let configuration = self.get_configuration(token, team_id, configuration_id).await?;
        let selected = configuration
            .projects
            .as_deref()
            .and_then(|projects| projects.first());

        if let Some(project_id) = selected {
            debug!("Using project {} selected in configuration", project_id);
            return self.get_project(token, team_id, project_id).await.map(Some);
        }

        let projects = self.list_projects(token, team_id).await?;
        Ok(projects.into_iter().next())
    }

    /// Create a production deployment from a git repository
    pub async fn create_deployment(
        &self,
        token: &str,
        team_id: Option<&str>,
        name: &str,
        project_id: &str,
        git_source: GitSource,
    ) -> Result<Deployment, ApiError> {
        let body = CreateDeploymentRequest {
            name: name.to_string(),
            project: project_id.to_string(),
            target: "production".to_string(),
            git_source,
        };
        let deployment: Deployment = self
            .http
            .post("/v13/deployments", &team_query(team_id), token, &body)
            .await?;
        info!("Created deployment {} at {}", deployment.id, deployment.url);
        Ok(deployment)
    }
}
