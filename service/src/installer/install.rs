//! OAuth installation flow
//!
//! The platform redirects the user here with an authorization code after they
//! add the integration. The code is exchanged for an access token, which is
//! stored encrypted alongside a pending installation, and the user is sent on
//! to the configuration page.

use openapi_server::models::OAuthCallbackQuery;
use tracing::{info, warn};
use url::Url;

use crate::app::state::AppState;
use crate::errors::ServiceError;
use crate::models::installation::{Installation, NewAccount};

/// Path of the configuration page, relative to the app base URL
pub const CONFIGURE_PATH: &str = "/configure";

/// Complete an installation and return the URL to redirect the user to
pub async fn complete_install(
    state: &AppState,
    query: OAuthCallbackQuery,
) -> Result<String, ServiceError> {
    let code = query
        .code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ServiceError::validation("Missing authorization code."))?;

    let token = state.platform.exchange_code(code).await?;

    let configuration_id = resolve_configuration_id(
        token.installation_id.as_deref(),
        query.configuration_id.as_deref(),
    )?;

    let access_token = state.cipher.encrypt(&token.access_token)?;
    let account = state
        .store
        .upsert_account(NewAccount {
            remote_user_id: token.user_id.clone(),
            team_id: token.team_id.clone().or(query.team_id.clone()),
            access_token,
        })
        .await?;

    let installation = state
        .store
        .create_installation(account.id, &configuration_id)
        .await?;
    info!(
        "Installation {} pending for configuration {}",
        installation.id, installation.configuration_id
    );

    configure_url(&state.app_base_url, &installation, query.next.as_deref())
}

/// Pick the configuration id the installation is keyed by
///
/// The id issued with the token is authoritative; the query value is only a
/// fallback and must agree with it when both are present.
pub fn resolve_configuration_id(
    issued: Option<&str>,
    requested: Option<&str>,
) -> Result<String, ServiceError> {
    let issued = issued.map(str::trim).filter(|id| !id.is_empty());
    let requested = requested.map(str::trim).filter(|id| !id.is_empty());

    match (issued, requested) {
        (Some(issued), Some(requested)) if issued != requested => {
            warn!(
                "Callback configuration id {} does not match token installation {}",
                requested, issued
            );
            Err(ServiceError::validation(
                "Configuration id does not match the authorization.",
            ))
        }
        (Some(id), _) | (None, Some(id)) => Ok(id.to_string()),
        (None, None) => Err(ServiceError::validation("Missing configuration id.")),
    }
}

/// Build the configuration page URL for an installation
pub fn configure_url(
    app_base_url: &str,
    installation: &Installation,
    next: Option<&str>,
) -> Result<String, ServiceError> {
    let mut url = Url::parse(&format!("{}{}", app_base_url.trim_end_matches('/'), CONFIGURE_PATH))
        .map_err(|e| ServiceError::ConfigError(format!("Invalid app base URL: {e}")))?;

    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("configurationId", &installation.configuration_id);
        if let Some(next) = next.filter(|n| !n.is_empty()) {
            pairs.append_pair("next", next);
        }
    }

    Ok(url.into())
}
