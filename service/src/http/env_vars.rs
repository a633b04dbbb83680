//! Batch environment variable creation
//!
//! Every variable is created with its own call, all issued at once. Each
//! call runs to completion regardless of its siblings, and the failures are
//! folded into a single error afterwards. Conflicts (the key already exists
//! on the project) are reported in preference to any other failure since
//! they are the one case the user can fix directly.

use std::collections::{BTreeMap, HashMap};

use futures::future::join_all;
use openapi_client::models::CreateEnvVarRequest;
use tracing::{info, warn};

use crate::errors::ServiceError;
use crate::http::errors::UpstreamFailure;
use crate::http::platform::{team_query, PlatformClient};

/// Most distinct failure messages quoted before only the most common is kept
const MAX_DISTINCT_MESSAGES: usize = 3;

impl PlatformClient {
    /// Create every variable on the project as an encrypted variable for all
    /// deployment targets
    pub async fn set_env_vars(
        &self,
        token: &str,
        team_id: Option<&str>,
        project_id: &str,
        vars: &BTreeMap<String, String>,
    ) -> Result<(), ServiceError> {
        let path = format!("/v10/projects/{}/env", project_id);
        let query = team_query(team_id);

        let calls = vars.iter().map(|(key, value)| {
            let body = CreateEnvVarRequest::encrypted(key.as_str(), value.as_str());
            let path = path.as_str();
            let query = query.as_slice();
            async move {
                let result = self.http.post_discard(path, query, token, &body).await;
                (key.as_str(), result)
            }
        });

        let failures: Vec<(&str, UpstreamFailure)> = join_all(calls)
            .await
            .into_iter()
            .filter_map(|(key, result)| {
                let failure = result.err()?.classify();
                warn!(
                    key,
                    conflict = failure.is_conflict(),
                    "Failed to create environment variable: {}",
                    failure.message()
                );
                Some((key, failure))
            })
            .collect();

        summarize_env_failures(&failures)?;
        info!(
            "Set {} environment variables on project {}",
            vars.len(),
            project_id
        );
        Ok(())
    }
}

/// Fold per-key failures into one error
///
/// Conflicts take priority: if any key conflicted, the error names only the
/// conflicting keys. Otherwise every failed key is named along with the
/// distinct failure messages, or just the most common one when there are
/// more than [`MAX_DISTINCT_MESSAGES`].
pub fn summarize_env_failures(failures: &[(&str, UpstreamFailure)]) -> Result<(), ServiceError> {
    if failures.is_empty() {
        return Ok(());
    }

    let conflicts: Vec<&str> = failures
        .iter()
        .filter(|(_, failure)| failure.is_conflict())
        .map(|(key, _)| *key)
        .collect();

    if !conflicts.is_empty() {
        return Err(ServiceError::EnvVarConflict(format!(
            "Environment variables already exist on the project: {}. \
             Remove the existing variables from the project or rename them, then deploy again.",
            conflicts.join(", ")
        )));
    }

    let keys: Vec<&str> = failures.iter().map(|(key, _)| *key).collect();

    // Distinct messages in first-seen order, with their counts
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for (_, failure) in failures {
        let message = failure.message();
        let count = counts.entry(message).or_insert(0);
        if *count == 0 {
            order.push(message);
        }
        *count += 1;
    }

    let reason = if order.len() <= MAX_DISTINCT_MESSAGES {
        order.join("; ")
    } else {
        // max_by_key keeps the last maximum, so scan in reverse to prefer the first seen
        let most_common = order
            .iter()
            .rev()
            .max_by_key(|message| counts[*message])
            .copied()
            .unwrap_or_default();
        format!(
            "{} (most common of {} distinct errors)",
            most_common,
            order.len()
        )
    };

    Err(ServiceError::UpstreamError(format!(
        "Failed to set environment variables {}: {}",
        keys.join(", "),
        reason
    )))
}
