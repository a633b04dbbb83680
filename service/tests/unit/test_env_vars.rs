//! Batch environment variable tests

use std::collections::BTreeMap;

use launchpad::errors::ServiceError;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::test_platform;

const ENV_PATH: &str = "/v10/projects/prj_1/env";

fn vars(keys: &[&str]) -> BTreeMap<String, String> {
    keys.iter()
        .map(|k| (k.to_string(), format!("value-of-{}", k)))
        .collect()
}

async fn mock_env(server: &MockServer, key: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(ENV_PATH))
        .and(body_partial_json(json!({ "key": key })))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

fn created() -> ResponseTemplate {
    ResponseTemplate::new(201).set_body_json(json!({ "created": {} }))
}

#[tokio::test]
async fn test_every_key_submitted_once() {
    let server = MockServer::start().await;
    for key in ["OPENAI_API_KEY", "DATABASE_URL", "MIGRATION_SECRET"] {
        mock_env(&server, key, created()).await;
    }

    let platform = test_platform(&server.uri());
    platform
        .set_env_vars(
            "tok",
            None,
            "prj_1",
            &vars(&["OPENAI_API_KEY", "DATABASE_URL", "MIGRATION_SECRET"]),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_variables_are_encrypted_for_all_targets() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENV_PATH))
        .and(query_param("teamId", "team_1"))
        .and(header("authorization", "Bearer tok"))
        .and(body_partial_json(json!({
            "key": "OPENAI_API_KEY",
            "value": "value-of-OPENAI_API_KEY",
            "type": "encrypted",
            "target": ["production", "preview", "development"]
        })))
        .respond_with(created())
        .expect(1)
        .mount(&server)
        .await;

    let platform = test_platform(&server.uri());
    platform
        .set_env_vars("tok", Some("team_1"), "prj_1", &vars(&["OPENAI_API_KEY"]))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_conflict_names_key_and_siblings_still_run() {
    let server = MockServer::start().await;
    mock_env(
        &server,
        "OPENAI_API_KEY",
        ResponseTemplate::new(409).set_body_json(json!({
            "error": {
                "code": "ENV_CONFLICT",
                "message": "A variable with the same name already exists."
            }
        })),
    )
    .await;
    mock_env(&server, "DATABASE_URL", created()).await;
    mock_env(&server, "MIGRATION_SECRET", created()).await;

    let platform = test_platform(&server.uri());
    let err = platform
        .set_env_vars(
            "tok",
            None,
            "prj_1",
            &vars(&["OPENAI_API_KEY", "DATABASE_URL", "MIGRATION_SECRET"]),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::EnvVarConflict(_)));
    let message = err.to_string();
    assert!(message.contains("OPENAI_API_KEY"));
    assert!(message.contains("already exist"));
    assert!(!message.contains("DATABASE_URL"));
}

#[tokio::test]
async fn test_bad_request_with_exists_code_is_conflict() {
    let server = MockServer::start().await;
    mock_env(
        &server,
        "DATABASE_URL",
        ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": "ENV_ALREADY_EXISTS", "message": "Duplicate" }
        })),
    )
    .await;
    mock_env(
        &server,
        "OPENAI_API_KEY",
        ResponseTemplate::new(500).set_body_json(json!({ "error": { "message": "Internal" } })),
    )
    .await;

    let platform = test_platform(&server.uri());
    let err = platform
        .set_env_vars("tok", None, "prj_1", &vars(&["DATABASE_URL", "OPENAI_API_KEY"]))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::EnvVarConflict(_)));
    assert!(err.to_string().contains("DATABASE_URL"));
    assert!(!err.to_string().contains("OPENAI_API_KEY"));
}

#[tokio::test]
async fn test_non_conflict_failures_are_aggregated() {
    let server = MockServer::start().await;
    for key in ["DATABASE_URL", "OPENAI_API_KEY"] {
        mock_env(
            &server,
            key,
            ResponseTemplate::new(403)
                .set_body_json(json!({ "error": { "message": "Not authorized" } })),
        )
        .await;
    }
    mock_env(&server, "MIGRATION_SECRET", created()).await;

    let platform = test_platform(&server.uri());
    let err = platform
        .set_env_vars(
            "tok",
            None,
            "prj_1",
            &vars(&["DATABASE_URL", "MIGRATION_SECRET", "OPENAI_API_KEY"]),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::UpstreamError(_)));
    assert_eq!(
        err.to_string(),
        "Failed to set environment variables DATABASE_URL, OPENAI_API_KEY: Not authorized"
    );
}

#[tokio::test]
async fn test_empty_success_body_counts_as_created() {
    let server = MockServer::start().await;
    mock_env(&server, "OPENAI_API_KEY", ResponseTemplate::new(204)).await;
    mock_env(&server, "DATABASE_URL", created()).await;

    let platform = test_platform(&server.uri());
    platform
        .set_env_vars("tok", None, "prj_1", &vars(&["DATABASE_URL", "OPENAI_API_KEY"]))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_unreachable_platform_reports_every_key() {
    // Nothing listens on port 1
    let platform = test_platform("http://127.0.0.1:1");
    let err = platform
        .set_env_vars("tok", None, "prj_1", &vars(&["DATABASE_URL", "OPENAI_API_KEY"]))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::UpstreamError(_)));
    let message = err.to_string();
    assert!(message.starts_with("Failed to set environment variables DATABASE_URL, OPENAI_API_KEY: "));
    assert!(!message.contains("already exist"));
}
