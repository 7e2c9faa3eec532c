#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use diagnosis_proxy::{
    Result,
    config::{Config, LlmConfig, LogsConfig, ServerConfig},
    server,
};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::fs;
use tower::ServiceExt; // for `oneshot`
use wiremock::MockServer;

pub const TEST_API_KEY: &str = "test-api-key";
pub const COMPLETIONS_PATH: &str = "/openai/v1/chat/completions";

const BOUNDARY: &str = "diagnosis-proxy-test-boundary";

/// Create a test configuration pointing the LLM client at `base_url`
pub fn create_test_config(base_url: &str) -> Config {
    Config {
        llm: LlmConfig {
            base_url: base_url.to_string(),
            api_key: TEST_API_KEY.to_string(),
            ..LlmConfig::default()
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            allowed_origins: vec!["http://localhost:3000".to_string()],
            max_upload_bytes: None,
            logs: LogsConfig {
                level: "debug".to_string(),
            },
        },
    }
}

/// Config for a wiremock upstream mounted under `/openai/v1`
pub fn config_for_mock(mock_server: &MockServer) -> Config {
    create_test_config(&format!("{}/openai/v1", mock_server.uri()))
}

pub fn create_test_app(config: &Config) -> Router {
    server::build_app(config).expect("test app should build")
}

/// Upstream success body with one choice per entry
pub fn completion_body(contents: &[&str]) -> Value {
    let choices: Vec<Value> = contents
        .iter()
        .enumerate()
        .map(|(index, content)| {
            json!({
                "index": index,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            })
        })
        .collect();

    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "deepseek-r1-distill-llama-70b",
        "choices": choices,
        "usage": {"prompt_tokens": 40, "completion_tokens": 4, "total_tokens": 44}
    })
}

/// One part of a multipart form
pub enum FormPart<'a> {
    File {
        name: &'a str,
        filename: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

pub fn multipart_body(parts: &[FormPart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            FormPart::File {
                name,
                filename,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, filename, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
            FormPart::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn image_part(bytes: &[u8]) -> FormPart<'_> {
    FormPart::File {
        name: "image",
        filename: "forearm.jpg",
        content_type: "image/jpeg",
        bytes,
    }
}

pub fn description_part(value: &str) -> FormPart<'_> {
    FormPart::Text {
        name: "description",
        value,
    }
}

pub fn analyze_request(uri: &str, parts: &[FormPart<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

/// Send a request through the router and decode the JSON response body
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Create a temporary directory for test files
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Create a test config YAML file
pub async fn create_test_config_file(dir: &TempDir, content: &str) -> Result<String> {
    let config_path = dir.path().join("config.yaml");
    fs::write(&config_path, content).await?;
    Ok(config_path.to_string_lossy().to_string())
}

/// Sample configuration YAML for testing
pub const SAMPLE_CONFIG_YAML: &str = r#"
llm:
  base_url: "http://127.0.0.1:9999/openai/v1"
  api_key: "yaml-key"
  model: "llama-3.3-70b-versatile"
  max_tokens: 512
  temperature: 0.2
  timeout_secs: 10
server:
  host: "127.0.0.1"
  port: 8081
  allowed_origins:
    - "http://localhost:3000"
  max_upload_bytes: 1048576
  logs:
    level: "debug"
"#;
