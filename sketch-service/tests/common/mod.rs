#![allow(dead_code)]

use sketch_service::config::SketchConfig;
use sketch_service::services::providers::mock::MockVisionProvider;
use sketch_service::startup::{AppState, Application};
use std::sync::Arc;

pub const LOGIN_JSON: &str = r#"{
  "screen_name": "Login",
  "layout": "single-column",
  "sections": [
    {
      "title": "Login form",
      "elements": [
        { "type": "heading", "label": "Login" },
        { "type": "input", "label": "Username", "placeholder": "Enter username" },
        { "type": "button", "label": "Sign in", "size": "medium", "position": "center" }
      ]
    }
  ]
}"#;

/// A tiny stand-in for a PNG; the mock never decodes it.
pub const SKETCH_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake-sketch";

pub const BOUNDARY: &str = "sketch-test-boundary";

pub struct TestApp {
    pub address: String,
    pub provider: Arc<MockVisionProvider>,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawn the app on a random port with the given mock provider.
    pub async fn spawn(provider: MockVisionProvider) -> Self {
        Self::spawn_with(provider, |_| {}).await
    }

    pub async fn spawn_with(
        provider: MockVisionProvider,
        configure: impl FnOnce(&mut SketchConfig),
    ) -> Self {
        let mut config = SketchConfig::with_api_key("test-api-key");
        config.common.port = 0;
        configure(&mut config);

        let provider = Arc::new(provider);
        let app = Application::build_with_provider(config, provider.clone())
            .await
            .expect("Failed to build test application");
        let address = format!("http://127.0.0.1:{}", app.port());

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        TestApp {
            address,
            provider,
            client: reqwest::Client::new(),
        }
    }

    /// Upload `bytes` as the `file` field.
    pub async fn upload(&self, bytes: &[u8], filename: &str, mime: &str) -> reqwest::Response {
        let form = reqwest::multipart::Form::new().part(
            "file",
            reqwest::multipart::Part::bytes(bytes.to_vec())
                .file_name(filename.to_string())
                .mime_str(mime)
                .unwrap(),
        );

        self.client
            .post(format!("{}/api/upload", self.address))
            .multipart(form)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn upload_sketch(&self) -> reqwest::Response {
        self.upload(SKETCH_BYTES, "login.png", "image/png").await
    }
}

/// App state for router-level tests.
pub fn state_with(provider: MockVisionProvider, configure: impl FnOnce(&mut SketchConfig)) -> AppState {
    let mut config = SketchConfig::with_api_key("test-api-key");
    configure(&mut config);
    AppState::new(config, Arc::new(provider))
}

/// Hand-built multipart body with a single part.
pub fn multipart_body(
    field_name: &str,
    filename: Option<&str>,
    content_type: Option<&str>,
    data: &[u8],
) -> Vec<u8> {
    let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", field_name);
    if let Some(filename) = filename {
        disposition.push_str(&format!("; filename=\"{}\"", filename));
    }

    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n{}\r\n", BOUNDARY, disposition).as_bytes());
    if let Some(content_type) = content_type {
        body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
    }
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}
