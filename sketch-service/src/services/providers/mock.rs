//! Mock provider implementation for testing.

use super::{FinishReason, GenerationParams, ProviderError, ProviderResponse, VisionProvider};
use crate::models::SketchImage;
use async_trait::async_trait;
use std::sync::Mutex;

/// A call seen by the mock.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub mime_type: String,
    pub image_len: usize,
    pub params: GenerationParams,
}

/// Mock vision provider that answers every call with the same canned result.
pub struct MockVisionProvider {
    reply: Result<String, ProviderError>,
    healthy: bool,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockVisionProvider {
    /// Reply with `text` on every call.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            reply: Ok(text.into()),
            healthy: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fail every call and every health check with `error`.
    pub fn failing(error: ProviderError) -> Self {
        Self {
            reply: Err(error),
            healthy: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Calls received so far, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl VisionProvider for MockVisionProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-vision"
    }

    async fn generate(
        &self,
        prompt: &str,
        image: &SketchImage,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(RecordedCall {
                prompt: prompt.to_string(),
                mime_type: image.mime_type.clone(),
                image_len: image.len(),
                params: params.clone(),
            });

        let text = self.reply.clone()?;

        Ok(ProviderResponse {
            input_tokens: prompt.len() as i32 / 4,
            output_tokens: text.len() as i32 / 4,
            text,
            finish_reason: FinishReason::Complete,
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.healthy {
            Ok(())
        } else {
            Err(ProviderError::NotConfigured(
                "Mock vision provider set to fail".to_string(),
            ))
        }
    }
}
