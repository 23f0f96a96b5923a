use crate::config::{GenerationMode, GenerationSettings};
use crate::models::{SketchImage, UiDescription, UploadResponse};
use crate::services::extraction::extract_json;
use crate::services::metrics;
use crate::services::prompt::{build_prompt, response_schema};
use crate::services::providers::{FinishReason, GenerationParams, ProviderError};
use crate::startup::AppState;
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use std::time::Instant;

/// Multipart field name the frontend uses for the sketch.
pub const FILE_FIELD: &str = "file";

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// `POST /api/upload`: interpret one sketch image.
pub async fn upload_sketch(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let result = match multipart {
        Ok(multipart) => process_upload(&state, multipart).await,
        Err(e) => Err(AppError::BadRequest(anyhow::anyhow!(
            "Failed to read upload: {}",
            e.body_text()
        ))),
    };

    match &result {
        Ok(_) => metrics::record_upload("success"),
        Err(e) => metrics::record_upload(e.code()),
    }

    result.map(Json)
}

async fn process_upload(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<UploadResponse, AppError> {
    let image = read_sketch(&mut multipart).await?;

    let generation = &state.config.generation;
    let provider = &state.provider;

    tracing::info!(
        filename = image.filename.as_deref().unwrap_or("-"),
        mime_type = %image.mime_type,
        size = image.len(),
        mode = %generation.mode,
        model = provider.model(),
        "Sketch upload received"
    );

    let prompt = build_prompt(generation.mode);
    let params = generation_params(generation);

    let started = Instant::now();
    let result = provider.generate(&prompt, &image, &params).await;
    metrics::record_provider_latency(
        provider.name(),
        provider.model(),
        started.elapsed().as_secs_f64(),
    );

    let response = result.map_err(|e| {
        metrics::record_provider_error(provider.name(), e.kind());
        tracing::error!(provider = provider.name(), error = %e, "Vision provider call failed");
        provider_error_to_app_error(e)
    })?;

    if response.finish_reason == FinishReason::Length {
        tracing::warn!(
            output_tokens = response.output_tokens,
            "Model output hit the token limit and may be truncated"
        );
    }

    tracing::debug!(
        raw_response = %response.text,
        input_tokens = response.input_tokens,
        output_tokens = response.output_tokens,
        "Model response received"
    );

    let extracted = extract_json(&response.text).map_err(|e| {
        metrics::record_extraction("failed");
        tracing::warn!(error = %e, response_len = response.text.len(), "Model response is not JSON");
        AppError::InvalidModelResponse(format!("Model did not return valid JSON: {}", e))
    })?;
    metrics::record_extraction(extracted.method.as_str());

    match UiDescription::conform(&extracted.value) {
        Ok(ui) => {
            tracing::info!(
                screen_name = %ui.screen_name,
                sections = ui.sections.len(),
                elements = ui.sections.iter().map(|s| s.elements.len()).sum::<usize>(),
                extraction = extracted.method.as_str(),
                "Sketch interpreted"
            );
        }
        Err(e) => {
            metrics::record_schema_mismatch();
            tracing::warn!(error = %e, "Model output does not match the UI description shape");
            if generation.strict_schema {
                return Err(AppError::InvalidModelResponse(format!(
                    "Model output does not match the UI description schema: {}",
                    e
                )));
            }
        }
    }

    Ok(UploadResponse::success(image.filename, extracted.value))
}

/// Provider parameters for the configured generation mode.
pub fn generation_params(settings: &GenerationSettings) -> GenerationParams {
    match settings.mode {
        GenerationMode::Structured => GenerationParams {
            temperature: Some(0.0),
            max_tokens: Some(settings.max_output_tokens),
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(response_schema()),
        },
        GenerationMode::Freeform => GenerationParams::default(),
    }
}

fn provider_error_to_app_error(error: ProviderError) -> AppError {
    match error {
        ProviderError::EmptyResponse => {
            AppError::InvalidModelResponse("Model returned an empty response".to_string())
        }
        other => AppError::UpstreamUnavailable(format!("Model provider call failed: {}", other)),
    }
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(anyhow::anyhow!("Failed to read upload: {}", e.body_text()))
    }
}

/// Read the sketch file from the multipart body into memory.
async fn read_sketch(multipart: &mut Multipart) -> Result<SketchImage, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let is_file = field.name() == Some(FILE_FIELD) || field.file_name().is_some();
        if !is_file {
            continue;
        }

        let filename = field.file_name().map(|s| s.to_string());
        let mime_type = resolve_mime_type(field.content_type(), filename.as_deref());
        let bytes = field.bytes().await.map_err(multipart_error)?.to_vec();

        if bytes.is_empty() {
            return Err(AppError::BadRequest(anyhow::anyhow!("Uploaded file is empty")));
        }

        if !mime_type.starts_with("image/") {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Unsupported content type '{}', expected an image",
                mime_type
            )));
        }

        return Ok(SketchImage {
            bytes,
            mime_type,
            filename,
        });
    }

    Err(AppError::BadRequest(anyhow::anyhow!("No file uploaded")))
}

/// Declared content type, or a guess from the filename when none was sent.
fn resolve_mime_type(declared: Option<&str>, filename: Option<&str>) -> String {
    let declared = declared
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
        .filter(|ct| !ct.is_empty() && ct != DEFAULT_MIME_TYPE);

    declared
        .or_else(|| {
            filename
                .and_then(|name| mime_guess::from_path(name).first())
                .map(|m| m.essence_str().to_string())
        })
        .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string())
}
