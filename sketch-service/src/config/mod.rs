use secrecy::Secret;
use service_core::config::{self as core_config, get_env, get_env_parsed};
use service_core::error::AppError;
use std::fmt;
use std::str::FromStr;

/// Default Gemini model used for sketch interpretation.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default Gemini REST base URL.
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default upload cap (20MB).
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

const DEFAULT_MAX_OUTPUT_TOKENS: i32 = 8192;
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct SketchConfig {
    pub common: core_config::Config,
    pub gemini: GeminiSettings,
    pub generation: GenerationSettings,
    /// Uploads above this size are rejected with 413.
    pub max_upload_bytes: usize,
}

#[derive(Clone)]
pub struct GeminiSettings {
    pub api_key: Secret<String>,
    pub model: String,
    pub api_base: String,
    pub timeout_secs: u64,
}

impl fmt::Debug for GeminiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiSettings")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub mode: GenerationMode,
    pub max_output_tokens: i32,
    /// Reject model output that does not match the UI description shape.
    pub strict_schema: bool,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            mode: GenerationMode::Structured,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            strict_schema: false,
        }
    }
}

/// How the model is asked to produce JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationMode {
    /// Response MIME type, schema and sampling are pinned on the provider side.
    #[default]
    Structured,
    /// The prompt text alone asks for JSON.
    Freeform,
}

impl GenerationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::Structured => "structured",
            GenerationMode::Freeform => "freeform",
        }
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structured" | "schema" => Ok(GenerationMode::Structured),
            "freeform" | "free-form" | "text" => Ok(GenerationMode::Freeform),
            other => Err(format!(
                "unknown generation mode '{}', expected 'structured' or 'freeform'",
                other
            )),
        }
    }
}

impl SketchConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        Ok(SketchConfig {
            common,
            gemini: GeminiSettings {
                api_key: Secret::new(get_env("GEMINI_API_KEY", None)?),
                model: get_env("GEMINI_MODEL", Some(DEFAULT_MODEL))?,
                api_base: get_env("GEMINI_API_BASE", Some(DEFAULT_GEMINI_API_BASE))?,
                timeout_secs: get_env_parsed("GEMINI_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            },
            generation: GenerationSettings {
                mode: get_env("SKETCH_GENERATION_MODE", Some("structured"))?
                    .parse::<GenerationMode>()
                    .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
                max_output_tokens: get_env_parsed(
                    "SKETCH_MAX_OUTPUT_TOKENS",
                    DEFAULT_MAX_OUTPUT_TOKENS,
                )?,
                strict_schema: get_env_parsed("SKETCH_STRICT_SCHEMA", false)?,
            },
            max_upload_bytes: get_env_parsed("SKETCH_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }

    /// Configuration for tests and embedding: everything at its default.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        SketchConfig {
            common: core_config::Config { port: 0 },
            gemini: GeminiSettings {
                api_key: Secret::new(api_key.into()),
                model: DEFAULT_MODEL.to_string(),
                api_base: DEFAULT_GEMINI_API_BASE.to_string(),
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            },
            generation: GenerationSettings::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}
