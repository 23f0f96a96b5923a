pub mod extraction;
pub mod metrics;
pub mod prompt;
pub mod providers;

pub use extraction::{extract_json, ExtractionError, ExtractionMethod};
pub use providers::{GenerationParams, ProviderError, VisionProvider};
