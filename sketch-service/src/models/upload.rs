use serde::Serialize;

/// An uploaded sketch held in memory for the duration of one request.
#[derive(Debug, Clone)]
pub struct SketchImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub filename: Option<String>,
}

impl SketchImage {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Success envelope for `POST /api/upload`.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub status: &'static str,
    pub filename: Option<String>,
    pub ui_description: serde_json::Value,
}

impl UploadResponse {
    pub fn success(filename: Option<String>, ui_description: serde_json::Value) -> Self {
        Self {
            status: "success",
            filename,
            ui_description,
        }
    }
}
