//! Error types for engine operations.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Operation-local failures. None of these invalidate the item list;
/// the session stays usable after any of them is reported.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The referenced item is no longer on the sheet.
    #[error("item {0} not found")]
    NotFound(u32),

    /// Transform attempted on a locked item.
    #[error("item {0} is locked")]
    Locked(u32),

    /// Uploaded bytes could not be decoded as a raster image.
    #[error("could not decode \"{filename}\" as an image")]
    Decode { filename: String },

    /// Composition or encoding failed during print export.
    #[error("export failed: {0}")]
    Export(String),

    /// Malformed command envelope or out-of-range configuration.
    #[error("invalid command: {0}")]
    InvalidCommand(String),
}

impl EngineError {
    /// JSON error envelope handed back over the command boundary.
    pub fn to_json(&self) -> String {
        serde_json::json!({ "error": self.to_string() }).to_string()
    }
}

impl From<EngineError> for JsValue {
    fn from(err: EngineError) -> JsValue {
        JsValue::from_str(&err.to_string())
    }
}
