use thiserror::Error;

/// Why a template was rejected. Template problems are always fatal; the
/// document is never consulted once one is found.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Unsupported {kind} at '{path}': template leaves must be strings")]
    UnsupportedValue { path: String, kind: &'static str },

    #[error("Invalid array at '{path}': {message}")]
    InvalidArray { path: String, message: String },

    #[error("Template root must be an object or an array, got {0}")]
    InvalidRoot(&'static str),
}
