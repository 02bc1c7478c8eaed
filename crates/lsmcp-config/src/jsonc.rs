//! JSON-with-comments tolerance.
//!
//! Editors such as VS Code and Zed store settings as JSONC: `//` line
//! comments, `/* */` block comments and trailing commas before a closing
//! bracket. Parsing is delegated to `jsonc-parser`; this module fixes the
//! accepted dialect and maps its errors.

use jsonc_parser::ParseOptions;
use serde_json::Value;
use thiserror::Error;

/// Errors from the tolerant parse.
#[derive(Debug, Error)]
pub enum JsoncError {
    #[error("invalid JSONC: {0}")]
    Syntax(String),

    #[error("document is empty")]
    Empty,

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Comments and trailing commas only; property names must stay quoted.
fn options() -> ParseOptions {
    ParseOptions {
        allow_comments: true,
        allow_trailing_commas: true,
        allow_loose_object_property_names: false,
        ..Default::default()
    }
}

/// Parse JSONC text into a JSON value.
pub fn parse_tolerant(input: &str) -> Result<Value, JsoncError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    jsonc_parser::parse_to_serde_value(input, &options())
        .map_err(|e| JsoncError::Syntax(e.to_string()))?
        .ok_or(JsoncError::Empty)
}
