//! Response builders for the platform's JSON response shape.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};

use crate::core::models::OutgoingResponse;

/// Serializes an [`OutgoingResponse`] for the platform. UTF-8 bodies are sent
/// as text; anything else is base64-encoded and flagged as such.
#[must_use]
pub fn to_platform_response(response: &OutgoingResponse) -> Value {
    let (body, encoded) = match std::str::from_utf8(&response.body) {
        Ok(text) => (text.to_string(), false),
        Err(_) => (STANDARD.encode(&response.body), true),
    };

    json!({
        "statusCode": response.status,
        "headers": response.headers,
        "body": body,
        "isBase64Encoded": encoded,
    })
}
