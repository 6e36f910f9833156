use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use tracing::warn;

use crate::core::models::{Headers, IncomingRequest};

pub fn v_path<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = root;
    for key in path {
        cur = cur.get(*key)?;
    }
    Some(cur)
}

pub fn v_str<'a>(root: &'a Value, path: &[&str]) -> Option<&'a str> {
    v_path(root, path).and_then(|v| v.as_str())
}

/// Returns the first string found among several candidate paths.
fn first_str<'a>(root: &'a Value, paths: &[&[&str]]) -> Option<&'a str> {
    paths.iter().find_map(|p| v_str(root, p))
}

pub fn get_header_value<'a>(headers: &'a Value, name: &str) -> Option<&'a str> {
    if let Some(v) = headers.get(name).and_then(|s| s.as_str()) {
        return Some(v);
    }
    headers.as_object().and_then(|map| {
        map.iter().find_map(|(k, v)| {
            if k.eq_ignore_ascii_case(name) {
                v.as_str()
            } else {
                None
            }
        })
    })
}

/// Builds an [`IncomingRequest`] from a platform event. Fields the event does
/// not carry stay `None`; the adapter supplies defaults later.
pub fn incoming_request_from_event(payload: &Value) -> IncomingRequest {
    let method = first_str(
        payload,
        &[&["httpMethod"], &["requestContext", "http", "method"], &["method"]],
    )
    .map(ToString::to_string);

    let path = first_str(payload, &[&["rawPath"], &["path"]]).map(ToString::to_string);

    let query_string = first_str(payload, &[&["rawQueryString"], &["query_string"]])
        .map(ToString::to_string)
        .or_else(|| query_from_parameters(payload));

    let mut headers = payload.get("headers").map(|h| {
        serde_json::from_value::<Headers>(h.clone()).unwrap_or_else(|e| {
            warn!("Ignoring malformed headers: {}", e);
            Headers::default()
        })
    });

    // HTTP API v2 events move cookies out of the headers into their own array.
    if let Some(cookie) = cookie_header(payload) {
        let headers = headers.get_or_insert_with(Headers::default);
        if headers.get("Cookie").is_none() {
            headers.insert("Cookie", cookie);
        }
    }

    let body = payload.get("body").and_then(|b| match b {
        Value::Null => None,
        Value::String(s) => Some(decode_body(s, is_base64(payload))),
        other => Some(other.to_string().into_bytes()),
    });

    IncomingRequest {
        method,
        path,
        query_string,
        headers,
        body,
    }
}

fn cookie_header(payload: &Value) -> Option<String> {
    let cookies: Vec<&str> = payload
        .get("cookies")
        .and_then(Value::as_array)?
        .iter()
        .filter_map(Value::as_str)
        .collect();
    if cookies.is_empty() {
        None
    } else {
        Some(cookies.join("; "))
    }
}

fn is_base64(payload: &Value) -> bool {
    payload
        .get("isBase64Encoded")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn decode_body(body: &str, base64_encoded: bool) -> Vec<u8> {
    if !base64_encoded {
        return body.as_bytes().to_vec();
    }
    STANDARD.decode(body).unwrap_or_else(|e| {
        warn!("Body flagged as base64 but failed to decode, passing raw: {}", e);
        body.as_bytes().to_vec()
    })
}

/// Rebuilds a query string from parameter maps when the event has no raw
/// query. Keys are sorted so the result does not depend on map order.
fn query_from_parameters(payload: &Value) -> Option<String> {
    let mut pairs: Vec<(String, String)> = Vec::new();

    if let Some(multi) = payload
        .get("multiValueQueryStringParameters")
        .and_then(Value::as_object)
    {
        for (key, values) in multi {
            for value in values.as_array().into_iter().flatten() {
                if let Some(v) = value.as_str() {
                    pairs.push((key.clone(), v.to_string()));
                }
            }
        }
    } else if let Some(single) = payload
        .get("queryStringParameters")
        .and_then(Value::as_object)
    {
        for (key, value) in single {
            if let Some(v) = value.as_str() {
                pairs.push((key.clone(), v.to_string()));
            }
        }
    } else {
        return None;
    }

    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    Some(
        pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&"),
    )
}
