//! Translation of an [`IncomingRequest`] into the gateway environment the
//! inner application reads.
//!
//! Translation never fails: every missing field falls back to a default.

use std::collections::BTreeMap;
use std::io::{self, Cursor, Read};

use crate::core::config::AdapterConfig;
use crate::core::models::IncomingRequest;

pub const HEADER_PREFIX: &str = "HTTP_";
pub const DEFAULT_PORT: &str = "80";
pub const FORWARDED_PROTO_HEADER: &str = "X-Forwarded-Proto";

/// Header names carried as dedicated keys instead of under [`HEADER_PREFIX`].
const RESERVED_KEYS: [&str; 2] = ["CONTENT_TYPE", "CONTENT_LENGTH"];

/// Per-request environment handed to the application.
#[derive(Debug)]
pub struct GatewayContext {
    pub request_method: String,
    pub script_name: String,
    pub path_info: String,
    pub query_string: String,
    pub content_type: String,
    pub content_length: String,
    pub server_name: String,
    pub server_port: String,
    pub server_protocol: String,
    pub url_scheme: String,
    /// `HTTP_*` keys, one per non-reserved header.
    pub headers: BTreeMap<String, String>,
    pub version: (u8, u8),
    pub multithread: bool,
    pub multiprocess: bool,
    pub run_once: bool,
    input: Cursor<Vec<u8>>,
}

impl GatewayContext {
    #[must_use]
    pub fn from_request(request: IncomingRequest, config: &AdapterConfig) -> Self {
        let IncomingRequest {
            method,
            path,
            query_string,
            headers,
            body,
        } = request;
        let headers = headers.unwrap_or_default();
        let body = body.unwrap_or_default();

        let (server_name, server_port) = match headers.get("Host") {
            Some(host) => split_host(host),
            None => (config.default_host.clone(), DEFAULT_PORT.to_string()),
        };

        // Exact-case match first, then any casing.
        let url_scheme = if headers.get(FORWARDED_PROTO_HEADER) == Some("https") {
            "https"
        } else {
            "http"
        };

        let mut http_headers = BTreeMap::new();
        for (name, value) in headers.iter() {
            let key = normalize_header_name(name);
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            http_headers.insert(format!("{HEADER_PREFIX}{key}"), value.to_string());
        }

        Self {
            request_method: method
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "GET".to_string()),
            script_name: String::new(),
            path_info: normalize_path(path.as_deref()),
            query_string: query_string.unwrap_or_default(),
            content_type: headers.get("Content-Type").unwrap_or_default().to_string(),
            content_length: body.len().to_string(),
            server_name,
            server_port,
            server_protocol: "HTTP/1.1".to_string(),
            url_scheme: url_scheme.to_string(),
            headers: http_headers,
            version: (1, 0),
            multithread: false,
            multiprocess: true,
            run_once: false,
            input: Cursor::new(body),
        }
    }

    /// Looks up a canonical key (`REQUEST_METHOD`, `HTTP_ACCEPT`,
    /// `gateway.url_scheme`, ...).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        let value = match key {
            "REQUEST_METHOD" => &self.request_method,
            "SCRIPT_NAME" => &self.script_name,
            "PATH_INFO" => &self.path_info,
            "QUERY_STRING" => &self.query_string,
            "CONTENT_TYPE" => &self.content_type,
            "CONTENT_LENGTH" => &self.content_length,
            "SERVER_NAME" => &self.server_name,
            "SERVER_PORT" => &self.server_port,
            "SERVER_PROTOCOL" => &self.server_protocol,
            "gateway.url_scheme" => &self.url_scheme,
            other => return self.headers.get(other).map(String::as_str),
        };
        Some(value.as_str())
    }

    /// All string-valued keys as one mapping.
    #[must_use]
    pub fn environ(&self) -> BTreeMap<String, String> {
        let mut env = self.headers.clone();
        for key in [
            "REQUEST_METHOD",
            "SCRIPT_NAME",
            "PATH_INFO",
            "QUERY_STRING",
            "CONTENT_TYPE",
            "CONTENT_LENGTH",
            "SERVER_NAME",
            "SERVER_PORT",
            "SERVER_PROTOCOL",
            "gateway.url_scheme",
        ] {
            if let Some(value) = self.get(key) {
                env.insert(key.to_string(), value.to_string());
            }
        }
        env
    }

    /// Readable request body stream.
    pub fn input(&mut self) -> &mut Cursor<Vec<u8>> {
        &mut self.input
    }

    /// Reads whatever is left of the body stream.
    ///
    /// # Errors
    ///
    /// Only fails if the underlying reader does, which an in-memory body never does.
    pub fn read_body(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.input.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

/// `Content-Type` → `CONTENT_TYPE`.
#[must_use]
pub fn normalize_header_name(name: &str) -> String {
    name.to_ascii_uppercase().replace('-', "_")
}

#[must_use]
pub fn normalize_path(path: Option<&str>) -> String {
    match path {
        None | Some("") => "/".to_string(),
        Some(p) if p.starts_with('/') => p.to_string(),
        Some(p) => format!("/{p}"),
    }
}

/// Splits a Host header on its last `:` into server name and port.
#[must_use]
pub fn split_host(host: &str) -> (String, String) {
    // `[::1]` is an IPv6 literal without a port.
    if host.ends_with(']') {
        return (host.to_string(), DEFAULT_PORT.to_string());
    }
    match host.rsplit_once(':') {
        Some((name, "")) => (name.to_string(), DEFAULT_PORT.to_string()),
        Some((name, port)) => (name.to_string(), port.to_string()),
        None => (host.to_string(), DEFAULT_PORT.to_string()),
    }
}
