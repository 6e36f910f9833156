use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde_json::Value;

use crate::errors::GatewayError;

/// Request as received from the platform. Every field may be missing;
/// defaults are applied when the request is translated into a context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncomingRequest {
    pub method: Option<String>,
    pub path: Option<String>,
    pub query_string: Option<String>,
    pub headers: Option<Headers>,
    pub body: Option<Vec<u8>>,
}

impl IncomingRequest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_query_string(mut self, query: impl Into<String>) -> Self {
        self.query_string = Some(query.into());
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Headers::default)
            .insert(name, value);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Header pairs in arrival order. Lookups by name are case-insensitive,
/// with an exact-case match preferred.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// Case-sensitive lookup; the last pair with this exact name wins.
    #[must_use]
    pub fn get_exact(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_exact(name).or_else(|| {
            self.0
                .iter()
                .rev()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Headers(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for Headers {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HeadersVisitor;

        impl<'de> Visitor<'de> for HeadersVisitor {
            type Value = Headers;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of header names to values, or null")
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Headers, E> {
                Ok(Headers::default())
            }

            fn visit_none<E: serde::de::Error>(self) -> Result<Headers, E> {
                Ok(Headers::default())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Headers, A::Error> {
                let mut headers = Headers::default();
                while let Some((name, value)) = map.next_entry::<String, Value>()? {
                    match value {
                        Value::Null => {}
                        Value::String(s) => headers.insert(name, s),
                        other => headers.insert(name, other.to_string()),
                    }
                }
                Ok(headers)
            }
        }

        deserializer.deserialize_any(HeadersVisitor)
    }
}

/// Slot the application writes its status and headers into, plus the body
/// accumulated from its chunks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedResponse {
    status: Option<String>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl CapturedResponse {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Response-start callback. A second call replaces the first.
    pub fn start_response<S, I, K, V>(&mut self, status: S, headers: I)
    where
        S: Into<String>,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.status = Some(status.into());
        self.headers = headers
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
    }

    #[must_use]
    pub fn status_line(&self) -> Option<&str> {
        self.status.as_deref()
    }

    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn push_chunk(&mut self, chunk: &[u8]) {
        self.body.extend_from_slice(chunk);
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Turns the captured pieces into the platform response.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::StatusLine`] when the status line does not
    /// start with a numeric code.
    pub fn finalize(self) -> Result<OutgoingResponse, GatewayError> {
        let status = match self.status.as_deref().and_then(|s| s.split_whitespace().next()) {
            None => 200,
            Some(code) => code
                .parse::<u16>()
                .map_err(|_| GatewayError::StatusLine(self.status.clone().unwrap_or_default()))?,
        };

        Ok(OutgoingResponse {
            body: self.body,
            status,
            headers: self.headers.into_iter().collect(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingResponse {
    pub body: Vec<u8>,
    pub status: u16,
    pub headers: BTreeMap<String, String>,
}

impl Default for OutgoingResponse {
    fn default() -> Self {
        Self {
            body: Vec::new(),
            status: 200,
            headers: BTreeMap::new(),
        }
    }
}

impl OutgoingResponse {
    #[must_use]
    pub fn new(body: impl Into<Vec<u8>>, status: u16, headers: BTreeMap<String, String>) -> Self {
        Self {
            body: body.into(),
            status,
            headers,
        }
    }

    #[must_use]
    pub fn plain_text(status: u16, body: impl Into<Vec<u8>>) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(
            "Content-Type".to_string(),
            "text/plain; charset=utf-8".to_string(),
        );
        Self::new(body, status, headers)
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}
