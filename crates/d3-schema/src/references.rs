//! Reachability of URIs embedded in claims

use crate::error::{Result, SchemaError};
use d3_domain::traits::ReferenceResolver;
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use serde_json::Value;
use std::collections::BTreeSet;
use std::time::Duration;

/// Default time allowed for one reachability check (10 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Every distinct `http`/`https` URI found in string values of `value`
///
/// # Examples
///
/// ```
/// use d3_schema::collect_uris;
/// use serde_json::json;
///
/// let uris = collect_uris(&json!({
///     "manufacturerUri": "https://example.com",
///     "cpe": "cpe:2.3:h:acme:cam",
///     "tags": ["https://example.com", "camera"]
/// }));
/// assert_eq!(uris.len(), 1);
/// ```
pub fn collect_uris(value: &Value) -> BTreeSet<String> {
    let mut uris = BTreeSet::new();
    let mut stack = vec![value];
    while let Some(value) = stack.pop() {
        match value {
            Value::String(text) => {
                if is_web_uri(text) {
                    uris.insert(text.clone());
                }
            }
            Value::Array(items) => stack.extend(items),
            Value::Object(map) => stack.extend(map.values()),
            _ => {}
        }
    }
    uris
}

fn is_web_uri(text: &str) -> bool {
    Url::parse(text)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host().is_some())
        .unwrap_or(false)
}

/// Checks URIs with a single HTTP `HEAD` request each
///
/// Success and redirect statuses count as reachable, as does
/// `405 Method Not Allowed` (the server is there, it just refuses `HEAD`).
#[derive(Debug, Clone)]
pub struct HttpReferenceResolver {
    client: Client,
}

impl HttpReferenceResolver {
    /// Resolver whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("d3-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SchemaError::Http(e.to_string()))?;
        Ok(Self { client })
    }
}

impl ReferenceResolver for HttpReferenceResolver {
    fn resolves(&self, uri: &str) -> bool {
        match self.client.head(uri).send() {
            Ok(response) => {
                let status = response.status();
                let reachable =
                    status.is_success() || status.is_redirection() || status == StatusCode::METHOD_NOT_ALLOWED;
                if !reachable {
                    tracing::debug!("{} answered {}", uri, status);
                }
                reachable
            }
            Err(e) => {
                tracing::debug!("{} is unreachable: {}", uri, e);
                false
            }
        }
    }
}
