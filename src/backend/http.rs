//! HTTP transport for the cache service.
//!
//! - `GET  {endpoint}/v1/ping` liveness probe on connect
//! - `POST {endpoint}/v1/prune` JSON [`PruneRequest`] body, newline-delimited
//!   JSON [`CacheRecord`]s in the reply

use super::{BackendConnector, CacheBackend};
use crate::config::PruneConfig;
use crate::models::{CacheRecord, PruneRequest};
use crate::observability::SessionContext;
use crate::{Error, Result};
use reqwest::Url;
use std::time::Duration;
use tracing::{debug, instrument};

/// Header carrying the session identifier.
pub const SESSION_HEADER: &str = "X-Buildprune-Session";

/// Header carrying the namespace label.
pub const NAMESPACE_HEADER: &str = "X-Buildprune-Namespace";

const PING_PATH: &str = "v1/ping";
const PRUNE_PATH: &str = "v1/prune";

/// Connects to a cache service over HTTP.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    endpoint: String,
    connect_timeout: Option<Duration>,
}

impl HttpConnector {
    /// Creates a connector for `endpoint` (e.g. `http://127.0.0.1:8235`).
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            connect_timeout: None,
        }
    }

    /// Creates a connector from configuration.
    #[must_use]
    pub fn from_config(config: &PruneConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            connect_timeout: config.connect_timeout(),
        }
    }

    /// Sets the TCP connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    fn connection_error(&self, cause: impl ToString) -> Error {
        Error::Connection {
            endpoint: self.endpoint.clone(),
            cause: cause.to_string(),
        }
    }

    /// Parses the endpoint as a base URL that relative paths extend.
    fn base_url(&self) -> Result<Url> {
        let mut raw = self.endpoint.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let url = Url::parse(&raw).map_err(|e| self.connection_error(format!("invalid URL: {e}")))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(self.connection_error(format!("unsupported scheme '{other}'"))),
        }
    }
}

impl BackendConnector for HttpConnector {
    type Backend = HttpBackend;

    #[instrument(
        name = "buildprune.backend.connect",
        skip(self, session),
        fields(endpoint = %self.endpoint, session_id = %session.session_id())
    )]
    async fn connect(&self, session: &SessionContext) -> Result<HttpBackend> {
        let base = self.base_url()?;
        let ping = base
            .join(PING_PATH)
            .map_err(|e| self.connection_error(e))?;
        let prune_url = base
            .join(PRUNE_PATH)
            .map_err(|e| self.connection_error(e))?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder.build().map_err(|e| self.connection_error(e))?;

        let response = client
            .get(ping)
            .header(SESSION_HEADER, session.session_id())
            .header(NAMESPACE_HEADER, session.namespace())
            .send()
            .await
            .map_err(|e| self.connection_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.connection_error(format!("liveness probe returned {status}")));
        }

        debug!("Acquired cache service handle");
        Ok(HttpBackend {
            client,
            prune_url,
            endpoint: self.endpoint.clone(),
        })
    }

    fn location(&self) -> &str {
        &self.endpoint
    }
}

/// Connected HTTP cache service handle.
#[derive(Debug)]
pub struct HttpBackend {
    client: reqwest::Client,
    prune_url: Url,
    endpoint: String,
}

impl CacheBackend for HttpBackend {
    #[instrument(
        name = "buildprune.backend.prune",
        skip(self, session, request),
        fields(endpoint = %self.endpoint, filters = request.filters.len())
    )]
    async fn prune(
        &self,
        session: &SessionContext,
        request: &PruneRequest,
    ) -> Result<Vec<CacheRecord>> {
        let response = self
            .client
            .post(self.prune_url.clone())
            .header(SESSION_HEADER, session.session_id())
            .header(NAMESPACE_HEADER, session.namespace())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                let error_kind = if e.is_timeout() {
                    "timeout"
                } else if e.is_connect() {
                    "connect"
                } else if e.is_request() {
                    "request"
                } else {
                    "unknown"
                };
                tracing::error!(error = %e, error_kind, "Prune request failed");
                Error::Request(format!("{error_kind} error: {e}"))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Request(format!("failed to read reply: {e}")))?;

        if !status.is_success() {
            let message = body.trim();
            tracing::warn!(%status, body = message, "Cache service rejected prune");
            return Err(Error::Request(if message.is_empty() {
                format!("cache service returned {status}")
            } else {
                message.to_string()
            }));
        }

        let records = decode_records(&body)?;
        debug!(records = records.len(), "Prune reply decoded");
        Ok(records)
    }

    fn close(self) {
        debug!(endpoint = %self.endpoint, "Released cache service handle");
    }
}

/// Decodes a newline-delimited JSON reply into records.
///
/// Blank lines are skipped. A single malformed line fails the whole reply.
///
/// # Errors
///
/// Returns [`Error::Request`] naming the first line that does not decode.
pub fn decode_records(body: &str) -> Result<Vec<CacheRecord>> {
    body.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|e| {
                Error::Request(format!("malformed record on line {}: {e}", index + 1))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_records_keeps_order() {
        let body = concat!(
            r#"{"id":"b","size":2}"#,
            "\n\n",
            r#"{"id":"a","size":1,"in_use":true}"#,
            "\n"
        );
        let records = decode_records(body).expect("valid ndjson");

        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert!(records[1].in_use);
    }

    #[test]
    fn test_decode_empty_reply() {
        assert!(decode_records("").expect("empty").is_empty());
        assert!(decode_records("\n  \n").expect("blank").is_empty());
    }

    #[test]
    fn test_decode_is_all_or_nothing() {
        let body = "{\"id\":\"a\"}\nnot json\n{\"id\":\"c\"}\n";
        let err = decode_records(body).expect_err("second line is malformed");
        match err {
            Error::Request(message) => assert!(message.contains("line 2")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_base_url_appends_slash() {
        let connector = HttpConnector::new("http://cache:8235/api");
        let base = connector.base_url().expect("valid");
        assert_eq!(
            base.join(PRUNE_PATH).expect("join").as_str(),
            "http://cache:8235/api/v1/prune"
        );
    }

    #[test]
    fn test_base_url_rejects_garbage() {
        let err = HttpConnector::new("not a url").base_url().expect_err("invalid");
        assert!(matches!(err, Error::Connection { .. }));

        let err = HttpConnector::new("unix:///run/buildkitd.sock")
            .base_url()
            .expect_err("unsupported scheme");
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[tokio::test]
    async fn test_connect_to_closed_port_is_connection_error() {
        // Bind then drop to find a port nobody listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let connector = HttpConnector::new(format!("http://{addr}"))
            .with_connect_timeout(Duration::from_secs(2));
        let err = connector
            .connect(&SessionContext::default())
            .await
            .expect_err("nothing listening");
        assert!(matches!(err, Error::Connection { .. }));
    }
}
