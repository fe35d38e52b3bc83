// RouterOS REST client
//
// Wraps `reqwest::Client` with `/rest` URL construction, basic auth, and
// error-body parsing. The router's REST endpoint speaks plain JSON arrays
// of flat objects, so there is no envelope to strip; the only translation
// is turning "match one field" lookups into `.id`-addressed requests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::record::{RawRecord, RecordExt};
use crate::router::RouterApi;
use crate::transport::{BasicAuth, TransportConfig};

/// Error body returned by RouterOS on non-2xx responses:
/// `{"error": 400, "message": "Bad Request", "detail": "..."}`.
#[derive(Deserialize)]
struct RouterErrorBody {
    message: Option<String>,
    detail: Option<String>,
}

/// Raw HTTP client for the router's REST endpoint.
///
/// Every [`RouterApi`] primitive is one or two requests against
/// `{base}/rest{path}`. Entries addressed by a field other than `.id` are
/// located with a filtered `GET` first.
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
    auth: BasicAuth,
    timeout: Duration,
    connected: AtomicBool,
}

impl RestClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the router root, e.g. `https://192.168.88.1`.
    pub fn new(base_url: Url, auth: BasicAuth, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, auth, transport.timeout))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        auth: BasicAuth,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            base_url,
            auth,
            timeout,
            connected: AtomicBool::new(false),
        }
    }

    /// The router base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/rest{path}`. `path` must start with `/`.
    pub(crate) fn rest_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/rest{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a request, tracking reachability and mapping failures.
    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, Error> {
        let builder = builder.basic_auth(
            &self.auth.username,
            Some(self.auth.password.expose_secret()),
        );

        let resp = match builder.send().await {
            Ok(resp) => resp,
            Err(e) => {
                self.connected.store(false, Ordering::Relaxed);
                if e.is_timeout() {
                    return Err(Error::Timeout {
                        timeout_secs: self.timeout.as_secs(),
                    });
                }
                return Err(Error::Transport(e));
            }
        };
        self.connected.store(true, Ordering::Relaxed);

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<RouterErrorBody>(&body)
            .ok()
            .and_then(|b| b.detail.filter(|d| !d.is_empty()).or(b.message))
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_owned());

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication { message });
        }
        Err(Error::Router {
            status: status.as_u16(),
            message,
        })
    }

    /// Parse a JSON body into records. A single object is accepted as a
    /// one-element list; an empty body is an empty list.
    async fn records(resp: reqwest::Response) -> Result<Vec<RawRecord>, Error> {
        let body = resp.text().await.map_err(Error::Transport)?;
        trace!(body_len = body.len(), "response body");
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }

        let value: Value = serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: body.clone(),
        })?;

        match value {
            Value::Array(items) => Ok(items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect()),
            Value::Object(map) => Ok(vec![map]),
            other => Err(Error::Deserialization {
                message: format!("expected a JSON array, got {other}"),
                body,
            }),
        }
    }

    async fn get(&self, url: Url) -> Result<Vec<RawRecord>, Error> {
        debug!("GET {}", url);
        let resp = self.send(self.http.get(url)).await?;
        Self::records(resp).await
    }

    async fn post(&self, url: Url, body: &Value) -> Result<Vec<RawRecord>, Error> {
        debug!("POST {}", url);
        let resp = self.send(self.http.post(url).json(body)).await?;
        Self::records(resp).await
    }

    /// Resolve the router-assigned `.id` of the entry whose `field == value`.
    async fn locate_id(&self, path: &str, field: &str, value: &str) -> Result<String, Error> {
        let mut url = self.rest_url(path)?;
        url.query_pairs_mut().append_pair(field, value);

        self.get(url)
            .await?
            .iter()
            .find_map(|r| r.text(".id"))
            .ok_or_else(|| Error::NotFound {
                path: path.to_owned(),
                field: field.to_owned(),
                value: value.to_owned(),
            })
    }
}

impl RouterApi for RestClient {
    async fn fetch(&self, path: &str) -> Result<Vec<RawRecord>, Error> {
        let url = self.rest_url(path)?;
        self.get(url).await
    }

    async fn mutate(
        &self,
        path: &str,
        match_field: &str,
        match_value: &str,
        set_field: &str,
        set_value: Value,
    ) -> Result<(), Error> {
        let id = self.locate_id(path, match_field, match_value).await?;
        let url = self.rest_url(&format!("{path}/{id}"))?;

        let mut body = Map::new();
        body.insert(set_field.to_owned(), set_value);

        debug!(%url, set_field, "PATCH");
        self.send(self.http.patch(url).json(&body)).await?;
        Ok(())
    }

    async fn invoke(
        &self,
        path: &str,
        command: &str,
        match_field: &str,
        match_value: &str,
    ) -> Result<(), Error> {
        let id = self.locate_id(path, match_field, match_value).await?;
        let url = self.rest_url(&format!("{path}/{command}"))?;
        self.post(url, &json!({ ".id": id })).await?;
        Ok(())
    }

    async fn probe(&self, address: &str, interface: &str) -> Result<bool, Error> {
        let url = self.rest_url("/ping")?;
        let body = json!({
            "address": address,
            "interface": interface,
            "arp-ping": "yes",
            "count": "1",
        });

        let replies = self.post(url, &body).await?;
        Ok(replies.iter().any(|r| {
            r.text("received")
                .and_then(|s| s.trim().parse::<u64>().ok())
                .is_some_and(|n| n > 0)
        }))
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }
}
