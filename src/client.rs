// Hand-crafted async HTTP client for the Customer.io Track API (v1).
//
// Base URL: https://track.customer.io/api/v1
// Auth: Basic, base64 of the site:key combo

use base64::Engine;
use chrono::Utc;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::session::Session;
use crate::transport::TransportConfig;
use crate::types::{Device, DevicePlatform, PushEvent, TrackEvent};

/// The production Track API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://track.customer.io/api/v1";

/// Async client for the Customer.io Track API.
///
/// Holds the credentials (as a default `Authorization` header on the
/// underlying `reqwest::Client`) and nothing else — the current customer
/// lives in a [`Session`] threaded through each customer-scoped call.
pub struct TrackClient {
    http: reqwest::Client,
    base_url: Url,
}

impl TrackClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client against the production endpoint.
    ///
    /// Fails with [`Error::MissingApiKey`] if the key is empty, before any
    /// network activity.
    pub fn new(api_key: &SecretString) -> Result<Self, Error> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL, &TransportConfig::default())
    }

    /// Build a client against an explicit base URL (tests, EU region).
    pub fn with_base_url(
        api_key: &SecretString,
        base_url: &str,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::MissingApiKey);
        }

        let encoded = base64::engine::general_purpose::STANDARD.encode(api_key.expose_secret());
        // Base64 output is always a valid header value.
        let mut auth = HeaderValue::try_from(format!("Basic {encoded}"))
            .map_err(|_| Error::MissingApiKey)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = transport.build_client_with_headers(headers)?;
        let base_url = Self::normalize_base_url(base_url)?;

        Ok(Self { http, base_url })
    }

    /// Normalize the base URL to end with `/` so relative joins append to
    /// the API path instead of replacing its last segment.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Record a customer-scoped event: `POST /customers/{id}/events`.
    ///
    /// Requires an identified customer — fails with
    /// [`Error::CustomerRequired`] before any network call otherwise.
    pub async fn track_event(&self, session: &Session, event: &TrackEvent) -> Result<Value, Error> {
        let customer = session.require_customer("track_event")?;
        self.post(&format!("customers/{customer}/events"), event)
            .await
    }

    /// Record a push-notification lifecycle event: `POST /push/events`.
    ///
    /// Not customer-scoped — the delivery id and token identify the send
    /// directly, so this works before anyone is identified.
    pub async fn track_push_event(&self, push: &PushEvent) -> Result<Value, Error> {
        self.post("push/events", push).await
    }

    /// Register (or refresh) this device's push token:
    /// `PUT /customers/{id}/devices`.
    ///
    /// Always reports `platform: "ios"`, matching the upstream behavior —
    /// the payload schema also admits `"android"`, but that path has never
    /// been exercised. Use [`add_device_full`](Self::add_device_full) to
    /// send a different platform or device attributes.
    pub async fn add_device(&self, session: &Session, push_token: &str) -> Result<Value, Error> {
        let device = Device {
            id: push_token.to_owned(),
            platform: DevicePlatform::Ios,
            last_used: Some(Utc::now().timestamp()),
            attributes: None,
        };
        self.add_device_full(session, &device).await
    }

    /// Register a device with the full payload schema (platform, attributes).
    pub async fn add_device_full(&self, session: &Session, device: &Device) -> Result<Value, Error> {
        #[derive(Serialize)]
        struct Body<'a> {
            device: &'a Device,
        }

        let customer = session.require_customer("add_device")?;
        self.put(&format!("customers/{customer}/devices"), &Body { device })
            .await
    }

    /// Remove a device registration:
    /// `DELETE /customers/{id}/devices/{push_token}`. No body.
    pub async fn delete_device(&self, session: &Session, push_token: &str) -> Result<Value, Error> {
        let customer = session.require_customer("delete_device")?;
        self.delete(&format!("customers/{customer}/devices/{push_token}"))
            .await
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"push/events"`) onto the base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        self.base_url.join(path).map_err(Error::InvalidUrl)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn post<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<Value, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url.clone()).json(body).send().await?;
        Self::handle_response(&url, resp).await
    }

    async fn put<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<Value, Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self.http.put(url.clone()).json(body).send().await?;
        Self::handle_response(&url, resp).await
    }

    async fn delete(&self, path: &str) -> Result<Value, Error> {
        let url = self.url(path)?;
        debug!("DELETE {url}");

        let resp = self.http.delete(url.clone()).send().await?;
        Self::handle_response(&url, resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    /// Non-success statuses become [`Error::Api`] carrying the attempted
    /// URL. Success bodies are returned as parsed JSON with no schema
    /// validation; an empty body parses as `null`.
    async fn handle_response(url: &Url, resp: reqwest::Response) -> Result<Value, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = resp.text().await?;
        if body.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}
