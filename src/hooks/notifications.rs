// Push-notification hook.
//
// Observes the most recent notification interaction exposed by the OS
// layer. On each change: report an "opened" push event for Customer.io
// sends, and forward any embedded deep link to the app's navigation.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::client::TrackClient;
use crate::error::Error;
use crate::hooks::ErrorPolicy;
use crate::types::PushEvent;

// ── Boundary contracts ───────────────────────────────────────────────

/// The most recent user interaction with a delivered notification, as
/// exposed by the host platform's notification layer.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationResponse {
    /// The custom payload dictionary attached to the notification, if any.
    pub payload: Option<Value>,
}

/// Typed view of the keys Customer.io attaches to a notification payload.
///
/// All keys are optional — notifications from other senders simply carry
/// none of them. Unrecognized fields are kept in `extra`.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationPayload {
    #[serde(rename = "CIO-Delivery-Token", default)]
    pub delivery_token: Option<String>,

    #[serde(rename = "CIO-Delivery-ID", default)]
    pub delivery_id: Option<String>,

    /// Deep link to forward to app navigation.
    #[serde(default)]
    pub url: Option<String>,

    #[serde(flatten)]
    pub extra: Value,
}

impl NotificationPayload {
    /// Parse the raw payload dictionary. Returns `None` when the payload
    /// is not a JSON object.
    pub fn from_value(raw: &Value) -> Option<Self> {
        serde_json::from_value(raw.clone()).ok()
    }
}

/// App navigation boundary: accepts a URL and performs app-internal or
/// external navigation.
pub trait DeepLinkOpener: Send + Sync {
    fn open_url(&self, url: &str);
}

impl<T: DeepLinkOpener + ?Sized> DeepLinkOpener for Arc<T> {
    fn open_url(&self, url: &str) {
        (**self).open_url(url);
    }
}

// ── Hook ─────────────────────────────────────────────────────────────

/// Bridges notification-open interactions into the Track client and the
/// deep-link opener.
///
/// Owns no state — it is a pure reaction to the observed channel.
//
// TODO: also report "delivered" events for notifications that arrive
// while the app is backgrounded.
pub struct NotificationHook<L> {
    client: Arc<TrackClient>,
    links: L,
    responses: watch::Receiver<Option<NotificationResponse>>,
    policy: ErrorPolicy,
}

impl<L: DeepLinkOpener> NotificationHook<L> {
    pub fn new(
        client: Arc<TrackClient>,
        links: L,
        responses: watch::Receiver<Option<NotificationResponse>>,
        policy: ErrorPolicy,
    ) -> Self {
        Self {
            client,
            links,
            responses,
            policy,
        }
    }

    /// Consume notification responses until the channel closes or `cancel`
    /// fires.
    ///
    /// Only returns an error under [`ErrorPolicy::Propagate`].
    pub async fn run(mut self, cancel: CancellationToken) -> Result<(), Error> {
        loop {
            tokio::select! {
                () = cancel.cancelled() => return Ok(()),
                changed = self.responses.changed() => {
                    if changed.is_err() {
                        return Ok(());
                    }
                    let payload = self
                        .responses
                        .borrow_and_update()
                        .as_ref()
                        .and_then(|r| r.payload.clone());
                    if let Some(raw) = payload {
                        self.handle_payload(&raw).await?;
                    }
                }
            }
        }
    }

    /// React to a single notification payload.
    ///
    /// The "opened" report and the deep-link forward are independent: a
    /// tracking failure under `LogAndContinue` still forwards the URL.
    async fn handle_payload(&self, raw: &Value) -> Result<(), Error> {
        let Some(payload) = NotificationPayload::from_value(raw) else {
            return Ok(());
        };

        if let Some(token) = &payload.delivery_token {
            // Delivery id can be absent on malformed sends; report the open
            // anyway so the token is accounted for.
            let push = PushEvent::opened(payload.delivery_id.clone().unwrap_or_default(), token);
            match self.client.track_push_event(&push).await {
                Ok(_) => debug!("reported notification open for delivery {}", push.delivery_id),
                Err(err) => match self.policy {
                    ErrorPolicy::LogAndContinue => {
                        warn!("failed to report notification open: {err}");
                    }
                    ErrorPolicy::Propagate => return Err(err),
                },
            }
        }

        if let Some(url) = &payload.url {
            debug!("forwarding deep link: {url}");
            self.links.open_url(url);
        }

        Ok(())
    }
}
