// Screen-tracking hook.
//
// Observes the host app's navigation state and reports a "screen" event
// for the active leaf route on every change.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::client::TrackClient;
use crate::error::Error;
use crate::hooks::ErrorPolicy;
use crate::session::Session;
use crate::types::TrackEvent;

// ── Navigation state tree ────────────────────────────────────────────

/// A navigator's state: an ordered list of route nodes plus the index of
/// the active one. Nested navigators hang off [`Route::state`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationState {
    pub index: usize,
    pub routes: Vec<Route>,
}

/// One route node in the navigation tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub name: String,

    /// Route parameters, reported as the screen event's `data`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,

    /// Nested navigator state, when this route hosts one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<NavigationState>,
}

impl NavigationState {
    /// Resolve the currently active leaf route.
    ///
    /// Follows the `index`-selected child through nested navigators until
    /// a node with no nested state. Terminates because the tree is finite
    /// and acyclic. Returns `None` when `index` is out of range at any
    /// level.
    pub fn active_route(&self) -> Option<&Route> {
        let route = self.routes.get(self.index)?;
        match &route.state {
            Some(nested) => nested.active_route(),
            None => Some(route),
        }
    }
}

// ── Hook ─────────────────────────────────────────────────────────────

/// Emits a `screen` event each time the active route changes.
///
/// Events for anonymous sessions are dropped — there is no anonymous
/// tracking and no queueing for later identification. One tracking call
/// per observed change, no deduplication or throttling.
pub struct ScreenTrackingHook {
    client: Arc<TrackClient>,
    session: Session,
    navigation: watch::Receiver<Option<NavigationState>>,
    policy: ErrorPolicy,
}

impl ScreenTrackingHook {
    pub fn new(
        client: Arc<TrackClient>,
        session: Session,
        navigation: watch::Receiver<Option<NavigationState>>,
        policy: ErrorPolicy,
    ) -> Self {
        Self {
            client,
            session,
            navigation,
            policy,
        }
    }

    /// Consume navigation-state changes until the channel closes or
    /// `cancel` fires.
    ///
    /// Only returns an error under [`ErrorPolicy::Propagate`].
    pub async fn run(mut self, cancel: CancellationToken) -> Result<(), Error> {
        loop {
            tokio::select! {
                () = cancel.cancelled() => return Ok(()),
                changed = self.navigation.changed() => {
                    if changed.is_err() {
                        return Ok(());
                    }
                    let active = self
                        .navigation
                        .borrow_and_update()
                        .as_ref()
                        .and_then(|state| state.active_route().cloned());
                    if let Some(route) = active {
                        self.track_route(route).await?;
                    }
                }
            }
        }
    }

    async fn track_route(&self, route: Route) -> Result<(), Error> {
        if !self.session.is_identified() {
            debug!("no customer identified, dropping screen event for {}", route.name);
            return Ok(());
        }

        let mut event = TrackEvent::screen(route.name);
        if let Some(params) = route.params {
            event = event.with_data(params);
        }

        match self.client.track_event(&self.session, &event).await {
            Ok(_) => Ok(()),
            Err(err) => match self.policy {
                ErrorPolicy::LogAndContinue => {
                    warn!("failed to track screen {}: {err}", event.name);
                    Ok(())
                }
                ErrorPolicy::Propagate => Err(err),
            },
        }
    }
}
