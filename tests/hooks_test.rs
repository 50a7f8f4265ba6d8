// End-to-end hook tests: watch channels on one side, wiremock on the other.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use tokio::sync::watch;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cio_track::hooks::{
    DeepLinkOpener, ErrorPolicy, NavigationState, NotificationHook, NotificationResponse, Route,
    ScreenTrackingHook,
};
use cio_track::{Session, TrackClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Arc<TrackClient>) {
    let server = MockServer::start().await;
    let client = TrackClient::with_base_url(
        &SecretString::from("site:key"),
        &server.uri(),
        &TransportConfig::default(),
    )
    .unwrap();
    (server, Arc::new(client))
}

/// Poll until the mock server has seen `n` requests, or panic after 2s.
async fn wait_for_requests(server: &MockServer, n: usize) {
    timeout(Duration::from_secs(2), async {
        loop {
            if server.received_requests().await.unwrap().len() >= n {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("server never saw {n} request(s)"));
}

#[derive(Default)]
struct RecordingOpener {
    urls: Mutex<Vec<String>>,
}

impl RecordingOpener {
    fn opened(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

impl DeepLinkOpener for RecordingOpener {
    fn open_url(&self, url: &str) {
        self.urls.lock().unwrap().push(url.to_owned());
    }
}

fn notification(payload: serde_json::Value) -> Option<NotificationResponse> {
    Some(NotificationResponse {
        payload: Some(payload),
    })
}

// ── Notification hook ───────────────────────────────────────────────

#[tokio::test]
async fn notification_open_is_tracked_and_deep_link_forwarded() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/push/events"))
        .and(body_json(json!({
            "delivery_id": "dlv_1",
            "device_id": "tok_1",
            "event": "opened",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let opener = Arc::new(RecordingOpener::default());
    let (tx, rx) = watch::channel(None);
    let cancel = CancellationToken::new();
    let hook = NotificationHook::new(
        client,
        Arc::clone(&opener),
        rx,
        ErrorPolicy::LogAndContinue,
    );
    let task = tokio::spawn(hook.run(cancel.clone()));

    tx.send(notification(json!({
        "CIO-Delivery-Token": "tok_1",
        "CIO-Delivery-ID": "dlv_1",
        "url": "myapp://orders/42",
    })))
    .unwrap();

    wait_for_requests(&server, 1).await;
    timeout(Duration::from_secs(2), async {
        while opener.opened().is_empty() {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    assert_eq!(opener.opened(), vec!["myapp://orders/42".to_owned()]);

    cancel.cancel();
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn notification_without_token_forwards_url_but_tracks_nothing() {
    let (server, client) = setup().await;

    let opener = Arc::new(RecordingOpener::default());
    let (tx, rx) = watch::channel(None);
    let cancel = CancellationToken::new();
    let hook = NotificationHook::new(
        client,
        Arc::clone(&opener),
        rx,
        ErrorPolicy::LogAndContinue,
    );
    tokio::spawn(hook.run(cancel.clone()));

    tx.send(notification(json!({"url": "myapp://promo"}))).unwrap();

    // The deep-link forward is the observable end of this reaction.
    timeout(Duration::from_secs(2), async {
        while opener.opened().is_empty() {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    assert!(server.received_requests().await.unwrap().is_empty());
    cancel.cancel();
}

#[tokio::test]
async fn notification_hook_swallows_tracking_failures() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/push/events"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let opener = Arc::new(RecordingOpener::default());
    let (tx, rx) = watch::channel(None);
    let cancel = CancellationToken::new();
    let hook = NotificationHook::new(
        client,
        Arc::clone(&opener),
        rx,
        ErrorPolicy::LogAndContinue,
    );
    let task = tokio::spawn(hook.run(cancel.clone()));

    tx.send(notification(json!({
        "CIO-Delivery-Token": "tok_1",
        "CIO-Delivery-ID": "dlv_1",
        "url": "myapp://still/forwarded",
    })))
    .unwrap();

    wait_for_requests(&server, 1).await;

    // The failure is logged, not surfaced: the URL still reaches navigation
    // and the loop keeps observing.
    timeout(Duration::from_secs(2), async {
        while opener.opened().is_empty() {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
    assert!(!task.is_finished());

    tx.send(notification(json!({"CIO-Delivery-Token": "tok_2"})))
        .unwrap();
    wait_for_requests(&server, 2).await;

    cancel.cancel();
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn notification_hook_stops_when_sender_drops() {
    let (_server, client) = setup().await;

    let (tx, rx) = watch::channel(None);
    let hook = NotificationHook::new(
        client,
        Arc::new(RecordingOpener::default()),
        rx,
        ErrorPolicy::LogAndContinue,
    );
    let task = tokio::spawn(hook.run(CancellationToken::new()));

    drop(tx);
    timeout(Duration::from_secs(2), task)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
}

// ── Screen tracking hook ────────────────────────────────────────────

fn nested_nav_state() -> NavigationState {
    NavigationState {
        index: 0,
        routes: vec![Route {
            name: "Shop".into(),
            params: None,
            state: Some(NavigationState {
                index: 1,
                routes: vec![
                    Route {
                        name: "Catalog".into(),
                        params: None,
                        state: None,
                    },
                    Route {
                        name: "ProductDetail".into(),
                        params: Some(json!({"sku": "sku_1"})),
                        state: None,
                    },
                ],
            }),
        }],
    }
}

#[tokio::test]
async fn screen_change_tracks_active_leaf_route() {
    let (server, client) = setup().await;
    let session = Session::identified("cust_1");

    Mock::given(method("POST"))
        .and(path("/customers/cust_1/events"))
        .and(body_json(json!({
            "name": "ProductDetail",
            "type": "screen",
            "data": {"sku": "sku_1"},
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let (tx, rx) = watch::channel(None);
    let cancel = CancellationToken::new();
    let hook = ScreenTrackingHook::new(client, session, rx, ErrorPolicy::Propagate);
    let task = tokio::spawn(hook.run(cancel.clone()));

    tx.send(Some(nested_nav_state())).unwrap();

    wait_for_requests(&server, 1).await;

    cancel.cancel();
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn anonymous_screen_events_are_dropped() {
    let (server, client) = setup().await;
    let session = Session::anonymous();

    let (tx, rx) = watch::channel(None);
    let cancel = CancellationToken::new();
    let hook = ScreenTrackingHook::new(client, session, rx, ErrorPolicy::Propagate);
    tokio::spawn(hook.run(cancel.clone()));

    tx.send(Some(nested_nav_state())).unwrap();
    sleep(Duration::from_millis(200)).await;

    assert!(server.received_requests().await.unwrap().is_empty());
    cancel.cancel();
}

#[tokio::test]
async fn screen_hook_propagates_tracking_failures() {
    let (server, client) = setup().await;
    let session = Session::identified("cust_1");

    Mock::given(method("POST"))
        .and(path("/customers/cust_1/events"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (tx, rx) = watch::channel(None);
    let hook = ScreenTrackingHook::new(client, session, rx, ErrorPolicy::Propagate);
    let task = tokio::spawn(hook.run(CancellationToken::new()));

    tx.send(Some(NavigationState {
        index: 0,
        routes: vec![Route {
            name: "Home".into(),
            params: None,
            state: None,
        }],
    }))
    .unwrap();

    let err = timeout(Duration::from_secs(2), task)
        .await
        .unwrap()
        .unwrap()
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
}
