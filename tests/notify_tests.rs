//! Integration tests for remote notifications.
//!
//! A local axum listener stands in for the datastore and records every
//! request it receives.

#![cfg(all(feature = "notify", feature = "web"))]

use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::routing::any;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use rs_sentinel::hal::MockClock;
use rs_sentinel::services::{format_timestamp, HttpNotifier, AUTH_HEADER, NOTIFY_CONTENT_TYPE};
use rs_sentinel::{
    AlarmStateMachine, Notifier, NotifyConfig, NotifyError, SharedAlarmState, MSG_ALARM_TRIGGERED,
    MSG_PERSON_DETECTED,
};

#[derive(Debug)]
struct Captured {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: String,
}

/// Start a datastore stub answering `status`; returns its URL and the
/// stream of captured requests.
async fn datastore(status: StatusCode) -> (String, mpsc::UnboundedReceiver<Captured>) {
    slow_datastore(status, Duration::ZERO).await
}

/// Like [`datastore`], but each answer is held back for `delay`.
async fn slow_datastore(
    status: StatusCode,
    delay: Duration,
) -> (String, mpsc::UnboundedReceiver<Captured>) {
    let (tx, rx) = mpsc::unbounded_channel();

    let app = Router::new()
        .route(
            "/*path",
            any(
                move |State(tx): State<mpsc::UnboundedSender<Captured>>,
                      method: Method,
                      uri: axum::http::Uri,
                      headers: HeaderMap,
                      body: Bytes| async move {
                    let _ = tx.send(Captured {
                        method,
                        path: uri.path().to_string(),
                        headers,
                        body: String::from_utf8_lossy(&body).into_owned(),
                    });
                    tokio::time::sleep(delay).await;
                    status
                },
            ),
        )
        .with_state(tx);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/house/alarm"), rx)
}

async fn next(rx: &mut mpsc::UnboundedReceiver<Captured>) -> Captured {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("no request within 5 s")
        .expect("datastore stopped")
}

fn config(url: &str) -> NotifyConfig {
    NotifyConfig::default()
        .with_server(url)
        .with_auth_token("s3cret")
        .with_timeout_ms(2_000)
}

/// Splits `"<message> <YYYY-MM-DDTHH:MM:SSZ>"`.
fn split_state(state: &str) -> (&str, &str) {
    state.rsplit_once(' ').expect("message and timestamp")
}

fn assert_timestamp_shape(ts: &str) {
    let bytes = ts.as_bytes();
    assert_eq!(bytes.len(), 20, "timestamp {ts}");
    for (i, b) in bytes.iter().enumerate() {
        match i {
            4 | 7 => assert_eq!(*b, b'-'),
            10 => assert_eq!(*b, b'T'),
            13 | 16 => assert_eq!(*b, b':'),
            19 => assert_eq!(*b, b'Z'),
            _ => assert!(b.is_ascii_digit(), "timestamp {ts}"),
        }
    }
}

#[tokio::test]
async fn test_notification_request_shape() {
    let (url, mut rx) = datastore(StatusCode::OK).await;
    let notifier = HttpNotifier::spawn(&config(&url)).unwrap();
    assert!(notifier.is_enabled());

    notifier.try_notify(MSG_PERSON_DETECTED).unwrap();
    let request = next(&mut rx).await;

    assert_eq!(request.method, Method::PUT);
    assert_eq!(request.path, "/house/alarm");
    assert_eq!(request.headers[AUTH_HEADER], "s3cret");
    assert_eq!(request.headers["content-type"], NOTIFY_CONTENT_TYPE);

    let json: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    let object = json.as_object().unwrap();
    assert_eq!(object.len(), 1);

    let (message, ts) = split_state(object["state"].as_str().unwrap());
    assert_eq!(message, MSG_PERSON_DETECTED);
    assert_timestamp_shape(ts);
}

#[tokio::test]
async fn test_notifications_arrive_in_order() {
    let (url, mut rx) = datastore(StatusCode::OK).await;
    let notifier = HttpNotifier::spawn(&config(&url)).unwrap();

    notifier.notify(MSG_PERSON_DETECTED);
    notifier.notify(MSG_ALARM_TRIGGERED);

    for expected in [MSG_PERSON_DETECTED, MSG_ALARM_TRIGGERED] {
        let request = next(&mut rx).await;
        let json: serde_json::Value = serde_json::from_str(&request.body).unwrap();
        let (message, _) = split_state(json["state"].as_str().unwrap());
        assert_eq!(message, expected);
    }
}

#[tokio::test]
async fn test_timestamp_taken_when_request_is_sent() {
    let (url, mut rx) = slow_datastore(StatusCode::OK, Duration::from_millis(1_500)).await;
    let notifier = HttpNotifier::spawn(&config(&url).with_timeout_ms(5_000)).unwrap();

    let queued_at = time::OffsetDateTime::now_utc();
    notifier.notify(MSG_PERSON_DETECTED);
    notifier.notify(MSG_ALARM_TRIGGERED);

    let _ = next(&mut rx).await;
    // The second request waits for the first answer before it is stamped
    let second = next(&mut rx).await;
    let json: serde_json::Value = serde_json::from_str(&second.body).unwrap();
    let (message, ts) = split_state(json["state"].as_str().unwrap());

    assert_eq!(message, MSG_ALARM_TRIGGERED);
    let earliest = format_timestamp(queued_at + time::Duration::seconds(1));
    assert!(ts >= earliest.as_str(), "stamped {ts}, queued before {earliest}");
}

#[tokio::test]
async fn test_rejected_notification_does_not_stop_delivery() {
    let (url, mut rx) = datastore(StatusCode::INTERNAL_SERVER_ERROR).await;
    let notifier = HttpNotifier::spawn(&config(&url)).unwrap();

    notifier.notify("first");
    notifier.notify("second");

    assert!(next(&mut rx).await.body.contains("first"));
    assert!(next(&mut rx).await.body.contains("second"));
}

#[tokio::test]
async fn test_alarm_transitions_reach_datastore() {
    let (url, mut rx) = datastore(StatusCode::OK).await;
    let notifier = HttpNotifier::spawn(&config(&url)).unwrap();
    let alarm = SharedAlarmState::new(AlarmStateMachine::new(0), MockClock::new(), notifier);

    alarm.tick(true);
    alarm.clock().set_secs(31);
    alarm.tick(false);
    let _ = alarm.disarm("0000", "4321");

    let mut messages = Vec::new();
    for _ in 0..3 {
        let request = next(&mut rx).await;
        let json: serde_json::Value = serde_json::from_str(&request.body).unwrap();
        let (message, _) = split_state(json["state"].as_str().unwrap());
        messages.push(message.to_string());
    }
    assert_eq!(messages, ["Person detected", "Alarm triggered!", "invalid code"]);
}

#[tokio::test]
async fn test_unconfigured_notifier_is_disabled() {
    let notifier = HttpNotifier::spawn(&NotifyConfig::default().with_auth_token("s3cret")).unwrap();

    assert!(!notifier.is_enabled());
    assert!(matches!(
        notifier.try_notify(MSG_PERSON_DETECTED),
        Err(NotifyError::NotConfigured)
    ));
    // Dropped without complaint
    notifier.notify(MSG_PERSON_DETECTED);
}

#[tokio::test]
async fn test_unreachable_datastore_never_blocks_caller() {
    // Nothing listens on this port once the listener is dropped
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/alarm", listener.local_addr().unwrap());
    drop(listener);

    let notifier = HttpNotifier::spawn(&config(&url).with_queue_depth(1)).unwrap();

    let started = std::time::Instant::now();
    for _ in 0..50 {
        notifier.notify(MSG_PERSON_DETECTED);
    }
    assert!(started.elapsed() < Duration::from_secs(1));
}
