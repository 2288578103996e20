//! HTTP notifier for remote status reporting.
//!
//! State changes are reported to a datastore as an HTTP `PUT` with body
//! `{"state":"<message> <timestamp>"}`, content type `text/json`, and an
//! `X-Auth-Token` header.
//!
//! [`HttpNotifier::notify`] never blocks: it pushes the message onto a
//! bounded channel with `try_send`. A background tokio task drains the
//! channel, stamps each message as it sends it, and performs the request
//! with a timeout. Failures are logged and dropped, never retried. Without `SERVER` and `AUTH_TOKEN`
//! the notifier is a silent no-op.
//!
//! # Example
//!
//! ```ignore
//! let notifier = HttpNotifier::spawn(&config.notify)?;
//! let state = Arc::new(SharedAlarmState::new(machine, clock, notifier));
//! ```

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::config::NotifyConfig;
use crate::error::NotifyError;
use crate::traits::Notifier;

/// Header carrying the datastore token.
pub const AUTH_HEADER: &str = "X-Auth-Token";

/// Content type the datastore expects.
pub const NOTIFY_CONTENT_TYPE: &str = "text/json";

/// A message stamped for delivery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    /// Status text, e.g. "Person detected"
    pub message: String,
    /// When the message was sent
    pub sent_at: OffsetDateTime,
}

impl Notification {
    /// Stamp `message` with the current UTC time.
    pub fn now(message: &str) -> Self {
        Self {
            message: message.to_string(),
            sent_at: OffsetDateTime::now_utc(),
        }
    }

    /// The JSON body sent for this notification.
    pub fn payload(&self) -> serde_json::Value {
        serde_json::json!({
            "state": format!("{} {}", self.message, format_timestamp(self.sent_at)),
        })
    }
}

/// Format `at` in UTC as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn format_timestamp(at: OffsetDateTime) -> String {
    let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");
    at.to_offset(UtcOffset::UTC)
        .format(&format)
        .unwrap_or_default()
}

// ============================================================================
// HTTP Notifier
// ============================================================================

/// Non-blocking notifier backed by a delivery task.
///
/// Cheap to clone; all clones feed the same queue.
#[derive(Clone, Debug, Default)]
pub struct HttpNotifier {
    tx: Option<mpsc::Sender<String>>,
}

impl HttpNotifier {
    /// A notifier that drops everything.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Start the delivery task and return a handle to it.
    ///
    /// Must be called from within a tokio runtime. Returns a disabled
    /// notifier if the endpoint is not configured.
    pub fn spawn(config: &NotifyConfig) -> Result<Self, NotifyError> {
        if !config.is_configured() {
            tracing::info!("SERVER or AUTH_TOKEN not set; notifications disabled");
            return Ok(Self::disabled());
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms as u64))
            .build()?;
        let endpoint = config.server.to_string();
        let token = config.auth_token.to_string();
        let (tx, mut rx) = mpsc::channel::<String>(config.queue_depth.max(1));

        tracing::info!(endpoint = %endpoint, "notifications enabled");

        tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                match deliver(&client, &endpoint, &token, &message).await {
                    Ok(()) => tracing::debug!(msg = %message, "notification delivered"),
                    Err(e) => tracing::warn!(msg = %message, error = %e, "notification failed"),
                }
            }
            tracing::debug!("notification channel closed");
        });

        Ok(Self { tx: Some(tx) })
    }

    /// Whether messages are being delivered anywhere.
    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    /// Queue `message` for delivery.
    pub fn try_notify(&self, message: &str) -> Result<(), NotifyError> {
        let tx = self.tx.as_ref().ok_or(NotifyError::NotConfigured)?;
        tx.try_send(message.to_string()).map_err(|e| match e {
            TrySendError::Full(_) => NotifyError::QueueFull,
            TrySendError::Closed(_) => NotifyError::Closed,
        })
    }
}

impl Notifier for HttpNotifier {
    fn notify(&self, message: &str) {
        match self.try_notify(message) {
            Ok(()) | Err(NotifyError::NotConfigured) => {}
            Err(e) => tracing::warn!(msg = message, error = %e, "notification dropped"),
        }
    }
}

/// Stamp `message` with the current time and send it.
pub async fn deliver(
    client: &reqwest::Client,
    endpoint: &str,
    token: &str,
    message: &str,
) -> Result<(), NotifyError> {
    let notification = Notification::now(message);
    let response = client
        .put(endpoint)
        .header(CONTENT_TYPE, NOTIFY_CONTENT_TYPE)
        .header(AUTH_HEADER, token)
        .body(notification.payload().to_string())
        .send()
        .await?;

    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(NotifyError::Status(status.as_u16()))
    }
}
