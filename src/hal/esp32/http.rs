//! HTTP server for the ESP32-C3.
//!
//! Serves the same endpoints as the desktop axum server using esp-idf-svc.
//! The callback-based server only hands over the raw URI, so the disarm
//! code is pulled out with [`crate::parsing`].
//!
//! # Endpoints
//!
//! - `GET /alarm?code=...` - Disarm attempt (always `200 OK`, body `OK`)
//! - `GET /api/status` - Current alarm status (JSON)
//! - `GET /` - Status page (serves embedded HTML)
//!
//! # Example
//!
//! ```ignore
//! use rs_sentinel::hal::esp32::Esp32HttpServer;
//!
//! let state = Arc::new(SharedAlarmState::new(machine, Esp32Clock::new(), NoopNotifier));
//! let server = Esp32HttpServer::new(&config, state)?;
//! ```

use crate::config::Config;
use crate::parsing::{query_param, raw_query_param};
use crate::shared::AlarmControl;
use crate::AlarmStatus;
use esp_idf_hal::io::Write;
use esp_idf_svc::http::server::{Configuration, EspHttpServer};
use esp_idf_svc::http::Method;
use esp_idf_svc::io::EspIOError;
use std::sync::Arc;

/// HTTP server for the disarm endpoint and status page.
///
/// Keeps the underlying server alive for as long as this value lives.
pub struct Esp32HttpServer {
    _server: EspHttpServer<'static>,
}

impl Esp32HttpServer {
    /// Create and start the HTTP server.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP server fails to start.
    pub fn new<A: AlarmControl + 'static>(config: &Config, alarm: Arc<A>) -> anyhow::Result<Self> {
        let server_config = Configuration {
            http_port: config.web.port,
            ..Default::default()
        };

        let mut server = EspHttpServer::new(&server_config)?;

        let access_code: Arc<str> = Arc::from(config.access.code.as_str());
        let alarm_for_disarm: Arc<dyn AlarmControl> = alarm.clone();
        let alarm_for_status: Arc<dyn AlarmControl> = alarm;

        // GET /alarm - Disarm attempt, never reveals the outcome
        server.fn_handler("/alarm", Method::Get, move |req| {
            let uri = req.uri();
            match query_param(uri, "code") {
                Ok(Some(code)) => {
                    let _ = alarm_for_disarm.disarm(&code, &access_code);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "undecodable disarm code");
                    // Compare the raw text so the attempt still counts as denied
                    if let Some(raw) = raw_query_param(uri, "code") {
                        let _ = alarm_for_disarm.disarm(raw, &access_code);
                    }
                }
                Ok(None) => tracing::debug!("disarm request without code"),
            }
            let mut resp = req.into_response(200, None, &[("Content-Type", "text/plain")])?;
            resp.write_all(b"OK")?;
            Ok::<_, EspIOError>(())
        })?;

        // GET /api/status - Current status
        server.fn_handler("/api/status", Method::Get, move |req| {
            let json = status_json(&alarm_for_status.status());
            let mut resp = req.into_response(200, None, &[("Content-Type", "application/json")])?;
            resp.write_all(json.as_bytes())?;
            Ok::<_, EspIOError>(())
        })?;

        // GET / - Serve status page (shared with desktop)
        server.fn_handler("/", Method::Get, move |req| {
            let html = include_str!("../../../www/index.html");
            let mut resp = req.into_response(200, None, &[("Content-Type", "text/html")])?;
            resp.write_all(html.as_bytes())?;
            Ok::<_, EspIOError>(())
        })?;

        tracing::info!(port = config.web.port, "http server started");

        Ok(Self { _server: server })
    }
}

/// Same shape as the desktop `/api/status` response.
fn status_json(status: &AlarmStatus) -> String {
    format!(
        r#"{{"success":true,"data":{{"state":"{}","state_entered_at_ms":{},"elapsed_ms":{},"armed":{}}}}}"#,
        status.state.as_str(),
        status.state_entered_at_ms,
        status.elapsed_ms,
        status.state.is_armed()
    )
}
