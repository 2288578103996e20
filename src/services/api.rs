//! API response types for the HTTP endpoints.

use serde::{Deserialize, Serialize};

use crate::alarm::{AlarmState, AlarmStatus};

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters of `GET /alarm`, in request order.
///
/// Kept as raw pairs so a repeated `code` does not fail extraction.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct DisarmQuery(Vec<(String, String)>);

impl DisarmQuery {
    /// The first submitted access code. Later repeats are ignored.
    pub fn code(&self) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == "code")
            .map(|(_, value)| value.as_str())
    }
}

// ============================================================================
// Response Types
// ============================================================================

/// API response wrapper for consistent JSON structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful
    pub success: bool,
    /// Response data (present when success=true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message (present when success=false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response with data
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Current alarm status response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Current state
    pub state: AlarmState,
    /// When the current state was entered (ms on the controller clock)
    pub state_entered_at_ms: u64,
    /// Time spent in the current state
    pub elapsed_ms: u64,
    /// Whether new motion would start a countdown
    pub armed: bool,
}

impl From<&AlarmStatus> for StatusResponse {
    fn from(status: &AlarmStatus) -> Self {
        Self {
            state: status.state,
            state_entered_at_ms: status.state_entered_at_ms,
            elapsed_ms: status.elapsed_ms,
            armed: status.state.is_armed(),
        }
    }
}
