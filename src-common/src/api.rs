//! Control-plane payload types shared by the service and its clients.

use crate::types::VadStatus;
use serde::{Deserialize, Serialize};

/// Default port the service listens on; overridden by `PORT`.
pub const DEFAULT_PORT: u16 = 5173;

/// Default server address for clients; overridden by `SERVER_URL`.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5173";

pub const STATUS_PATH: &str = "/api/v1/vad/status";
pub const START_PATH: &str = "/api/v1/vad/start";
pub const STOP_PATH: &str = "/api/v1/vad/stop";
pub const OPTIONS_PATH: &str = "/api/v1/vad/options";
pub const HEALTH_PATH: &str = "/health";

/// Response envelope for start/stop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<VadStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ControlResponse {
    pub fn success(status: VadStatus) -> Self {
        Self {
            ok: true,
            status: Some(status),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            status: None,
            error: Some(error.into()),
        }
    }
}

/// Response envelope for options updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AckResponse {
    pub fn ok() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
        }
    }
}

/// Health-check body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_carries_status() {
        let response = ControlResponse::success(VadStatus {
            running: true,
            segments_saved: 2,
            last_segment_path: None,
        });
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""ok":true"#));
        assert!(json.contains(r#""running":true"#));
        assert!(!json.contains("error"));
    }

    #[test]
    fn failure_envelope_carries_error() {
        let response = ControlResponse::failure("already running");
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""ok":false"#));
        assert!(json.contains("already running"));
        assert!(!json.contains("status"));
    }

    #[test]
    fn envelopes_roundtrip() {
        let json = r#"{"ok":true,"status":{"running":false,"segmentsSaved":0}}"#;
        let response: ControlResponse = serde_json::from_str(json).unwrap();
        assert!(response.ok);
        assert!(response.status.is_some());
        assert!(response.error.is_none());
    }
}
