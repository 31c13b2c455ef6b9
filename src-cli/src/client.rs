//! HTTP client for communicating with vadrec-service.

use crate::exit_codes::ExitCode;
use vadrec_common::api::{
    ControlResponse, DEFAULT_SERVER_URL, OPTIONS_PATH, START_PATH, STATUS_PATH, STOP_PATH,
};
use vadrec_common::{VadOptions, VadStatus};

/// Error type for service client operations.
#[derive(Debug, Clone)]
pub enum ServiceError {
    /// Could not reach the service
    ConnectionFailed(String),
    /// Response could not be parsed
    InvalidResponse(String),
    /// The service returned an error
    RemoteError(String),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            ServiceError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            ServiceError::RemoteError(msg) => write!(f, "Service error: {}", msg),
        }
    }
}

impl std::error::Error for ServiceError {}

impl ServiceError {
    /// Convert to an appropriate exit code.
    pub fn to_exit_code(&self) -> ExitCode {
        match self {
            ServiceError::ConnectionFailed(_) => ExitCode::ServiceConnectionFailed,
            ServiceError::InvalidResponse(_) => ExitCode::GeneralError,
            ServiceError::RemoteError(_) => ExitCode::GeneralError,
        }
    }
}

/// Client for the vadrec control plane.
pub struct ServiceClient {
    http: reqwest::Client,
    base_url: String,
}

impl ServiceClient {
    /// Create a client for the address in `SERVER_URL`, falling back to the
    /// default local port.
    pub fn new() -> Self {
        let base_url = std::env::var("SERVER_URL")
            .ok()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn status(&self) -> Result<VadStatus, ServiceError> {
        let response = self
            .http
            .get(self.url(STATUS_PATH))
            .send()
            .await
            .map_err(connection)?;
        response
            .json::<VadStatus>()
            .await
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))
    }

    /// POST the start request, with any `key=value` overrides as the body.
    pub async fn start(&self, overrides: serde_json::Value) -> Result<VadStatus, ServiceError> {
        let response = self
            .http
            .post(self.url(START_PATH))
            .json(&overrides)
            .send()
            .await
            .map_err(connection)?;
        unwrap_control(response).await
    }

    pub async fn stop(&self) -> Result<VadStatus, ServiceError> {
        let response = self
            .http
            .post(self.url(STOP_PATH))
            .send()
            .await
            .map_err(connection)?;
        unwrap_control(response).await
    }

    pub async fn options(&self) -> Result<VadOptions, ServiceError> {
        let response = self
            .http
            .get(self.url(OPTIONS_PATH))
            .send()
            .await
            .map_err(connection)?;
        response
            .json::<VadOptions>()
            .await
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))
    }
}

impl Default for ServiceClient {
    fn default() -> Self {
        Self::new()
    }
}

fn connection(err: reqwest::Error) -> ServiceError {
    ServiceError::ConnectionFailed(err.to_string())
}

/// Decode a `{ok, status?, error?}` envelope into its status or error.
async fn unwrap_control(response: reqwest::Response) -> Result<VadStatus, ServiceError> {
    let envelope = response
        .json::<ControlResponse>()
        .await
        .map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;
    if envelope.ok {
        envelope
            .status
            .ok_or_else(|| ServiceError::InvalidResponse("missing status".to_string()))
    } else {
        Err(ServiceError::RemoteError(
            envelope.error.unwrap_or_else(|| "unknown error".to_string()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_map_to_exit_codes() {
        assert_eq!(
            ServiceError::ConnectionFailed("refused".to_string()).to_exit_code(),
            ExitCode::ServiceConnectionFailed
        );
        assert_eq!(
            ServiceError::RemoteError("busy".to_string()).to_exit_code(),
            ExitCode::GeneralError
        );
    }
}
