use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use super::ApiError;

/// Description of one logical API call.
///
/// The same value is dispatched again after a successful token refresh, so
/// everything except the Authorization header is fixed at construction.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    /// Set once the request has been re-issued after a refresh.
    pub retried: bool,
    /// Whether a 401 may trigger the refresh-and-retry cycle at all.
    pub reauth: bool,
}

impl PendingRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            retried: false,
            reauth: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// Attach a JSON body
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to encode request body: {}", e)))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Exclude this request from the refresh-and-retry cycle.
    /// Used for the credential exchange and refresh endpoints themselves.
    pub fn without_reauth(mut self) -> Self {
        self.reauth = false;
        self
    }

    /// True if a 401 on this request should start a refresh
    pub fn may_reauthenticate(&self) -> bool {
        self.reauth && !self.retried
    }
}
