//! API client for communicating with the profilehub REST API.
//!
//! This module provides the `ApiClient` struct. Requests are described by a
//! `PendingRequest` and go through two layers: `dispatch`, which attaches the
//! current bearer token and sends, and `execute`, which wraps it with the
//! single refresh-and-retry cycle for expired access tokens.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};

use crate::auth::Session;
use crate::models::{
    selected_interests, AccessToken, Credentials, Interest, ProfileUpdate, RefreshRequest,
    TokenPair, UpdatedUserInterest, UserInterest, UserProfile,
};

use super::{ApiError, PendingRequest};

// ============================================================================
// Constants
// ============================================================================

/// Base URL used when neither config nor environment provides one
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const REGISTER_PATH: &str = "/register/";
const TOKEN_PATH: &str = "/token/";
const TOKEN_REFRESH_PATH: &str = "/token/refresh/";
const PROFILE_PATH: &str = "/profile/";
const USER_INTERESTS_PATH: &str = "/user-interests/";
const INTERESTS_PATH: &str = "/interests/";
const BULK_UPDATE_INTERESTS_PATH: &str = "/user-interests/bulk-update/";

/// API client for the account service.
/// Clone is cheap - reqwest::Client and the session are both behind Arcs.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<Session>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: Arc<Session>) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, session, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        session: Arc<Session>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            session,
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    // ===== Request Pipeline =====

    /// Send `req` once, with the current access token if there is one.
    /// Returns the response together with the token that was attached.
    ///
    /// An unreadable token store counts as no token: the request still goes
    /// out, unauthenticated.
    async fn dispatch(&self, req: &PendingRequest) -> Result<(Response, Option<String>), ApiError> {
        let token = match self.session.access_token() {
            Ok(token) => token,
            Err(e) => {
                warn!(path = %req.path, error = %e, "Failed to read access token, sending without it");
                None
            }
        };

        let mut builder = self.client.request(req.method.clone(), self.url(&req.path));
        if let Some(ref token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(ref body) = req.body {
            builder = builder.json(body);
        }

        debug!(
            method = %req.method,
            path = %req.path,
            authenticated = token.is_some(),
            retried = req.retried,
            "Sending request"
        );
        let response = builder.send().await?;
        Ok((response, token))
    }

    /// Run a request through the refresh-and-retry layer.
    ///
    /// A 401 on the first attempt refreshes the access token and re-sends the
    /// request exactly once. If the refresh fails the session is cleared and
    /// the refresh error is returned as `ApiError::RefreshFailed`.
    pub async fn execute(&self, req: PendingRequest) -> Result<Response, ApiError> {
        let method = req.method.clone();
        let path = req.path.clone();

        let result = self.execute_with_reauth(req).await;
        if let Err(ref e) = result {
            warn!(method = %method, path = %path, error = %e, "API request failed");
        }
        result
    }

    async fn execute_with_reauth(&self, mut req: PendingRequest) -> Result<Response, ApiError> {
        let (response, sent_token) = self.dispatch(&req).await?;

        if response.status() != StatusCode::UNAUTHORIZED || !req.may_reauthenticate() {
            return Self::check_response(response).await;
        }

        req.retried = true;
        info!(path = %req.path, "Access token rejected, refreshing session");

        self.reauthenticate(sent_token.as_deref())
            .await
            .map_err(|e| ApiError::RefreshFailed(Box::new(e)))?;

        let (response, _) = self.dispatch(&req).await?;
        Self::check_response(response).await
    }

    /// Refresh after a 401 on a request sent with `stale`.
    /// Refreshes are serialized; any failure logs the user out.
    async fn reauthenticate(&self, stale: Option<&str>) -> Result<(), ApiError> {
        let _guard = self.session.refresh_lock().lock().await;

        let result = self.refresh_unless_renewed(stale).await;
        if let Err(ref e) = result {
            warn!(error = %e, "Token refresh failed, clearing session");
            if let Err(clear_err) = self.session.clear() {
                error!(error = %clear_err, "Failed to clear session after refresh failure");
            }
        }
        result
    }

    async fn refresh_unless_renewed(&self, stale: Option<&str>) -> Result<(), ApiError> {
        let current = self.session.access_token()?;
        if current.is_some() && current.as_deref() != stale {
            // Another request refreshed while this one waited for the lock
            debug!("Access token already renewed, skipping refresh");
            return Ok(());
        }
        self.refresh_access_token().await
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// Fails with `NoRefreshToken` before any network call when the session
    /// has no refresh token. Does not clear the session on failure; `execute`
    /// does that for refreshes it starts itself. If the session is logged out
    /// or replaced while the call is in flight, the new token is dropped.
    pub async fn refresh_access_token(&self) -> Result<(), ApiError> {
        let refresh = self
            .session
            .refresh_token()?
            .ok_or(ApiError::NoRefreshToken)?;

        // Sent through `dispatch` directly: a refresh is never itself refreshed
        let req = PendingRequest::post(TOKEN_REFRESH_PATH)
            .json(&RefreshRequest { refresh: refresh.clone() })?
            .without_reauth();
        let result = self.send_refresh(&req).await;
        if let Err(ref e) = result {
            warn!(path = %req.path, error = %e, "Token refresh request failed");
        }
        let token = result?;

        if self.session.renew_access(&refresh, token.access)? {
            debug!("Access token renewed");
        } else {
            info!("Session changed during refresh, discarding renewed token");
        }
        Ok(())
    }

    async fn send_refresh(&self, req: &PendingRequest) -> Result<AccessToken, ApiError> {
        let (response, _) = self.dispatch(req).await?;
        let response = Self::check_response(response).await?;
        Self::parse_json(response).await
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let url = response.url().path().to_string();
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", url, e))
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.execute(PendingRequest::get(path)).await?;
        Self::parse_json(response).await
    }

    // ===== Account Methods =====

    /// Create an account. The response body is not used.
    ///
    /// Never refreshes: a 401 here is returned as `Unauthorized` as is.
    pub async fn register(&self, credentials: &Credentials) -> Result<(), ApiError> {
        let req = PendingRequest::post(REGISTER_PATH)
            .json(credentials)?
            .without_reauth();
        self.execute(req).await?;
        info!(email = %credentials.email, "Account registered");
        Ok(())
    }

    /// Exchange credentials for an access/refresh token pair.
    /// The caller decides whether to store the pair.
    ///
    /// Never refreshes: a 401 means the credentials were rejected.
    pub async fn obtain_token_pair(&self, credentials: &Credentials) -> Result<TokenPair, ApiError> {
        let req = PendingRequest::post(TOKEN_PATH)
            .json(credentials)?
            .without_reauth();
        let response = self.execute(req).await?;
        Self::parse_json(response).await
    }

    // ===== Profile Methods =====

    pub async fn fetch_profile(&self) -> Result<UserProfile, ApiError> {
        self.get(PROFILE_PATH).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ApiError> {
        let req = PendingRequest::patch(PROFILE_PATH).json(update)?;
        let response = self.execute(req).await?;
        Self::parse_json(response).await
    }

    pub async fn update_bio(&self, bio: &str) -> Result<UserProfile, ApiError> {
        self.update_profile(&ProfileUpdate::bio(bio)).await
    }

    // ===== Interest Methods =====

    /// Interests the user has selected
    pub async fn fetch_user_interests(&self) -> Result<Vec<UserInterest>, ApiError> {
        self.get(USER_INTERESTS_PATH).await
    }

    /// The full interest catalogue
    pub async fn fetch_all_interests(&self) -> Result<Vec<Interest>, ApiError> {
        self.get(INTERESTS_PATH).await
    }

    /// Replace the user's interests with the given set
    pub async fn bulk_update_interests(&self, interests: &[UpdatedUserInterest]) -> Result<(), ApiError> {
        let req = PendingRequest::post(BULK_UPDATE_INTERESTS_PATH).json(interests)?;
        self.execute(req).await?;
        debug!(count = interests.len(), "User interests updated");
        Ok(())
    }

    /// Save a selection of interest ids and return the resulting interest list.
    /// The list is built from the catalogue, in catalogue order.
    pub async fn save_interest_selection(&self, ids: &[i64]) -> Result<Vec<UserInterest>, ApiError> {
        let catalogue = self.fetch_all_interests().await?;

        let unknown: Vec<i64> = ids
            .iter()
            .copied()
            .filter(|id| !catalogue.iter().any(|i| i.id == *id))
            .collect();
        if !unknown.is_empty() {
            warn!(?unknown, "Selected interest ids not in catalogue");
        }

        self.bulk_update_interests(&UpdatedUserInterest::from_ids(ids)).await?;
        Ok(selected_interests(&catalogue, ids))
    }
}
