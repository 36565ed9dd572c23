use tokio::sync::watch;
use tracing::{error, info};

use crate::api::{ApiClient, ApiError};
use crate::models::Credentials;

use super::validate::validate_credentials;

/// Login, signup and logout on top of an `ApiClient` and its session.
///
/// The authenticated flag lives in the shared `Session`, so a refresh
/// failure inside the client is visible here as well.
#[derive(Clone)]
pub struct Auth {
    api: ApiClient,
}

impl Auth {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn is_authenticated(&self) -> bool {
        self.api.session().is_authenticated()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.api.session().subscribe()
    }

    /// Create an account. Does not log in.
    pub async fn signup(&self, email: &str, password: &str) -> Result<(), ApiError> {
        validate_credentials(email, password)?;
        self.api
            .register(&Credentials::new(email.trim(), password))
            .await
    }

    /// Exchange credentials for tokens and store them
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ApiError> {
        validate_credentials(email, password)?;
        let credentials = Credentials::new(email.trim(), password);

        let pair = match self.api.obtain_token_pair(&credentials).await {
            Ok(pair) => pair,
            Err(e) => {
                error!(error = %e, "Login failed");
                return Err(e);
            }
        };

        self.api.session().set(pair.access, pair.refresh)?;
        info!(email = %credentials.email, "Login successful");
        Ok(())
    }

    /// Forget both tokens. Leaves the store empty whatever its prior state.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.api.session().clear()?;
        info!("Logged out");
        Ok(())
    }
}
