//! Command handlers for the profilehub CLI.
//!
//! `App` owns the configuration and the `Auth` facade (which in turn owns
//! the API client and the shared session) and runs one command per process.

use std::io::{self, Write};

use anyhow::{bail, Result};
use chrono::Utc;
use profilehub_core::utils::format_age;
use profilehub_core::{ApiClient, ApiError, Auth, Config};
use tracing::{debug, info, warn};

use crate::command::{Command, USAGE};
use crate::render::{render_catalogue, render_profile, render_user_interests};

/// Environment variable consulted before prompting for a password
const PASSWORD_ENV: &str = "PROFILEHUB_PASSWORD";

pub struct App {
    config: Config,
    auth: Auth,
}

impl App {
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let base_url = config.base_url();
        debug!(%base_url, storage = ?config.token_storage, "Config loaded");

        let session = config.open_session()?;
        let api = ApiClient::with_timeout(base_url, session, config.request_timeout())?;

        Ok(Self {
            config,
            auth: Auth::new(api),
        })
    }

    fn api(&self) -> &ApiClient {
        self.auth.api()
    }

    pub async fn run(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Signup { email } => self.signup(email).await,
            Command::Login { email } => self.login(email).await,
            Command::Logout => self.logout(),
            Command::Status => {
                self.status();
                Ok(())
            }
            Command::Profile => self.profile().await,
            Command::Bio { text } => self.update_bio(&text).await,
            Command::Interests => self.interests().await,
            Command::AllInterests => self.all_interests().await,
            Command::SetInterests { ids } => self.set_interests(&ids).await,
            Command::Help => {
                println!("{}", USAGE);
                Ok(())
            }
        }
    }

    // ===== Account =====

    async fn signup(&mut self, email: Option<String>) -> Result<()> {
        let email = self.resolve_email(email)?;
        let password = Self::read_password()?;

        match self.auth.signup(&email, &password).await {
            Ok(()) => {
                println!("Account created for {}. You can now log in.", email.trim());
                Ok(())
            }
            Err(ApiError::Validation(e)) => bail!("{}", e),
            Err(ApiError::BadRequest(reason)) => bail!("Failed to sign up: {}", reason),
            Err(e) => bail!("Failed to sign up. Please try again. ({})", user_message(&e)),
        }
    }

    async fn login(&mut self, email: Option<String>) -> Result<()> {
        let email = self.resolve_email(email)?;
        let password = Self::read_password()?;

        match self.auth.login(&email, &password).await {
            Ok(()) => {}
            Err(ApiError::Validation(e)) => bail!("{}", e),
            Err(ApiError::Unauthorized) => {
                bail!("Failed to log in. Please check your credentials.")
            }
            Err(e) => bail!("{}", user_message(&e)),
        }

        self.config.last_email = Some(email.trim().to_string());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        println!("Logged in as {}.", email.trim());
        Ok(())
    }

    fn logout(&mut self) -> Result<()> {
        self.auth.logout()?;
        println!("Logged out.");
        Ok(())
    }

    fn status(&self) {
        println!("API:     {}", self.api().base_url());
        if self.auth.is_authenticated() {
            let saved = self
                .api()
                .session()
                .saved_at()
                .map(|at| format!(" (session saved {})", format_age(at, Utc::now())))
                .unwrap_or_default();
            println!("Session: logged in{}", saved);
        } else {
            println!("Session: logged out");
        }
    }

    // ===== Profile =====

    async fn profile(&self) -> Result<()> {
        self.require_login("view your profile")?;

        let api = self.api();
        let (profile, interests) =
            futures::try_join!(api.fetch_profile(), api.fetch_user_interests())
                .map_err(|e| self.after_failure(e, "Failed to fetch profile data"))?;

        print!("{}", render_profile(&profile, &interests));
        Ok(())
    }

    async fn update_bio(&self, text: &str) -> Result<()> {
        self.require_login("edit your bio")?;

        let profile = self
            .api()
            .update_bio(text)
            .await
            .map_err(|e| self.after_failure(e, "Failed to update bio"))?;

        println!("Bio updated: {}", profile.bio_display());
        Ok(())
    }

    async fn interests(&self) -> Result<()> {
        self.require_login("view your interests")?;

        let interests = self
            .api()
            .fetch_user_interests()
            .await
            .map_err(|e| self.after_failure(e, "Failed to fetch interests"))?;

        print!("{}", render_user_interests(&interests));
        Ok(())
    }

    async fn all_interests(&self) -> Result<()> {
        self.require_login("view interests")?;

        let api = self.api();
        let (catalogue, mine) =
            futures::try_join!(api.fetch_all_interests(), api.fetch_user_interests())
                .map_err(|e| self.after_failure(e, "Failed to fetch all interests"))?;

        let selected: Vec<i64> = mine.iter().map(|i| i.interest_id).collect();
        print!("{}", render_catalogue(&catalogue, &selected));
        Ok(())
    }

    async fn set_interests(&self, ids: &[i64]) -> Result<()> {
        self.require_login("edit your interests")?;

        let saved = self
            .api()
            .save_interest_selection(ids)
            .await
            .map_err(|e| self.after_failure(e, "Failed to update interests"))?;

        info!(count = saved.len(), "Interests saved");
        print!("{}", render_user_interests(&saved));
        Ok(())
    }

    // ===== Helpers =====

    fn require_login(&self, action: &str) -> Result<()> {
        if self.auth.is_authenticated() {
            Ok(())
        } else {
            bail!("Please log in to {}. Run `profilehub login`.", action)
        }
    }

    /// Convert an API failure into the message shown to the user
    fn after_failure(&self, err: ApiError, context: &str) -> anyhow::Error {
        if !self.auth.is_authenticated() {
            return anyhow::anyhow!("{}", user_message(&err));
        }
        anyhow::anyhow!("{}: {}", context, user_message(&err))
    }

    fn resolve_email(&self, email: Option<String>) -> Result<String> {
        if let Some(email) = email {
            return Ok(email);
        }

        match self.config.last_email {
            Some(ref last) => print!("Email [{}]: ", last),
            None => print!("Email: "),
        }
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim();

        match (input.is_empty(), &self.config.last_email) {
            (true, Some(last)) => Ok(last.clone()),
            _ => Ok(input.to_string()),
        }
    }

    fn read_password() -> Result<String> {
        if let Ok(password) = std::env::var(PASSWORD_ENV) {
            return Ok(password);
        }
        Ok(rpassword::prompt_password("Password: ")?)
    }
}

/// User-facing text for an API error
pub fn user_message(err: &ApiError) -> String {
    match err {
        ApiError::Validation(e) => e.to_string(),
        e if e.is_unauthorized() => "Your session has expired. Please log in again.".to_string(),
        ApiError::BadRequest(reason) => format!("Request rejected: {}", reason),
        ApiError::NetworkError(e) if e.is_timeout() => {
            "Connection timed out. Please try again.".to_string()
        }
        ApiError::NetworkError(e) if e.is_connect() => {
            "Unable to connect to server. Check your internet connection.".to_string()
        }
        ApiError::ServerError(_) => "The server had a problem. Please try again later.".to_string(),
        ApiError::RateLimited => "Too many requests. Please wait and try again.".to_string(),
        other => other.to_string(),
    }
}
