//! Core library for profilehub.
//!
//! Provides the session token store, the authenticated API client with its
//! refresh-and-retry layer, the wire models for profiles and interests, and
//! the login/logout facade used by front ends.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::{Auth, Session, TokenStore, Tokens};
pub use config::{Config, TokenStorage};
