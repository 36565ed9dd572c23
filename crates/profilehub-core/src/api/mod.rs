//! REST API client module for the profilehub account service.
//!
//! This module provides the `ApiClient` for registering, obtaining tokens,
//! and reading or updating the user's profile and interests.
//!
//! Every request carries the session's bearer token when one is present.
//! A 401 triggers a single refresh of the access token followed by one
//! retry of the original request.

pub mod client;
pub mod error;
pub mod request;

pub use client::ApiClient;
pub use error::ApiError;
pub use request::PendingRequest;
