//! Data models for profilehub entities.
//!
//! This module contains the wire types exchanged with the account API:
//!
//! - `Credentials`, `TokenPair`, `AccessToken`: login and token renewal
//! - `UserProfile`, `ProfileUpdate`: the user's profile
//! - `Interest`, `UserInterest`: interest tags and the user's selection

pub mod interest;
pub mod profile;
pub mod token;

pub use interest::{
    group_by_category, selected_interests, Categorized, Interest, InterestGroup,
    UpdatedUserInterest, UserInterest,
};
pub use profile::{ProfileUpdate, UserProfile};
pub use token::{AccessToken, Credentials, RefreshRequest, TokenPair};
