use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct UserProfile {
    pub email: String,
    #[serde(default)]
    pub bio: String,
}

impl UserProfile {
    /// Bio text for display, with a placeholder when empty
    pub fn bio_display(&self) -> &str {
        if self.bio.trim().is_empty() {
            "(no bio)"
        } else {
            &self.bio
        }
    }
}

/// Partial update sent with `PATCH /profile/`. Unset fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl ProfileUpdate {
    pub fn bio(bio: impl Into<String>) -> Self {
        Self {
            bio: Some(bio.into()),
        }
    }
}
