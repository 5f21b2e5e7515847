//! Profile and session records.
//!
//! A profile row has the wire shape `{id, username, avatar_url, theme}` and
//! is distinct from the authentication identity: the session carries the
//! credential token, the profile carries display preferences. A profile
//! exists iff a session exists.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::theme::Theme;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub theme: Theme,
}

/// Partial profile update; only set fields are sent to the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.avatar_url.is_none() && self.theme.is_none()
    }

    /// Merge echoed fields over an existing profile, in place.
    pub fn apply_to(&self, profile: &mut Profile) {
        if let Some(username) = &self.username {
            profile.username = username.clone();
        }
        if let Some(avatar_url) = &self.avatar_url {
            profile.avatar_url = Some(avatar_url.clone());
        }
        if let Some(theme) = self.theme {
            profile.theme = theme;
        }
    }
}

/// An authenticated session: the owning user plus the credential token pair
/// issued by the auth service. Valid until logout or expiry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub user_id: Uuid,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}
