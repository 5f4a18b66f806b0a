//! Account profile model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::auth::AuthContext;

/// Row of the `profiles` table.
///
/// Accounts are created at the auth provider, so a signed-in account may not
/// have a row yet. The row is created on the first profile update or when an
/// invitation is accepted.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Profile {
    pub user_id: Uuid,
    pub email: String,
    pub full_name: Option<String>,

    /// Global voice provider API key, used by every widget without its own
    pub retell_api_key: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for `PATCH /api/v1/profile`.
///
/// An empty `retell_api_key` clears the global key.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub retell_api_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub has_retell_api_key: bool,
    /// `None` until the profile row exists
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProfileResponse {
    /// View for a signed-in account that has no profile row yet.
    pub fn unsaved(auth: &AuthContext) -> Self {
        Self {
            user_id: auth.user_id,
            email: auth.email.clone(),
            full_name: None,
            has_retell_api_key: false,
            created_at: None,
            updated_at: None,
        }
    }
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            user_id: profile.user_id,
            email: Some(profile.email),
            full_name: profile.full_name,
            has_retell_api_key: profile.retell_api_key.is_some_and(|k| !k.is_empty()),
            created_at: Some(profile.created_at),
            updated_at: Some(profile.updated_at),
        }
    }
}
