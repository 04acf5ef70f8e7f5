//! Session-related types for admin authentication.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use ayucan_core::{AdminRole, AdminUserId};

use crate::api::AdminProfile;

/// Session-stored admin identity.
///
/// Minimal data stored in the session to identify the logged-in admin.
/// The backend token is stored separately under [`keys::API_TOKEN`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrentAdmin {
    /// Admin's backend ID.
    pub id: AdminUserId,
    /// Admin's email address.
    pub email: String,
    /// Admin's display name.
    pub name: String,
    /// Admin's role/permission level.
    pub role: AdminRole,
}

impl From<AdminProfile> for CurrentAdmin {
    fn from(profile: AdminProfile) -> Self {
        Self {
            id: profile.id,
            email: profile.email,
            name: profile.name,
            role: profile.role,
        }
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";

    /// Key for the backend bearer token.
    pub const API_TOKEN: &str = "api_token";

    /// Key for the one-shot toast shown on the next page render.
    pub const FLASH: &str = "flash";
}
