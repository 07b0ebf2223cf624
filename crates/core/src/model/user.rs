use serde::{Deserialize, Serialize};

use crate::model::ids::UserId;

/// Access level stored on a user document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    #[default]
    User,
    Admin,
}

/// The `users` collection document for one identity-provider account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub permission: Permission,
}

/// The signed-in user, passed explicitly into services instead of read from
/// ambient scope. Absence of a `CurrentUser` is the anonymous-preview path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    id: UserId,
    name: Option<String>,
    email: Option<String>,
    permission: Permission,
}

impl CurrentUser {
    #[must_use]
    pub fn new(id: UserId, profile: UserProfile) -> Self {
        Self {
            id,
            name: profile.name,
            email: profile.email,
            permission: profile.permission,
        }
    }

    #[must_use]
    pub fn id(&self) -> &UserId {
        &self.id
    }

    #[must_use]
    pub fn permission(&self) -> Permission {
        self.permission
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.permission == Permission::Admin
    }

    /// Display name, falling back for accounts that never set one.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or("Anonymous")
    }

    /// Contact email, falling back for accounts that never set one.
    #[must_use]
    pub fn contact_email(&self) -> &str {
        self.email
            .as_deref()
            .filter(|email| !email.trim().is_empty())
            .unwrap_or("not provided")
    }
}
