use std::sync::Arc;

use course_core::model::{CurrentUser, UserId, UserProfile};

use crate::error::RemoteStoreError;
use crate::remote::{DocumentStore, USERS};

/// Resolves profile documents for identity-provider accounts.
///
/// Sign-in and registration belong to the identity provider; this only looks
/// up the stored profile and its permission so callers can inject an explicit
/// `CurrentUser` instead of reading ambient auth state.
#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<DocumentStore>,
}

impl UserDirectory {
    #[must_use]
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Resolve a signed-in account to a `CurrentUser`.
    ///
    /// `None` means the identity exists but has no profile document yet; the
    /// caller decides whether that is the anonymous path.
    ///
    /// # Errors
    ///
    /// Returns `RemoteStoreError` if the lookup fails.
    pub async fn current_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<CurrentUser>, RemoteStoreError> {
        let profile: Option<UserProfile> = self.store.fetch(USERS, user_id.as_str()).await?;
        Ok(profile.map(|profile| CurrentUser::new(user_id.clone(), profile)))
    }
}
