//! The identity provider contract consumed by the assistant core.

use async_trait::async_trait;

use lectern_core::{LecternError, Result};

/// A signed-in user's session as reported by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserSession {
    pub user_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl UserSession {
    pub fn new(user_id: String) -> Self {
        Self {
            user_id,
            email: None,
            display_name: None,
        }
    }
}

/// Contract of the external identity collaborator.
///
/// The core issues exactly three kinds of read (`current_session`,
/// `short_lived_credential`) and pass-through (`sign_in`/`sign_up`/`sign_out`)
/// calls against it and assumes nothing about how the provider persists
/// users. The credential call may fail independently of session validity;
/// callers must treat it as an optional enhancement.
#[async_trait]
pub trait IdentityAccessor: Send + Sync {
    /// Looks up the current session, if any.
    async fn current_session(&self) -> Result<Option<UserSession>>;

    /// Fetches a short-lived signed credential for bearer authentication.
    ///
    /// `Ok(None)` means the provider issued nothing for this user; an `Err`
    /// means the issuance itself failed. Both are non-fatal to callers.
    async fn short_lived_credential(&self) -> Result<Option<String>>;

    /// Signs a user in with the provider.
    async fn sign_in(&self, email: String, password: String) -> Result<UserSession>;

    /// Registers a new user with the provider.
    async fn sign_up(
        &self,
        email: String,
        password: String,
        display_name: String,
    ) -> Result<UserSession>;

    /// Ends the current session with the provider.
    async fn sign_out(&self) -> Result<()>;
}

/// Accessor for a page with no identity provider wired up.
///
/// Reports no session and no credential, so every exchange proceeds
/// unauthenticated.
pub struct AnonymousIdentity;

#[async_trait]
impl IdentityAccessor for AnonymousIdentity {
    async fn current_session(&self) -> Result<Option<UserSession>> {
        Ok(None)
    }

    async fn short_lived_credential(&self) -> Result<Option<String>> {
        Ok(None)
    }

    async fn sign_in(&self, _email: String, _password: String) -> Result<UserSession> {
        Err(LecternError::Identity(
            "No identity provider is configured".to_string(),
        ))
    }

    async fn sign_up(
        &self,
        _email: String,
        _password: String,
        _display_name: String,
    ) -> Result<UserSession> {
        Err(LecternError::Identity(
            "No identity provider is configured".to_string(),
        ))
    }

    async fn sign_out(&self) -> Result<()> {
        Ok(())
    }
}

/// Accessor with a fixed identity, resolved out of band.
///
/// Used by the CLI (identity from environment variables) and by tests that
/// need a known session without a live provider.
pub struct StaticIdentity {
    session: UserSession,
    credential: Option<String>,
}

impl StaticIdentity {
    pub fn new(user_id: String) -> Self {
        Self {
            session: UserSession::new(user_id),
            credential: None,
        }
    }

    /// Attaches a fixed bearer credential returned by every
    /// `short_lived_credential` call.
    pub fn with_credential(mut self, token: String) -> Self {
        self.credential = Some(token);
        self
    }
}

#[async_trait]
impl IdentityAccessor for StaticIdentity {
    async fn current_session(&self) -> Result<Option<UserSession>> {
        Ok(Some(self.session.clone()))
    }

    async fn short_lived_credential(&self) -> Result<Option<String>> {
        Ok(self.credential.clone())
    }

    async fn sign_in(&self, _email: String, _password: String) -> Result<UserSession> {
        Err(LecternError::Identity(
            "A static identity cannot sign in".to_string(),
        ))
    }

    async fn sign_up(
        &self,
        _email: String,
        _password: String,
        _display_name: String,
    ) -> Result<UserSession> {
        Err(LecternError::Identity(
            "A static identity cannot sign up".to_string(),
        ))
    }

    async fn sign_out(&self) -> Result<()> {
        Ok(())
    }
}
