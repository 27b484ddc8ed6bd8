//! Best-effort identity resolution for one backend exchange.

use crate::accessor::IdentityAccessor;

/// Header carrying the plain user identifier.
pub const USER_ID_HEADER: &str = "X-User-ID";

/// Header carrying the short-lived bearer credential.
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Identity attachment resolved for one exchange. Both fields are optional;
/// an empty value means the exchange proceeds without that layer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdentityHeaders {
    pub user_id: Option<String>,
    pub bearer_token: Option<String>,
}

impl IdentityHeaders {
    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none() && self.bearer_token.is_none()
    }

    /// Returns the `Authorization` header value, when a credential resolved.
    pub fn bearer_value(&self) -> Option<String> {
        self.bearer_token
            .as_ref()
            .map(|token| format!("Bearer {}", token))
    }
}

/// Resolves identity for one exchange, collecting whatever the provider can
/// supply and ignoring whatever it cannot.
///
/// The session lookup and the credential fetch run concurrently and fail
/// independently; a failure in either is absorbed (debug-logged) rather than
/// propagated, so the exchange itself is never blocked on identity.
pub async fn resolve_identity(accessor: &dyn IdentityAccessor) -> IdentityHeaders {
    let (session, credential) = tokio::join!(
        accessor.current_session(),
        accessor.short_lived_credential()
    );

    let user_id = match session {
        Ok(session) => session.map(|s| s.user_id),
        Err(e) => {
            tracing::debug!(error = %e, "Session lookup failed, proceeding unidentified");
            None
        }
    };

    let bearer_token = match credential {
        Ok(token) => token,
        Err(e) => {
            tracing::debug!(error = %e, "Credential fetch failed, proceeding without bearer");
            None
        }
    };

    IdentityHeaders {
        user_id,
        bearer_token,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::{AnonymousIdentity, StaticIdentity, UserSession};
    use async_trait::async_trait;
    use lectern_core::{LecternError, Result};

    /// Provider whose session lookup works but whose credential issuance is
    /// broken, and vice versa.
    struct FlakyProvider {
        session_ok: bool,
        credential_ok: bool,
    }

    #[async_trait]
    impl crate::IdentityAccessor for FlakyProvider {
        async fn current_session(&self) -> Result<Option<UserSession>> {
            if self.session_ok {
                Ok(Some(UserSession::new("user-7".to_string())))
            } else {
                Err(LecternError::Identity("session store down".to_string()))
            }
        }

        async fn short_lived_credential(&self) -> Result<Option<String>> {
            if self.credential_ok {
                Ok(Some("tok-7".to_string()))
            } else {
                Err(LecternError::Identity("signer down".to_string()))
            }
        }

        async fn sign_in(&self, _email: String, _password: String) -> Result<UserSession> {
            Err(LecternError::Identity("unsupported".to_string()))
        }

        async fn sign_up(
            &self,
            _email: String,
            _password: String,
            _display_name: String,
        ) -> Result<UserSession> {
            Err(LecternError::Identity("unsupported".to_string()))
        }

        async fn sign_out(&self) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_resolve_full_identity() {
        let accessor =
            StaticIdentity::new("user-42".to_string()).with_credential("tok-abc".to_string());
        let headers = resolve_identity(&accessor).await;
        assert_eq!(headers.user_id.as_deref(), Some("user-42"));
        assert_eq!(headers.bearer_token.as_deref(), Some("tok-abc"));
        assert!(!headers.is_anonymous());
    }

    #[tokio::test]
    async fn test_resolve_anonymous() {
        let headers = resolve_identity(&AnonymousIdentity).await;
        assert!(headers.is_anonymous());
        assert_eq!(headers.bearer_value(), None);
    }

    #[tokio::test]
    async fn test_credential_failure_keeps_user_id() {
        let accessor = FlakyProvider {
            session_ok: true,
            credential_ok: false,
        };
        let headers = resolve_identity(&accessor).await;
        assert_eq!(headers.user_id.as_deref(), Some("user-7"));
        assert_eq!(headers.bearer_token, None);
    }

    #[tokio::test]
    async fn test_session_failure_keeps_credential() {
        let accessor = FlakyProvider {
            session_ok: false,
            credential_ok: true,
        };
        let headers = resolve_identity(&accessor).await;
        assert_eq!(headers.user_id, None);
        assert_eq!(headers.bearer_token.as_deref(), Some("tok-7"));
    }

    #[tokio::test]
    async fn test_both_failures_resolve_anonymous() {
        let accessor = FlakyProvider {
            session_ok: false,
            credential_ok: false,
        };
        let headers = resolve_identity(&accessor).await;
        assert!(headers.is_anonymous());
    }

    #[test]
    fn test_bearer_value_format() {
        let headers = IdentityHeaders {
            user_id: None,
            bearer_token: Some("tok-xyz".to_string()),
        };
        assert_eq!(headers.bearer_value().as_deref(), Some("Bearer tok-xyz"));
    }
}
