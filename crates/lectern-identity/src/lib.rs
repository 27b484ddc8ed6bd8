//! Identity collaborator contract and adapters.
//!
//! The assistant core never manages identity itself. It consumes an external
//! provider through the [`IdentityAccessor`] trait and attaches whatever
//! identity it can obtain, best-effort, to backend requests. Every call is
//! allowed to fail without blocking an exchange.

pub mod accessor;
pub mod headers;

pub use accessor::{AnonymousIdentity, IdentityAccessor, StaticIdentity, UserSession};
pub use headers::{resolve_identity, IdentityHeaders, AUTHORIZATION_HEADER, USER_ID_HEADER};
