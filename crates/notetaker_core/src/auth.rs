//! Authentication gate.
//!
//! # Responsibility
//! - Resolve a `Session` before any note store can be built.
//! - Keep credential material out of `Debug` output and logs.
//!
//! # Invariants
//! - A remote backend session carries exactly one credential.
//! - A session always has a non-empty principal.

use crate::config::{AppConfig, BackendConfig};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Principal used for local sessions when none is configured. Remote
/// sessions must name their user.
pub const LOCAL_PRINCIPAL: &str = "local";

/// Credential presented to the note store.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Static API key (`x-api-key` header).
    ApiKey(String),
    /// User-pool or OIDC token (`Authorization` header).
    BearerToken(String),
    /// Local backend; nothing to present.
    Local,
}

impl Credential {
    /// Returns the HTTP header carrying this credential, if any.
    pub fn header(&self) -> Option<(&'static str, &str)> {
        match self {
            Self::ApiKey(key) => Some(("x-api-key", key.as_str())),
            Self::BearerToken(token) => Some(("Authorization", token.as_str())),
            Self::Local => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::ApiKey(_) => "api_key",
            Self::BearerToken(_) => "bearer_token",
            Self::Local => "local",
        }
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "Local"),
            other => write!(f, "{}(<redacted>)", other.kind()),
        }
    }
}

/// Granted session. Its existence is what unlocks the note UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Display name of the signed-in user.
    pub principal: String,
    pub credential: Credential,
}

impl Session {
    /// Greeting line shown once the gate opens.
    pub fn greeting(&self) -> String {
        format!("Hello, {}", self.principal)
    }
}

/// Why the gate refused to grant a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Remote backend configured without API key or token.
    MissingCredential,
    /// Both API key and token configured; the choice would be ambiguous.
    ConflictingCredentials,
    /// Remote backend configured without a user name.
    MissingPrincipal,
    /// Configured principal is blank.
    EmptyPrincipal,
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCredential => {
                write!(f, "not signed in: configure an API key or an auth token")
            }
            Self::ConflictingCredentials => {
                write!(f, "both an API key and an auth token are configured; keep one")
            }
            Self::MissingPrincipal => write!(f, "not signed in: configure a user name"),
            Self::EmptyPrincipal => write!(f, "user name cannot be blank"),
        }
    }
}

impl Error for AuthError {}

/// Grants a session from resolved configuration.
///
/// # Errors
/// - `MissingCredential` / `ConflictingCredentials` for GraphQL backends
///   without exactly one credential.
/// - `MissingPrincipal` for GraphQL backends without a user name.
/// - `EmptyPrincipal` when a blank user name is configured.
pub fn authenticate(config: &AppConfig) -> Result<Session, AuthError> {
    let result = grant(config);
    match &result {
        Ok(session) => info!(
            "event=auth_gate module=auth status=ok credential={}",
            session.credential.kind()
        ),
        Err(err) => warn!("event=auth_gate module=auth status=error error={err}"),
    }
    result
}

fn grant(config: &AppConfig) -> Result<Session, AuthError> {
    let credential = match &config.backend {
        BackendConfig::GraphQl {
            api_key, auth_token, ..
        } => match (api_key, auth_token) {
            (Some(_), Some(_)) => return Err(AuthError::ConflictingCredentials),
            (Some(key), None) => Credential::ApiKey(key.clone()),
            (None, Some(token)) => Credential::BearerToken(token.clone()),
            (None, None) => return Err(AuthError::MissingCredential),
        },
        BackendConfig::Sqlite { .. } => Credential::Local,
    };

    let principal = match &config.user {
        Some(user) if user.trim().is_empty() => return Err(AuthError::EmptyPrincipal),
        Some(user) => user.trim().to_string(),
        None if credential == Credential::Local => LOCAL_PRINCIPAL.to_string(),
        None => return Err(AuthError::MissingPrincipal),
    };

    Ok(Session {
        principal,
        credential,
    })
}
