//! Short-lived signing credentials and the sources that resolve them.
//!
//! The transport never knows where credentials come from: it is handed a
//! [`CredentialSource`] and asks it for fresh [`Credentials`] on every call.
//! [`default_chain`] mirrors the usual AWS resolution order (environment,
//! shared credentials file, container endpoint, instance role) but any
//! source, or any ordering of sources, can be injected instead.
//!
//! ## Usage
//!
//! ```no_run
//! use sigproxy_search::credentials::{CredentialSource, StaticCredentials};
//!
//! # async fn example() -> sigproxy_search::Result<()> {
//! let source = StaticCredentials::new("AKIDEXAMPLE", "secret");
//! let creds = source.resolve().await?;
//! assert_eq!(creds.access_key_id, "AKIDEXAMPLE");
//! # Ok(())
//! # }
//! ```

mod providers;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::SearchError;

pub use providers::{
    ContainerCredentials, EnvironmentCredentials, InstanceMetadataCredentials, ProfileCredentials,
    StaticCredentials,
};

/// Credentials used to sign one outbound request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Access key id, included in the signature scope.
    pub access_key_id: String,
    /// Secret key, used only to derive the signing key.
    pub secret_access_key: String,
    /// Session token for temporary credentials.
    pub session_token: Option<String>,
    /// When temporary credentials stop being valid.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credentials {
    /// Long-lived credentials with no session token.
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
            expires_at: None,
        }
    }

    /// Attach a session token.
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Attach an expiry.
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Returns true if the credentials carry an expiry at or before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Something that can produce signing credentials on demand.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Short name used in logs and aggregated errors.
    fn name(&self) -> &str;

    /// Resolve credentials.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Credential`] if this source has nothing usable.
    async fn resolve(&self) -> Result<Credentials, SearchError>;
}

/// Tries each source in order and returns the first usable credentials.
pub struct CredentialChain {
    sources: Vec<Box<dyn CredentialSource>>,
}

impl CredentialChain {
    /// Creates an empty chain. An empty chain always fails.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Appends a source to the end of the chain.
    pub fn with_source(mut self, source: impl CredentialSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Number of sources in the chain.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns true if the chain has no sources.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Source names in resolution order.
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|source| source.name()).collect()
    }
}

impl Default for CredentialChain {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialSource for CredentialChain {
    fn name(&self) -> &str {
        "chain"
    }

    async fn resolve(&self) -> Result<Credentials, SearchError> {
        let now = Utc::now();
        let mut failures = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            match source.resolve().await {
                Ok(creds) if creds.is_expired_at(now) => {
                    tracing::debug!(source = source.name(), "credentials already expired");
                    failures.push(format!("{}: credentials expired", source.name()));
                }
                Ok(creds) => {
                    tracing::debug!(source = source.name(), "resolved signing credentials");
                    return Ok(creds);
                }
                Err(err) => {
                    tracing::debug!(
                        source = source.name(),
                        error = %err,
                        "credential source skipped"
                    );
                    failures.push(format!("{}: {}", source.name(), err));
                }
            }
        }

        if failures.is_empty() {
            return Err(SearchError::Credential(
                "no credential sources configured".into(),
            ));
        }
        Err(SearchError::Credential(format!(
            "no credential source succeeded ({})",
            failures.join("; ")
        )))
    }
}

/// Environment → shared credentials file → container endpoint → instance role.
pub fn default_chain() -> CredentialChain {
    CredentialChain::new()
        .with_source(EnvironmentCredentials::new())
        .with_source(ProfileCredentials::from_env())
        .with_source(ContainerCredentials::from_env())
        .with_source(InstanceMetadataCredentials::from_env())
}
