//! Bearer-token credential adapter for the Azure DevOps SDK.

use azure_core::credentials::{AccessToken, Secret, TokenCredential, TokenRequestOptions};
use secrecy::{ExposeSecret, SecretString};

/// A pre-acquired Entra ID token presented to the SDK as a `TokenCredential`.
///
/// The token is handed back as-is for every scope; refreshing it is the
/// caller's job.
#[derive(Clone)]
pub struct BearerCredential {
    token: SecretString,
}

impl BearerCredential {
    pub fn new(token: SecretString) -> Self {
        Self { token }
    }
}

impl std::fmt::Debug for BearerCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerCredential")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[async_trait::async_trait]
impl TokenCredential for BearerCredential {
    async fn get_token(
        &self,
        _scopes: &[&str],
        _options: Option<TokenRequestOptions<'_>>,
    ) -> azure_core::error::Result<AccessToken> {
        // The real expiry is unknown here; the service rejects stale tokens.
        Ok(AccessToken::new(
            Secret::new(self.token.expose_secret().to_string()),
            time::OffsetDateTime::now_utc() + time::Duration::hours(1),
        ))
    }
}
