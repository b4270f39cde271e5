//! Credentials for Azure DevOps requests.
//!
//! A `TokenProvider` hands out an `AccessToken` on demand. Personal access
//! tokens go out as Basic auth with an empty user name; Entra ID tokens go out
//! as Bearer auth. The SDK does the header encoding.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use azure_devops_rust_api::Credential;
use secrecy::{ExposeSecret, SecretString};

use super::credential::BearerCredential;
use super::error::{AdoError, AdoResult};

/// How a token is presented to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    Basic,
    Bearer,
}

/// A credential ready to attach to a request.
#[derive(Clone)]
pub struct AccessToken {
    scheme: AuthScheme,
    secret: SecretString,
}

impl AccessToken {
    pub fn new(scheme: AuthScheme, secret: SecretString) -> Self {
        Self { scheme, secret }
    }

    pub fn scheme(&self) -> AuthScheme {
        self.scheme
    }

    /// Convert into the credential the SDK clients are built with.
    pub fn to_credential(&self) -> Credential {
        match self.scheme {
            AuthScheme::Basic => Credential::from_pat(self.secret.expose_secret().to_string()),
            AuthScheme::Bearer => {
                Credential::TokenCredential(Arc::new(BearerCredential::new(self.secret.clone())))
            }
        }
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("scheme", &self.scheme)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Produces a credential on demand.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> AdoResult<AccessToken>;
}

/// Personal access token credential.
#[derive(Clone)]
pub struct PatTokenProvider {
    pat: SecretString,
}

impl PatTokenProvider {
    pub fn new(pat: SecretString) -> Self {
        Self { pat }
    }
}

impl fmt::Debug for PatTokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatTokenProvider")
            .field("pat", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl TokenProvider for PatTokenProvider {
    async fn access_token(&self) -> AdoResult<AccessToken> {
        non_empty(AccessToken::new(AuthScheme::Basic, self.pat.clone()))
    }
}

/// A pre-acquired bearer token, e.g. from `az account get-access-token`.
#[derive(Clone)]
pub struct StaticBearerTokenProvider {
    token: SecretString,
}

impl StaticBearerTokenProvider {
    pub fn new(token: SecretString) -> Self {
        Self { token }
    }
}

impl fmt::Debug for StaticBearerTokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticBearerTokenProvider")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl TokenProvider for StaticBearerTokenProvider {
    async fn access_token(&self) -> AdoResult<AccessToken> {
        non_empty(AccessToken::new(AuthScheme::Bearer, self.token.clone()))
    }
}

fn non_empty(token: AccessToken) -> AdoResult<AccessToken> {
    if token.secret.expose_secret().trim().is_empty() {
        return Err(AdoError::Auth("credential is empty".to_string()));
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pat_provider_uses_basic_scheme() {
        let provider = PatTokenProvider::new(SecretString::from("my-pat".to_string()));
        let token = provider.access_token().await.unwrap();
        assert_eq!(token.scheme(), AuthScheme::Basic);
        assert!(matches!(token.to_credential(), Credential::Pat(_)));
    }

    #[tokio::test]
    async fn test_bearer_provider_uses_bearer_scheme() {
        let provider = StaticBearerTokenProvider::new(SecretString::from("eyJ0eXAi".to_string()));
        let token = provider.access_token().await.unwrap();
        assert_eq!(token.scheme(), AuthScheme::Bearer);
        assert!(matches!(token.to_credential(), Credential::TokenCredential(_)));
    }

    #[tokio::test]
    async fn test_empty_credential_is_rejected() {
        let provider = PatTokenProvider::new(SecretString::from("   ".to_string()));
        let err = provider.access_token().await.unwrap_err();
        assert!(matches!(err, AdoError::Auth(_)));
    }

    #[test]
    fn test_debug_output_is_redacted() {
        let provider = PatTokenProvider::new(SecretString::from("super-secret".to_string()));
        let rendered = format!("{:?}", provider);
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("super-secret"));

        let token = AccessToken::new(AuthScheme::Bearer, SecretString::from("abc".to_string()));
        assert!(!format!("{:?}", token).contains("abc"));
    }
}
