//! Runtime configuration.
//!
//! Values come from an optional JSON file (with `${VAR}` expansion) and are
//! overridden by CLI flags / environment variables.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use std::{env, fs};

use secrecy::SecretString;
use serde::Deserialize;

use crate::ado::{PatTokenProvider, StaticBearerTokenProvider, TokenProvider};

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

const CONFIG_DIR_NAME: &str = "ado-testresults-mcp";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Azure DevOps organization is not set (use --organization or ADO_ORGANIZATION)")]
    MissingOrganization,

    #[error("No credential configured (use --pat / ADO_PAT or --bearer-token / ADO_BEARER_TOKEN)")]
    MissingCredential,
}

/// On-disk configuration. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileConfig {
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub pat: Option<String>,
    #[serde(default)]
    pub bearer_token: Option<String>,
}

/// Values supplied on the command line or through the environment.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub organization: Option<String>,
    pub timeout_secs: Option<u64>,
    pub pat: Option<String>,
    pub bearer_token: Option<String>,
}

/// The credential used for every request.
#[derive(Debug, Clone)]
pub enum Credential {
    Pat(SecretString),
    Bearer(SecretString),
}

impl Credential {
    /// Wrap this credential in the matching token provider.
    pub fn token_provider(&self) -> Arc<dyn TokenProvider> {
        match self {
            Credential::Pat(pat) => Arc::new(PatTokenProvider::new(pat.clone())),
            Credential::Bearer(token) => Arc::new(StaticBearerTokenProvider::new(token.clone())),
        }
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct AdoConfig {
    pub organization: String,
    /// Upper bound on a single Azure DevOps request.
    pub request_timeout: Duration,
    pub credential: Credential,
}

impl AdoConfig {
    /// Merge file values with overrides. Overrides win.
    pub fn resolve(file: FileConfig, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let organization = overrides
            .organization
            .or(file.organization)
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .ok_or(ConfigError::MissingOrganization)?;

        // A PAT takes precedence over a bearer token from the same source.
        let credential = match (overrides.pat, overrides.bearer_token) {
            (Some(pat), _) if !pat.is_empty() => Some(Credential::Pat(SecretString::from(pat))),
            (_, Some(token)) if !token.is_empty() => {
                Some(Credential::Bearer(SecretString::from(token)))
            }
            _ => match (file.pat, file.bearer_token) {
                (Some(pat), _) if !pat.is_empty() => {
                    Some(Credential::Pat(SecretString::from(pat)))
                }
                (_, Some(token)) if !token.is_empty() => {
                    Some(Credential::Bearer(SecretString::from(token)))
                }
                _ => None,
            },
        }
        .ok_or(ConfigError::MissingCredential)?;

        Ok(Self {
            organization,
            request_timeout: Duration::from_secs(
                overrides
                    .timeout_secs
                    .or(file.timeout_secs)
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            credential,
        })
    }

    /// Load the optional config file and merge it with `overrides`.
    pub fn load(path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let file = match resolve_config_path(path) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading config file");
                load_file_config(&path)?
            }
            None => FileConfig::default(),
        };
        Self::resolve(file, overrides)
    }
}

/// Explicit path first, then `$XDG_CONFIG_HOME/ado-testresults-mcp/config.json`.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = explicit {
        return Some(p.to_path_buf());
    }

    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        let candidate = PathBuf::from(xdg).join(CONFIG_DIR_NAME).join("config.json");
        if candidate.exists() {
            return Some(candidate);
        }
    }

    None
}

pub fn load_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg: FileConfig = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(expand_file_config(cfg))
}

fn expand_file_config(cfg: FileConfig) -> FileConfig {
    let expand = |v: Option<String>| v.map(|s| expand_env_vars(&s));
    FileConfig {
        organization: expand(cfg.organization),
        timeout_secs: cfg.timeout_secs,
        pat: expand(cfg.pat),
        bearer_token: expand(cfg.bearer_token),
    }
}

/// Replace `${NAME}` with the value of environment variable `NAME`.
///
/// Unknown variables are left as written.
fn expand_env_vars(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next(); // consume '{'
            let mut name = String::new();
            let mut closed = false;
            for c in chars.by_ref() {
                if c == '}' {
                    closed = true;
                    break;
                }
                name.push(c);
            }
            match env::var(&name) {
                Ok(val) if closed => out.push_str(&val),
                _ => {
                    out.push_str("${");
                    out.push_str(&name);
                    if closed {
                        out.push('}');
                    }
                }
            }
        } else {
            out.push(ch);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::io::Write;

    fn overrides_with_pat(org: &str) -> ConfigOverrides {
        ConfigOverrides {
            organization: Some(org.to_string()),
            pat: Some("pat-value".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_defaults() {
        let cfg = AdoConfig::resolve(FileConfig::default(), overrides_with_pat("contoso")).unwrap();
        assert_eq!(cfg.organization, "contoso");
        assert_eq!(cfg.request_timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(matches!(cfg.credential, Credential::Pat(_)));
    }

    #[test]
    fn test_resolve_requires_organization() {
        let overrides = ConfigOverrides {
            pat: Some("x".to_string()),
            ..Default::default()
        };
        let err = AdoConfig::resolve(FileConfig::default(), overrides).unwrap_err();
        assert!(matches!(err, ConfigError::MissingOrganization));
    }

    #[test]
    fn test_resolve_requires_credential() {
        let overrides = ConfigOverrides {
            organization: Some("contoso".to_string()),
            ..Default::default()
        };
        let err = AdoConfig::resolve(FileConfig::default(), overrides).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential));
    }

    #[test]
    fn test_overrides_win_over_file() {
        let file = FileConfig {
            organization: Some("from-file".to_string()),
            timeout_secs: Some(5),
            bearer_token: Some("file-token".to_string()),
            ..Default::default()
        };
        let overrides = ConfigOverrides {
            organization: Some("from-cli".to_string()),
            ..Default::default()
        };
        let cfg = AdoConfig::resolve(file, overrides).unwrap();
        assert_eq!(cfg.organization, "from-cli");
        assert_eq!(cfg.request_timeout, Duration::from_secs(5));
        match cfg.credential {
            Credential::Bearer(token) => assert_eq!(token.expose_secret(), "file-token"),
            other => panic!("unexpected credential: {other:?}"),
        }
    }

    #[test]
    fn test_organization_is_trimmed() {
        let cfg =
            AdoConfig::resolve(FileConfig::default(), overrides_with_pat("  contoso \n")).unwrap();
        assert_eq!(cfg.organization, "contoso");

        let err = AdoConfig::resolve(FileConfig::default(), overrides_with_pat("   ")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingOrganization));
    }

    #[test]
    fn test_override_pat_wins_over_file_pat() {
        let file = FileConfig {
            organization: Some("contoso".to_string()),
            pat: Some("file-pat".to_string()),
            ..Default::default()
        };
        let cfg = AdoConfig::resolve(file, overrides_with_pat("contoso")).unwrap();
        match cfg.credential {
            Credential::Pat(pat) => assert_eq!(pat.expose_secret(), "pat-value"),
            other => panic!("unexpected credential: {other:?}"),
        }
    }

    #[test]
    fn test_expand_env_vars() {
        // PATH is set in any test environment.
        let path = env::var("PATH").unwrap();
        assert_eq!(expand_env_vars("a-${PATH}-b"), format!("a-{}-b", path));
        assert_eq!(
            expand_env_vars("${ADO_MCP_SURELY_UNSET_VAR}"),
            "${ADO_MCP_SURELY_UNSET_VAR}"
        );
        assert_eq!(expand_env_vars("no vars"), "no vars");
        assert_eq!(expand_env_vars("${UNCLOSED"), "${UNCLOSED");
    }

    #[test]
    fn test_load_file_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"organization": "fabrikam", "pat": "file-pat", "timeoutSecs": 12}}"#
        )
        .unwrap();

        let cfg = AdoConfig::load(Some(file.path()), ConfigOverrides::default()).unwrap();
        assert_eq!(cfg.organization, "fabrikam");
        assert_eq!(cfg.request_timeout, Duration::from_secs(12));
        match cfg.credential {
            Credential::Pat(pat) => assert_eq!(pat.expose_secret(), "file-pat"),
            other => panic!("unexpected credential: {other:?}"),
        }
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        let err = AdoConfig::load(Some(&missing), overrides_with_pat("contoso")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_malformed_file_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = AdoConfig::load(Some(file.path()), overrides_with_pat("contoso")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
