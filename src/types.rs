//! Core type definitions for session configuration.

use std::collections::HashMap;
use std::time::Duration;

use aws_smithy_runtime_api::client::http::SharedHttpClient;
use serde::{Deserialize, Serialize};

/// One product entry appended to the outgoing user-agent header.
///
/// Rendered as `name/version (extra1; extra2)`. Entries with an empty name
/// are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserAgentProduct {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<String>,
}

impl UserAgentProduct {
    #[must_use]
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            extra: Vec::new(),
        }
    }
}

/// How to treat an access-denied response from the identity check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InsufficientPermissionsPolicy {
    /// Surface the denial as a hard error.
    #[default]
    Fail,
    /// Log a warning and continue with an empty account id.
    Proceed,
}

/// Raw session configuration supplied by the embedding caller.
///
/// All fields are optional; validation only rejects combinations that leave
/// no way to resolve credentials at all. Credential precedence: an explicit
/// access/secret key pair, then an assumed role layered on whatever base is
/// configured, then the default provider chain when explicitly enabled.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    /// Session token accompanying temporary access keys.
    pub token: Option<String>,

    /// Named profile consulted by the profile-file credential provider.
    pub profile: Option<String>,
    /// Overrides the shared credentials file location for the profile provider.
    pub shared_credentials_file: Option<String>,

    pub assume_role_arn: Option<String>,
    pub assume_role_session_name: Option<String>,
    pub assume_role_external_id: Option<String>,
    /// Inline IAM policy narrowing the assumed role's permissions.
    pub assume_role_policy: Option<String>,
    /// Route the role-assumption call through the configured endpoint
    /// overrides instead of the default provider endpoints.
    pub assume_role_uses_custom_endpoints: bool,

    pub region: Option<String>,
    /// Per-service endpoint overrides, service name to URL. Unset services
    /// use default endpoints.
    pub endpoints: HashMap<String, String>,
    /// Maximum API retries; 0 leaves the provider default in place.
    pub max_retries: i32,

    pub skip_creds_validation: bool,
    pub skip_metadata_api_check: bool,
    pub skip_requesting_account_id: bool,

    /// Disable TLS certificate verification. Only for test or mock endpoints.
    pub insecure: bool,
    /// Emit verbose logs while constructing the session and resolving identity.
    pub debug_logging: bool,

    /// Explicit opt-in to ambient credentials (environment, shared files,
    /// instance metadata) when nothing else is configured.
    pub use_default_credential_chain: bool,

    pub user_agent_products: Vec<UserAgentProduct>,

    /// Deadline for the identity check and the credential probe.
    pub identity_check_timeout: Option<Duration>,
    pub on_insufficient_permissions: InsufficientPermissionsPolicy,

    /// Replaces the HTTP transport for every client built from this
    /// configuration. Test seam for mock transports.
    pub http_client: Option<SharedHttpClient>,
}

impl Config {
    /// Both halves of a static key pair, when usable.
    pub(crate) fn static_key_pair(&self) -> Option<(&str, &str)> {
        match (self.access_key.as_deref(), self.secret_key.as_deref()) {
            (Some(access), Some(secret)) if !access.is_empty() && !secret.is_empty() => {
                Some((access, secret))
            }
            _ => None,
        }
    }

    /// True when exactly one half of the key pair is set.
    pub(crate) fn has_partial_key_pair(&self) -> bool {
        let access = self.access_key.as_deref().is_some_and(|k| !k.is_empty());
        let secret = self.secret_key.as_deref().is_some_and(|k| !k.is_empty());
        access != secret
    }
}

/// Which credential source the builder selected for a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsSource {
    /// Explicit access/secret keys, optionally with a session token.
    Static {
        access_key: String,
        secret_key: String,
        token: Option<String>,
    },
    /// A role assumed on top of a base source.
    AssumeRole {
        role_arn: String,
        session_name: String,
        external_id: Option<String>,
        policy: Option<String>,
        use_custom_endpoints: bool,
        base: Box<CredentialsSource>,
    },
    /// Ambient lookup: environment, shared files, and (unless disabled)
    /// the instance metadata service.
    DefaultChain {
        profile: Option<String>,
        shared_credentials_file: Option<String>,
        allow_metadata_api: bool,
    },
}

/// Outcome of identity resolution.
///
/// Built once per resolve call and returned immediately; never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IdentityResult {
    /// Caller account id; empty when the lookup was skipped or discarded.
    pub account_id: String,
    pub partition: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_flags_off() {
        let config = Config::default();
        assert!(!config.skip_creds_validation);
        assert!(!config.skip_metadata_api_check);
        assert!(!config.skip_requesting_account_id);
        assert!(!config.insecure);
        assert!(!config.debug_logging);
        assert!(!config.use_default_credential_chain);
        assert_eq!(config.max_retries, 0);
    }

    #[test]
    fn test_static_key_pair_requires_both_halves() {
        let mut config = Config {
            access_key: Some("MockAccessKey".to_string()),
            ..Config::default()
        };
        assert!(config.static_key_pair().is_none());
        assert!(config.has_partial_key_pair());

        config.secret_key = Some("MockSecretKey".to_string());
        assert_eq!(
            config.static_key_pair(),
            Some(("MockAccessKey", "MockSecretKey"))
        );
        assert!(!config.has_partial_key_pair());
    }

    #[test]
    fn test_empty_strings_count_as_unset() {
        let config = Config {
            access_key: Some(String::new()),
            secret_key: Some("MockSecretKey".to_string()),
            ..Config::default()
        };
        assert!(config.static_key_pair().is_none());
        assert!(config.has_partial_key_pair());
    }

    #[test]
    fn test_identity_result_serialization() {
        let identity = IdentityResult {
            account_id: "222222222222".to_string(),
            partition: "aws".to_string(),
        };

        let json = serde_json::to_string(&identity).unwrap();

        // Verify PascalCase field names
        assert!(json.contains("\"AccountId\":\"222222222222\""));
        assert!(json.contains("\"Partition\":\"aws\""));
    }

    #[test]
    fn test_user_agent_product_serialization() {
        let product = UserAgentProduct::new("terraform", "1.5.0");
        let json = serde_json::to_string(&product).unwrap();
        assert!(json.contains("\"Name\":\"terraform\""));
        assert!(json.contains("\"Version\":\"1.5.0\""));
        // Empty extras are omitted entirely
        assert!(!json.contains("\"Extra\""));
    }
}
