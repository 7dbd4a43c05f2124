//! Normalization of a validated configuration into session options.

use std::collections::HashMap;
use std::time::Duration;

use aws_smithy_runtime_api::client::http::SharedHttpClient;

use crate::error::{SessionError, SessionResult};
use crate::types::{Config, CredentialsSource, InsufficientPermissionsPolicy, UserAgentProduct};
use crate::validation::validate_config;

/// Deadline applied to the identity check when the caller supplies none.
pub(crate) const DEFAULT_IDENTITY_CHECK_TIMEOUT: Duration = Duration::from_secs(30);

/// Session name used for role assumption when the caller supplies none.
const DEFAULT_ASSUME_ROLE_SESSION_NAME: &str = env!("CARGO_PKG_NAME");

/// Normalized, immutable snapshot of a [`Config`].
///
/// Consumed by [`Session::create`](crate::Session::create); never mutated
/// after construction. Building twice from the same configuration yields
/// equal options.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub credentials: CredentialsSource,
    pub region: Option<String>,
    /// Service name (lowercased) to endpoint URL.
    pub endpoints: HashMap<String, String>,
    /// Maximum retries; 0 leaves the provider default in place.
    pub max_retries: u32,
    /// Outgoing user-agent products, base product first.
    pub user_agent: Vec<UserAgentProduct>,
    pub insecure: bool,
    pub debug_logging: bool,
    pub skip_creds_validation: bool,
    pub identity_check_timeout: Duration,
    pub on_insufficient_permissions: InsufficientPermissionsPolicy,
    /// Transport override carried through to every client.
    pub http_client: Option<SharedHttpClient>,
}

impl SessionOptions {
    /// Translate a configuration into a normalized option set.
    ///
    /// Validates first, then maps credentials onto a [`CredentialsSource`],
    /// normalizes endpoint overrides, and assembles the user-agent product
    /// list. All-or-nothing: the first inconsistency aborts the build and no
    /// partially-populated options are returned.
    pub fn build(config: &Config) -> SessionResult<Self> {
        validate_config(config)?;

        let mut user_agent = Vec::with_capacity(config.user_agent_products.len() + 1);
        user_agent.push(UserAgentProduct::new(
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
        ));
        user_agent.extend(config.user_agent_products.iter().cloned());

        Ok(Self {
            credentials: credentials_source(config),
            region: config.region.clone().filter(|r| !r.is_empty()),
            endpoints: normalized_endpoints(&config.endpoints)?,
            max_retries: config.max_retries as u32,
            user_agent,
            insecure: config.insecure,
            debug_logging: config.debug_logging,
            skip_creds_validation: config.skip_creds_validation,
            identity_check_timeout: config
                .identity_check_timeout
                .unwrap_or(DEFAULT_IDENTITY_CHECK_TIMEOUT),
            on_insufficient_permissions: config.on_insufficient_permissions,
            http_client: config.http_client.clone(),
        })
    }
}

// The transport override has no meaningful equality; compare everything else.
impl PartialEq for SessionOptions {
    fn eq(&self, other: &Self) -> bool {
        self.credentials == other.credentials
            && self.region == other.region
            && self.endpoints == other.endpoints
            && self.max_retries == other.max_retries
            && self.user_agent == other.user_agent
            && self.insecure == other.insecure
            && self.debug_logging == other.debug_logging
            && self.skip_creds_validation == other.skip_creds_validation
            && self.identity_check_timeout == other.identity_check_timeout
            && self.on_insufficient_permissions == other.on_insufficient_permissions
    }
}

/// Select the credential source for a configuration.
///
/// Static keys win over the default chain; an assume-role ARN layers on top
/// of whichever base was selected.
fn credentials_source(config: &Config) -> CredentialsSource {
    let base = if let Some((access_key, secret_key)) = config.static_key_pair() {
        CredentialsSource::Static {
            access_key: access_key.to_string(),
            secret_key: secret_key.to_string(),
            token: config.token.clone().filter(|t| !t.is_empty()),
        }
    } else {
        CredentialsSource::DefaultChain {
            profile: config.profile.clone().filter(|p| !p.is_empty()),
            shared_credentials_file: config
                .shared_credentials_file
                .clone()
                .filter(|f| !f.is_empty()),
            allow_metadata_api: !config.skip_metadata_api_check,
        }
    };

    match config.assume_role_arn.as_deref().filter(|a| !a.is_empty()) {
        Some(role_arn) => CredentialsSource::AssumeRole {
            role_arn: role_arn.to_string(),
            session_name: config
                .assume_role_session_name
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_ASSUME_ROLE_SESSION_NAME.to_string()),
            external_id: config.assume_role_external_id.clone().filter(|e| !e.is_empty()),
            policy: config.assume_role_policy.clone().filter(|p| !p.is_empty()),
            use_custom_endpoints: config.assume_role_uses_custom_endpoints,
            base: Box::new(base),
        },
        None => base,
    }
}

fn normalized_endpoints(
    overrides: &HashMap<String, String>,
) -> SessionResult<HashMap<String, String>> {
    let mut endpoints = HashMap::with_capacity(overrides.len());
    for (service, url) in overrides {
        let service = service.trim().to_ascii_lowercase();
        if service.is_empty() {
            return Err(SessionError::Build(
                "endpoint override with an empty service name".to_string(),
            ));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(SessionError::Build(format!(
                "endpoint override for {service} is not an http(s) URL: {url}"
            )));
        }
        endpoints.insert(service, url.clone());
    }
    Ok(endpoints)
}
