//! Session construction from normalized options.

use std::collections::HashMap;
use std::time::Duration;

use aws_config::environment::EnvironmentVariableCredentialsProvider;
use aws_config::imds;
use aws_config::imds::credentials::ImdsCredentialsProvider;
use aws_config::meta::credentials::CredentialsProviderChain;
use aws_config::meta::region::RegionProviderChain;
use aws_config::profile::profile_file::{ProfileFileKind, ProfileFiles};
use aws_config::profile::ProfileFileCredentialsProvider;
use aws_config::retry::RetryConfig;
use aws_config::sts::AssumeRoleProvider;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_credential_types::Credentials;
use log::debug;
use tokio::time::timeout;

use crate::error::{SessionError, SessionResult};
use crate::options::SessionOptions;
use crate::transport::insecure_http_client;
use crate::types::{CredentialsSource, InsufficientPermissionsPolicy};
use crate::user_agent::UserAgentProductsInterceptor;

/// Endpoint-override map key for the identity-check service.
pub const STS_SERVICE: &str = "sts";

/// Connect timeout for the instance-metadata probe. Tight so a non-cloud
/// environment fails fast instead of hanging.
const IMDS_CONNECT_TIMEOUT: Duration = Duration::from_millis(250);

/// Read timeout for the instance-metadata probe.
const IMDS_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Upper bound on resolving the default provider chain.
const CHAIN_RESOLUTION_TIMEOUT: Duration = Duration::from_secs(5);

/// An authenticated handle for issuing calls against provider APIs.
///
/// Owns the resolved SDK configuration and a constructed STS client. Owned
/// by the caller after creation; independent sessions share no state.
#[derive(Debug, Clone)]
pub struct Session {
    sdk_config: SdkConfig,
    sts: aws_sdk_sts::Client,
    region: Option<String>,
    endpoints: HashMap<String, String>,
    identity_check_timeout: Duration,
    on_insufficient_permissions: InsufficientPermissionsPolicy,
}

impl Session {
    /// Construct a session from normalized options.
    ///
    /// Resolves the credential source, loads the SDK configuration, and
    /// builds the STS client. Unless `skip_creds_validation` was set, one
    /// identity probe runs immediately after construction; any probe failure
    /// surfaces as [`SessionError::CredentialValidationFailed`] and no
    /// session is returned.
    pub async fn create(options: SessionOptions) -> SessionResult<Self> {
        let credentials = credentials_provider(&options).await?;

        let region_provider =
            RegionProviderChain::first_try(options.region.clone().map(Region::new))
                .or_default_provider();

        let mut retry = RetryConfig::standard();
        if options.max_retries > 0 {
            // max_attempts counts the initial try
            retry = retry.with_max_attempts(options.max_retries + 1);
        }
        let timeouts = TimeoutConfig::builder()
            .operation_timeout(options.identity_check_timeout)
            .build();

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(region_provider)
            .retry_config(retry)
            .timeout_config(timeouts);
        if let Some(client) = options.http_client.clone() {
            loader = loader.http_client(client);
        } else if options.insecure {
            loader = loader.http_client(insecure_http_client());
        }
        let sdk_config = loader.load().await;
        let region = sdk_config.region().map(ToString::to_string);
        if options.debug_logging {
            debug!(
                "loaded SDK configuration: region {region:?}, retries {}, {} endpoint override(s)",
                options.max_retries,
                options.endpoints.len()
            );
        }

        let sts = sts_client(&sdk_config, &options);
        let session = Self {
            sdk_config,
            sts,
            region,
            endpoints: options.endpoints,
            identity_check_timeout: options.identity_check_timeout,
            on_insufficient_permissions: options.on_insufficient_permissions,
        };

        if options.skip_creds_validation {
            if options.debug_logging {
                debug!("skipping the credential validation probe");
            }
        } else {
            session.validate_credentials().await?;
        }

        Ok(session)
    }

    /// One cheap identity call to confirm the credentials work at all.
    async fn validate_credentials(&self) -> SessionResult<()> {
        self.sts
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| SessionError::CredentialValidationFailed(e.to_string()))?;
        Ok(())
    }

    /// The resolved SDK configuration, for building further service clients.
    pub fn sdk_config(&self) -> &SdkConfig {
        &self.sdk_config
    }

    /// The STS client used for identity checks.
    pub fn sts_client(&self) -> &aws_sdk_sts::Client {
        &self.sts
    }

    /// Region the session resolved to, if any.
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Endpoint override for a service, if one was configured.
    pub fn endpoint_for(&self, service: &str) -> Option<&str> {
        self.endpoints
            .get(&service.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub(crate) fn identity_check_timeout(&self) -> Duration {
        self.identity_check_timeout
    }

    pub(crate) fn on_insufficient_permissions(&self) -> InsufficientPermissionsPolicy {
        self.on_insufficient_permissions
    }
}

/// Build the credential provider for the selected source.
async fn credentials_provider(options: &SessionOptions) -> SessionResult<SharedCredentialsProvider> {
    match &options.credentials {
        CredentialsSource::AssumeRole {
            role_arn,
            session_name,
            external_id,
            policy,
            use_custom_endpoints,
            base,
        } => {
            let base_provider = standalone_provider(base).await?;
            let mut builder = AssumeRoleProvider::builder(role_arn).session_name(session_name);
            if let Some(external_id) = external_id {
                builder = builder.external_id(external_id);
            }
            if let Some(policy) = policy {
                builder = builder.policy(policy);
            }
            if let Some(region) = &options.region {
                builder = builder.region(Region::new(region.clone()));
            }
            if *use_custom_endpoints {
                if let Some(url) = options.endpoints.get(STS_SERVICE) {
                    let bootstrap = SdkConfig::builder()
                        .behavior_version(BehaviorVersion::latest())
                        .endpoint_url(url)
                        .build();
                    builder = builder.configure(&bootstrap);
                }
            }
            let provider = builder.build_from_provider(base_provider).await;
            Ok(SharedCredentialsProvider::new(provider))
        }
        source => standalone_provider(source).await,
    }
}

/// Provider for a non-layered source: static keys or the default chain.
async fn standalone_provider(source: &CredentialsSource) -> SessionResult<SharedCredentialsProvider> {
    match source {
        CredentialsSource::Static {
            access_key,
            secret_key,
            token,
        } => Ok(SharedCredentialsProvider::new(Credentials::new(
            access_key.clone(),
            secret_key.clone(),
            token.clone(),
            None,
            "StaticConfig",
        ))),
        CredentialsSource::DefaultChain {
            profile,
            shared_credentials_file,
            allow_metadata_api,
        } => {
            let chain = default_chain(
                profile.as_deref(),
                shared_credentials_file.as_deref(),
                *allow_metadata_api,
            );
            // Resolve once up front so an unusable chain surfaces here
            // instead of on the first API call.
            match timeout(CHAIN_RESOLUTION_TIMEOUT, chain.provide_credentials()).await {
                Err(_) => Err(SessionError::MissingCredentials(
                    "timed out resolving the default credential provider chain".to_string(),
                )),
                Ok(Err(e)) => Err(SessionError::MissingCredentials(e.to_string())),
                Ok(Ok(_)) => Ok(SharedCredentialsProvider::new(chain)),
            }
        }
        CredentialsSource::AssumeRole { .. } => Err(SessionError::Build(
            "assume-role sources cannot nest".to_string(),
        )),
    }
}

/// Ambient lookup: environment, then shared profile files, then (when
/// allowed) the instance metadata service.
fn default_chain(
    profile: Option<&str>,
    shared_credentials_file: Option<&str>,
    allow_metadata_api: bool,
) -> CredentialsProviderChain {
    let mut profile_builder = ProfileFileCredentialsProvider::builder();
    if let Some(name) = profile {
        profile_builder = profile_builder.profile_name(name);
    }
    if let Some(path) = shared_credentials_file {
        profile_builder = profile_builder.profile_files(
            ProfileFiles::builder()
                .with_file(ProfileFileKind::Credentials, path)
                .build(),
        );
    }

    let chain = CredentialsProviderChain::first_try(
        "Environment",
        EnvironmentVariableCredentialsProvider::new(),
    )
    .or_else("Profile", profile_builder.build());

    if allow_metadata_api {
        let imds_client = imds::Client::builder()
            .connect_timeout(IMDS_CONNECT_TIMEOUT)
            .read_timeout(IMDS_READ_TIMEOUT)
            .build();
        chain.or_else(
            "Ec2InstanceMetadata",
            ImdsCredentialsProvider::builder()
                .imds_client(imds_client)
                .build(),
        )
    } else {
        chain
    }
}

fn sts_client(sdk_config: &SdkConfig, options: &SessionOptions) -> aws_sdk_sts::Client {
    let mut builder = aws_sdk_sts::config::Builder::from(sdk_config)
        .interceptor(UserAgentProductsInterceptor::new(&options.user_agent));
    if let Some(url) = options.endpoints.get(STS_SERVICE) {
        builder = builder.endpoint_url(url);
    }
    aws_sdk_sts::Client::from_conf(builder.build())
}
