//! Configuration validation ahead of option building.

use crate::error::{SessionError, SessionResult};
use crate::types::Config;

/// Validate field combinations on a raw [`Config`].
///
/// Pure check with no side effects. Absent optional fields are never an
/// error on their own; the configuration is only rejected when it leaves no
/// way to resolve credentials, supplies a broken key pair, or carries a
/// negative retry count.
pub fn validate_config(config: &Config) -> SessionResult<()> {
    if config.max_retries < 0 {
        return Err(SessionError::InvalidRetryCount(config.max_retries));
    }

    if config.has_partial_key_pair() {
        return Err(SessionError::MissingCredentials(
            "access key and secret key must be configured together".to_string(),
        ));
    }

    let resolvable = config.static_key_pair().is_some()
        || field_set(&config.assume_role_arn)
        || field_set(&config.profile)
        || field_set(&config.shared_credentials_file)
        || config.use_default_credential_chain;
    if !resolvable {
        return Err(SessionError::MissingCredentials(
            "no access key pair, role ARN, or profile configured, and the default \
             provider chain was not enabled"
                .to_string(),
        ));
    }

    Ok(())
}

fn field_set(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|value| !value.is_empty())
}
