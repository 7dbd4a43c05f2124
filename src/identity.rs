//! Caller-identity resolution through the STS identity check.

use aws_sdk_sts::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_sts::operation::get_caller_identity::GetCallerIdentityError;
use log::{debug, warn};
use tokio::time::timeout;

use crate::error::{SessionError, SessionResult};
use crate::partition::{partition_for_region, partition_from_arn};
use crate::session::Session;
use crate::types::{Config, IdentityResult, InsufficientPermissionsPolicy};

/// Error codes STS returns for expired or malformed credentials.
const INVALID_CREDENTIAL_CODES: &[&str] = &[
    "ExpiredToken",
    "ExpiredTokenException",
    "IncompleteSignature",
    "InvalidClientTokenId",
    "SignatureDoesNotMatch",
    "UnrecognizedClientException",
];

/// Error codes STS returns when the caller may not invoke the identity check.
const ACCESS_DENIED_CODES: &[&str] = &["AccessDenied", "AccessDeniedException"];

type IdentityCallError = SdkError<GetCallerIdentityError, aws_smithy_runtime_api::http::Response>;

#[derive(Debug, PartialEq, Eq)]
enum FailureClass {
    InvalidCredentials,
    AccessDenied,
    Unreachable,
    Other,
}

/// Resolve the caller's account id and partition for a session.
///
/// When `skip_creds_validation` is set on the configuration the identity
/// check is skipped entirely and the partition is derived from the session's
/// resolved region. With `skip_requesting_account_id` the call still runs
/// (confirming the credentials) but the account id is discarded.
pub async fn resolve_identity(session: &Session, config: &Config) -> SessionResult<IdentityResult> {
    if config.skip_creds_validation {
        debug!("skipping the identity check; deriving partition from the configured region");
        return Ok(region_identity(session));
    }

    let call = session.sts_client().get_caller_identity().send();
    let outcome = match timeout(session.identity_check_timeout(), call).await {
        Err(_) => {
            return Err(SessionError::IdentityCheckUnreachable(
                "identity check timed out".to_string(),
            ))
        }
        Ok(outcome) => outcome,
    };

    match outcome {
        Ok(output) => {
            let partition = output
                .arn()
                .and_then(partition_from_arn)
                .unwrap_or_else(|| region_partition(session));
            let account_id = if config.skip_requesting_account_id {
                String::new()
            } else {
                output.account().map(ToString::to_string).unwrap_or_default()
            };
            debug!("resolved caller identity in partition {partition}");
            Ok(IdentityResult {
                account_id,
                partition,
            })
        }
        Err(err) => match classify_failure(&err) {
            FailureClass::Unreachable => {
                Err(SessionError::IdentityCheckUnreachable(error_detail(&err)))
            }
            FailureClass::InvalidCredentials => {
                Err(SessionError::CredentialsInvalid(error_detail(&err)))
            }
            FailureClass::AccessDenied => match session.on_insufficient_permissions() {
                InsufficientPermissionsPolicy::Fail => Err(
                    SessionError::CredentialsInsufficientPermissions(error_detail(&err)),
                ),
                InsufficientPermissionsPolicy::Proceed => {
                    warn!(
                        "identity check denied; continuing without an account id: {}",
                        error_detail(&err)
                    );
                    Ok(region_identity(session))
                }
            },
            FailureClass::Other => Err(SessionError::Sdk(error_detail(&err))),
        },
    }
}

fn classify_failure(err: &IdentityCallError) -> FailureClass {
    match err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => FailureClass::Unreachable,
        SdkError::ServiceError(_) => classify_error_code(err.code().unwrap_or_default()),
        _ => FailureClass::Other,
    }
}

fn classify_error_code(code: &str) -> FailureClass {
    if INVALID_CREDENTIAL_CODES.contains(&code) {
        FailureClass::InvalidCredentials
    } else if ACCESS_DENIED_CODES.contains(&code) {
        FailureClass::AccessDenied
    } else {
        FailureClass::Other
    }
}

fn error_detail(err: &IdentityCallError) -> String {
    err.message()
        .map(ToString::to_string)
        .unwrap_or_else(|| err.to_string())
}

fn region_identity(session: &Session) -> IdentityResult {
    IdentityResult {
        account_id: String::new(),
        partition: region_partition(session),
    }
}

fn region_partition(session: &Session) -> String {
    partition_for_region(session.region().unwrap_or_default()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_credential_codes_classified() {
        assert_eq!(
            classify_error_code("ExpiredToken"),
            FailureClass::InvalidCredentials
        );
        assert_eq!(
            classify_error_code("ExpiredTokenException"),
            FailureClass::InvalidCredentials
        );
        assert_eq!(
            classify_error_code("InvalidClientTokenId"),
            FailureClass::InvalidCredentials
        );
        assert_eq!(
            classify_error_code("SignatureDoesNotMatch"),
            FailureClass::InvalidCredentials
        );
    }

    #[test]
    fn test_access_denied_codes_classified() {
        assert_eq!(classify_error_code("AccessDenied"), FailureClass::AccessDenied);
        assert_eq!(
            classify_error_code("AccessDeniedException"),
            FailureClass::AccessDenied
        );
    }

    #[test]
    fn test_unknown_codes_fall_through() {
        assert_eq!(classify_error_code("Throttling"), FailureClass::Other);
        assert_eq!(classify_error_code(""), FailureClass::Other);
    }
}
