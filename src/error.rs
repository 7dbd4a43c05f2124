//! Error types for session configuration and identity resolution.

use thiserror::Error;

/// Main error type for session construction and identity resolution.
///
/// Every stage of the pipeline returns one of these; no stage recovers from
/// another's failure. The factory is the only stage that rewraps: any failure
/// of its post-construction probe surfaces as [`CredentialValidationFailed`],
/// regardless of the underlying cause.
///
/// [`CredentialValidationFailed`]: SessionError::CredentialValidationFailed
#[derive(Error, Debug)]
pub enum SessionError {
    /// No usable credential configuration was found.
    #[error("no valid credential sources found: {0}")]
    MissingCredentials(String),

    /// A negative retry count was supplied.
    #[error("invalid retry count: {0}")]
    InvalidRetryCount(i32),

    /// The configuration could not be normalized into session options.
    #[error("failed to build session options: {0}")]
    Build(String),

    /// The post-construction credential probe failed.
    #[error("error validating provider credentials: {0}")]
    CredentialValidationFailed(String),

    /// The identity check rejected the credentials as expired or malformed.
    #[error("invalid or expired credentials: {0}")]
    CredentialsInvalid(String),

    /// The credentials are usable but may not call the identity check.
    #[error("credentials lack permission for the identity check: {0}")]
    CredentialsInsufficientPermissions(String),

    /// The identity check endpoint could not be reached in time.
    #[error("identity check unreachable: {0}")]
    IdentityCheckUnreachable(String),

    /// Any other AWS SDK failure.
    #[error("AWS SDK error: {0}")]
    Sdk(String),
}

/// Result type alias
pub type SessionResult<T> = Result<T, SessionError>;
