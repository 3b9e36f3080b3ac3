//! Error taxonomy and AWS error classification
//!
//! [`ResourceError`] is what every resource operation returns. Provider
//! failures arrive as `anyhow::Error` from [`crate::ec2::Ec2Client`]. A
//! failed single-object describe always becomes
//! [`ResourceError::DoesNotExist`]; the `.code()` carried by the SDK error
//! (see [`classify_anyhow_error`]) only decides how loudly that is logged.

use thiserror::Error;
use tracing::{debug, warn};

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ResourceError>;

/// Errors raised by resource operations
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The provider has no object with this id (recoverable)
    #[error("Resource doesn't exist on EC2 [{id}]")]
    DoesNotExist { id: String },

    /// The operation needs a bound id
    #[error("{kind} has no id; set one before issuing EC2 requests")]
    Unbound { kind: &'static str },

    /// The cached provider snapshot was read before any describe
    #[error("{kind} {id} has no snapshot; call refresh() first")]
    MissingSnapshot { kind: &'static str, id: String },

    /// The resource is in a state that forbids the operation
    #[error("{kind} {id}: {reason}")]
    IllegalState {
        kind: &'static str,
        id: String,
        reason: String,
    },

    /// A bounded wait ran out of attempts
    #[error("Timeout waiting for {what} after {attempts} attempts")]
    Timeout { what: String, attempts: u32 },

    /// An `after_create` / `after_delete` hook failed
    #[error("Lifecycle handler failed: {0}")]
    Handler(#[source] anyhow::Error),

    /// Any other provider failure
    #[error(transparent)]
    Provider(#[from] anyhow::Error),
}

impl ResourceError {
    /// Check if this is the "does not exist" condition
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResourceError::DoesNotExist { .. })
    }

    /// Map a failed single-object describe to `DoesNotExist`.
    ///
    /// Any describe failure counts as "no such object". Missing or malformed
    /// ids are logged at debug, every other provider error at warn.
    pub fn from_lookup(id: &str, error: anyhow::Error) -> Self {
        match classify_anyhow_error(&error) {
            AwsError::NotFound { .. } => {
                debug!(resource_id = %id, error = %error, "Provider reports resource missing");
            }
            AwsError::Sdk { code, .. } => {
                warn!(
                    resource_id = %id,
                    code = ?code,
                    error = %error,
                    "Describe failed, treating resource as missing"
                );
            }
        }
        ResourceError::DoesNotExist { id: id.to_string() }
    }

    pub(crate) fn illegal_state(
        kind: &'static str,
        id: Option<&str>,
        reason: impl Into<String>,
    ) -> Self {
        ResourceError::IllegalState {
            kind,
            id: id.unwrap_or("<unbound>").to_string(),
            reason: reason.into(),
        }
    }
}

/// AWS error categories
#[derive(Debug, Error)]
pub enum AwsError {
    /// Resource was not found (or its id is malformed)
    #[error("Resource not found: {resource_id}")]
    NotFound { resource_id: String },

    /// Generic AWS SDK error with code and message
    #[error("AWS error: {message}")]
    Sdk {
        code: Option<String>,
        message: String,
    },
}

impl AwsError {
    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AwsError::NotFound { .. })
    }
}

/// Known EC2 error codes meaning "no such object"
const NOT_FOUND_CODES: &[&str] = &[
    "InvalidInstanceID.NotFound",
    "InvalidInstanceID.Malformed",
    "InvalidVolume.NotFound",
    "InvalidVolumeID.Malformed",
    "InvalidSnapshot.NotFound",
    "InvalidSnapshotID.Malformed",
    "InvalidAllocationID.NotFound",
    "InvalidAssociationID.NotFound",
    "InvalidAddress.NotFound",
    "InvalidGroup.NotFound",
    "InvalidGroupId.Malformed",
    "InvalidPermission.NotFound",
    "InvalidSubnetID.NotFound",
    "InvalidVpcID.NotFound",
    "InvalidAMIID.NotFound",
    "InvalidAMIID.Malformed",
    "InvalidAMIID.Unavailable",
];

/// Classify an AWS SDK error using the error code.
pub fn classify_aws_error(code: Option<&str>, message: Option<&str>) -> AwsError {
    let message = message.unwrap_or("Unknown error").to_string();

    match code {
        Some(c) if NOT_FOUND_CODES.contains(&c) => AwsError::NotFound {
            resource_id: message,
        },
        _ => AwsError::Sdk {
            code: code.map(|s| s.to_string()),
            message,
        },
    }
}

/// Downcast `$cause` to each listed EC2 operation error and classify the
/// first match by its metadata code.
macro_rules! classify_ec2_operations {
    ($cause:expr, $($module:ident :: $error:ident),+ $(,)?) => {
        $(
            if let Some(e) = $cause.downcast_ref::<aws_sdk_ec2::error::SdkError<
                aws_sdk_ec2::operation::$module::$error,
            >>() {
                let meta = ProvideErrorMetadata::meta(e);
                return classify_aws_error(meta.code(), meta.message());
            }
        )+
    };
}

/// Classify an `anyhow::Error` by extracting the AWS error code.
///
/// Walks the error chain looking for the EC2 describe operation errors
/// this crate issues. Falls back to matching known codes in the
/// Debug representation when no typed error is found.
pub fn classify_anyhow_error(error: &anyhow::Error) -> AwsError {
    use aws_sdk_ec2::error::ProvideErrorMetadata;

    for cause in error.chain() {
        classify_ec2_operations!(
            cause,
            describe_instances::DescribeInstancesError,
            describe_volumes::DescribeVolumesError,
            describe_snapshots::DescribeSnapshotsError,
            describe_addresses::DescribeAddressesError,
            describe_security_groups::DescribeSecurityGroupsError,
            describe_subnets::DescribeSubnetsError,
            describe_vpcs::DescribeVpcsError,
            describe_images::DescribeImagesError,
        );
    }

    let debug_str = format!("{:?}", error);
    if let Some(code) = extract_error_code(&debug_str) {
        return classify_aws_error(Some(&code), Some(&error.to_string()));
    }

    AwsError::Sdk {
        code: None,
        message: error.to_string(),
    }
}

/// Extract an AWS error code from a debug string representation
fn extract_error_code(debug_str: &str) -> Option<String> {
    for code in NOT_FOUND_CODES {
        if debug_str.contains(code) {
            return Some((*code).to_string());
        }
    }

    if let Some(start) = debug_str.find("code: Some(\"") {
        let rest = &debug_str[start + 12..];
        if let Some(end) = rest.find('"') {
            return Some(rest[..end].to_string());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_codes() {
        for code in NOT_FOUND_CODES {
            let err = classify_aws_error(Some(code), Some("some message"));
            assert!(err.is_not_found(), "Expected NotFound for code: {code}");
        }
    }

    #[test]
    fn unknown_and_missing_codes() {
        let err = classify_aws_error(Some("SomeNewError"), Some("details"));
        assert!(matches!(err, AwsError::Sdk { code: Some(_), .. }));

        let err = classify_aws_error(None, Some("something failed"));
        assert!(matches!(err, AwsError::Sdk { code: None, .. }));
    }

    #[test]
    fn anyhow_fallback_reads_code_from_message() {
        let err = anyhow::anyhow!("InvalidVolume.NotFound: The volume 'vol-1' does not exist");
        assert!(classify_anyhow_error(&err).is_not_found());

        let err = anyhow::anyhow!("connection refused");
        assert!(!classify_anyhow_error(&err).is_not_found());
    }

    #[test]
    fn extract_code_from_code_field() {
        let debug_str = r#"SdkError { code: Some("SomeRandomCode"), message: "fail" }"#;
        assert_eq!(
            extract_error_code(debug_str).as_deref(),
            Some("SomeRandomCode")
        );
    }

    #[test]
    fn every_lookup_failure_means_missing() {
        let missing = ResourceError::from_lookup(
            "i-123",
            anyhow::anyhow!("InvalidInstanceID.NotFound: i-123"),
        );
        assert!(matches!(missing, ResourceError::DoesNotExist { ref id } if id == "i-123"));

        let throttled = ResourceError::from_lookup(
            "i-123",
            anyhow::anyhow!("RequestLimitExceeded: slow down"),
        );
        assert!(matches!(throttled, ResourceError::DoesNotExist { ref id } if id == "i-123"));
    }
}
