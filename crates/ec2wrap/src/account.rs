//! AWS account identity

use crate::context::AwsContext;
use anyhow::{Context, Result};
use tracing::info;

/// Strongly-typed AWS account ID (12-digit string)
///
/// Snapshot listings and owned-image queries are pinned to this value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display, derive_more::Deref)]
pub struct AccountId(String);

impl AccountId {
    /// Wrap an account id obtained out of band (tests, cached config)
    pub fn new(id: impl Into<String>) -> Self {
        AccountId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Fetch the current AWS account ID via STS GetCallerIdentity
///
/// This call needs no special permissions; it succeeds whenever the
/// credentials are valid.
pub async fn get_current_account_id(ctx: &AwsContext) -> Result<AccountId> {
    let identity = ctx
        .sts_client()
        .get_caller_identity()
        .send()
        .await
        .context("Failed to get AWS caller identity - check credentials")?;

    let account = identity
        .account()
        .context("No account ID returned from STS GetCallerIdentity")?;

    info!(account_id = %account, "AWS account resolved");

    Ok(AccountId(account.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_id_derefs_and_displays() {
        let id = AccountId::new("123456789012");
        assert_eq!(id.len(), 12);
        assert_eq!(id.to_string(), "123456789012");
        assert_eq!(id.as_str(), "123456789012");
    }
}
