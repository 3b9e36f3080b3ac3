//! Connector: the provider handle every resource is bound to

use crate::account::{AccountId, get_current_account_id};
use crate::context::AwsContext;
use crate::ec2::{Ec2Api, Ec2Client};
use anyhow::Result;
use ec2wrap_common::Settings;
use std::sync::Arc;

/// Supplies the EC2 API handle, the caller's account and adapter settings.
pub trait Connector: Send + Sync {
    fn api(&self) -> &dyn Ec2Api;

    /// Account id of the calling credentials
    fn account_id(&self) -> &str;

    fn settings(&self) -> &Settings;
}

/// Concrete connector over any [`Ec2Api`] implementation
pub struct Ec2Connector {
    api: Arc<dyn Ec2Api>,
    account_id: AccountId,
    settings: Settings,
}

impl Ec2Connector {
    pub fn new(api: Arc<dyn Ec2Api>, account_id: AccountId, settings: Settings) -> Self {
        Self {
            api,
            account_id,
            settings,
        }
    }

    /// Build an SDK-backed connector, resolving the account through STS.
    pub async fn from_context(ctx: &AwsContext, settings: Settings) -> Result<Self> {
        let account_id = get_current_account_id(ctx).await?;
        Ok(Self::new(
            Arc::new(Ec2Client::from_context(ctx)),
            account_id,
            settings,
        ))
    }

    /// Wrap into the shared handle resources hold
    pub fn shared(self) -> Arc<dyn Connector> {
        Arc::new(self)
    }
}

impl Connector for Ec2Connector {
    fn api(&self) -> &dyn Ec2Api {
        self.api.as_ref()
    }

    fn account_id(&self) -> &str {
        self.account_id.as_str()
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }
}

impl std::fmt::Debug for Ec2Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ec2Connector")
            .field("account_id", &self.account_id)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
