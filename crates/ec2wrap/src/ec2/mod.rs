//! EC2 API access

mod instance;
mod network;
mod operations;
mod storage;
mod types;

pub use operations::Ec2Api;
pub use types::{AddressRef, CreateVolumeParams, DescribeRequest, RunInstancesParams};

#[cfg(test)]
pub use operations::MockEc2Api;

use crate::context::AwsContext;
use anyhow::{Context, Result};
use aws_sdk_ec2::{Client, types::Tag};
use tracing::debug;

/// EC2 client backing [`Ec2Api`] with the AWS SDK
pub struct Ec2Client {
    pub(crate) client: Client,
}

impl Ec2Client {
    /// Create a new EC2 client (loads AWS config from environment)
    pub async fn new(region: &str) -> Result<Self> {
        let ctx = AwsContext::new(region).await;
        Ok(Self::from_context(&ctx))
    }

    /// Create an EC2 client from a pre-loaded AWS context
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.ec2_client(),
        }
    }

    /// Add or overwrite tags on resources
    pub async fn create_tags(&self, resource_ids: Vec<String>, tags: Vec<Tag>) -> Result<()> {
        debug!(resources = ?resource_ids, count = tags.len(), "Creating tags");
        self.client
            .create_tags()
            .set_resources(Some(resource_ids))
            .set_tags(Some(tags))
            .send()
            .await
            .context("Failed to create tags")?;
        Ok(())
    }

    /// Remove tags from resources
    pub async fn delete_tags(&self, resource_ids: Vec<String>, tags: Vec<Tag>) -> Result<()> {
        debug!(resources = ?resource_ids, count = tags.len(), "Deleting tags");
        self.client
            .delete_tags()
            .set_resources(Some(resource_ids))
            .set_tags(Some(tags))
            .send()
            .await
            .context("Failed to delete tags")?;
        Ok(())
    }
}

/// EC2 rejects empty id lists on some describe calls; send `None` instead.
pub(crate) fn non_empty<T>(values: Vec<T>) -> Option<Vec<T>> {
    if values.is_empty() { None } else { Some(values) }
}
