//! Machine images (AMIs)

use super::first_or_missing;
use crate::connector::Connector;
use crate::ec2::{DescribeRequest, Ec2Api};
use crate::error::Result;
use crate::options::CreateOptions;
use crate::resource::{Resource, ResourceKind};
use async_trait::async_trait;
use aws_sdk_ec2::types::{Image, ImageState};
use ec2wrap_common::options::DESCRIPTION;
use std::sync::Arc;
use tracing::debug;

/// Images are captured from an instance id seed
const INSTANCE_SEED_PREFIX: &str = "i-";

/// A machine image
pub type Ec2Image = Resource<ImageKind>;

#[derive(Debug, Clone, Copy, Default)]
pub struct ImageKind;

#[async_trait]
impl ResourceKind for ImageKind {
    type Snapshot = Image;

    const NAME: &'static str = "image";

    fn extract_id(snapshot: &Image) -> Option<String> {
        snapshot.image_id().map(str::to_string)
    }

    async fn parse_list(api: &dyn Ec2Api, request: DescribeRequest) -> anyhow::Result<Vec<Image>> {
        api.describe_images(request).await
    }

    async fn parse_one(api: &dyn Ec2Api, id: &str) -> Result<Image> {
        first_or_missing(id, api.describe_images(DescribeRequest::by_id(id)).await)
    }

    /// The description argument becomes the image name
    async fn build_create_request(
        resource: &mut Ec2Image,
        options: &CreateOptions,
        description: &str,
    ) -> Result<()> {
        let Some(instance_id) = resource
            .id()
            .filter(|id| id.starts_with(INSTANCE_SEED_PREFIX))
            .map(str::to_string)
        else {
            debug!(seed = ?resource.id(), "Not an instance id, nothing to capture");
            return Ok(());
        };

        let image_id = resource
            .api()
            .create_image(&instance_id, description, options.non_blank(DESCRIPTION))
            .await?;
        resource.set_id(image_id);
        Ok(())
    }

    async fn build_delete_request(resource: &Ec2Image) -> Result<()> {
        resource.api().deregister_image(resource.bound()?).await?;
        Ok(())
    }
}

impl Resource<ImageKind> {
    /// Images owned by the connector's account
    pub async fn owned(connector: &Arc<dyn Connector>) -> Result<Vec<Self>> {
        Self::new(connector.clone())
            .get_filtered("owner-id", [connector.account_id()])
            .await
    }

    /// Images that are not public
    pub async fn private(connector: &Arc<dyn Connector>) -> Result<Vec<Self>> {
        Self::new(connector.clone())
            .get_filtered("is-public", ["false"])
            .await
    }

    pub fn name(&self) -> Result<Option<&str>> {
        Ok(self.snapshot()?.name())
    }

    /// Current state, refreshed from EC2
    pub async fn state(&mut self) -> Result<Option<ImageState>> {
        self.refresh().await?;
        Ok(self.snapshot()?.state().cloned())
    }
}
