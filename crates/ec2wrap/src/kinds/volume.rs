//! EBS volumes

use super::{Ec2Snapshot, first_or_missing};
use crate::connector::Connector;
use crate::ec2::{CreateVolumeParams, DescribeRequest, Ec2Api};
use crate::error::{ResourceError, Result};
use crate::options::CreateOptions;
use crate::resource::{Resource, ResourceKind};
use async_trait::async_trait;
use aws_sdk_ec2::types::{Volume, VolumeState};
use ec2wrap_common::options::{AVAILABILITY_ZONE, VOLUME_SIZE, VOLUME_TYPE};
use std::sync::Arc;
use tracing::{debug, info};

/// Volumes are created from a snapshot id seed
const SNAPSHOT_SEED_PREFIX: &str = "snap-";

/// An EBS volume
pub type Ec2Volume = Resource<VolumeKind>;

#[derive(Debug, Clone, Copy, Default)]
pub struct VolumeKind;

#[async_trait]
impl ResourceKind for VolumeKind {
    type Snapshot = Volume;

    const NAME: &'static str = "volume";

    fn extract_id(snapshot: &Volume) -> Option<String> {
        snapshot.volume_id().map(str::to_string)
    }

    async fn parse_list(api: &dyn Ec2Api, request: DescribeRequest) -> anyhow::Result<Vec<Volume>> {
        api.describe_volumes(request).await
    }

    async fn parse_one(api: &dyn Ec2Api, id: &str) -> Result<Volume> {
        first_or_missing(id, api.describe_volumes(DescribeRequest::by_id(id)).await)
    }

    async fn build_create_request(
        resource: &mut Ec2Volume,
        options: &CreateOptions,
        _description: &str,
    ) -> Result<()> {
        let Some(snapshot_id) = resource
            .id()
            .filter(|id| id.starts_with(SNAPSHOT_SEED_PREFIX))
            .map(str::to_string)
        else {
            debug!(seed = ?resource.id(), "Not a snapshot id, nothing to create");
            return Ok(());
        };

        let availability_zone = options.non_blank(AVAILABILITY_ZONE).ok_or_else(|| {
            ResourceError::illegal_state(
                Self::NAME,
                Some(&snapshot_id),
                "the availability-zone option is required",
            )
        })?;

        let size_gib = options
            .non_blank(VOLUME_SIZE)
            .map(|size| {
                size.parse::<i32>().map_err(|_| {
                    ResourceError::illegal_state(
                        Self::NAME,
                        Some(&snapshot_id),
                        format!("invalid volume size '{}'", size),
                    )
                })
            })
            .transpose()?;

        let volume_id = resource
            .api()
            .create_volume(CreateVolumeParams {
                snapshot_id,
                availability_zone,
                size_gib,
                volume_type: options.non_blank(VOLUME_TYPE),
            })
            .await?;

        resource.set_id(volume_id);
        Ok(())
    }

    async fn build_delete_request(resource: &Ec2Volume) -> Result<()> {
        resource.api().delete_volume(resource.bound()?).await?;
        Ok(())
    }
}

impl Resource<VolumeKind> {
    /// Volumes attached to `instance_id`
    pub async fn for_instance(connector: &Arc<dyn Connector>, instance_id: &str) -> Result<Vec<Self>> {
        Self::new(connector.clone())
            .get_filtered("attachment.instance-id", [instance_id])
            .await
    }

    /// Volumes attached at `device` (on any instance)
    pub async fn attached_at(connector: &Arc<dyn Connector>, device: &str) -> Result<Vec<Self>> {
        Self::new(connector.clone())
            .get_filtered("attachment.device", [device])
            .await
    }

    /// Volumes not attached to anything
    pub async fn available(connector: &Arc<dyn Connector>) -> Result<Vec<Self>> {
        Self::new(connector.clone())
            .get_filtered("status", ["available"])
            .await
    }

    /// Start a snapshot of this volume.
    ///
    /// The returned snapshot is bound but not refreshed; EC2 may not list it
    /// for a short while.
    pub async fn take_snapshot(&self, description: &str) -> Result<Ec2Snapshot> {
        let volume_id = self.bound()?;
        info!(volume_id = %volume_id, "Taking snapshot");
        let snapshot_id = self
            .api()
            .create_snapshot(volume_id, Some(description.to_string()))
            .await?;
        Ok(Ec2Snapshot::with_id(self.connector().clone(), snapshot_id))
    }

    /// Device name of the first attachment
    pub fn attached_device(&self) -> Result<Option<&str>> {
        Ok(self
            .snapshot()?
            .attachments()
            .first()
            .and_then(|attachment| attachment.device()))
    }

    /// Current state, refreshed from EC2
    pub async fn state(&mut self) -> Result<Option<VolumeState>> {
        self.refresh().await?;
        Ok(self.snapshot()?.state().cloned())
    }
}
