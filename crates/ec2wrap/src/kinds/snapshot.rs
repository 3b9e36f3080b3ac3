//! EBS snapshots owned by the caller's account

use super::first_or_missing;
use crate::connector::Connector;
use crate::ec2::{DescribeRequest, Ec2Api};
use crate::error::Result;
use crate::options::CreateOptions;
use crate::resource::{Resource, ResourceKind};
use async_trait::async_trait;
use aws_sdk_ec2::types::{Filter, Snapshot, SnapshotState};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Snapshots are created from a volume id seed
const VOLUME_SEED_PREFIX: &str = "vol-";

/// An EBS snapshot
pub type Ec2Snapshot = Resource<SnapshotKind>;

#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotKind;

#[async_trait]
impl ResourceKind for SnapshotKind {
    type Snapshot = Snapshot;

    const NAME: &'static str = "snapshot";

    fn extract_id(snapshot: &Snapshot) -> Option<String> {
        snapshot.snapshot_id().map(str::to_string)
    }

    /// Listings only cover snapshots owned by the account
    fn build_filter_request(filters: Vec<Filter>, connector: &dyn Connector) -> DescribeRequest {
        DescribeRequest::filtered(filters).with_owner(connector.account_id())
    }

    async fn parse_list(api: &dyn Ec2Api, request: DescribeRequest) -> anyhow::Result<Vec<Snapshot>> {
        api.describe_snapshots(request).await
    }

    async fn parse_one(api: &dyn Ec2Api, id: &str) -> Result<Snapshot> {
        first_or_missing(id, api.describe_snapshots(DescribeRequest::by_id(id)).await)
    }

    async fn build_create_request(
        resource: &mut Ec2Snapshot,
        _options: &CreateOptions,
        description: &str,
    ) -> Result<()> {
        let Some(volume_id) = resource
            .id()
            .filter(|id| id.starts_with(VOLUME_SEED_PREFIX))
            .map(str::to_string)
        else {
            debug!(seed = ?resource.id(), "Not a volume id, nothing to snapshot");
            return Ok(());
        };

        let snapshot_id = resource
            .api()
            .create_snapshot(&volume_id, Some(description.to_string()))
            .await?;
        resource.set_id(snapshot_id);
        Ok(())
    }

    async fn build_delete_request(resource: &Ec2Snapshot) -> Result<()> {
        resource.api().delete_snapshot(resource.bound()?).await?;
        Ok(())
    }
}

impl Resource<SnapshotKind> {
    /// Volume size in GiB
    pub fn size(&self) -> Result<Option<i32>> {
        Ok(self.snapshot()?.volume_size())
    }

    pub fn description(&self) -> Result<Option<&str>> {
        Ok(self.snapshot()?.description())
    }

    /// Source volume id
    pub fn volume_id(&self) -> Result<Option<&str>> {
        Ok(self.snapshot()?.volume_id())
    }

    /// Current state, refreshed from EC2
    pub async fn state(&mut self) -> Result<Option<SnapshotState>> {
        self.refresh().await?;
        Ok(self.snapshot()?.state().cloned())
    }

    /// When the snapshot was started
    pub fn created_at(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .snapshot()?
            .start_time()
            .and_then(|time| DateTime::from_timestamp(time.secs(), time.subsec_nanos())))
    }
}
