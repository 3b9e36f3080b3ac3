//! EBS volume, snapshot and AMI calls

use super::types::{CreateVolumeParams, DescribeRequest};
use super::{Ec2Client, non_empty};
use anyhow::{Context, Result};
use aws_sdk_ec2::types::{Image, Snapshot, Volume, VolumeType};
use tracing::{debug, info};

impl Ec2Client {
    /// Describe images (single page; EC2 returns every match at once)
    pub async fn describe_images(&self, request: DescribeRequest) -> Result<Vec<Image>> {
        debug!(ids = ?request.ids, owners = ?request.owner_ids, "Describing images");

        let response = self
            .client
            .describe_images()
            .set_image_ids(non_empty(request.ids))
            .set_owners(non_empty(request.owner_ids))
            .set_filters(non_empty(request.filters))
            .send()
            .await
            .context("Failed to describe images")?;

        Ok(response.images().to_vec())
    }

    /// Deregister an AMI
    pub async fn deregister_image(&self, image_id: &str) -> Result<()> {
        info!(image_id = %image_id, "Deregistering image");
        self.client
            .deregister_image()
            .image_id(image_id)
            .send()
            .await
            .with_context(|| format!("Failed to deregister image {}", image_id))?;
        Ok(())
    }

    /// Describe volumes, following pagination
    pub async fn describe_volumes(&self, request: DescribeRequest) -> Result<Vec<Volume>> {
        debug!(ids = ?request.ids, filters = request.filters.len(), "Describing volumes");

        let mut pages = self
            .client
            .describe_volumes()
            .set_volume_ids(non_empty(request.ids))
            .set_filters(non_empty(request.filters))
            .into_paginator()
            .send();

        let mut volumes = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.context("Failed to describe volumes")?;
            volumes.extend(page.volumes().iter().cloned());
        }

        Ok(volumes)
    }

    /// Create a volume from a snapshot
    pub async fn create_volume(&self, params: CreateVolumeParams) -> Result<String> {
        info!(
            snapshot_id = %params.snapshot_id,
            availability_zone = %params.availability_zone,
            size_gib = ?params.size_gib,
            "Creating volume"
        );

        let response = self
            .client
            .create_volume()
            .snapshot_id(&params.snapshot_id)
            .availability_zone(&params.availability_zone)
            .set_size(params.size_gib)
            .set_volume_type(params.volume_type.as_deref().map(VolumeType::from))
            .send()
            .await
            .with_context(|| format!("Failed to create volume from {}", params.snapshot_id))?;

        let volume_id = response
            .volume_id()
            .context("No volume ID returned from CreateVolume")?
            .to_string();

        info!(volume_id = %volume_id, "Volume created");
        Ok(volume_id)
    }

    /// Delete a volume
    pub async fn delete_volume(&self, volume_id: &str) -> Result<()> {
        info!(volume_id = %volume_id, "Deleting volume");
        self.client
            .delete_volume()
            .volume_id(volume_id)
            .send()
            .await
            .with_context(|| format!("Failed to delete volume {}", volume_id))?;
        Ok(())
    }

    /// Describe snapshots, following pagination
    pub async fn describe_snapshots(&self, request: DescribeRequest) -> Result<Vec<Snapshot>> {
        debug!(ids = ?request.ids, owners = ?request.owner_ids, "Describing snapshots");

        let mut pages = self
            .client
            .describe_snapshots()
            .set_snapshot_ids(non_empty(request.ids))
            .set_owner_ids(non_empty(request.owner_ids))
            .set_filters(non_empty(request.filters))
            .into_paginator()
            .send();

        let mut snapshots = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.context("Failed to describe snapshots")?;
            snapshots.extend(page.snapshots().iter().cloned());
        }

        Ok(snapshots)
    }

    /// Snapshot a volume
    pub async fn create_snapshot(
        &self,
        volume_id: &str,
        description: Option<String>,
    ) -> Result<String> {
        info!(volume_id = %volume_id, "Creating snapshot");

        let response = self
            .client
            .create_snapshot()
            .volume_id(volume_id)
            .set_description(description)
            .send()
            .await
            .with_context(|| format!("Failed to snapshot volume {}", volume_id))?;

        let snapshot_id = response
            .snapshot_id()
            .context("No snapshot ID returned from CreateSnapshot")?
            .to_string();

        info!(snapshot_id = %snapshot_id, "Snapshot started");
        Ok(snapshot_id)
    }

    /// Delete a snapshot
    pub async fn delete_snapshot(&self, snapshot_id: &str) -> Result<()> {
        info!(snapshot_id = %snapshot_id, "Deleting snapshot");
        self.client
            .delete_snapshot()
            .snapshot_id(snapshot_id)
            .send()
            .await
            .with_context(|| format!("Failed to delete snapshot {}", snapshot_id))?;
        Ok(())
    }
}
