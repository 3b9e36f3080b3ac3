//! EC2 instance and image-capture calls

use super::types::{DescribeRequest, RunInstancesParams};
use super::{Ec2Client, non_empty};
use anyhow::{Context, Result};
use aws_sdk_ec2::types::{InstanceType, Reservation};
use tracing::{debug, info};

impl Ec2Client {
    /// Describe instances, following pagination
    pub async fn describe_instances(&self, request: DescribeRequest) -> Result<Vec<Reservation>> {
        debug!(ids = ?request.ids, filters = request.filters.len(), "Describing instances");

        let mut pages = self
            .client
            .describe_instances()
            .set_instance_ids(non_empty(request.ids))
            .set_filters(non_empty(request.filters))
            .into_paginator()
            .send();

        let mut reservations = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.context("Failed to describe instances")?;
            reservations.extend(page.reservations().iter().cloned());
        }

        Ok(reservations)
    }

    /// Launch one instance and return its reservation
    pub async fn run_instances(&self, params: RunInstancesParams) -> Result<Reservation> {
        info!(
            image_id = %params.image_id,
            instance_type = %params.instance_type,
            subnet_id = ?params.subnet_id,
            "Launching instance"
        );

        let response = self
            .client
            .run_instances()
            .image_id(&params.image_id)
            .instance_type(InstanceType::from(params.instance_type.as_str()))
            .min_count(1)
            .max_count(1)
            .set_key_name(params.key_name)
            .set_security_group_ids(params.security_group_id.map(|sg| vec![sg]))
            .set_subnet_id(params.subnet_id)
            .set_private_ip_address(params.private_ip)
            .set_user_data(params.user_data)
            .set_block_device_mappings(non_empty(params.block_devices))
            .send()
            .await
            .context("Failed to launch instance")?;

        let reservation = Reservation::builder()
            .set_reservation_id(response.reservation_id().map(str::to_string))
            .set_owner_id(response.owner_id().map(str::to_string))
            .set_requester_id(response.requester_id().map(str::to_string))
            .set_groups(Some(response.groups().to_vec()))
            .set_instances(Some(response.instances().to_vec()))
            .build();

        info!(
            reservation_id = ?reservation.reservation_id(),
            instances = reservation.instances().len(),
            "Instance launched"
        );

        Ok(reservation)
    }

    /// Terminate instances
    pub async fn terminate_instances(&self, instance_ids: Vec<String>) -> Result<()> {
        info!(instance_ids = ?instance_ids, "Terminating instances");
        self.client
            .terminate_instances()
            .set_instance_ids(Some(instance_ids))
            .send()
            .await
            .context("Failed to terminate instances")?;
        Ok(())
    }

    pub async fn start_instance(&self, instance_id: &str) -> Result<()> {
        info!(instance_id = %instance_id, "Starting instance");
        self.client
            .start_instances()
            .instance_ids(instance_id)
            .send()
            .await
            .with_context(|| format!("Failed to start instance {}", instance_id))?;
        Ok(())
    }

    pub async fn stop_instance(&self, instance_id: &str) -> Result<()> {
        info!(instance_id = %instance_id, "Stopping instance");
        self.client
            .stop_instances()
            .instance_ids(instance_id)
            .send()
            .await
            .with_context(|| format!("Failed to stop instance {}", instance_id))?;
        Ok(())
    }

    pub async fn reboot_instance(&self, instance_id: &str) -> Result<()> {
        info!(instance_id = %instance_id, "Rebooting instance");
        self.client
            .reboot_instances()
            .instance_ids(instance_id)
            .send()
            .await
            .with_context(|| format!("Failed to reboot instance {}", instance_id))?;
        Ok(())
    }

    /// Create an AMI from a running instance
    pub async fn create_image(
        &self,
        instance_id: &str,
        name: &str,
        description: Option<String>,
    ) -> Result<String> {
        info!(instance_id = %instance_id, name = %name, "Creating image from instance");

        let response = self
            .client
            .create_image()
            .instance_id(instance_id)
            .name(name)
            .set_description(description)
            .send()
            .await
            .with_context(|| format!("Failed to create image from {}", instance_id))?;

        let image_id = response
            .image_id()
            .context("No image ID returned from CreateImage")?
            .to_string();

        info!(image_id = %image_id, "Image creation started");
        Ok(image_id)
    }
}
