//! EC2 instances

use super::{Ec2SecurityGroup, Ec2Volume, first_or_missing, name_tag, only};
use crate::connector::Connector;
use crate::ec2::{DescribeRequest, Ec2Api, RunInstancesParams};
use crate::error::{ResourceError, Result};
use crate::options::CreateOptions;
use crate::resource::{Resource, ResourceKind};
use crate::wait::{WaitConfig, wait_until};
use async_trait::async_trait;
use aws_sdk_ec2::types::{
    BlockDeviceMapping, EbsBlockDevice, Instance, InstanceStateName, IpPermission, IpRange,
    Reservation,
};
use aws_sdk_ec2::primitives::DateTimeFormat;
use base64::Engine;
use ec2wrap_common::defaults::{
    ANY_IPV4_CIDR, DEFAULT_CAPTURE_NAME, DEFAULT_INSTANCE_TYPE, DEFAULT_KEY_NAME,
};
use ec2wrap_common::options::{
    BLOCK_DEVICE_MAPPING, INSTANCE_TYPE, KEY_NAME, PRIVATE_IP, SECURITY_GROUP, SUBNET_ID,
    USER_DATA, parse_block_device_mapping,
};
use ec2wrap_common::{describe_instance_type, tags::NAME_TAG};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Instances are launched from an image id seed
const IMAGE_SEED_PREFIX: &str = "ami-";

/// An EC2 instance
pub type Ec2Instance = Resource<InstanceKind>;

/// Instance kind state: pending snapshot attachments and the launch reservation
#[derive(Debug, Clone, Default)]
pub struct InstanceKind {
    /// device name -> snapshot id, consumed by the next launch
    attachments: BTreeMap<String, String>,
    reservation: Option<Reservation>,
}

impl InstanceKind {
    fn block_device_mappings(&self) -> Vec<BlockDeviceMapping> {
        self.attachments
            .iter()
            .map(|(device, snapshot)| ebs_mapping(device, snapshot))
            .collect()
    }
}

fn ebs_mapping(device: &str, snapshot_id: &str) -> BlockDeviceMapping {
    BlockDeviceMapping::builder()
        .device_name(device)
        .ebs(
            EbsBlockDevice::builder()
                .snapshot_id(snapshot_id)
                .delete_on_termination(true)
                .build(),
        )
        .build()
}

fn tcp_permission(port: i32) -> IpPermission {
    IpPermission::builder()
        .ip_protocol("tcp")
        .from_port(port)
        .to_port(port)
        .ip_ranges(IpRange::builder().cidr_ip(ANY_IPV4_CIDR).build())
        .build()
}

fn port_allowed(permissions: &[IpPermission], port: i32) -> bool {
    permissions.iter().any(|permission| {
        matches!(
            (permission.from_port(), permission.to_port()),
            (Some(from), Some(to)) if from <= port && port <= to
        )
    })
}

#[async_trait]
impl ResourceKind for InstanceKind {
    type Snapshot = Instance;

    const NAME: &'static str = "instance";

    fn extract_id(snapshot: &Instance) -> Option<String> {
        snapshot.instance_id().map(str::to_string)
    }

    async fn parse_list(api: &dyn Ec2Api, request: DescribeRequest) -> anyhow::Result<Vec<Instance>> {
        Ok(api
            .describe_instances(request)
            .await?
            .iter()
            .flat_map(|reservation| reservation.instances().iter().cloned())
            .collect())
    }

    async fn parse_one(api: &dyn Ec2Api, id: &str) -> Result<Instance> {
        first_or_missing(id, Self::parse_list(api, DescribeRequest::by_id(id)).await)
    }

    async fn build_create_request(
        resource: &mut Ec2Instance,
        options: &CreateOptions,
        description: &str,
    ) -> Result<()> {
        let Some(image_id) = resource
            .id()
            .filter(|id| id.starts_with(IMAGE_SEED_PREFIX))
            .map(str::to_string)
        else {
            debug!(seed = ?resource.id(), "Not an image id, nothing to launch");
            return Ok(());
        };

        let settings = resource.connector().settings();
        let tag_delay = settings.tag_delay;
        let name = settings.instance_name(description);

        let mut block_devices = resource.kind().block_device_mappings();
        if let Some(mapping) = options.get(BLOCK_DEVICE_MAPPING) {
            block_devices.extend(
                parse_block_device_mapping(mapping)
                    .iter()
                    .map(|(device, snapshot)| ebs_mapping(device, snapshot)),
            );
        }

        let user_data = options
            .get(USER_DATA)
            .map(|data| base64::engine::general_purpose::STANDARD.encode(data.as_bytes()));

        let params = RunInstancesParams::new(
            image_id,
            options.non_blank(INSTANCE_TYPE).as_deref().unwrap_or(DEFAULT_INSTANCE_TYPE),
        )
        .with_key_name(options.non_blank(KEY_NAME).as_deref().unwrap_or(DEFAULT_KEY_NAME))
        .with_security_group(options.non_blank(SECURITY_GROUP))
        .with_subnet(options.non_blank(SUBNET_ID))
        .with_private_ip(options.non_blank(PRIVATE_IP))
        .with_user_data(user_data)
        .with_block_devices(block_devices);

        let reservation = resource.api().run_instances(params).await?;
        resource.kind_mut().attachments.clear();

        let instance = reservation
            .instances()
            .first()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("RunInstances returned no instances"))?;
        let instance_id = Self::extract_id(&instance)
            .ok_or_else(|| anyhow::anyhow!("Launched instance has no instance ID"))?;

        resource.set_id(instance_id.clone());
        resource.set_snapshot(instance);
        resource.kind_mut().reservation = Some(reservation);

        tokio::time::sleep(tag_delay).await;
        if let Err(e) = resource.add_tag(NAME_TAG, &name).await {
            warn!(instance_id = %instance_id, name = %name, error = %e, "Failed to name instance");
        }

        Ok(())
    }

    async fn build_delete_request(resource: &Ec2Instance) -> Result<()> {
        let id = resource.bound()?;
        resource.api().terminate_instances(vec![id.to_string()]).await?;
        Ok(())
    }
}

impl Resource<InstanceKind> {
    /// Human-readable description of a legacy instance type
    pub fn describe_size(instance_type: &str) -> Option<&'static str> {
        describe_instance_type(instance_type)
    }

    /// Instances launched into `subnet_id`
    pub async fn in_subnet(connector: &Arc<dyn Connector>, subnet_id: &str) -> Result<Vec<Self>> {
        Self::new(connector.clone())
            .get_filtered("subnet-id", [subnet_id])
            .await
    }

    /// The instance with this private IP, if exactly one matches
    pub async fn with_private_ip(connector: &Arc<dyn Connector>, ip: &str) -> Result<Option<Self>> {
        let matches = Self::new(connector.clone())
            .get_filtered("private-ip-address", [ip])
            .await?;
        Ok(only(matches))
    }

    /// The instance with this public DNS name, if exactly one matches
    pub async fn with_public_dns(connector: &Arc<dyn Connector>, dns: &str) -> Result<Option<Self>> {
        let matches = Self::new(connector.clone())
            .get_filtered("dns-name", [dns])
            .await?;
        Ok(only(matches))
    }

    /// Queue a snapshot to be attached at `device` on the next launch.
    ///
    /// Returns the snapshot previously queued for that device.
    pub fn attach_snapshot(
        &mut self,
        device: impl Into<String>,
        snapshot_id: impl Into<String>,
    ) -> Option<String> {
        self.kind_mut()
            .attachments
            .insert(device.into(), snapshot_id.into())
    }

    /// Drop a queued attachment
    pub fn remove_attach(&mut self, device: &str) -> Option<String> {
        self.kind_mut().attachments.remove(device)
    }

    pub fn pending_attachments(&self) -> impl Iterator<Item = (&str, &str)> {
        self.kind()
            .attachments
            .iter()
            .map(|(device, snapshot)| (device.as_str(), snapshot.as_str()))
    }

    /// Current state, refreshed from EC2
    pub async fn state(&mut self) -> Result<InstanceStateName> {
        self.refresh().await?;
        Ok(self.cached_state()?.unwrap_or(InstanceStateName::Pending))
    }

    fn cached_state(&self) -> Result<Option<InstanceStateName>> {
        Ok(self
            .snapshot()?
            .state()
            .and_then(|state| state.name())
            .cloned())
    }

    /// Start a stopped instance; returns whether a start was issued
    pub async fn start(&mut self) -> Result<bool> {
        if self.state().await? != InstanceStateName::Stopped {
            debug!(instance_id = ?self.id(), "Instance not stopped, not starting");
            return Ok(false);
        }
        self.api().start_instance(self.bound()?).await?;
        Ok(true)
    }

    /// Stop a running instance; returns whether a stop was issued
    pub async fn stop(&mut self) -> Result<bool> {
        if self.state().await? != InstanceStateName::Running {
            debug!(instance_id = ?self.id(), "Instance not running, not stopping");
            return Ok(false);
        }
        self.api().stop_instance(self.bound()?).await?;
        Ok(true)
    }

    /// Reboot a running instance; returns whether a reboot was issued
    pub async fn reboot(&mut self) -> Result<bool> {
        if self.state().await? != InstanceStateName::Running {
            debug!(instance_id = ?self.id(), "Instance not running, not rebooting");
            return Ok(false);
        }
        self.api().reboot_instance(self.bound()?).await?;
        Ok(true)
    }

    /// Create an image from this instance while it is running.
    ///
    /// Returns the new image id, or `None` when the instance is not running.
    pub async fn capture(&mut self, name: Option<&str>, description: Option<&str>) -> Result<Option<String>> {
        if self.state().await? != InstanceStateName::Running {
            info!(instance_id = ?self.id(), "Instance not running, skipping capture");
            return Ok(None);
        }

        let image_id = self
            .api()
            .create_image(
                self.bound()?,
                name.unwrap_or(DEFAULT_CAPTURE_NAME),
                description.map(str::to_string),
            )
            .await?;
        Ok(Some(image_id))
    }

    /// Poll while the instance is pending, then require it to be running.
    ///
    /// Fails with `Timeout` when still pending after `wait.max_attempts`
    /// checks and with `IllegalState` when it settled in any other state.
    pub async fn wait_for_boot(&mut self, wait: &WaitConfig) -> Result<()> {
        let id = self.bound()?.to_string();
        let connector = self.connector().clone();

        info!(instance_id = %id, max_attempts = wait.max_attempts, "Waiting for instance to boot");

        let settled = wait_until(wait, &format!("instance {} boot", id), || {
            let (api, id) = (connector.api(), id.as_str());
            async move {
                let instance = InstanceKind::parse_one(api, id).await?;
                let pending = matches!(
                    instance.state().and_then(|state| state.name()),
                    None | Some(InstanceStateName::Pending)
                );
                Ok((!pending).then_some(instance))
            }
        })
        .await?;
        self.set_snapshot(settled);

        match self.cached_state()? {
            Some(InstanceStateName::Running) => {
                info!(instance_id = %id, "Instance is running");
                Ok(())
            }
            state => {
                let reason = self
                    .snapshot()?
                    .state_reason()
                    .and_then(|reason| reason.message())
                    .unwrap_or("no state reason provided by AWS");
                Err(ResourceError::illegal_state(
                    InstanceKind::NAME,
                    Some(&id),
                    format!("instance settled in state {:?}: {}", state, reason),
                ))
            }
        }
    }

    /// Group id of the first security group the instance runs with
    fn first_security_group(&self) -> Result<String> {
        self.snapshot()?
            .security_groups()
            .first()
            .and_then(|group| group.group_id())
            .map(str::to_string)
            .ok_or_else(|| {
                ResourceError::illegal_state(
                    InstanceKind::NAME,
                    self.id(),
                    "instance has no security group",
                )
            })
    }

    /// Open TCP `ports` to 0.0.0.0/0 on the instance's first security group.
    ///
    /// Ports already inside an allowed range are skipped.
    pub async fn allow_ports(&self, ports: &[i32]) -> Result<()> {
        let group_id = self.first_security_group()?;
        let group = Ec2SecurityGroup::lookup(self.connector(), &group_id).await?;
        let existing = group.ip_permissions()?;

        let to_send: Vec<IpPermission> = ports
            .iter()
            .filter(|&&port| {
                let present = port_allowed(existing, port);
                if present {
                    debug!(security_group_id = %group_id, port, "Port already allowed, skipping");
                }
                !present
            })
            .map(|&port| tcp_permission(port))
            .collect();

        if to_send.is_empty() {
            debug!(security_group_id = %group_id, "All ports already allowed");
            return Ok(());
        }

        info!(security_group_id = %group_id, ports = ?ports, "Allowing ports");
        self.api().authorize_ingress(&group_id, to_send).await?;
        Ok(())
    }

    /// Close TCP `ports` for 0.0.0.0/0 on the instance's first security group.
    ///
    /// Only exact single-port rules are revoked; a port inside a wider
    /// allowed range stays open.
    pub async fn disallow_ports(&self, ports: &[i32]) -> Result<()> {
        if ports.is_empty() {
            return Ok(());
        }
        let group_id = self.first_security_group()?;

        info!(security_group_id = %group_id, ports = ?ports, "Disallowing ports");
        self.api()
            .revoke_ingress(&group_id, ports.iter().map(|&port| tcp_permission(port)).collect())
            .await?;
        Ok(())
    }

    /// Volumes attached to this instance
    pub async fn volumes(&self) -> Result<Vec<Ec2Volume>> {
        Ec2Volume::for_instance(self.connector(), self.bound()?).await
    }

    pub fn private_ip(&self) -> Result<Option<&str>> {
        Ok(self.snapshot()?.private_ip_address())
    }

    pub fn public_dns(&self) -> Result<Option<&str>> {
        Ok(self
            .snapshot()?
            .public_dns_name()
            .filter(|dns| !dns.is_empty()))
    }

    /// Public DNS name, else private IP (VPC-only instances)
    pub fn host(&self) -> Result<Option<&str>> {
        match self.public_dns()? {
            Some(dns) => Ok(Some(dns)),
            None => self.private_ip(),
        }
    }

    /// Value of the `Name` tag
    pub fn name(&self) -> Result<Option<&str>> {
        Ok(name_tag(self.snapshot()?.tags()))
    }

    pub fn instance_type(&self) -> Result<Option<&str>> {
        Ok(self.snapshot()?.instance_type().map(|t| t.as_str()))
    }

    pub fn is_vpc_instance(&self) -> Result<bool> {
        Ok(self
            .snapshot()?
            .vpc_id()
            .is_some_and(|vpc| !vpc.is_empty()))
    }

    /// Whether the instance exists and is running
    pub async fn is_running(&mut self) -> Result<bool> {
        self.is_in_state(InstanceStateName::Running).await
    }

    /// Whether the instance exists and is stopped
    pub async fn is_stopped(&mut self) -> Result<bool> {
        self.is_in_state(InstanceStateName::Stopped).await
    }

    async fn is_in_state(&mut self, expected: InstanceStateName) -> Result<bool> {
        match self.state().await {
            Ok(state) => Ok(state == expected),
            Err(ResourceError::DoesNotExist { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// `ec2-run-instances` style summary of the launch reservation
    pub fn launch_summary(&self) -> Option<String> {
        let reservation = self.kind().reservation.as_ref()?;

        let mut summary = format!(
            "RESERVATION\t{}\t{}",
            reservation.reservation_id().unwrap_or_default(),
            reservation.owner_id().unwrap_or_default()
        );
        for group in reservation.groups() {
            summary.push('\t');
            summary.push_str(group.group_name().unwrap_or_default());
        }
        summary.push('\n');

        for instance in reservation.instances() {
            summary.push_str(&format!(
                "INSTANCE\t{}\t{}\t{}\t{}\t{}\t{}\n",
                instance.instance_id().unwrap_or_default(),
                instance.image_id().unwrap_or_default(),
                instance
                    .state()
                    .and_then(|state| state.name())
                    .map(|name| name.as_str())
                    .unwrap_or_default(),
                instance.ami_launch_index().unwrap_or_default(),
                instance.instance_type().map(|t| t.as_str()).unwrap_or_default(),
                instance
                    .launch_time()
                    .and_then(|time| time.fmt(DateTimeFormat::DateTime).ok())
                    .unwrap_or_default(),
            ));
        }

        Some(summary)
    }
}
