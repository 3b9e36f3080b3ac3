//! EC2 API trait for testing

use super::Ec2Client;
use super::types::{AddressRef, CreateVolumeParams, DescribeRequest, RunInstancesParams};
use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_ec2::types::{
    Address, DomainType, Image, IpPermission, Reservation, SecurityGroup, Snapshot, Subnet, Tag,
    Volume, Vpc,
};

/// One async method per EC2 call the resource kinds issue.
///
/// Resources only ever talk to EC2 through this trait, so unit tests can
/// swap in `MockEc2Api` and integration tests an in-memory fake.
///
/// Note: optional parameters use `Option<String>` instead of `Option<&str>`
/// to work around mockall lifetime limitations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Ec2Api: Send + Sync {
    /// Add or overwrite tags on every listed resource
    async fn create_tags(&self, resource_ids: Vec<String>, tags: Vec<Tag>) -> Result<()>;

    /// Remove tags (matching key and value) from every listed resource
    async fn delete_tags(&self, resource_ids: Vec<String>, tags: Vec<Tag>) -> Result<()>;

    async fn describe_instances(&self, request: DescribeRequest) -> Result<Vec<Reservation>>;

    /// Launch exactly one instance
    async fn run_instances(&self, params: RunInstancesParams) -> Result<Reservation>;

    async fn terminate_instances(&self, instance_ids: Vec<String>) -> Result<()>;

    async fn start_instance(&self, instance_id: &str) -> Result<()>;

    async fn stop_instance(&self, instance_id: &str) -> Result<()>;

    async fn reboot_instance(&self, instance_id: &str) -> Result<()>;

    /// Create an AMI from an instance and return its image id
    async fn create_image(
        &self,
        instance_id: &str,
        name: &str,
        description: Option<String>,
    ) -> Result<String>;

    async fn describe_images(&self, request: DescribeRequest) -> Result<Vec<Image>>;

    async fn deregister_image(&self, image_id: &str) -> Result<()>;

    async fn describe_volumes(&self, request: DescribeRequest) -> Result<Vec<Volume>>;

    /// Create a volume and return its id
    async fn create_volume(&self, params: CreateVolumeParams) -> Result<String>;

    async fn delete_volume(&self, volume_id: &str) -> Result<()>;

    async fn describe_snapshots(&self, request: DescribeRequest) -> Result<Vec<Snapshot>>;

    /// Snapshot a volume and return the snapshot id
    async fn create_snapshot(&self, volume_id: &str, description: Option<String>)
    -> Result<String>;

    async fn delete_snapshot(&self, snapshot_id: &str) -> Result<()>;

    async fn describe_addresses(&self, request: DescribeRequest) -> Result<Vec<Address>>;

    /// Allocate an elastic IP in `domain`
    async fn allocate_address(&self, domain: DomainType) -> Result<Address>;

    async fn release_address(&self, address: AddressRef) -> Result<()>;

    /// Associate an address with an instance and return the association id
    async fn associate_address(
        &self,
        address: AddressRef,
        instance_id: &str,
    ) -> Result<Option<String>>;

    async fn disassociate_address(&self, association: AddressRef) -> Result<()>;

    async fn describe_security_groups(&self, request: DescribeRequest)
    -> Result<Vec<SecurityGroup>>;

    /// Create a security group and return its id
    async fn create_security_group(
        &self,
        name: &str,
        description: &str,
        vpc_id: Option<String>,
    ) -> Result<String>;

    async fn delete_security_group(&self, group_id: &str) -> Result<()>;

    async fn authorize_ingress(&self, group_id: &str, permissions: Vec<IpPermission>)
    -> Result<()>;

    async fn revoke_ingress(&self, group_id: &str, permissions: Vec<IpPermission>) -> Result<()>;

    async fn describe_subnets(&self, request: DescribeRequest) -> Result<Vec<Subnet>>;

    async fn create_subnet(&self, vpc_id: &str, cidr_block: &str) -> Result<Subnet>;

    async fn delete_subnet(&self, subnet_id: &str) -> Result<()>;

    async fn describe_vpcs(&self, request: DescribeRequest) -> Result<Vec<Vpc>>;

    async fn create_vpc(&self, cidr_block: &str) -> Result<Vpc>;

    async fn delete_vpc(&self, vpc_id: &str) -> Result<()>;
}

#[async_trait]
impl Ec2Api for Ec2Client {
    async fn create_tags(&self, resource_ids: Vec<String>, tags: Vec<Tag>) -> Result<()> {
        Ec2Client::create_tags(self, resource_ids, tags).await
    }

    async fn delete_tags(&self, resource_ids: Vec<String>, tags: Vec<Tag>) -> Result<()> {
        Ec2Client::delete_tags(self, resource_ids, tags).await
    }

    async fn describe_instances(&self, request: DescribeRequest) -> Result<Vec<Reservation>> {
        Ec2Client::describe_instances(self, request).await
    }

    async fn run_instances(&self, params: RunInstancesParams) -> Result<Reservation> {
        Ec2Client::run_instances(self, params).await
    }

    async fn terminate_instances(&self, instance_ids: Vec<String>) -> Result<()> {
        Ec2Client::terminate_instances(self, instance_ids).await
    }

    async fn start_instance(&self, instance_id: &str) -> Result<()> {
        Ec2Client::start_instance(self, instance_id).await
    }

    async fn stop_instance(&self, instance_id: &str) -> Result<()> {
        Ec2Client::stop_instance(self, instance_id).await
    }

    async fn reboot_instance(&self, instance_id: &str) -> Result<()> {
        Ec2Client::reboot_instance(self, instance_id).await
    }

    async fn create_image(
        &self,
        instance_id: &str,
        name: &str,
        description: Option<String>,
    ) -> Result<String> {
        Ec2Client::create_image(self, instance_id, name, description).await
    }

    async fn describe_images(&self, request: DescribeRequest) -> Result<Vec<Image>> {
        Ec2Client::describe_images(self, request).await
    }

    async fn deregister_image(&self, image_id: &str) -> Result<()> {
        Ec2Client::deregister_image(self, image_id).await
    }

    async fn describe_volumes(&self, request: DescribeRequest) -> Result<Vec<Volume>> {
        Ec2Client::describe_volumes(self, request).await
    }

    async fn create_volume(&self, params: CreateVolumeParams) -> Result<String> {
        Ec2Client::create_volume(self, params).await
    }

    async fn delete_volume(&self, volume_id: &str) -> Result<()> {
        Ec2Client::delete_volume(self, volume_id).await
    }

    async fn describe_snapshots(&self, request: DescribeRequest) -> Result<Vec<Snapshot>> {
        Ec2Client::describe_snapshots(self, request).await
    }

    async fn create_snapshot(
        &self,
        volume_id: &str,
        description: Option<String>,
    ) -> Result<String> {
        Ec2Client::create_snapshot(self, volume_id, description).await
    }

    async fn delete_snapshot(&self, snapshot_id: &str) -> Result<()> {
        Ec2Client::delete_snapshot(self, snapshot_id).await
    }

    async fn describe_addresses(&self, request: DescribeRequest) -> Result<Vec<Address>> {
        Ec2Client::describe_addresses(self, request).await
    }

    async fn allocate_address(&self, domain: DomainType) -> Result<Address> {
        Ec2Client::allocate_address(self, domain).await
    }

    async fn release_address(&self, address: AddressRef) -> Result<()> {
        Ec2Client::release_address(self, address).await
    }

    async fn associate_address(
        &self,
        address: AddressRef,
        instance_id: &str,
    ) -> Result<Option<String>> {
        Ec2Client::associate_address(self, address, instance_id).await
    }

    async fn disassociate_address(&self, association: AddressRef) -> Result<()> {
        Ec2Client::disassociate_address(self, association).await
    }

    async fn describe_security_groups(
        &self,
        request: DescribeRequest,
    ) -> Result<Vec<SecurityGroup>> {
        Ec2Client::describe_security_groups(self, request).await
    }

    async fn create_security_group(
        &self,
        name: &str,
        description: &str,
        vpc_id: Option<String>,
    ) -> Result<String> {
        Ec2Client::create_security_group(self, name, description, vpc_id).await
    }

    async fn delete_security_group(&self, group_id: &str) -> Result<()> {
        Ec2Client::delete_security_group(self, group_id).await
    }

    async fn authorize_ingress(
        &self,
        group_id: &str,
        permissions: Vec<IpPermission>,
    ) -> Result<()> {
        Ec2Client::authorize_ingress(self, group_id, permissions).await
    }

    async fn revoke_ingress(&self, group_id: &str, permissions: Vec<IpPermission>) -> Result<()> {
        Ec2Client::revoke_ingress(self, group_id, permissions).await
    }

    async fn describe_subnets(&self, request: DescribeRequest) -> Result<Vec<Subnet>> {
        Ec2Client::describe_subnets(self, request).await
    }

    async fn create_subnet(&self, vpc_id: &str, cidr_block: &str) -> Result<Subnet> {
        Ec2Client::create_subnet(self, vpc_id, cidr_block).await
    }

    async fn delete_subnet(&self, subnet_id: &str) -> Result<()> {
        Ec2Client::delete_subnet(self, subnet_id).await
    }

    async fn describe_vpcs(&self, request: DescribeRequest) -> Result<Vec<Vpc>> {
        Ec2Client::describe_vpcs(self, request).await
    }

    async fn create_vpc(&self, cidr_block: &str) -> Result<Vpc> {
        Ec2Client::create_vpc(self, cidr_block).await
    }

    async fn delete_vpc(&self, vpc_id: &str) -> Result<()> {
        Ec2Client::delete_vpc(self, vpc_id).await
    }
}
