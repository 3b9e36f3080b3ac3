//! VPC subnets

use super::first_or_missing;
use crate::ec2::{DescribeRequest, Ec2Api};
use crate::error::{ResourceError, Result};
use crate::options::CreateOptions;
use crate::resource::{Resource, ResourceKind};
use async_trait::async_trait;
use aws_sdk_ec2::types::Subnet;
use ec2wrap_common::defaults::DEFAULT_SUBNET_CIDR;
use ec2wrap_common::options::{CIDR_BLOCK, GROUP_VPC_ID, VPC_ID};

/// A subnet
pub type Ec2Subnet = Resource<SubnetKind>;

#[derive(Debug, Clone, Copy, Default)]
pub struct SubnetKind;

#[async_trait]
impl ResourceKind for SubnetKind {
    type Snapshot = Subnet;

    const NAME: &'static str = "subnet";

    fn extract_id(snapshot: &Subnet) -> Option<String> {
        snapshot.subnet_id().map(str::to_string)
    }

    async fn parse_list(api: &dyn Ec2Api, request: DescribeRequest) -> anyhow::Result<Vec<Subnet>> {
        api.describe_subnets(request).await
    }

    async fn parse_one(api: &dyn Ec2Api, id: &str) -> Result<Subnet> {
        first_or_missing(id, api.describe_subnets(DescribeRequest::by_id(id)).await)
    }

    /// The `vpc-id` option wins, then `vpc_id`; otherwise the description
    /// argument is taken as the VPC id.
    async fn build_create_request(
        resource: &mut Ec2Subnet,
        options: &CreateOptions,
        description: &str,
    ) -> Result<()> {
        let vpc_id = options
            .first_non_blank(&[VPC_ID, GROUP_VPC_ID])
            .or_else(|| Some(description.trim().to_string()).filter(|vpc| !vpc.is_empty()))
            .ok_or_else(|| {
                ResourceError::illegal_state(Self::NAME, resource.id(), "no VPC id to create the subnet in")
            })?;
        let cidr_block = options
            .non_blank(CIDR_BLOCK)
            .unwrap_or_else(|| DEFAULT_SUBNET_CIDR.to_string());

        let subnet = resource.api().create_subnet(&vpc_id, &cidr_block).await?;
        let subnet_id = Self::extract_id(&subnet)
            .ok_or_else(|| anyhow::anyhow!("CreateSubnet returned no subnet id"))?;

        resource.set_id(subnet_id);
        resource.set_snapshot(subnet);
        Ok(())
    }

    async fn build_delete_request(resource: &Ec2Subnet) -> Result<()> {
        resource.api().delete_subnet(resource.bound()?).await?;
        Ok(())
    }
}

impl Resource<SubnetKind> {
    pub fn vpc_id(&self) -> Result<Option<&str>> {
        Ok(self.snapshot()?.vpc_id())
    }

    pub fn cidr_block(&self) -> Result<Option<&str>> {
        Ok(self.snapshot()?.cidr_block())
    }
}
