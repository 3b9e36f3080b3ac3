//! VPCs

use super::first_or_missing;
use crate::ec2::{DescribeRequest, Ec2Api};
use crate::error::Result;
use crate::options::CreateOptions;
use crate::resource::{Resource, ResourceKind};
use async_trait::async_trait;
use aws_sdk_ec2::types::Vpc;
use ec2wrap_common::defaults::DEFAULT_VPC_CIDR;
use ec2wrap_common::options::CIDR_BLOCK;

/// A VPC
pub type Ec2Vpc = Resource<VpcKind>;

#[derive(Debug, Clone, Copy, Default)]
pub struct VpcKind;

#[async_trait]
impl ResourceKind for VpcKind {
    type Snapshot = Vpc;

    const NAME: &'static str = "VPC";

    fn extract_id(snapshot: &Vpc) -> Option<String> {
        snapshot.vpc_id().map(str::to_string)
    }

    async fn parse_list(api: &dyn Ec2Api, request: DescribeRequest) -> anyhow::Result<Vec<Vpc>> {
        api.describe_vpcs(request).await
    }

    async fn parse_one(api: &dyn Ec2Api, id: &str) -> Result<Vpc> {
        first_or_missing(id, api.describe_vpcs(DescribeRequest::by_id(id)).await)
    }

    async fn build_create_request(
        resource: &mut Ec2Vpc,
        options: &CreateOptions,
        _description: &str,
    ) -> Result<()> {
        let cidr_block = options
            .non_blank(CIDR_BLOCK)
            .unwrap_or_else(|| DEFAULT_VPC_CIDR.to_string());

        let vpc = resource.api().create_vpc(&cidr_block).await?;
        let vpc_id =
            Self::extract_id(&vpc).ok_or_else(|| anyhow::anyhow!("CreateVpc returned no VPC id"))?;

        resource.set_id(vpc_id);
        resource.set_snapshot(vpc);
        Ok(())
    }

    async fn build_delete_request(resource: &Ec2Vpc) -> Result<()> {
        resource.api().delete_vpc(resource.bound()?).await?;
        Ok(())
    }
}

impl Resource<VpcKind> {
    pub fn cidr_block(&self) -> Result<Option<&str>> {
        Ok(self.snapshot()?.cidr_block())
    }

    /// Whether this is the region's default VPC
    pub fn is_default(&self) -> Result<bool> {
        Ok(self.snapshot()?.is_default().unwrap_or(false))
    }
}
