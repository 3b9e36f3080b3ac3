//! Security groups

use super::first_or_missing;
use crate::ec2::{DescribeRequest, Ec2Api};
use crate::error::Result;
use crate::options::CreateOptions;
use crate::resource::{Resource, ResourceKind};
use async_trait::async_trait;
use aws_sdk_ec2::types::{IpPermission, SecurityGroup};
use ec2wrap_common::options::{DESCRIPTION, GROUP_VPC_ID, VPC_ID};

/// A security group
pub type Ec2SecurityGroup = Resource<SecurityGroupKind>;

#[derive(Debug, Clone, Copy, Default)]
pub struct SecurityGroupKind;

#[async_trait]
impl ResourceKind for SecurityGroupKind {
    type Snapshot = SecurityGroup;

    const NAME: &'static str = "security group";

    fn extract_id(snapshot: &SecurityGroup) -> Option<String> {
        snapshot.group_id().map(str::to_string)
    }

    async fn parse_list(
        api: &dyn Ec2Api,
        request: DescribeRequest,
    ) -> anyhow::Result<Vec<SecurityGroup>> {
        api.describe_security_groups(request).await
    }

    async fn parse_one(api: &dyn Ec2Api, id: &str) -> Result<SecurityGroup> {
        first_or_missing(id, api.describe_security_groups(DescribeRequest::by_id(id)).await)
    }

    /// The description argument is the group name. EC2 requires a group
    /// description, so the name stands in when the option is missing.
    /// The VPC comes from `vpc_id`, or `vpc-id` when that is absent.
    async fn build_create_request(
        resource: &mut Ec2SecurityGroup,
        options: &CreateOptions,
        description: &str,
    ) -> Result<()> {
        let group_description = options
            .non_blank(DESCRIPTION)
            .unwrap_or_else(|| description.to_string());

        let vpc_id = options.first_non_blank(&[GROUP_VPC_ID, VPC_ID]);

        let group_id = resource
            .api()
            .create_security_group(description, &group_description, vpc_id)
            .await?;
        resource.set_id(group_id);
        Ok(())
    }

    async fn build_delete_request(resource: &Ec2SecurityGroup) -> Result<()> {
        resource.api().delete_security_group(resource.bound()?).await?;
        Ok(())
    }
}

impl Resource<SecurityGroupKind> {
    /// Ingress rules from the last snapshot
    pub fn ip_permissions(&self) -> Result<&[IpPermission]> {
        Ok(self.snapshot()?.ip_permissions())
    }

    pub fn vpc_id(&self) -> Result<Option<&str>> {
        Ok(self.snapshot()?.vpc_id())
    }

    pub fn name(&self) -> Result<Option<&str>> {
        Ok(self.snapshot()?.group_name())
    }
}
