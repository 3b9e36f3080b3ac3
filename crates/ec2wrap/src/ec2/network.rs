//! Elastic IP, security group, subnet and VPC calls

use super::types::{AddressRef, DescribeRequest};
use super::{Ec2Client, non_empty};
use anyhow::{Context, Result, bail};
use aws_sdk_ec2::types::{Address, DomainType, IpPermission, SecurityGroup, Subnet, Vpc};
use tracing::{debug, info};

impl Ec2Client {
    /// Describe elastic IPs; `request.ids` are public IPs
    pub async fn describe_addresses(&self, request: DescribeRequest) -> Result<Vec<Address>> {
        debug!(public_ips = ?request.ids, filters = request.filters.len(), "Describing addresses");

        let response = self
            .client
            .describe_addresses()
            .set_public_ips(non_empty(request.ids))
            .set_filters(non_empty(request.filters))
            .send()
            .await
            .context("Failed to describe addresses")?;

        Ok(response.addresses().to_vec())
    }

    /// Allocate a new elastic IP
    pub async fn allocate_address(&self, domain: DomainType) -> Result<Address> {
        info!(domain = %domain.as_str(), "Allocating elastic IP");

        let response = self
            .client
            .allocate_address()
            .domain(domain)
            .send()
            .await
            .context("Failed to allocate elastic IP")?;

        let public_ip = response
            .public_ip()
            .context("No public IP returned from AllocateAddress")?;

        info!(public_ip = %public_ip, allocation_id = ?response.allocation_id(), "Elastic IP allocated");

        Ok(Address::builder()
            .public_ip(public_ip)
            .set_allocation_id(response.allocation_id().map(str::to_string))
            .set_domain(response.domain().cloned())
            .build())
    }

    /// Release an elastic IP by allocation id (VPC) or public IP (standard)
    pub async fn release_address(&self, address: AddressRef) -> Result<()> {
        info!(address = ?address, "Releasing elastic IP");

        let request = self.client.release_address();
        let request = match &address {
            AddressRef::AllocationId(id) => request.allocation_id(id),
            AddressRef::PublicIp(ip) => request.public_ip(ip),
            AddressRef::AssociationId(_) => bail!("Cannot release an address by association id"),
        };

        request
            .send()
            .await
            .with_context(|| format!("Failed to release elastic IP {:?}", address))?;
        Ok(())
    }

    /// Associate an elastic IP with an instance
    pub async fn associate_address(
        &self,
        address: AddressRef,
        instance_id: &str,
    ) -> Result<Option<String>> {
        info!(address = ?address, instance_id = %instance_id, "Associating elastic IP");

        let request = self.client.associate_address().instance_id(instance_id);
        let request = match &address {
            AddressRef::AllocationId(id) => request.allocation_id(id),
            AddressRef::PublicIp(ip) => request.public_ip(ip),
            AddressRef::AssociationId(_) => bail!("Cannot associate an address by association id"),
        };

        let response = request.send().await.with_context(|| {
            format!("Failed to associate {:?} with {}", address, instance_id)
        })?;

        Ok(response.association_id().map(str::to_string))
    }

    /// Disassociate an elastic IP by association id (VPC) or public IP (standard)
    pub async fn disassociate_address(&self, association: AddressRef) -> Result<()> {
        info!(association = ?association, "Disassociating elastic IP");

        let request = self.client.disassociate_address();
        let request = match &association {
            AddressRef::AssociationId(id) => request.association_id(id),
            AddressRef::PublicIp(ip) => request.public_ip(ip),
            AddressRef::AllocationId(_) => {
                bail!("Cannot disassociate an address by allocation id")
            }
        };

        request
            .send()
            .await
            .with_context(|| format!("Failed to disassociate {:?}", association))?;
        Ok(())
    }

    /// Describe security groups, following pagination
    pub async fn describe_security_groups(
        &self,
        request: DescribeRequest,
    ) -> Result<Vec<SecurityGroup>> {
        debug!(ids = ?request.ids, filters = request.filters.len(), "Describing security groups");

        let mut pages = self
            .client
            .describe_security_groups()
            .set_group_ids(non_empty(request.ids))
            .set_filters(non_empty(request.filters))
            .into_paginator()
            .send();

        let mut groups = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.context("Failed to describe security groups")?;
            groups.extend(page.security_groups().iter().cloned());
        }

        Ok(groups)
    }

    /// Create a security group
    pub async fn create_security_group(
        &self,
        name: &str,
        description: &str,
        vpc_id: Option<String>,
    ) -> Result<String> {
        info!(name = %name, vpc_id = ?vpc_id, "Creating security group");

        let response = self
            .client
            .create_security_group()
            .group_name(name)
            .description(description)
            .set_vpc_id(vpc_id)
            .send()
            .await
            .with_context(|| format!("Failed to create security group {}", name))?;

        let group_id = response
            .group_id()
            .context("No group ID returned from CreateSecurityGroup")?
            .to_string();

        info!(security_group_id = %group_id, "Security group created");
        Ok(group_id)
    }

    /// Delete a security group
    pub async fn delete_security_group(&self, group_id: &str) -> Result<()> {
        info!(security_group_id = %group_id, "Deleting security group");
        self.client
            .delete_security_group()
            .group_id(group_id)
            .send()
            .await
            .with_context(|| format!("Failed to delete security group {}", group_id))?;
        Ok(())
    }

    /// Add ingress rules to a security group
    pub async fn authorize_ingress(
        &self,
        group_id: &str,
        permissions: Vec<IpPermission>,
    ) -> Result<()> {
        info!(security_group_id = %group_id, rules = permissions.len(), "Authorizing ingress");
        self.client
            .authorize_security_group_ingress()
            .group_id(group_id)
            .set_ip_permissions(Some(permissions))
            .send()
            .await
            .with_context(|| format!("Failed to authorize ingress on {}", group_id))?;
        Ok(())
    }

    /// Remove ingress rules from a security group
    pub async fn revoke_ingress(&self, group_id: &str, permissions: Vec<IpPermission>) -> Result<()> {
        info!(security_group_id = %group_id, rules = permissions.len(), "Revoking ingress");
        self.client
            .revoke_security_group_ingress()
            .group_id(group_id)
            .set_ip_permissions(Some(permissions))
            .send()
            .await
            .with_context(|| format!("Failed to revoke ingress on {}", group_id))?;
        Ok(())
    }

    /// Describe subnets, following pagination
    pub async fn describe_subnets(&self, request: DescribeRequest) -> Result<Vec<Subnet>> {
        debug!(ids = ?request.ids, filters = request.filters.len(), "Describing subnets");

        let mut pages = self
            .client
            .describe_subnets()
            .set_subnet_ids(non_empty(request.ids))
            .set_filters(non_empty(request.filters))
            .into_paginator()
            .send();

        let mut subnets = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.context("Failed to describe subnets")?;
            subnets.extend(page.subnets().iter().cloned());
        }

        Ok(subnets)
    }

    /// Create a subnet inside a VPC
    pub async fn create_subnet(&self, vpc_id: &str, cidr_block: &str) -> Result<Subnet> {
        info!(vpc_id = %vpc_id, cidr_block = %cidr_block, "Creating subnet");

        let response = self
            .client
            .create_subnet()
            .vpc_id(vpc_id)
            .cidr_block(cidr_block)
            .send()
            .await
            .with_context(|| format!("Failed to create subnet in {}", vpc_id))?;

        response
            .subnet()
            .cloned()
            .context("No subnet returned from CreateSubnet")
    }

    /// Delete a subnet
    pub async fn delete_subnet(&self, subnet_id: &str) -> Result<()> {
        info!(subnet_id = %subnet_id, "Deleting subnet");
        self.client
            .delete_subnet()
            .subnet_id(subnet_id)
            .send()
            .await
            .with_context(|| format!("Failed to delete subnet {}", subnet_id))?;
        Ok(())
    }

    /// Describe VPCs, following pagination
    pub async fn describe_vpcs(&self, request: DescribeRequest) -> Result<Vec<Vpc>> {
        debug!(ids = ?request.ids, filters = request.filters.len(), "Describing VPCs");

        let mut pages = self
            .client
            .describe_vpcs()
            .set_vpc_ids(non_empty(request.ids))
            .set_filters(non_empty(request.filters))
            .into_paginator()
            .send();

        let mut vpcs = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.context("Failed to describe VPCs")?;
            vpcs.extend(page.vpcs().iter().cloned());
        }

        Ok(vpcs)
    }

    /// Create a VPC
    pub async fn create_vpc(&self, cidr_block: &str) -> Result<Vpc> {
        info!(cidr_block = %cidr_block, "Creating VPC");

        let response = self
            .client
            .create_vpc()
            .cidr_block(cidr_block)
            .send()
            .await
            .context("Failed to create VPC")?;

        response.vpc().cloned().context("No VPC returned from CreateVpc")
    }

    /// Delete a VPC
    pub async fn delete_vpc(&self, vpc_id: &str) -> Result<()> {
        info!(vpc_id = %vpc_id, "Deleting VPC");
        self.client
            .delete_vpc()
            .vpc_id(vpc_id)
            .send()
            .await
            .with_context(|| format!("Failed to delete VPC {}", vpc_id))?;
        Ok(())
    }
}
