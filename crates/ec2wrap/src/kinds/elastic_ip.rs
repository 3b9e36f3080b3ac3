//! Elastic IP addresses
//!
//! The resource id of an elastic IP is its public address. VPC addresses
//! are released and associated by allocation id, standard ones by IP.

use super::{Ec2Instance, first_or_missing};
use crate::connector::Connector;
use crate::ec2::{AddressRef, DescribeRequest, Ec2Api};
use crate::error::{ResourceError, Result};
use crate::options::CreateOptions;
use crate::resource::{Resource, ResourceKind};
use async_trait::async_trait;
use aws_sdk_ec2::types::{Address, DomainType};
use ec2wrap_common::options::ALLOCATE_IN_VPC;
use std::sync::Arc;
use tracing::{error, info};

/// An elastic IP
pub type Ec2ElasticIp = Resource<ElasticIpKind>;

/// Elastic IP kind state: allocation id returned by the allocate call
#[derive(Debug, Clone, Default)]
pub struct ElasticIpKind {
    allocation_id: Option<String>,
}

#[async_trait]
impl ResourceKind for ElasticIpKind {
    type Snapshot = Address;

    const NAME: &'static str = "elastic IP";

    fn extract_id(snapshot: &Address) -> Option<String> {
        snapshot.public_ip().map(str::to_string)
    }

    async fn parse_list(api: &dyn Ec2Api, request: DescribeRequest) -> anyhow::Result<Vec<Address>> {
        api.describe_addresses(request).await
    }

    async fn parse_one(api: &dyn Ec2Api, id: &str) -> Result<Address> {
        first_or_missing(id, api.describe_addresses(DescribeRequest::by_id(id)).await)
    }

    async fn build_create_request(
        resource: &mut Ec2ElasticIp,
        options: &CreateOptions,
        _description: &str,
    ) -> Result<()> {
        let domain = if options.contains(ALLOCATE_IN_VPC) {
            DomainType::Vpc
        } else {
            DomainType::Standard
        };

        let address = resource.api().allocate_address(domain).await?;
        let public_ip = Self::extract_id(&address)
            .ok_or_else(|| anyhow::anyhow!("Allocated address has no public IP"))?;

        resource.kind_mut().allocation_id = address.allocation_id().map(str::to_string);
        resource.set_id(public_ip);
        resource.set_snapshot(address);
        Ok(())
    }

    async fn build_delete_request(resource: &Ec2ElasticIp) -> Result<()> {
        let public_ip = resource.bound()?;
        if resource.is_associated()? {
            return Err(ResourceError::illegal_state(
                Self::NAME,
                Some(public_ip),
                "address is associated with an instance",
            ));
        }

        resource.api().release_address(resource.address_ref()?).await?;
        Ok(())
    }
}

impl Resource<ElasticIpKind> {
    /// Every VPC-domain address
    pub async fn all_vpc(connector: &Arc<dyn Connector>) -> Result<Vec<Self>> {
        Self::in_domain(connector, DomainType::Vpc).await
    }

    /// Every standard-domain address
    pub async fn all_standard(connector: &Arc<dyn Connector>) -> Result<Vec<Self>> {
        Self::in_domain(connector, DomainType::Standard).await
    }

    /// VPC addresses not associated with any instance
    pub async fn unassociated_vpc(connector: &Arc<dyn Connector>) -> Result<Vec<Self>> {
        Ok(Self::unassociated(Self::all_vpc(connector).await?))
    }

    /// Standard addresses not associated with any instance
    pub async fn unassociated_standard(connector: &Arc<dyn Connector>) -> Result<Vec<Self>> {
        Ok(Self::unassociated(Self::all_standard(connector).await?))
    }

    /// Addresses associated with `instance_id`
    pub async fn for_instance(connector: &Arc<dyn Connector>, instance_id: &str) -> Result<Vec<Self>> {
        Self::new(connector.clone())
            .get_filtered("instance-id", [instance_id])
            .await
    }

    async fn in_domain(connector: &Arc<dyn Connector>, domain: DomainType) -> Result<Vec<Self>> {
        Self::new(connector.clone())
            .get_filtered("domain", [domain.as_str()])
            .await
    }

    fn unassociated(addresses: Vec<Self>) -> Vec<Self> {
        addresses
            .into_iter()
            .filter(|address| matches!(address.is_associated(), Ok(false)))
            .collect()
    }

    /// Public IP (the resource id)
    pub fn ip(&self) -> Option<&str> {
        self.id()
    }

    /// Allocation id, from the last snapshot or the allocate call
    pub fn allocation_id(&self) -> Option<&str> {
        self.snapshot()
            .ok()
            .and_then(|address| address.allocation_id())
            .or(self.kind().allocation_id.as_deref())
    }

    pub fn is_associated(&self) -> Result<bool> {
        Ok(self
            .snapshot()?
            .instance_id()
            .is_some_and(|instance| !instance.is_empty()))
    }

    fn is_vpc(&self) -> Result<bool> {
        Ok(self.snapshot()?.domain() == Some(&DomainType::Vpc))
    }

    fn address_ref(&self) -> Result<AddressRef> {
        let domain = self.snapshot()?.domain();
        Ok(AddressRef::for_allocation(
            domain,
            self.allocation_id(),
            self.bound()?,
        ))
    }

    /// Associate this address with `instance`
    pub async fn associate(&self, instance: &Ec2Instance) -> Result<()> {
        let instance_id = instance.bound()?;
        info!(public_ip = ?self.id(), instance_id = %instance_id, "Associating elastic IP");
        self.api()
            .associate_address(self.address_ref()?, instance_id)
            .await?;
        Ok(())
    }

    /// Detach this address from whatever instance holds it
    pub async fn disassociate(&self) -> Result<()> {
        let association = if self.is_vpc()? {
            let association_id = self.snapshot()?.association_id().ok_or_else(|| {
                ResourceError::illegal_state(
                    ElasticIpKind::NAME,
                    self.id(),
                    "VPC address has no association id",
                )
            })?;
            AddressRef::AssociationId(association_id.to_string())
        } else {
            AddressRef::PublicIp(self.bound()?.to_string())
        };

        self.api().disassociate_address(association).await?;
        Ok(())
    }

    /// Move this address onto `instance`, detaching it first if needed.
    ///
    /// The instance is refreshed afterwards so its public DNS reflects the
    /// new address; a failed refresh is logged, not returned.
    pub async fn force_associate(&self, instance: &mut Ec2Instance) -> Result<()> {
        if self.is_associated()? {
            self.disassociate().await?;
        }
        self.associate(instance).await?;

        if let Err(e) = instance.refresh().await {
            error!(
                instance_id = ?instance.id(),
                error = %e,
                "Unable to refresh instance after attaching elastic IP"
            );
        }
        Ok(())
    }
}
