//! Request types shared by the EC2 API trait and its implementations

use aws_sdk_ec2::types::{BlockDeviceMapping, DomainType, Filter};

/// Shape of every describe call: filters, explicit ids and owner pinning.
///
/// For addresses `ids` are public IPs; for the other kinds they are the
/// provider object ids. `owner_ids` only applies to snapshots and images.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DescribeRequest {
    pub filters: Vec<Filter>,
    pub ids: Vec<String>,
    pub owner_ids: Vec<String>,
}

impl DescribeRequest {
    /// Request matching every object of the kind
    pub fn all() -> Self {
        Self::default()
    }

    /// Request carrying the given filters
    pub fn filtered(filters: Vec<Filter>) -> Self {
        Self {
            filters,
            ..Self::default()
        }
    }

    /// Request for a single object by id
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            ids: vec![id.into()],
            ..Self::default()
        }
    }

    /// Restrict results to objects owned by `owner`
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner_ids.push(owner.into());
        self
    }
}

/// Parameters for launching exactly one instance
#[derive(Debug, Clone, PartialEq)]
pub struct RunInstancesParams {
    pub image_id: String,
    pub instance_type: String,
    pub key_name: Option<String>,
    pub security_group_id: Option<String>,
    pub subnet_id: Option<String>,
    pub private_ip: Option<String>,
    /// Already base64-encoded
    pub user_data: Option<String>,
    pub block_devices: Vec<BlockDeviceMapping>,
}

impl RunInstancesParams {
    /// Create launch parameters with required fields
    pub fn new(image_id: impl Into<String>, instance_type: impl Into<String>) -> Self {
        Self {
            image_id: image_id.into(),
            instance_type: instance_type.into(),
            key_name: None,
            security_group_id: None,
            subnet_id: None,
            private_ip: None,
            user_data: None,
            block_devices: Vec::new(),
        }
    }

    pub fn with_key_name(mut self, key_name: impl Into<String>) -> Self {
        self.key_name = Some(key_name.into());
        self
    }

    pub fn with_security_group(mut self, group_id: Option<String>) -> Self {
        self.security_group_id = group_id;
        self
    }

    pub fn with_subnet(mut self, subnet_id: Option<String>) -> Self {
        self.subnet_id = subnet_id;
        self
    }

    pub fn with_private_ip(mut self, private_ip: Option<String>) -> Self {
        self.private_ip = private_ip;
        self
    }

    pub fn with_user_data(mut self, user_data_b64: Option<String>) -> Self {
        self.user_data = user_data_b64;
        self
    }

    pub fn with_block_devices(mut self, mappings: Vec<BlockDeviceMapping>) -> Self {
        self.block_devices = mappings;
        self
    }
}

/// Parameters for creating a volume from a snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct CreateVolumeParams {
    pub snapshot_id: String,
    pub availability_zone: String,
    pub size_gib: Option<i32>,
    pub volume_type: Option<String>,
}

/// How an elastic IP is addressed in release / associate / disassociate calls.
///
/// VPC addresses are addressed by allocation or association id, standard
/// (EC2-Classic) addresses by their public IP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressRef {
    AllocationId(String),
    AssociationId(String),
    PublicIp(String),
}

impl AddressRef {
    /// Reference used to release or associate an address in `domain`
    pub fn for_allocation(domain: Option<&DomainType>, allocation_id: Option<&str>, public_ip: &str) -> Self {
        match (domain, allocation_id) {
            (Some(DomainType::Vpc), Some(allocation)) => AddressRef::AllocationId(allocation.to_string()),
            _ => AddressRef::PublicIp(public_ip.to_string()),
        }
    }
}
