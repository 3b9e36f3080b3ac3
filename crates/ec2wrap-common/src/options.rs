//! Keys recognized by `create()`
//!
//! Create options are an open key/value map. Each resource kind reads only
//! the keys listed here for it; anything else is ignored.

/// Instance: EC2 instance type (e.g. "m1.large")
pub const INSTANCE_TYPE: &str = "instance-type";

/// Instance: security group id to launch into
pub const SECURITY_GROUP: &str = "sec-group";

/// Instance: key pair name
pub const KEY_NAME: &str = "key-name";

/// Instance: subnet id to launch into
pub const SUBNET_ID: &str = "sub-net-id";

/// Instance: block devices as `device=snapshot-id[,device=snapshot-id...]`
pub const BLOCK_DEVICE_MAPPING: &str = "block-device-mapping";

/// Instance: fixed private IPv4 address
pub const PRIVATE_IP: &str = "private-ip";

/// Instance: plain-text user data (base64-encoded before sending)
pub const USER_DATA: &str = "user-data";

/// Elastic IP: allocate in the VPC domain when present (value ignored)
pub const ALLOCATE_IN_VPC: &str = "vpc";

/// Security group: VPC to create the group in (subnets accept it too)
pub const GROUP_VPC_ID: &str = "vpc_id";

/// Security group / image: free-text description
pub const DESCRIPTION: &str = "description";

/// Subnet: owning VPC id (security groups accept it too)
pub const VPC_ID: &str = "vpc-id";

/// Subnet / VPC: IPv4 CIDR block
pub const CIDR_BLOCK: &str = "cidr-block";

/// Volume: availability zone for the new volume
pub const AVAILABILITY_ZONE: &str = "availability-zone";

/// Volume: size in GiB
pub const VOLUME_SIZE: &str = "size";

/// Volume: EBS volume type (e.g. "gp3")
pub const VOLUME_TYPE: &str = "volume-type";

/// Parse a `device=snapshot-id` list into pairs, skipping malformed entries.
pub fn parse_block_device_mapping(value: &str) -> Vec<(String, String)> {
    value
        .split(',')
        .filter_map(|entry| {
            let (device, snapshot) = entry.split_once('=')?;
            let (device, snapshot) = (device.trim(), snapshot.trim());
            if device.is_empty() || snapshot.is_empty() {
                return None;
            }
            Some((device.to_string(), snapshot.to_string()))
        })
        .collect()
}
