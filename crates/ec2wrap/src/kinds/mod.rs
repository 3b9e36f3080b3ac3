//! Concrete EC2 resource kinds
//!
//! Each module defines a [`ResourceKind`](crate::resource::ResourceKind)
//! strategy, the `Ec2*` alias for its `Resource<K>` and the kind's domain
//! helpers.

mod elastic_ip;
mod image;
mod instance;
mod security_group;
mod snapshot;
mod subnet;
mod volume;
mod vpc;

pub use elastic_ip::{Ec2ElasticIp, ElasticIpKind};
pub use image::{Ec2Image, ImageKind};
pub use instance::{Ec2Instance, InstanceKind};
pub use security_group::{Ec2SecurityGroup, SecurityGroupKind};
pub use snapshot::{Ec2Snapshot, SnapshotKind};
pub use subnet::{Ec2Subnet, SubnetKind};
pub use volume::{Ec2Volume, VolumeKind};
pub use vpc::{Ec2Vpc, VpcKind};

use crate::error::{ResourceError, Result};
use aws_sdk_ec2::types::Tag;
use ec2wrap_common::tags::NAME_TAG;

/// First item of a single-id describe, or `DoesNotExist`
pub(crate) fn first_or_missing<T>(id: &str, described: anyhow::Result<Vec<T>>) -> Result<T> {
    described
        .map_err(|e| ResourceError::from_lookup(id, e))?
        .into_iter()
        .next()
        .ok_or_else(|| ResourceError::DoesNotExist { id: id.to_string() })
}

/// The only item, or `None` for zero or several matches
pub(crate) fn only<T>(items: Vec<T>) -> Option<T> {
    let mut items = items.into_iter();
    match (items.next(), items.next()) {
        (Some(item), None) => Some(item),
        _ => None,
    }
}

/// Value of the `Name` tag
pub(crate) fn name_tag(tags: &[Tag]) -> Option<&str> {
    tags.iter()
        .find(|tag| tag.key() == Some(NAME_TAG))
        .and_then(|tag| tag.value())
}
