//! Lifecycle hooks around create and delete
//!
//! Handlers are passed per call. `before_*` may veto the operation,
//! `after_*` runs once the provider call succeeded and `after_throw` sees
//! every error before it is returned to the caller.

use crate::error::ResourceError;
use crate::resource::{Resource, ResourceKind};

/// Hooks invoked by [`Resource::create`]
pub trait CreateHandler<K: ResourceKind>: Send + Sync {
    /// Return `false` to skip the create without error
    fn before_create(&self, _resource: &Resource<K>, _emulation: bool) -> bool {
        true
    }

    fn after_create(&self, _resource: &Resource<K>) -> anyhow::Result<()> {
        Ok(())
    }

    fn after_throw(&self, _resource: &Resource<K>, _error: &ResourceError) {}
}

/// Hooks invoked by [`Resource::delete`] and [`Resource::delete_all`]
pub trait DeleteHandler<K: ResourceKind>: Send + Sync {
    /// Return `false` to skip the delete without error
    fn before_delete(&self, _resource: &Resource<K>, _emulation: bool) -> bool {
        true
    }

    fn after_delete(&self, _resource: &Resource<K>) -> anyhow::Result<()> {
        Ok(())
    }

    fn after_throw(&self, _resource: &Resource<K>, _error: &ResourceError) {}
}

/// Handler that refuses every operation while emulating
///
/// Lets callers rehearse a run against real credentials: with
/// `Settings::emulation` set nothing is created or deleted.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipWhenEmulating;

impl<K: ResourceKind> CreateHandler<K> for SkipWhenEmulating {
    fn before_create(&self, _resource: &Resource<K>, emulation: bool) -> bool {
        !emulation
    }
}

impl<K: ResourceKind> DeleteHandler<K> for SkipWhenEmulating {
    fn before_delete(&self, _resource: &Resource<K>, emulation: bool) -> bool {
        !emulation
    }
}
