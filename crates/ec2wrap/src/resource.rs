//! Generic EC2 resource entity
//!
//! A [`Resource<K>`] pairs an identity (`None` or a provider id) with the
//! last fetched provider snapshot. Everything that differs between EC2
//! families (describe shapes, create/delete calls) lives behind the
//! [`ResourceKind`] strategy `K`, which the resource also owns as a value
//! so kinds can keep per-instance state.
//!
//! # Create protocol
//!
//! 1. `before_create` may veto ([`CreateOutcome::Vetoed`])
//! 2. `K::build_create_request`
//! 3. `refresh()`; `DoesNotExist` here yields [`CreateOutcome::Unconfirmed`]
//! 4. `after_create`
//!
//! Errors from steps 2-4 go to `after_throw` (or the log when no handler
//! was passed) and are then returned. Delete follows the same shape.

use crate::connector::Connector;
use crate::ec2::{DescribeRequest, Ec2Api};
use crate::error::{ResourceError, Result};
use crate::handler::{CreateHandler, DeleteHandler};
use crate::options::CreateOptions;
use async_trait::async_trait;
use aws_sdk_ec2::types::{Filter, Tag};
use ec2wrap_common::tags::tag_filter_key;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Provider-specific behavior of one EC2 resource family.
#[async_trait]
pub trait ResourceKind: Clone + fmt::Debug + Default + Send + Sync + Sized + 'static {
    /// Provider model describing one object of this kind
    type Snapshot: Clone + fmt::Debug + Send + Sync + 'static;

    /// Human-readable kind name used in logs and errors
    const NAME: &'static str;

    /// Canonical id of a snapshot
    fn extract_id(snapshot: &Self::Snapshot) -> Option<String>;

    /// Describe request for a filter query
    fn build_filter_request(filters: Vec<Filter>, _connector: &dyn Connector) -> DescribeRequest {
        DescribeRequest::filtered(filters)
    }

    /// Run a describe call, one snapshot per provider item
    async fn parse_list(
        api: &dyn Ec2Api,
        request: DescribeRequest,
    ) -> anyhow::Result<Vec<Self::Snapshot>>;

    /// Fetch a single object; `DoesNotExist` on zero matches or any describe failure
    async fn parse_one(api: &dyn Ec2Api, id: &str) -> Result<Self::Snapshot>;

    /// Issue the create call and update the resource's id (and maybe snapshot).
    ///
    /// A no-op when the current id is not a valid creation seed for the kind.
    async fn build_create_request(
        resource: &mut Resource<Self>,
        options: &CreateOptions,
        description: &str,
    ) -> Result<()>;

    /// Issue the provider delete call
    async fn build_delete_request(resource: &Resource<Self>) -> Result<()>;
}

/// Result of [`Resource::create`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// Created, refreshed and `after_create` ran
    Completed,
    /// `before_create` returned false; nothing was sent
    Vetoed,
    /// The create call succeeded but the object was not visible on refresh
    Unconfirmed,
}

/// Result of [`Resource::delete`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Completed,
    Vetoed,
}

/// Counts from [`Resource::delete_all`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteReport {
    pub deleted: usize,
    pub vetoed: usize,
    pub failed: usize,
}

/// One EC2 object of kind `K`
pub struct Resource<K: ResourceKind> {
    connector: Arc<dyn Connector>,
    id: Option<String>,
    snapshot: Option<K::Snapshot>,
    kind: K,
}

impl<K: ResourceKind> Resource<K> {
    /// Unbound resource (no id yet)
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            id: None,
            snapshot: None,
            kind: K::default(),
        }
    }

    /// Resource with an id (or creation seed) but no snapshot
    pub fn with_id(connector: Arc<dyn Connector>, id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::new(connector)
        }
    }

    /// Resource built from a provider object already in hand
    pub fn from_snapshot(connector: Arc<dyn Connector>, snapshot: K::Snapshot) -> Self {
        Self {
            id: K::extract_id(&snapshot),
            snapshot: Some(snapshot),
            ..Self::new(connector)
        }
    }

    /// Bind to `id` and refresh; `DoesNotExist` when there is no such object
    pub async fn lookup(connector: &Arc<dyn Connector>, id: &str) -> Result<Self> {
        let mut resource = Self::with_id(connector.clone(), id);
        resource.refresh().await?;
        Ok(resource)
    }

    /// Like [`lookup`](Self::lookup) with not-found folded into `None`
    pub async fn find(connector: &Arc<dyn Connector>, id: &str) -> Result<Option<Self>> {
        match Self::lookup(connector, id).await {
            Ok(resource) => Ok(Some(resource)),
            Err(ResourceError::DoesNotExist { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn exists(connector: &Arc<dyn Connector>, id: &str) -> Result<bool> {
        Ok(Self::find(connector, id).await?.is_some())
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    pub fn is_bound(&self) -> bool {
        self.id.is_some()
    }

    /// Last fetched provider snapshot
    pub fn snapshot(&self) -> Result<&K::Snapshot> {
        self.snapshot
            .as_ref()
            .ok_or_else(|| ResourceError::MissingSnapshot {
                kind: K::NAME,
                id: self.id.clone().unwrap_or_default(),
            })
    }

    pub(crate) fn set_snapshot(&mut self, snapshot: K::Snapshot) {
        self.snapshot = Some(snapshot);
    }

    pub fn kind(&self) -> &K {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut K {
        &mut self.kind
    }

    pub fn connector(&self) -> &Arc<dyn Connector> {
        &self.connector
    }

    pub(crate) fn api(&self) -> &dyn Ec2Api {
        self.connector.api()
    }

    /// Id, or `Unbound` when there is none
    pub(crate) fn bound(&self) -> Result<&str> {
        self.id
            .as_deref()
            .ok_or(ResourceError::Unbound { kind: K::NAME })
    }

    /// Re-fetch the snapshot and re-derive the id from it
    pub async fn refresh(&mut self) -> Result<()> {
        let id = self.bound()?.to_string();
        let snapshot = K::parse_one(self.api(), &id).await?;
        self.id = K::extract_id(&snapshot);
        self.snapshot = Some(snapshot);
        debug!(kind = K::NAME, resource_id = ?self.id, "Refreshed");
        Ok(())
    }

    /// Every object of this kind
    pub async fn get_all(&self) -> Result<Vec<Self>> {
        self.get_filtered_by(Vec::new()).await
    }

    /// Objects whose `key` filter matches any of `values`
    pub async fn get_filtered<I, S>(&self, key: &str, values: I) -> Result<Vec<Self>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let filter = Filter::builder()
            .name(key)
            .set_values(Some(values.into_iter().map(Into::into).collect()))
            .build();
        self.get_filtered_by(vec![filter]).await
    }

    /// Objects matching all `filters` (forwarded verbatim)
    pub async fn get_filtered_by(&self, filters: Vec<Filter>) -> Result<Vec<Self>> {
        let request = K::build_filter_request(filters, self.connector.as_ref());
        debug!(kind = K::NAME, filters = request.filters.len(), "Listing resources");

        let snapshots = K::parse_list(self.api(), request).await?;
        Ok(snapshots
            .into_iter()
            .map(|snapshot| Self::from_snapshot(self.connector.clone(), snapshot))
            .collect())
    }

    /// Objects tagged `name=value`
    pub async fn get_tagged(&self, name: &str, value: &str) -> Result<Vec<Self>> {
        self.get_filtered(&tag_filter_key(name), [value]).await
    }

    /// Every object except those tagged `name=value`, in `get_all` order
    pub async fn get_not_tagged(&self, name: &str, value: &str) -> Result<Vec<Self>> {
        let tagged = self.get_tagged(name, value).await?;
        let mut all = self.get_all().await?;
        all.retain(|resource| !tagged.contains(resource));
        Ok(all)
    }

    /// Ids of every object of this kind
    pub async fn all_ids(&self) -> Result<Vec<String>> {
        Ok(self
            .get_all()
            .await?
            .into_iter()
            .filter_map(|resource| resource.id)
            .collect())
    }

    pub async fn add_tag(&self, name: &str, value: &str) -> Result<()> {
        let id = self.bound()?;
        info!(kind = K::NAME, resource_id = %id, tag = %name, value = %value, "Adding tag");
        self.api()
            .create_tags(vec![id.to_string()], vec![tag(name, value)])
            .await?;
        Ok(())
    }

    pub async fn delete_tag(&self, name: &str, value: &str) -> Result<()> {
        let id = self.bound()?;
        info!(kind = K::NAME, resource_id = %id, tag = %name, "Deleting tag");
        self.api()
            .delete_tags(vec![id.to_string()], vec![tag(name, value)])
            .await?;
        Ok(())
    }

    /// Remove `name=value` from every object of this kind in one call
    pub async fn delete_tag_from_all(&self, name: &str, value: &str) -> Result<()> {
        let ids = self.all_ids().await?;
        if ids.is_empty() {
            debug!(kind = K::NAME, tag = %name, "No resources to untag");
            return Ok(());
        }

        info!(kind = K::NAME, count = ids.len(), tag = %name, "Deleting tag from all");
        self.api().delete_tags(ids, vec![tag(name, value)]).await?;
        Ok(())
    }

    /// Create the provider object (see the module docs for the protocol)
    pub async fn create(
        &mut self,
        options: &CreateOptions,
        description: &str,
        handler: Option<&dyn CreateHandler<K>>,
    ) -> Result<CreateOutcome> {
        if let Some(handler) = handler {
            let emulation = self.connector.settings().emulation;
            if !handler.before_create(self, emulation) {
                info!(kind = K::NAME, description = %description, "Create vetoed by handler");
                return Ok(CreateOutcome::Vetoed);
            }
        }

        match self.run_create(options, description, handler).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                match handler {
                    Some(handler) => handler.after_throw(self, &e),
                    None => error!(
                        kind = K::NAME,
                        resource_id = ?self.id,
                        error = %e,
                        "Create failed"
                    ),
                }
                Err(e)
            }
        }
    }

    async fn run_create(
        &mut self,
        options: &CreateOptions,
        description: &str,
        handler: Option<&dyn CreateHandler<K>>,
    ) -> Result<CreateOutcome> {
        K::build_create_request(self, options, description).await?;

        match self.refresh().await {
            Ok(()) => {}
            Err(ResourceError::DoesNotExist { id }) => {
                warn!(
                    kind = K::NAME,
                    resource_id = %id,
                    "Created resource not visible yet, skipping after_create"
                );
                return Ok(CreateOutcome::Unconfirmed);
            }
            Err(e) => return Err(e),
        }

        if let Some(handler) = handler {
            handler.after_create(self).map_err(ResourceError::Handler)?;
        }

        info!(kind = K::NAME, resource_id = ?self.id, "Created");
        Ok(CreateOutcome::Completed)
    }

    /// Delete the provider object. Local id and snapshot are left as they are.
    pub async fn delete(&self, handler: Option<&dyn DeleteHandler<K>>) -> Result<DeleteOutcome> {
        if let Some(handler) = handler {
            let emulation = self.connector.settings().emulation;
            if !handler.before_delete(self, emulation) {
                info!(kind = K::NAME, resource_id = ?self.id, "Delete vetoed by handler");
                return Ok(DeleteOutcome::Vetoed);
            }
        }

        match self.run_delete(handler).await {
            Ok(()) => {
                info!(kind = K::NAME, resource_id = ?self.id, "Deleted");
                Ok(DeleteOutcome::Completed)
            }
            Err(e) => {
                match handler {
                    Some(handler) => handler.after_throw(self, &e),
                    None => error!(
                        kind = K::NAME,
                        resource_id = ?self.id,
                        error = %e,
                        "Delete failed"
                    ),
                }
                Err(e)
            }
        }
    }

    async fn run_delete(&self, handler: Option<&dyn DeleteHandler<K>>) -> Result<()> {
        K::build_delete_request(self).await?;
        if let Some(handler) = handler {
            handler.after_delete(self).map_err(ResourceError::Handler)?;
        }
        Ok(())
    }

    /// Delete each resource in order, stopping at the first error
    pub async fn delete_each(resources: &[Self]) -> Result<()> {
        for resource in resources {
            resource.delete(None).await?;
        }
        Ok(())
    }

    /// Delete every resource with `handler`, logging and counting failures
    pub async fn delete_all(resources: &[Self], handler: &dyn DeleteHandler<K>) -> DeleteReport {
        let mut report = DeleteReport::default();

        for resource in resources {
            match resource.delete(Some(handler)).await {
                Ok(DeleteOutcome::Completed) => report.deleted += 1,
                Ok(DeleteOutcome::Vetoed) => report.vetoed += 1,
                Err(e) => {
                    warn!(
                        kind = K::NAME,
                        resource_id = ?resource.id,
                        error = %e,
                        "Delete failed, continuing with the rest"
                    );
                    report.failed += 1;
                }
            }
        }

        info!(
            kind = K::NAME,
            deleted = report.deleted,
            vetoed = report.vetoed,
            failed = report.failed,
            "Batch delete finished"
        );
        report
    }
}

pub(crate) fn tag(name: &str, value: &str) -> Tag {
    Tag::builder().key(name).value(value).build()
}

impl<K: ResourceKind> Clone for Resource<K> {
    fn clone(&self) -> Self {
        Self {
            connector: self.connector.clone(),
            id: self.id.clone(),
            snapshot: self.snapshot.clone(),
            kind: self.kind.clone(),
        }
    }
}

/// Equal only when both ids are bound and identical
impl<K: ResourceKind> PartialEq for Resource<K> {
    fn eq(&self, other: &Self) -> bool {
        match (&self.id, &other.id) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl<K: ResourceKind> Hash for Resource<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.id {
            Some(id) => id.hash(state),
            None => 0u64.hash(state),
        }
    }
}

impl<K: ResourceKind> fmt::Display for Resource<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", K::NAME, self.id.as_deref().unwrap_or("<unbound>"))
    }
}

impl<K: ResourceKind> fmt::Debug for Resource<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("kind", &K::NAME)
            .field("id", &self.id)
            .field("snapshot", &self.snapshot)
            .field("state", &self.kind)
            .finish_non_exhaustive()
    }
}
