//! ec2wrap - Typed lifecycle wrappers for EC2 resources
//!
//! Every EC2 family (instances, volumes, snapshots, elastic IPs, security
//! groups, subnets, VPCs and images) is exposed as a [`Resource<K>`] with a
//! shared lifecycle: look up, refresh, list with filters, tag, create and
//! delete with optional [`CreateHandler`] / [`DeleteHandler`] hooks.
//!
//! ## Modules
//!
//! - [`connector`]: EC2 API handle, caller account and [`Settings`]
//! - [`ec2`]: The [`Ec2Api`](ec2::Ec2Api) trait and its AWS SDK client
//! - [`resource`]: The generic entity and the [`ResourceKind`] strategy
//! - [`kinds`]: One kind per EC2 family plus its domain helpers
//! - [`handler`]: Lifecycle hooks
//! - [`wait`]: Bounded fixed-interval polling
//! - [`error`]: [`ResourceError`] and AWS error classification
//!
//! ## Example
//!
//! ```no_run
//! use ec2wrap::{AwsContext, CreateOptions, Ec2Connector, Ec2Instance, Settings};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let ctx = AwsContext::new("us-east-2").await;
//! let connector = Ec2Connector::from_context(&ctx, Settings::from_env()?)
//!     .await?
//!     .shared();
//!
//! let mut instance = Ec2Instance::with_id(connector, "ami-0123456789abcdef0");
//! instance.create(&CreateOptions::new(), "worker", None).await?;
//! println!("{} at {:?}", instance, instance.host());
//! # Ok(())
//! # }
//! ```

pub mod account;
pub mod connector;
pub mod context;
pub mod ec2;
pub mod error;
pub mod handler;
pub mod kinds;
pub mod options;
pub mod resource;
pub mod wait;

// Re-export commonly used items
pub use account::AccountId;
pub use connector::{Connector, Ec2Connector};
pub use context::AwsContext;
pub use error::{ResourceError, Result};
pub use handler::{CreateHandler, DeleteHandler, SkipWhenEmulating};
pub use kinds::{
    Ec2ElasticIp, Ec2Image, Ec2Instance, Ec2SecurityGroup, Ec2Snapshot, Ec2Subnet, Ec2Volume,
    Ec2Vpc,
};
pub use options::CreateOptions;
pub use resource::{CreateOutcome, DeleteOutcome, DeleteReport, Resource, ResourceKind};
pub use wait::WaitConfig;

pub use ec2wrap_common::Settings;
