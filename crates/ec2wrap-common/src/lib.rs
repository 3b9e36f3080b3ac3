//! ec2wrap-common - Shared types and constants
//!
//! This crate holds the pieces of ec2wrap that do not need the AWS SDK:
//! default values, create-option keys, tag helpers, the legacy instance
//! type catalog and the adapter [`Settings`].
//!
//! ## Modules
//!
//! - [`defaults`]: Default configuration values
//! - [`instance_types`]: Human-readable descriptions of legacy instance sizes
//! - [`options`]: Keys recognized by `create()` for each resource kind
//! - [`settings`]: Adapter settings (emulation flag, naming, delays)
//! - [`tags`]: Tag keys and filter helpers

pub mod defaults;
pub mod instance_types;
pub mod options;
pub mod settings;
pub mod tags;

pub use instance_types::describe_instance_type;
pub use settings::{Settings, SettingsError};
