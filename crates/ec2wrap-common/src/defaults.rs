//! Default configuration values
//!
//! Fallbacks used when a create option or setting is not supplied.

/// Instance type used when `instance-type` is not given
pub const DEFAULT_INSTANCE_TYPE: &str = "m1.xlarge";

/// Key pair name used when `key-name` is not given
pub const DEFAULT_KEY_NAME: &str = "common";

/// CIDR block for new VPCs when `cidr-block` is not given
pub const DEFAULT_VPC_CIDR: &str = "10.0.0.0/16";

/// CIDR block for new subnets when `cidr-block` is not given
pub const DEFAULT_SUBNET_CIDR: &str = "10.0.0.0/24";

/// Seconds to wait after launching an instance before tagging it
pub const DEFAULT_TAG_DELAY_SECS: u64 = 5;

/// Seconds between state checks while waiting for an instance to boot
pub const DEFAULT_BOOT_POLL_SECS: u64 = 5;

/// Maximum number of state checks while waiting for an instance to boot
pub const DEFAULT_BOOT_MAX_ATTEMPTS: u32 = 120;

/// Image name used by `capture()` when none is given
pub const DEFAULT_CAPTURE_NAME: &str = "CAPTURE";

/// CIDR opened or closed by the port helpers
pub const ANY_IPV4_CIDR: &str = "0.0.0.0/0";
