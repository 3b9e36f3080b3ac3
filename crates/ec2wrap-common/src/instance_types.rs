//! Legacy EC2 instance size catalog
//!
//! Short CPU/memory descriptions for the first-generation instance types.
//! Used for display only; the provider remains the source of truth for
//! what an instance actually runs on.

/// Known instance types and their descriptions.
pub const INSTANCE_TYPES: &[(&str, &str)] = &[
    ("t1.micro", "2 EC2 CPU and 613 MB Memory"),
    ("m1.small", "1 EC2 CPU and 1.7 GB Memory"),
    ("m1.large", "4 EC2 CPU and 7.5 GB Memory"),
    ("m1.xlarge", "8 EC2 CPU and 15 GB Memory"),
    ("m2.xlarge", "6.5 EC2 CPU and 17.1 GB Memory"),
    ("m2.2xlarge", "13 EC2 CPU and 34.2 GB Memory"),
    ("m2.4xlarge", "26 EC2 CPU and 68.4 GB Memory"),
    ("c1.medium", "5 EC2 CPU and 1.7 GB Memory"),
    ("c1.xlarge", "20 EC2 CPU and 7 GB Memory"),
    ("cc1.4xlarge", "33.5 EC2 CPU and 23 GB Memory"),
    ("cg1.4xlarge", "33.5 EC2 CPU and 22 GB Memory"),
];

/// Describe an instance type, ignoring ASCII case.
///
/// Returns `None` for types outside the catalog.
pub fn describe_instance_type(instance_type: &str) -> Option<&'static str> {
    INSTANCE_TYPES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(instance_type))
        .map(|(_, description)| *description)
}
