//! Tag keys and filter helpers

/// Tag key EC2 consoles display as the resource name
pub const NAME_TAG: &str = "Name";

/// Prefix EC2 uses for tag filters (`tag:<key>`)
pub const TAG_FILTER_PREFIX: &str = "tag:";

/// Build the describe-filter name matching a tag key.
pub fn tag_filter_key(name: &str) -> String {
    format!("{}{}", TAG_FILTER_PREFIX, name)
}
