//! Create options: an ordered string key/value map

use std::collections::BTreeMap;

/// Key/value options read by `create()`.
///
/// Each kind reads the keys in [`ec2wrap_common::options`] that apply to it
/// and ignores the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateOptions(BTreeMap<String, String>);

impl CreateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an option (builder style)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Trimmed value of `key`, treating blank values as absent
    pub fn non_blank(&self, key: &str) -> Option<String> {
        self.get(key)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    /// First non-blank value among `keys`, in the order given
    pub fn first_non_blank(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.non_blank(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CreateOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
