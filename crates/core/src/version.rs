//! Cache generation naming.
//!
//! A store name looks like `<app>-cache-v<N>`. Every store the application
//! ever created shares the `<app>-` prefix, which is how activation finds the
//! stale generations without touching stores that belong to someone else.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies one generation of the offline cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionTag {
    prefix: String,
    name: String,
}

impl VersionTag {
    /// Build the tag for `app_name` at generation `version`.
    pub fn new(app_name: &str, version: u32) -> Self {
        Self { prefix: format!("{app_name}-"), name: format!("{app_name}-cache-v{version}") }
    }

    /// The store name for this generation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The prefix shared by every generation of this application.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether `store_name` was created by this application.
    pub fn owns(&self, store_name: &str) -> bool {
        store_name.starts_with(&self.prefix)
    }

    /// Whether `store_name` is an older (or otherwise different) generation of
    /// this application and may be garbage-collected.
    pub fn supersedes(&self, store_name: &str) -> bool {
        self.owns(store_name) && store_name != self.name
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_format() {
        let tag = VersionTag::new("goblinstadt", 10);
        assert_eq!(tag.name(), "goblinstadt-cache-v10");
        assert_eq!(tag.prefix(), "goblinstadt-");
        assert_eq!(tag.to_string(), "goblinstadt-cache-v10");
    }

    #[test]
    fn test_supersedes_older_generation() {
        let tag = VersionTag::new("hoard", 2);
        assert!(tag.supersedes("hoard-cache-v1"));
        assert!(!tag.supersedes("hoard-cache-v2"));
    }

    #[test]
    fn test_foreign_store_untouched() {
        let tag = VersionTag::new("hoard", 2);
        assert!(!tag.owns("other-app-cache-v1"));
        assert!(!tag.supersedes("other-app-cache-v1"));
        assert!(!tag.supersedes("workbox-precache"));
    }
}
