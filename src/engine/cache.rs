//! Cache metadata contributed by resolvers and aggregated over a whole query execution.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How long a resolved value may be cached. `Seconds(0)` marks a value as uncacheable.
///
/// Any number of seconds orders below `Permanent`, so the minimum of two max-ages is the
/// shorter lifetime.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MaxAge {
    Seconds(u32),
    Permanent,
}

impl Default for MaxAge {
    fn default() -> Self {
        MaxAge::Permanent
    }
}

impl From<Option<u32>> for MaxAge {
    fn from(seconds: Option<u32>) -> Self {
        seconds.map_or(MaxAge::Permanent, MaxAge::Seconds)
    }
}

/// Describes when a resolved value becomes stale: the tags whose invalidation invalidates the
/// value, the maximum age of the value, and the contexts (such as `user` or `languages`) the
/// value varies by.
///
/// Merging two sets of metadata unions tags and contexts and keeps the smaller max-age.
///
/// # Examples
///
/// ```rust
/// use warpresolver::engine::cache::{CacheMetadata, MaxAge};
///
/// let a = CacheMetadata::new().with_tags(vec!["node:1"]).with_max_age(MaxAge::Seconds(60));
/// let b = CacheMetadata::new().with_tags(vec!["node:2"]).with_max_age(MaxAge::Seconds(30));
///
/// let merged = a.merged(&b);
/// assert!(merged.tags().contains("node:1"));
/// assert!(merged.tags().contains("node:2"));
/// assert_eq!(merged.max_age(), MaxAge::Seconds(30));
/// ```
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheMetadata {
    tags: BTreeSet<String>,
    contexts: BTreeSet<String>,
    max_age: MaxAge,
}

impl CacheMetadata {
    /// Creates empty, permanently cacheable metadata
    pub fn new() -> CacheMetadata {
        CacheMetadata::default()
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_contexts<I, T>(mut self, contexts: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.contexts.extend(contexts.into_iter().map(Into::into));
        self
    }

    /// Lowers the max-age to `max_age`. A longer max-age than the current one has no effect.
    pub fn with_max_age(mut self, max_age: MaxAge) -> Self {
        self.merge_max_age(max_age);
        self
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) {
        self.tags.insert(tag.into());
    }

    pub fn add_context(&mut self, context: impl Into<String>) {
        self.contexts.insert(context.into());
    }

    pub fn merge_max_age(&mut self, max_age: MaxAge) {
        self.max_age = self.max_age.min(max_age);
    }

    /// Folds `other` into this metadata
    pub fn merge(&mut self, other: &CacheMetadata) {
        self.tags.extend(other.tags.iter().cloned());
        self.contexts.extend(other.contexts.iter().cloned());
        self.merge_max_age(other.max_age);
    }

    pub fn merged(mut self, other: &CacheMetadata) -> Self {
        self.merge(other);
        self
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn contexts(&self) -> &BTreeSet<String> {
        &self.contexts
    }

    pub fn max_age(&self) -> MaxAge {
        self.max_age
    }

    pub fn is_cacheable(&self) -> bool {
        self.max_age != MaxAge::Seconds(0)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.contexts.is_empty() && self.max_age == MaxAge::Permanent
    }
}
