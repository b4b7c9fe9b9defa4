//! Variant tags.
//!
//! A tag names one capability a TAU build was configured with (`mpi`, `papi`,
//! `openmp`, ...). Tag sets are compared by membership only, so they are kept
//! in a `BTreeSet` and always render in sorted order.

use std::collections::btree_set;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Well-known tag names.
pub mod names {
    pub const MPI: &str = "mpi";
    pub const PAPI: &str = "papi";
    pub const PDT: &str = "pdt";
    pub const OPENMP: &str = "openmp";
    pub const OMPT: &str = "ompt";
    pub const OPARI: &str = "opari";
    pub const PTHREAD: &str = "pthread";
    pub const CUPTI: &str = "cupti";
    pub const SHMEM: &str = "shmem";
    pub const MPC: &str = "mpc";
    pub const INTEL: &str = "intel";
    pub const ICPC: &str = "icpc";
    pub const PGI: &str = "pgi";
    pub const SERIAL: &str = "serial";
}

/// A single variant tag.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(String);

impl Tag {
    /// Create a tag from its name.
    pub fn new(name: impl Into<String>) -> Self {
        Tag(name.into())
    }

    /// Get the tag name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Tag {
    fn from(s: &str) -> Self {
        Tag::new(s)
    }
}

impl From<String> for Tag {
    fn from(s: String) -> Self {
        Tag(s)
    }
}

/// An unordered set of tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(BTreeSet<Tag>);

impl TagSet {
    /// Create an empty tag set.
    pub fn new() -> Self {
        TagSet(BTreeSet::new())
    }

    /// Add a tag. Returns `false` if it was already present.
    pub fn insert(&mut self, tag: impl Into<Tag>) -> bool {
        self.0.insert(tag.into())
    }

    /// Check whether a tag is present.
    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t.as_str() == tag)
    }

    /// Number of tags in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set has no tags.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate tags in sorted order.
    pub fn iter(&self) -> btree_set::Iter<'_, Tag> {
        self.0.iter()
    }

    /// Whether every tag of `other` is in `self`.
    pub fn is_superset(&self, other: &TagSet) -> bool {
        self.0.is_superset(&other.0)
    }

    /// Whether the two sets share no tag.
    pub fn is_disjoint(&self, other: &TagSet) -> bool {
        self.0.is_disjoint(&other.0)
    }

    /// Tags in `self` but not in `other`.
    pub fn difference(&self, other: &TagSet) -> TagSet {
        TagSet(self.0.difference(&other.0).cloned().collect())
    }

    /// Tags present in both sets.
    pub fn intersection(&self, other: &TagSet) -> TagSet {
        TagSet(self.0.intersection(&other.0).cloned().collect())
    }

    /// Tag names in sorted order.
    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().map(|t| t.0.clone()).collect()
    }

    /// Join the tag names with `sep`, in sorted order.
    pub fn join(&self, sep: &str) -> String {
        self.to_vec().join(sep)
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join(","))
    }
}

impl<T: Into<Tag>> FromIterator<T> for TagSet {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        TagSet(iter.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Tag>> Extend<T> for TagSet {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a Tag;
    type IntoIter = btree_set::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
