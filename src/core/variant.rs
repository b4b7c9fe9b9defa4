//! Prebuilt TAU variants.
//!
//! Each TAU build configuration installs a `Makefile.tau-<tag>-<tag>...`
//! into the arch `lib` directory. The tags after the leading `tau` segment
//! name the features that build supports, in no particular order.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::tag::TagSet;

/// Filename prefix shared by every variant artifact.
pub const VARIANT_PREFIX: &str = "Makefile.tau";

/// One prebuilt TAU build, addressed by its tag set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variant {
    /// Features this build supports
    pub tags: TagSet,
    /// Path to the variant's makefile (or directory)
    pub path: PathBuf,
}

impl Variant {
    /// Parse a variant from an artifact path.
    ///
    /// Returns `None` when the file name does not follow the
    /// `Makefile.tau[-tag...]` pattern.
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let tags = parse_tags(&path)?;
        Some(Variant { tags, path })
    }

    /// The artifact file name.
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}

/// Extract the tag set encoded in a variant artifact name.
pub fn parse_tags(path: &Path) -> Option<TagSet> {
    let name = path.file_name()?.to_str()?;
    let rest = name.strip_prefix(VARIANT_PREFIX)?;

    if rest.is_empty() {
        return Some(TagSet::new());
    }

    // `Makefile.tau-mpi-pdt`: everything after the first dash is a tag
    let rest = rest.strip_prefix('-')?;
    Some(rest.split('-').filter(|t| !t.is_empty()).collect())
}
