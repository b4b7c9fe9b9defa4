//! Variant catalog - the prebuilt variants of one TAU installation.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::variant::{Variant, VARIANT_PREFIX};
use crate::util::fs::glob_paths;

/// Snapshot of the variants found in one library directory.
///
/// Each scan produces its own snapshot; nothing is cached between calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantCatalog {
    location: PathBuf,
    variants: Vec<Variant>,
}

impl VariantCatalog {
    /// Scan `lib_dir` for `Makefile.tau*` artifacts.
    ///
    /// A missing directory yields an empty catalog. Entries whose names do not
    /// parse as a variant are skipped.
    pub fn scan(lib_dir: &Path) -> Result<Self> {
        let pattern = format!("{}*", VARIANT_PREFIX);
        let mut variants = Vec::new();

        for path in glob_paths(lib_dir, &pattern)? {
            match Variant::from_path(&path) {
                Some(variant) => variants.push(variant),
                None => tracing::debug!("ignoring {}", path.display()),
            }
        }

        tracing::debug!(
            "found {} variant(s) in {}",
            variants.len(),
            lib_dir.display()
        );

        Ok(VariantCatalog {
            location: lib_dir.to_path_buf(),
            variants,
        })
    }

    /// Build a catalog from already-known variants, sorted by path.
    pub fn from_variants(
        location: impl Into<PathBuf>,
        variants: impl IntoIterator<Item = Variant>,
    ) -> Self {
        let mut variants: Vec<Variant> = variants.into_iter().collect();
        variants.sort_by(|a, b| a.path.cmp(&b.path));
        VariantCatalog {
            location: location.into(),
            variants,
        }
    }

    /// Directory the catalog was scanned from.
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Variants in path order.
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }
}
