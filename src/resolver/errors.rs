//! Resolution error types and diagnostics.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::tag::TagSet;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error during variant resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("TAU Makefile not found for tags '{desired}' in '{}'", location.display())]
    NoMatchingVariant {
        desired: TagSet,
        incompatible: TagSet,
        location: PathBuf,
        /// Every variant in the catalog, by tag set
        available: Vec<TagSet>,
    },
}

impl ResolveError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::NoMatchingVariant {
                desired,
                incompatible,
                location,
                available,
            } => {
                let mut diag = Diagnostic::error(format!(
                    "no TAU variant provides tags `{}`",
                    desired
                ))
                .with_location(location);

                if !incompatible.is_empty() {
                    diag = diag.with_context(format!("excluded tags: {}", incompatible));
                }

                if available.is_empty() {
                    diag = diag.with_context("the catalog has no variants");
                } else {
                    let listed: Vec<String> = available
                        .iter()
                        .map(|tags| format!("{{{}}}", tags))
                        .collect();
                    diag = diag.with_context(format!("available variants: {}", listed.join(" ")));
                }

                diag.with_suggestion(suggestions::NO_VARIANT)
            }
        }
    }
}
