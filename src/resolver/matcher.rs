//! Variant selection.
//!
//! Selection runs in two phases. A variant whose tags equal the desired set
//! wins outright. Failing that, the superset that carries no incompatible tag
//! and the fewest extra tags is chosen; ties go to the lexicographically
//! smallest sorted list of extra tags, so the result never depends on scan
//! order.

use std::fmt;

use crate::core::tag::TagSet;
use crate::core::variant::Variant;
use crate::resolver::errors::ResolveError;
use crate::sources::VariantCatalog;
use crate::util::diagnostic::{Diagnostic, DiagnosticSink};

/// How a variant satisfied the desired tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    /// Superset match carrying `extra` tags beyond the desired set
    Approximate { extra: TagSet },
}

/// The outcome of a successful selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub variant: Variant,
    pub kind: MatchKind,
}

impl Selection {
    /// Whether the selected variant's tags equal the desired tags.
    pub fn is_exact(&self) -> bool {
        self.kind == MatchKind::Exact
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            MatchKind::Exact => write!(f, "{} (exact)", self.variant.path.display()),
            MatchKind::Approximate { extra } => write!(
                f,
                "{} (approximate, extra tags: {})",
                self.variant.path.display(),
                extra
            ),
        }
    }
}

/// Select exactly one variant from `catalog`.
///
/// An approximate match is reported to `sink` as a warning.
pub fn select(
    desired: &TagSet,
    incompatible: &TagSet,
    catalog: &VariantCatalog,
    sink: &dyn DiagnosticSink,
) -> Result<Selection, ResolveError> {
    let supersets = || {
        catalog
            .variants()
            .iter()
            .filter(|v| v.tags.is_superset(desired))
    };

    if let Some(variant) = supersets().find(|v| v.tags == *desired) {
        tracing::debug!("exact variant match: {}", variant.path.display());
        return Ok(Selection {
            variant: variant.clone(),
            kind: MatchKind::Exact,
        });
    }

    let mut best: Option<(&Variant, TagSet)> = None;
    for variant in supersets() {
        if !variant.tags.is_disjoint(incompatible) {
            tracing::debug!(
                "skipping {}: carries incompatible tags {}",
                variant.file_name(),
                variant.tags.intersection(incompatible)
            );
            continue;
        }

        let extra = variant.tags.difference(desired);
        let better = match &best {
            None => true,
            Some((_, best_extra)) => {
                (extra.len(), extra.to_vec()) < (best_extra.len(), best_extra.to_vec())
            }
        };
        if better {
            best = Some((variant, extra));
        }
    }

    match best {
        Some((variant, extra)) => {
            sink.emit(
                Diagnostic::warning(format!(
                    "no TAU variant exactly matches tags `{}`",
                    desired
                ))
                .with_context(format!(
                    "using {} with extra tags: {}",
                    variant.file_name(),
                    extra
                )),
            );
            Ok(Selection {
                variant: variant.clone(),
                kind: MatchKind::Approximate { extra },
            })
        }
        None => Err(ResolveError::NoMatchingVariant {
            desired: desired.clone(),
            incompatible: incompatible.clone(),
            location: catalog.location().to_path_buf(),
            available: catalog.variants().iter().map(|v| v.tags.clone()).collect(),
        }),
    }
}
