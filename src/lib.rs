//! taucmdr - TAU variant resolution and environment synthesis
//!
//! This crate maps a declarative feature configuration onto a prebuilt TAU
//! installation: it derives the tags the configuration requires, selects the
//! matching variant makefile, and synthesizes the compile-time and run-time
//! environments, compiler wrappers, and launch commands around it.

pub mod builder;
pub mod core;
pub mod ops;
pub mod resolver;
pub mod sources;
pub mod util;

/// Fixtures and mocks for taucmdr unit tests.
///
/// Only compiled for tests. Provides canned feature settings, a fake TAU
/// install tree, and a recording [`ops::Builder`].
#[cfg(test)]
pub mod test_support;

pub use core::{
    feature::FeatureConfig, feature::FeatureSettings, manifest::FeatureManifest, tag::TagSet,
    variant::Variant,
};

pub use ops::TauInstallation;
pub use resolver::Selection;
pub use sources::VariantCatalog;
pub use util::context::GlobalContext;
