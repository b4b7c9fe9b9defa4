//! Core data structures.
//!
//! This module contains the foundational types the engine works with:
//! - Tags and tag sets
//! - Compiler roles, families, and installed compilers
//! - Target system description
//! - Feature configuration and its TOML manifest
//! - Prebuilt variants

pub mod compiler;
pub mod error;
pub mod feature;
pub mod manifest;
pub mod tag;
pub mod target;
pub mod variant;

pub use compiler::{CompilerFamily, CompilerRole, CompilerSet, InstalledCompiler, WrapperScript};
pub use error::InternalError;
pub use feature::{
    CompilerInst, ConfigError, DependencyInstall, FeatureConfig, FeatureSettings, OpenmpMeasure,
    SourceInst,
};
pub use manifest::FeatureManifest;
pub use tag::{Tag, TagSet};
pub use target::{TargetArch, TargetOs};
pub use variant::Variant;
