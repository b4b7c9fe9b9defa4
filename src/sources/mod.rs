//! Variant sources.
//!
//! Sources discover the prebuilt variants an installation provides.

pub mod catalog;

pub use catalog::VariantCatalog;
