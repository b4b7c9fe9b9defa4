//! Variant resolution.
//!
//! A feature configuration is reduced to a desired tag set and an
//! incompatible tag set, which are matched against a scanned catalog of
//! prebuilt variants. Everything here is pure; the only I/O happens when the
//! catalog is scanned, before resolution starts.

pub mod errors;
pub mod matcher;
pub mod tags;

pub use errors::ResolveError;
pub use matcher::{select, MatchKind, Selection};
pub use tags::{derive_tags, incompatible_tags};
