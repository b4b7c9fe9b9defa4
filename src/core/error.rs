//! Internal-consistency errors.
//!
//! These indicate a gap in a mapping table rather than bad user input, and are
//! always fatal to the operation that hit them.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

/// A mapping or catalog gap detected while synthesizing a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum InternalError {
    #[error("unknown compiler family for Fortran: '{family}' ({command})")]
    #[diagnostic(
        code(taucmdr::internal::fortran_family),
        help("Use a Fortran compiler from a family TAU knows how to configure")
    )]
    UnmappedFortranFamily { family: String, command: String },

    #[error("invalid target_arch '{arch}' or target_os '{os}'")]
    #[diagnostic(
        code(taucmdr::internal::target),
        help("Pick a target_arch and target_os pair TAU supports")
    )]
    UnsupportedTarget { arch: String, os: String },
}
