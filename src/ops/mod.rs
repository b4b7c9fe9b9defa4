//! High-level operations.
//!
//! This module ties configuration, resolution, and synthesis to a concrete
//! TAU installation on disk.

pub mod execute;
pub mod install;
pub mod installation;
pub mod verify;

pub use execute::{compile, compile_command, run, run_command, ExecError};
pub use install::{install, Builder, InstallOutcome, MakeBuilder};
pub use installation::TauInstallation;
pub use verify::{verify, VerifyError};
