//! Command-line and environment synthesis.
//!
//! This module turns a feature configuration into the arguments and
//! environment variables needed to configure TAU, compile against a selected
//! variant, and launch an instrumented application.

pub mod command;
pub mod configure;
pub mod environment;

pub use command::{
    application_command, compiler_command, needs_exec_wrapper, CommandSpec, CompilerCommand,
    EXEC_WRAPPER,
};
pub use configure::configure_args;
pub use environment::{
    compile_time_config, prepend_path, run_time_config, sanitize, Environment, Synthesized,
    PATH_SEPARATOR,
};
