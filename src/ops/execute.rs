//! Compile and launch instrumented applications.
//!
//! Failed commands are reported, never retried.

use anyhow::{Context, Result};
use thiserror::Error;

use crate::builder::command::CommandSpec;
use crate::builder::environment::Environment;
use crate::core::compiler::CompilerRole;
use crate::core::feature::ConfigError;
use crate::ops::installation::TauInstallation;
use crate::util::diagnostic::{suggestions, Diagnostic, DiagnosticSink};
use crate::util::process::ProcessBuilder;

/// External process failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecError {
    #[error("TAU was unable to build the application.")]
    CompileFailed { command: String, code: Option<i32> },

    #[error("the instrumented application exited with status {}", display_code(*code))]
    RunFailed { command: String, code: Option<i32> },

    #[error("no application command given")]
    EmptyCommand,
}

fn display_code(code: Option<i32>) -> String {
    code.map_or_else(|| "unknown (terminated by signal)".to_string(), |c| c.to_string())
}

impl ExecError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ExecError::CompileFailed { command, code } | ExecError::RunFailed { command, code } => {
                Diagnostic::error(self.to_string())
                    .with_context(format!("command: {}", command))
                    .with_context(format!("exit status: {}", display_code(*code)))
                    .with_suggestion(suggestions::SEE_LOG)
            }
            ExecError::EmptyCommand => Diagnostic::error(self.to_string())
                .with_suggestion("Pass the application command after `--`"),
        }
    }
}

/// The full compiler invocation for `role`, without running it.
pub fn compile_command(
    installation: &TauInstallation,
    role: CompilerRole,
    args: &[String],
    inherited: &Environment,
    sink: &dyn DiagnosticSink,
) -> Result<CommandSpec> {
    let compiler = installation
        .config()
        .compilers
        .get(role)
        .ok_or(ConfigError::MissingCompiler { role })?;

    let synth = installation.compile_time_config(inherited, sink)?;
    let program = installation
        .compiler_command(compiler)
        .program_in(&installation.bin_dir());

    Ok(CommandSpec::new(program)
        .args(synth.options)
        .args(args.iter().cloned())
        .with_env(synth.env))
}

/// The full application launch, without running it.
pub fn run_command(
    installation: &TauInstallation,
    launcher: &[String],
    app: &[String],
    inherited: &Environment,
    sink: &dyn DiagnosticSink,
) -> Result<CommandSpec> {
    if app.is_empty() {
        return Err(ExecError::EmptyCommand.into());
    }

    let (argv, env) = installation.application_command(launcher, app, inherited, sink);
    let spec = CommandSpec::from_argv(argv).ok_or(ExecError::EmptyCommand)?;
    Ok(spec.with_env(env))
}

/// Compile with the selected variant.
pub fn compile(
    installation: &TauInstallation,
    role: CompilerRole,
    args: &[String],
    inherited: &Environment,
    sink: &dyn DiagnosticSink,
) -> Result<()> {
    let spec = compile_command(installation, role, args, inherited, sink)?;
    tracing::info!("{}", spec);

    let status = process(&spec).status()?;
    if !status.success() {
        return Err(ExecError::CompileFailed {
            command: spec.to_string(),
            code: status.code(),
        }
        .into());
    }
    Ok(())
}

/// Launch an application with TAU measurement enabled.
pub fn run(
    installation: &TauInstallation,
    launcher: &[String],
    app: &[String],
    inherited: &Environment,
    sink: &dyn DiagnosticSink,
) -> Result<()> {
    let spec = run_command(installation, launcher, app, inherited, sink)?;
    tracing::info!("{}", spec);

    let status = process(&spec)
        .status()
        .with_context(|| format!("failed to launch `{}`", spec.program.display()))?;
    if !status.success() {
        return Err(ExecError::RunFailed {
            command: spec.to_string(),
            code: status.code(),
        }
        .into());
    }
    Ok(())
}

fn process(spec: &CommandSpec) -> ProcessBuilder {
    ProcessBuilder::new(&spec.program)
        .args(&spec.args)
        .env_exact(&spec.env)
}
