//! Command selection.
//!
//! Decides whether a compiler is invoked directly or through a TAU wrapper
//! script, and whether an application launch needs `tau_exec` spliced in
//! between the launcher and the application.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::builder::environment::{Environment, Synthesized};
use crate::core::compiler::{InstalledCompiler, WrapperScript};
use crate::core::feature::{CompilerInst, FeatureConfig, SourceInst};
use crate::core::tag::{names, TagSet};

/// The execution-time interception wrapper.
pub const EXEC_WRAPPER: &str = "tau_exec";

/// A program invocation with its arguments and environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// The program to run (e.g., "tau_cxx.sh", "/usr/bin/mpirun")
    pub program: PathBuf,
    /// Command arguments
    pub args: Vec<String>,
    /// Complete environment for the child
    pub env: Environment,
}

impl CommandSpec {
    /// Create a new command spec.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
            env: Environment::new(),
        }
    }

    /// Split an argument vector into program and arguments.
    ///
    /// Returns `None` for an empty vector.
    pub fn from_argv(argv: Vec<String>) -> Option<Self> {
        let mut iter = argv.into_iter();
        let program = iter.next()?;
        Some(CommandSpec::new(program).args(iter))
    }

    /// Add an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(|a| a.into()));
        self
    }

    /// Replace the environment.
    pub fn with_env(mut self, env: Environment) -> Self {
        self.env = env;
        self
    }

    /// Program followed by arguments.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = vec![self.program.display().to_string()];
        argv.extend(self.args.iter().cloned());
        argv
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.argv().join(" "))
    }
}

/// How a compiler is invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompilerCommand {
    /// Through a TAU compiler wrapper script
    Wrapper(WrapperScript),
    /// The compiler itself, by absolute path
    Direct(PathBuf),
}

impl CompilerCommand {
    /// The program to execute. Wrapper scripts are looked up in `bin_dir`.
    pub fn program_in(&self, bin_dir: &Path) -> PathBuf {
        match self {
            CompilerCommand::Wrapper(script) => bin_dir.join(script.command()),
            CompilerCommand::Direct(path) => path.clone(),
        }
    }

    pub fn is_wrapper(&self) -> bool {
        matches!(self, CompilerCommand::Wrapper(_))
    }
}

impl fmt::Display for CompilerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompilerCommand::Wrapper(script) => write!(f, "{}", script),
            CompilerCommand::Direct(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Choose between a TAU wrapper script and the bare compiler.
pub fn compiler_command(config: &FeatureConfig, compiler: &InstalledCompiler) -> CompilerCommand {
    let use_wrapper = config.source_inst != SourceInst::Never
        || config.compiler_inst != CompilerInst::Never
        || config.target_os.requires_compiler_wrapper();

    if use_wrapper {
        CompilerCommand::Wrapper(compiler.role.wrapper())
    } else {
        CompilerCommand::Direct(compiler.absolute_path.clone())
    }
}

/// Whether the application needs `tau_exec` at launch.
///
/// True when OpenCL is measured, or when nothing instrumented the binary at
/// compile time.
pub fn needs_exec_wrapper(config: &FeatureConfig) -> bool {
    config.measure_opencl || !config.instruments_at_compile_time()
}

/// Tags passed to `tau_exec -T`.
pub fn exec_wrapper_tags(config: &FeatureConfig, tags: &TagSet) -> TagSet {
    let mut tags = tags.clone();
    if !config.mpi_support {
        tags.insert(names::SERIAL);
    }
    if config.opencl_support {
        tags.insert(names::CUPTI);
    }
    tags
}

/// Build the full launch command line.
///
/// `runtime` is the output of the run-time synthesizer; its options are only
/// used when `tau_exec` is spliced in, its environment always accompanies the
/// returned argument vector.
pub fn application_command(
    config: &FeatureConfig,
    tags: &TagSet,
    runtime: Synthesized,
    launcher: &[String],
    app: &[String],
) -> (Vec<String>, Environment) {
    let mut argv: Vec<String> = launcher.to_vec();

    if needs_exec_wrapper(config) {
        let exec_tags = exec_wrapper_tags(config, tags);
        tracing::debug!("wrapping application with {} -T {}", EXEC_WRAPPER, exec_tags);
        argv.push(EXEC_WRAPPER.to_string());
        argv.push("-T".to_string());
        argv.push(exec_tags.join(","));
        argv.extend(runtime.options);
    }

    argv.extend(app.iter().cloned());
    (argv, runtime.env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::compiler::CompilerRole;
    use crate::core::target::TargetOs;
    use crate::test_support::gnu_settings;

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn uninstrumented() -> crate::core::feature::FeatureSettings {
        let mut settings = gnu_settings();
        settings.source_inst = SourceInst::Never;
        settings.compiler_inst = CompilerInst::Never;
        settings.sample = true;
        settings
    }

    #[test]
    fn test_wrapper_used_when_instrumenting() {
        let config = gnu_settings().build().unwrap();
        let cc = InstalledCompiler::new("/usr/bin/gcc", CompilerRole::Cc);
        let mpifc = InstalledCompiler::new("/usr/bin/mpif90", CompilerRole::MpiFc);

        assert_eq!(
            compiler_command(&config, &cc),
            CompilerCommand::Wrapper(WrapperScript::TauCc)
        );
        assert_eq!(compiler_command(&config, &mpifc).to_string(), "tau_f90.sh");
    }

    #[test]
    fn test_direct_compiler_without_instrumentation() {
        let config = uninstrumented().build().unwrap();
        let cxx = InstalledCompiler::new("/usr/bin/g++", CompilerRole::Cxx);

        let command = compiler_command(&config, &cxx);
        assert_eq!(command, CompilerCommand::Direct(PathBuf::from("/usr/bin/g++")));
        assert_eq!(
            command.program_in(Path::new("/opt/tau/x86_64/bin")),
            PathBuf::from("/usr/bin/g++")
        );
    }

    #[test]
    fn test_cray_always_wraps() {
        let mut settings = uninstrumented();
        settings.target_os = TargetOs::CrayCnl;
        let config = settings.build().unwrap();
        let cxx = InstalledCompiler::new("/opt/cray/bin/CC", CompilerRole::Cxx);

        let command = compiler_command(&config, &cxx);
        assert!(command.is_wrapper());
        assert_eq!(
            command.program_in(Path::new("/opt/tau/craycnl/bin")),
            PathBuf::from("/opt/tau/craycnl/bin/tau_cxx.sh")
        );
    }

    #[test]
    fn test_application_wrapped_when_uninstrumented() {
        let config = uninstrumented().build().unwrap();
        let tags: TagSet = ["papi"].into_iter().collect();
        let runtime = Synthesized {
            options: strings(&["-ebs"]),
            env: Environment::new(),
        };

        let (argv, _) = application_command(
            &config,
            &tags,
            runtime,
            &strings(&["mpirun", "-np", "4"]),
            &strings(&["./a.out"]),
        );
        assert_eq!(
            argv,
            strings(&["mpirun", "-np", "4", "tau_exec", "-T", "papi,serial", "-ebs", "./a.out"])
        );
    }

    #[test]
    fn test_application_unchanged_when_instrumented() {
        let config = gnu_settings().build().unwrap();
        let mut env = Environment::new();
        env.insert("TAU_PROFILE".to_string(), "1".to_string());
        let runtime = Synthesized {
            options: strings(&["-v"]),
            env: env.clone(),
        };

        let (argv, returned_env) = application_command(
            &config,
            &TagSet::new(),
            runtime,
            &strings(&["srun"]),
            &strings(&["./app", "--size", "10"]),
        );
        assert_eq!(argv, strings(&["srun", "./app", "--size", "10"]));
        assert_eq!(returned_env, env);
    }

    #[test]
    fn test_opencl_measurement_forces_exec_wrapper() {
        let mut settings = gnu_settings();
        settings.opencl_support = true;
        settings.measure_opencl = true;
        let config = settings.build().unwrap();

        assert!(needs_exec_wrapper(&config));
        let tags = exec_wrapper_tags(&config, &["pdt"].into_iter().collect());
        assert_eq!(tags.to_string(), "cupti,pdt,serial");
    }

    #[test]
    fn test_link_only_counts_as_instrumented() {
        let mut settings = uninstrumented();
        settings.link_only = true;
        assert!(!needs_exec_wrapper(&settings.build().unwrap()));
    }

    #[test]
    fn test_command_spec_from_argv() {
        let spec = CommandSpec::from_argv(strings(&["mpirun", "-np", "2"])).unwrap();
        assert_eq!(spec.program, PathBuf::from("mpirun"));
        assert_eq!(spec.args, strings(&["-np", "2"]));
        assert_eq!(spec.to_string(), "mpirun -np 2");
        assert!(CommandSpec::from_argv(Vec::new()).is_none());
    }
}
