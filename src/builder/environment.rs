//! Compile-time and run-time environment synthesis.
//!
//! Both synthesizers are pure: they take the inherited environment by
//! reference and return a fresh [`Synthesized`] value. Inherited `TAU_*`
//! variables are stripped first so a stale shell setup cannot override the
//! synthesized configuration.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::core::feature::{CompilerInst, FeatureConfig};
use crate::util::diagnostic::{Diagnostic, DiagnosticSink};

/// Environment variables by name.
pub type Environment = BTreeMap<String, String>;

/// Name prefix reserved for TAU's own variables.
pub const PRIVATE_PREFIX: &str = "TAU_";

/// Legacy output-directory variables, stripped along with `TAU_*`.
pub const LEGACY_VARS: [&str; 2] = ["PROFILEDIR", "TRACEDIR"];

/// Separator for list-valued variables (`PATH`, `TAU_METRICS`).
#[cfg(windows)]
pub const PATH_SEPARATOR: char = ';';
#[cfg(not(windows))]
pub const PATH_SEPARATOR: char = ':';

/// Compile-time option tokens collected into `TAU_OPTIONS`.
pub mod tokens {
    pub const REVERT: &str = "-optRevert";
    pub const VERBOSE: &str = "-optVerbose";
    pub const COMP_INST: &str = "-optCompInst";
    pub const NO_COMP_INST: &str = "-optNoCompInst";
    pub const LINK_ONLY: &str = "-optLinkOnly";
    pub const KEEP_FILES: &str = "-optKeepFiles";
    pub const REUSE_FILES: &str = "-optReuseFiles";
    pub const SELECT_FILE: &str = "-optTauSelectFile=";
    pub const TRACK_IO: &str = "-optTrackIO";
}

/// Options and environment produced for one side (compile or run).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Synthesized {
    /// Extra arguments, in order
    pub options: Vec<String>,
    /// Complete environment for the child process
    pub env: Environment,
}

/// Whether an inherited variable would conflict with a synthesized one.
pub fn is_private(name: &str) -> bool {
    name.starts_with(PRIVATE_PREFIX) || LEGACY_VARS.contains(&name)
}

/// Copy `inherited` without TAU's private variables.
///
/// Every removed variable is reported to `sink` in one warning.
pub fn sanitize(inherited: &Environment, sink: &dyn DiagnosticSink) -> Environment {
    let (removed, clean): (Environment, Environment) = inherited
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .partition(|(k, _)| is_private(k));

    if !removed.is_empty() {
        let mut diag = Diagnostic::warning(
            "ignoring TAU environment variables set in the current shell",
        );
        for (name, value) in &removed {
            diag = diag.with_context(format!("{}={}", name, value));
        }
        sink.emit(diag);
    }

    clean
}

/// Options and environment for compiling with the selected variant.
///
/// `TAU_MAKEFILE` points at `variant_path`; `TAU_OPTIONS` holds the option
/// tokens. The returned options are compiler arguments (`-g`).
pub fn compile_time_config(
    config: &FeatureConfig,
    variant_path: &Path,
    inherited: &Environment,
    sink: &dyn DiagnosticSink,
) -> Synthesized {
    let mut env = sanitize(inherited, sink);
    let mut options = Vec::new();

    let mut tau_opts = BTreeSet::from([tokens::REVERT.to_string()]);
    if config.verbose {
        tau_opts.insert(tokens::VERBOSE.to_string());
    }
    tau_opts.insert(
        match config.compiler_inst {
            CompilerInst::Always => tokens::COMP_INST,
            CompilerInst::Never => tokens::NO_COMP_INST,
            CompilerInst::Fallback => tokens::REVERT,
        }
        .to_string(),
    );
    if config.link_only {
        tau_opts.insert(tokens::LINK_ONLY.to_string());
    }
    if config.keep_inst_files {
        tau_opts.insert(tokens::KEEP_FILES.to_string());
    }
    if config.reuse_inst_files {
        tau_opts.insert(tokens::REUSE_FILES.to_string());
    }
    if let Some(select) = config.resolved_select_file() {
        tau_opts.insert(format!("{}{}", tokens::SELECT_FILE, select.display()));
    }
    if config.io_inst {
        tau_opts.insert(tokens::TRACK_IO.to_string());
    }

    if config.sample || config.compiler_inst != CompilerInst::Never {
        options.push("-g".to_string());
    }

    env.insert(
        "TAU_MAKEFILE".to_string(),
        variant_path.display().to_string(),
    );
    env.insert(
        "TAU_OPTIONS".to_string(),
        tau_opts.into_iter().collect::<Vec<_>>().join(" "),
    );

    Synthesized { options, env }
}

/// Options and environment for running an instrumented application.
///
/// The returned options are `tau_exec` arguments.
pub fn run_time_config(
    config: &FeatureConfig,
    inherited: &Environment,
    sink: &dyn DiagnosticSink,
) -> Synthesized {
    let mut env = sanitize(inherited, sink);
    let mut options = Vec::new();

    let flags = [
        ("TAU_VERBOSE", config.verbose),
        ("TAU_PROFILE", config.profile),
        ("TAU_TRACE", config.trace),
        ("TAU_SAMPLE", config.sample),
        ("TAU_TRACK_HEAP", config.measure_heap_usage),
    ];
    for (name, on) in flags {
        env.insert(name.to_string(), flag(on).to_string());
    }

    if config.callpath_depth > 0 {
        env.insert("TAU_CALLPATH".to_string(), "1".to_string());
        env.insert(
            "TAU_CALLPATH_DEPTH".to_string(),
            config.callpath_depth.to_string(),
        );
    }

    let tokens = [
        (config.verbose, "-v"),
        (config.sample, "-ebs"),
        (config.measure_cuda, "-cupti"),
        (config.measure_opencl, "-opencl"),
        (config.io_inst, "-io"),
    ];
    options.extend(
        tokens
            .into_iter()
            .filter(|(on, _)| *on)
            .map(|(_, token)| token.to_string()),
    );

    env.insert(
        "TAU_METRICS".to_string(),
        config.metrics.join(&PATH_SEPARATOR.to_string()),
    );

    Synthesized { options, env }
}

/// Put `dirs` in front of the environment's `PATH`, in order.
pub fn prepend_path(env: &mut Environment, dirs: &[PathBuf]) {
    let mut parts: Vec<String> = dirs.iter().map(|d| d.display().to_string()).collect();
    if let Some(existing) = env.get("PATH").filter(|p| !p.is_empty()) {
        parts.push(existing.clone());
    }
    env.insert("PATH".to_string(), parts.join(&PATH_SEPARATOR.to_string()));
}

fn flag(on: bool) -> &'static str {
    if on {
        "1"
    } else {
        "0"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::feature::SourceInst;
    use crate::test_support::gnu_settings;
    use crate::util::diagnostic::CollectingSink;

    fn env(pairs: &[(&str, &str)]) -> Environment {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn tau_options(synth: &Synthesized) -> Vec<&str> {
        synth.env["TAU_OPTIONS"].split(' ').collect()
    }

    #[test]
    fn test_sanitize_strips_private_and_legacy() {
        let sink = CollectingSink::new();
        let inherited = env(&[
            ("PATH", "/usr/bin"),
            ("TAU_MAKEFILE", "/stale/Makefile.tau"),
            ("TAU_", ""),
            ("PROFILEDIR", "/tmp/p"),
            ("TRACEDIR", "/tmp/t"),
            ("MY_TAU_HOME", "/keep"),
        ]);

        let clean = sanitize(&inherited, &sink);
        assert_eq!(clean, env(&[("PATH", "/usr/bin"), ("MY_TAU_HOME", "/keep")]));

        let diagnostics = sink.take();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].context.len(), 4);
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let sink = CollectingSink::new();
        let inherited = env(&[("HOME", "/home/u"), ("TAU_TRACE", "1")]);

        let once = sanitize(&inherited, &sink);
        sink.take();
        let twice = sanitize(&once, &sink);
        assert_eq!(once, twice);
        assert!(sink.take().is_empty());
    }

    #[test]
    fn test_compile_time_defaults() {
        let sink = CollectingSink::new();
        let config = gnu_settings().build().unwrap();
        let synth = compile_time_config(
            &config,
            Path::new("/opt/tau/x86_64/lib/Makefile.tau-pdt"),
            &env(&[("TAU_OPTIONS", "-optQuiet")]),
            &sink,
        );

        assert_eq!(synth.env["TAU_MAKEFILE"], "/opt/tau/x86_64/lib/Makefile.tau-pdt");
        // fallback maps to the seed token, so it appears once
        assert_eq!(tau_options(&synth), vec!["-optRevert"]);
        assert_eq!(synth.options, vec!["-g"]);
    }

    #[test]
    fn test_compile_time_all_tokens() {
        let sink = CollectingSink::new();
        let mut settings = gnu_settings();
        settings.verbose = true;
        settings.compiler_inst = CompilerInst::Always;
        settings.link_only = true;
        settings.keep_inst_files = true;
        settings.reuse_inst_files = true;
        settings.io_inst = true;
        settings.select_file = Some(PathBuf::from("/nonexistent/select.tau"));
        let config = settings.build().unwrap();

        let synth = compile_time_config(&config, Path::new("Makefile.tau"), &Environment::new(), &sink);
        let opts = tau_options(&synth);
        for token in [
            "-optRevert",
            "-optVerbose",
            "-optCompInst",
            "-optLinkOnly",
            "-optKeepFiles",
            "-optReuseFiles",
            "-optTauSelectFile=/nonexistent/select.tau",
            "-optTrackIO",
        ] {
            assert!(opts.contains(&token), "missing {}", token);
        }
        assert!(!opts.contains(&"-optNoCompInst"));
    }

    #[test]
    fn test_compile_time_tokens_unique() {
        let sink = CollectingSink::new();
        let mut settings = gnu_settings();
        settings.compiler_inst = CompilerInst::Never;
        let config = settings.build().unwrap();

        let first = compile_time_config(&config, Path::new("Makefile.tau"), &Environment::new(), &sink);
        let second = compile_time_config(&config, Path::new("Makefile.tau"), &first.env, &sink);

        let opts = tau_options(&second);
        let unique: BTreeSet<_> = opts.iter().collect();
        assert_eq!(opts.len(), unique.len());
        assert_eq!(first, second);
        assert!(second.options.is_empty());
    }

    #[test]
    fn test_sampling_forces_debug_info() {
        let sink = CollectingSink::new();
        let mut settings = gnu_settings();
        settings.source_inst = SourceInst::Never;
        settings.compiler_inst = CompilerInst::Never;
        settings.sample = true;
        let config = settings.build().unwrap();

        let synth = compile_time_config(&config, Path::new("Makefile.tau"), &Environment::new(), &sink);
        assert_eq!(synth.options, vec!["-g"]);
        assert!(tau_options(&synth).contains(&"-optNoCompInst"));
    }

    #[test]
    fn test_run_time_defaults() {
        let sink = CollectingSink::new();
        let config = gnu_settings().build().unwrap();
        let synth = run_time_config(&config, &env(&[("PROFILEDIR", "/old")]), &sink);

        assert_eq!(synth.env["TAU_VERBOSE"], "0");
        assert_eq!(synth.env["TAU_PROFILE"], "1");
        assert_eq!(synth.env["TAU_TRACE"], "0");
        assert_eq!(synth.env["TAU_SAMPLE"], "0");
        assert_eq!(synth.env["TAU_TRACK_HEAP"], "0");
        assert_eq!(synth.env["TAU_CALLPATH"], "1");
        assert_eq!(synth.env["TAU_CALLPATH_DEPTH"], "100");
        assert_eq!(synth.env["TAU_METRICS"], "TIME");
        assert!(!synth.env.contains_key("PROFILEDIR"));
        assert!(synth.options.is_empty());
    }

    #[test]
    fn test_run_time_options_and_metrics() {
        let sink = CollectingSink::new();
        let mut settings = gnu_settings();
        settings.verbose = true;
        settings.trace = true;
        settings.sample = true;
        settings.measure_cuda = true;
        settings.measure_opencl = true;
        settings.io_inst = true;
        settings.callpath_depth = 0;
        settings.metrics = vec!["TIME".to_string(), "PAPI_FP_INS".to_string()];
        let config = settings.build().unwrap();

        let synth = run_time_config(&config, &Environment::new(), &sink);
        assert_eq!(synth.options, vec!["-v", "-ebs", "-cupti", "-opencl", "-io"]);
        assert_eq!(
            synth.env["TAU_METRICS"],
            format!("TIME{}PAPI_FP_INS", PATH_SEPARATOR)
        );
        assert!(!synth.env.contains_key("TAU_CALLPATH"));
        assert!(!synth.env.contains_key("TAU_CALLPATH_DEPTH"));
        assert_eq!(synth.env["TAU_TRACE"], "1");
    }

    #[test]
    fn test_prepend_path() {
        let mut environment = env(&[("PATH", "/usr/bin")]);
        prepend_path(&mut environment, &[PathBuf::from("/opt/tau/x86_64/bin")]);
        assert_eq!(
            environment["PATH"],
            format!("/opt/tau/x86_64/bin{}/usr/bin", PATH_SEPARATOR)
        );

        let mut empty = Environment::new();
        prepend_path(&mut empty, &[PathBuf::from("/a")]);
        assert_eq!(empty["PATH"], "/a");
    }
}
