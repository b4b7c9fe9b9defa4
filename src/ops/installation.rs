//! A TAU installation paired with the features it must provide.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::builder::command::{self, CompilerCommand};
use crate::builder::environment::{self, Environment, Synthesized};
use crate::core::compiler::InstalledCompiler;
use crate::core::error::InternalError;
use crate::core::feature::FeatureConfig;
use crate::core::tag::TagSet;
use crate::core::target::tau_arch;
use crate::resolver::{self, Selection};
use crate::sources::VariantCatalog;
use crate::util::diagnostic::DiagnosticSink;

/// A TAU install prefix and the feature configuration it is used with.
#[derive(Debug, Clone)]
pub struct TauInstallation {
    prefix: PathBuf,
    arch: &'static str,
    config: FeatureConfig,
}

impl TauInstallation {
    /// Pair an install prefix with a configuration.
    ///
    /// Fails when the target has no TAU architecture name.
    pub fn new(prefix: impl Into<PathBuf>, config: FeatureConfig) -> Result<Self, InternalError> {
        let arch = tau_arch(config.target_arch, config.target_os)?;
        Ok(TauInstallation {
            prefix: prefix.into(),
            arch,
            config,
        })
    }

    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// TAU's name for the target architecture, e.g. `x86_64` or `craycnl`.
    pub fn arch(&self) -> &'static str {
        self.arch
    }

    /// `<prefix>/<arch>`
    pub fn arch_dir(&self) -> PathBuf {
        self.prefix.join(self.arch)
    }

    /// Directory with TAU's executables and wrapper scripts.
    pub fn bin_dir(&self) -> PathBuf {
        self.arch_dir().join("bin")
    }

    /// Directory with TAU's libraries and variant makefiles.
    pub fn lib_dir(&self) -> PathBuf {
        self.arch_dir().join("lib")
    }

    /// Tags the selected variant must carry.
    pub fn tags(&self) -> TagSet {
        resolver::derive_tags(&self.config)
    }

    /// Tags an approximate match must not carry.
    pub fn incompatible_tags(&self) -> TagSet {
        resolver::incompatible_tags(&self.config)
    }

    /// Scan the installation's variant catalog.
    pub fn catalog(&self) -> Result<VariantCatalog> {
        VariantCatalog::scan(&self.lib_dir())
    }

    /// Select the variant matching this configuration.
    pub fn select_variant(&self, sink: &dyn DiagnosticSink) -> Result<Selection> {
        let catalog = self.catalog()?;
        let selection = resolver::select(&self.tags(), &self.incompatible_tags(), &catalog, sink)?;
        tracing::debug!("selected {}", selection);
        Ok(selection)
    }

    /// Directories put in front of `PATH` so TAU's tools resolve.
    fn path_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = vec![self.bin_dir()];
        if let Some(pdt) = &self.config.pdt {
            dirs.push(pdt.bin_path());
        }
        dirs
    }

    /// Compile-time options and environment for the selected variant.
    pub fn compile_time_config(
        &self,
        inherited: &Environment,
        sink: &dyn DiagnosticSink,
    ) -> Result<Synthesized> {
        let selection = self
            .select_variant(sink)
            .context("cannot compile without a matching TAU variant")?;

        let mut synth =
            environment::compile_time_config(&self.config, &selection.variant.path, inherited, sink);
        environment::prepend_path(&mut synth.env, &self.path_dirs());
        Ok(synth)
    }

    /// Run-time options and environment.
    pub fn run_time_config(&self, inherited: &Environment, sink: &dyn DiagnosticSink) -> Synthesized {
        let mut synth = environment::run_time_config(&self.config, inherited, sink);
        environment::prepend_path(&mut synth.env, &self.path_dirs());
        synth
    }

    /// How `compiler` is invoked under this configuration.
    pub fn compiler_command(&self, compiler: &InstalledCompiler) -> CompilerCommand {
        command::compiler_command(&self.config, compiler)
    }

    /// The application launch command line and its environment.
    pub fn application_command(
        &self,
        launcher: &[String],
        app: &[String],
        inherited: &Environment,
        sink: &dyn DiagnosticSink,
    ) -> (Vec<String>, Environment) {
        let runtime = self.run_time_config(inherited, sink);
        command::application_command(&self.config, &self.tags(), runtime, launcher, app)
    }
}
