//! Feature configuration.
//!
//! A [`FeatureConfig`] describes everything a TAU build must support and every
//! measurement the user asked for. It is created once from
//! [`FeatureSettings`] through [`FeatureSettings::build`], which rejects
//! inconsistent combinations up front, and is never mutated afterwards.

use std::fmt;
use std::ops::Deref;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::compiler::{CompilerRole, CompilerSet, InstalledCompiler};
use crate::core::target::{TargetArch, TargetOs};
use crate::util::diagnostic::Diagnostic;
use crate::util::fs;

/// How source-based instrumentation is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceInst {
    /// Instrument automatically with PDT
    #[default]
    Automatic,
    /// Only the user's manual instrumentation API calls
    Manual,
    Never,
}

/// How compiler-based instrumentation is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompilerInst {
    Always,
    Never,
    /// Use compiler instrumentation only when source instrumentation fails
    #[default]
    Fallback,
}

/// How OpenMP regions are measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenmpMeasure {
    #[default]
    None,
    Ompt,
    Opari,
}

macro_rules! keyword_enum {
    ($ty:ident, $what:literal, { $($variant:ident => $kw:literal),+ $(,)? }) => {
        impl $ty {
            /// Get the keyword as a string.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $kw),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($kw => Ok($ty::$variant),)+
                    _ => Err(ConfigError::InvalidValue {
                        field: $what,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

keyword_enum!(SourceInst, "source_inst", {
    Automatic => "automatic",
    Manual => "manual",
    Never => "never",
});

keyword_enum!(CompilerInst, "compiler_inst", {
    Always => "always",
    Never => "never",
    Fallback => "fallback",
});

keyword_enum!(OpenmpMeasure, "measure_openmp", {
    None => "none",
    Ompt => "ompt",
    Opari => "opari",
});

/// Location of an installed dependency (PDT, binutils, libunwind, PAPI).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyInstall {
    /// Installation prefix
    pub install_prefix: PathBuf,
    /// Header directory
    pub include_path: PathBuf,
}

impl DependencyInstall {
    /// A dependency installed at `prefix` with headers in `prefix/include`.
    pub fn at(prefix: impl Into<PathBuf>) -> Self {
        let install_prefix = prefix.into();
        let include_path = install_prefix.join("include");
        DependencyInstall {
            install_prefix,
            include_path,
        }
    }

    /// Override the header directory.
    pub fn with_include_path(mut self, include_path: impl Into<PathBuf>) -> Self {
        self.include_path = include_path.into();
        self
    }

    /// Directory holding the dependency's executables.
    pub fn bin_path(&self) -> PathBuf {
        self.install_prefix.join("bin")
    }
}

/// Error raised by an inconsistent feature configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("profiling, tracing, or both must be enabled")]
    NoMeasurement,

    #[error("at least one instrumentation method must be used")]
    NoInstrumentation,

    #[error("required {role} compiler is not configured")]
    MissingCompiler { role: CompilerRole },

    #[error("invalid value '{value}' for `{field}`")]
    InvalidValue { field: &'static str, value: String },

    #[error("unable to find mpi.h in the MPI include path")]
    MpiHeaderNotFound { searched: Vec<PathBuf> },
}

impl ConfigError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string());
        match self {
            ConfigError::NoMeasurement => diag
                .with_suggestion("Set `profile = true` or `trace = true` (or both)"),
            ConfigError::NoInstrumentation => diag
                .with_context("source_inst = \"never\", compiler_inst = \"never\", sample = false")
                .with_suggestion("Enable source instrumentation, compiler instrumentation, or sampling"),
            ConfigError::MissingCompiler { role } => diag
                .with_suggestion(format!("Add a `{}` entry to the [compilers] table", role)),
            ConfigError::InvalidValue { field, .. } => {
                diag.with_suggestion(format!("Check the spelling of `{}`", field))
            }
            ConfigError::MpiHeaderNotFound { searched } => {
                let searched: Vec<String> =
                    searched.iter().map(|p| p.display().to_string()).collect();
                diag.with_context(format!("searched: {}", searched.join(", ")))
                    .with_suggestion("Set `mpi_include_path` in the [application] table")
            }
        }
    }
}

/// Unvalidated feature settings.
///
/// Fill in the fields, then call [`FeatureSettings::build`] to obtain a
/// [`FeatureConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSettings {
    // Target system
    pub target_os: TargetOs,
    pub target_arch: TargetArch,
    pub compilers: CompilerSet,

    /// Enable TAU's own verbose output
    pub verbose: bool,

    // Dependency installations
    pub pdt: Option<DependencyInstall>,
    pub binutils: Option<DependencyInstall>,
    pub libunwind: Option<DependencyInstall>,
    pub papi: Option<DependencyInstall>,

    // Application support
    pub openmp_support: bool,
    pub pthreads_support: bool,
    pub mpi_support: bool,
    pub mpi_include_path: Vec<PathBuf>,
    pub mpi_library_path: Vec<PathBuf>,
    pub mpi_libraries: Vec<String>,
    pub cuda_support: bool,
    pub cuda_prefix: Option<PathBuf>,
    pub opencl_support: bool,
    pub opencl_prefix: Option<PathBuf>,
    pub shmem_support: bool,
    pub mpc_support: bool,

    // Instrumentation
    pub source_inst: SourceInst,
    pub compiler_inst: CompilerInst,
    pub link_only: bool,
    pub io_inst: bool,
    pub keep_inst_files: bool,
    pub reuse_inst_files: bool,
    pub select_file: Option<PathBuf>,

    // Measurement
    pub profile: bool,
    pub trace: bool,
    pub sample: bool,
    /// Metrics in measurement order, e.g. `TIME`, `PAPI_FP_INS`
    pub metrics: Vec<String>,
    pub measure_mpi: bool,
    pub measure_openmp: OpenmpMeasure,
    pub measure_opencl: bool,
    pub measure_pthreads: bool,
    pub measure_cuda: bool,
    pub measure_shmem: bool,
    pub measure_mpc: bool,
    pub measure_heap_usage: bool,
    pub measure_memory_alloc: bool,
    /// Callpath depth; 0 disables callpath measurement
    pub callpath_depth: u32,
}

impl FeatureSettings {
    /// Settings for a serial, profiled, PDT-instrumented application.
    pub fn new(cxx: impl Into<PathBuf>) -> Self {
        Self::with_compilers(
            CompilerSet::new().with(InstalledCompiler::new(cxx, CompilerRole::Cxx)),
        )
    }

    /// Default settings over an explicit compiler set.
    pub fn with_compilers(compilers: CompilerSet) -> Self {
        FeatureSettings {
            target_os: TargetOs::host(),
            target_arch: TargetArch::host().unwrap_or(TargetArch::X86_64),
            compilers,
            verbose: false,
            pdt: None,
            binutils: None,
            libunwind: None,
            papi: None,
            openmp_support: false,
            pthreads_support: false,
            mpi_support: false,
            mpi_include_path: Vec::new(),
            mpi_library_path: Vec::new(),
            mpi_libraries: Vec::new(),
            cuda_support: false,
            cuda_prefix: None,
            opencl_support: false,
            opencl_prefix: None,
            shmem_support: false,
            mpc_support: false,
            source_inst: SourceInst::Automatic,
            compiler_inst: CompilerInst::Fallback,
            link_only: false,
            io_inst: false,
            keep_inst_files: false,
            reuse_inst_files: false,
            select_file: None,
            profile: true,
            trace: false,
            sample: false,
            metrics: vec!["TIME".to_string()],
            measure_mpi: false,
            measure_openmp: OpenmpMeasure::None,
            measure_opencl: false,
            measure_pthreads: false,
            measure_cuda: false,
            measure_shmem: false,
            measure_mpc: false,
            measure_heap_usage: false,
            measure_memory_alloc: false,
            callpath_depth: 100,
        }
    }

    /// Validate the settings and freeze them.
    pub fn build(self) -> Result<FeatureConfig, ConfigError> {
        if !(self.profile || self.trace) {
            return Err(ConfigError::NoMeasurement);
        }

        if self.source_inst == SourceInst::Never
            && self.compiler_inst == CompilerInst::Never
            && !self.sample
        {
            return Err(ConfigError::NoInstrumentation);
        }

        let cxx = self
            .compilers
            .get(CompilerRole::Cxx)
            .map(|c| c.innermost().clone())
            .ok_or(ConfigError::MissingCompiler {
                role: CompilerRole::Cxx,
            })?;

        if self.mpi_support {
            for role in [CompilerRole::MpiCc, CompilerRole::MpiCxx] {
                if !self.compilers.contains(role) {
                    return Err(ConfigError::MissingCompiler { role });
                }
            }
        }

        Ok(FeatureConfig {
            settings: self,
            cxx,
        })
    }
}

/// A validated, immutable feature configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureConfig {
    settings: FeatureSettings,
    cxx: InstalledCompiler,
}

impl FeatureConfig {
    /// The C++ compiler after unwrapping any wrapper compilers.
    pub fn cxx_compiler(&self) -> &InstalledCompiler {
        &self.cxx
    }

    /// Selective instrumentation file as an absolute, symlink-resolved path.
    ///
    /// Falls back to the absolute path when the file cannot be canonicalized.
    pub fn resolved_select_file(&self) -> Option<PathBuf> {
        self.settings.select_file.as_deref().map(fs::absolute_path)
    }

    /// Whether the application binary receives any compile-time instrumentation.
    pub fn instruments_at_compile_time(&self) -> bool {
        self.settings.source_inst != SourceInst::Never
            || self.settings.compiler_inst != CompilerInst::Never
            || self.settings.link_only
    }
}

impl Deref for FeatureConfig {
    type Target = FeatureSettings;

    fn deref(&self) -> &FeatureSettings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = FeatureSettings::new("/usr/bin/g++").build().unwrap();
        assert!(config.profile);
        assert_eq!(config.cxx_compiler().command, "g++");
    }

    #[test]
    fn test_requires_profile_or_trace() {
        let mut settings = FeatureSettings::new("/usr/bin/g++");
        settings.profile = false;
        settings.trace = false;
        assert_eq!(settings.build().unwrap_err(), ConfigError::NoMeasurement);
    }

    #[test]
    fn test_requires_an_instrumentation_method() {
        let mut settings = FeatureSettings::new("/usr/bin/g++");
        settings.source_inst = SourceInst::Never;
        settings.compiler_inst = CompilerInst::Never;
        assert_eq!(
            settings.clone().build().unwrap_err(),
            ConfigError::NoInstrumentation
        );

        settings.sample = true;
        assert!(settings.build().is_ok());
    }

    #[test]
    fn test_mpi_requires_mpi_compilers() {
        let mut settings = FeatureSettings::new("/usr/bin/g++");
        settings.mpi_support = true;
        assert_eq!(
            settings.build().unwrap_err(),
            ConfigError::MissingCompiler {
                role: CompilerRole::MpiCc
            }
        );
    }

    #[test]
    fn test_keyword_parsing() {
        assert_eq!("OMPT".parse::<OpenmpMeasure>().unwrap(), OpenmpMeasure::Ompt);
        assert_eq!("fallback".parse::<CompilerInst>().unwrap(), CompilerInst::Fallback);
        let err = "sometimes".parse::<SourceInst>().unwrap_err();
        assert!(err.to_string().contains("source_inst"));
    }

    #[test]
    fn test_select_file_is_absolute() {
        let tmp = tempfile::TempDir::new().unwrap();
        let select = tmp.path().join("select.tau");
        std::fs::write(&select, "BEGIN_EXCLUDE_LIST\nEND_EXCLUDE_LIST\n").unwrap();

        let mut settings = FeatureSettings::new("/usr/bin/g++");
        settings.select_file = Some(select.clone());
        let config = settings.build().unwrap();

        let resolved = config.resolved_select_file().unwrap();
        assert!(resolved.is_absolute());
        assert_eq!(resolved, select.canonicalize().unwrap());
    }
}
