//! Feature configuration file parsing.
//!
//! A feature file describes the target system, its compilers, dependency
//! installations, and the requested application support, instrumentation,
//! and measurement features:
//!
//! ```toml
//! [target]
//! os = "linux"
//! arch = "x86_64"
//!
//! [compilers]
//! CC = "/usr/bin/gcc"
//! CXX = "/usr/bin/g++"
//! MPI_CXX = { path = "/usr/bin/mpicxx", wraps = "/usr/bin/g++" }
//!
//! [dependencies]
//! pdt = "/opt/pdt"
//! papi = { prefix = "/opt/papi", include = "/opt/papi/include" }
//!
//! [application]
//! openmp = true
//!
//! [instrumentation]
//! source = "automatic"
//! compiler = "fallback"
//!
//! [measurement]
//! profile = true
//! openmp = "ompt"
//! metrics = ["TIME", "PAPI_FP_INS"]
//! ```
//!
//! Every field is optional; omitted fields keep the defaults of
//! [`FeatureSettings::with_compilers`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::compiler::{CompilerFamily, CompilerRole, CompilerSet, InstalledCompiler};
use crate::core::feature::{
    CompilerInst, DependencyInstall, FeatureConfig, FeatureSettings, OpenmpMeasure, SourceInst,
};
use crate::core::target::{TargetArch, TargetOs};

/// Conventional file name for a feature configuration.
pub const FEATURE_FILE_NAME: &str = "taucmdr.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawManifest {
    #[serde(default)]
    target: RawTarget,
    #[serde(default)]
    compilers: BTreeMap<String, RawCompiler>,
    #[serde(default)]
    dependencies: RawDependencies,
    #[serde(default)]
    application: RawApplication,
    #[serde(default)]
    instrumentation: RawInstrumentation,
    #[serde(default)]
    measurement: RawMeasurement,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTarget {
    os: Option<TargetOs>,
    arch: Option<TargetArch>,
}

/// A compiler given either as a bare path or as a detailed table.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCompiler {
    Path(PathBuf),
    Detailed {
        path: PathBuf,
        family: Option<CompilerFamily>,
        wraps: Option<Box<RawCompiler>>,
    },
}

/// A dependency given either as an install prefix or as a detailed table.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDependency {
    Prefix(PathBuf),
    Detailed {
        prefix: PathBuf,
        include: Option<PathBuf>,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDependencies {
    pdt: Option<RawDependency>,
    binutils: Option<RawDependency>,
    libunwind: Option<RawDependency>,
    papi: Option<RawDependency>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawApplication {
    openmp: Option<bool>,
    pthreads: Option<bool>,
    mpi: Option<bool>,
    mpi_include_path: Option<Vec<PathBuf>>,
    mpi_library_path: Option<Vec<PathBuf>>,
    mpi_libraries: Option<Vec<String>>,
    cuda: Option<bool>,
    cuda_prefix: Option<PathBuf>,
    opencl: Option<bool>,
    opencl_prefix: Option<PathBuf>,
    shmem: Option<bool>,
    mpc: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawInstrumentation {
    source: Option<SourceInst>,
    compiler: Option<CompilerInst>,
    link_only: Option<bool>,
    io: Option<bool>,
    keep_files: Option<bool>,
    reuse_files: Option<bool>,
    select_file: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMeasurement {
    verbose: Option<bool>,
    profile: Option<bool>,
    trace: Option<bool>,
    sample: Option<bool>,
    metrics: Option<Vec<String>>,
    mpi: Option<bool>,
    openmp: Option<OpenmpMeasure>,
    opencl: Option<bool>,
    pthreads: Option<bool>,
    cuda: Option<bool>,
    shmem: Option<bool>,
    mpc: Option<bool>,
    heap_usage: Option<bool>,
    memory_alloc: Option<bool>,
    callpath: Option<u32>,
}

/// Copy every present raw value over the corresponding setting.
macro_rules! overlay {
    ($settings:ident, $raw:expr, { $($field:ident <- $value:ident),+ $(,)? }) => {
        $(
            if let Some(v) = $raw.$value {
                $settings.$field = v;
            }
        )+
    };
}

/// Loader for feature configuration files.
pub struct FeatureManifest;

impl FeatureManifest {
    /// Load and validate a feature configuration file.
    pub fn load(path: &Path) -> Result<FeatureConfig> {
        Self::load_with_target(path, None, None)
    }

    /// Like [`FeatureManifest::load`], with target defaults for a file that
    /// leaves `os` or `arch` unset.
    pub fn load_with_target(
        path: &Path,
        os: Option<TargetOs>,
        arch: Option<TargetArch>,
    ) -> Result<FeatureConfig> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read feature configuration: {}", path.display()))?;

        Self::parse_with_target(&content, path, os, arch)
    }

    /// Parse and validate feature configuration content.
    ///
    /// Relative paths in the file are resolved against the file's directory.
    pub fn parse(content: &str, path: &Path) -> Result<FeatureConfig> {
        Self::parse_with_target(content, path, None, None)
    }

    fn parse_with_target(
        content: &str,
        path: &Path,
        os: Option<TargetOs>,
        arch: Option<TargetArch>,
    ) -> Result<FeatureConfig> {
        let raw: RawManifest = toml::from_str(content)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        let base = path.parent().unwrap_or(Path::new(".")).to_path_buf();

        let mut compilers = CompilerSet::new();
        for (keyword, raw_compiler) in raw.compilers {
            let role: CompilerRole = keyword
                .parse()
                .with_context(|| format!("in [compilers] of {}", path.display()))?;
            compilers.insert(convert_compiler(raw_compiler, role, &base));
        }

        let mut settings = FeatureSettings::with_compilers(compilers);
        let target = RawTarget {
            os: raw.target.os.or(os),
            arch: raw.target.arch.or(arch),
        };
        overlay!(settings, target, { target_os <- os, target_arch <- arch });

        let deps = raw.dependencies;
        settings.pdt = deps.pdt.map(|d| convert_dependency(d, &base));
        settings.binutils = deps.binutils.map(|d| convert_dependency(d, &base));
        settings.libunwind = deps.libunwind.map(|d| convert_dependency(d, &base));
        settings.papi = deps.papi.map(|d| convert_dependency(d, &base));

        let app = raw.application;
        overlay!(settings, app, {
            openmp_support <- openmp,
            pthreads_support <- pthreads,
            mpi_support <- mpi,
            mpi_libraries <- mpi_libraries,
            cuda_support <- cuda,
            opencl_support <- opencl,
            shmem_support <- shmem,
            mpc_support <- mpc,
        });
        if let Some(paths) = app.mpi_include_path {
            settings.mpi_include_path = paths.iter().map(|p| base.join(p)).collect();
        }
        if let Some(paths) = app.mpi_library_path {
            settings.mpi_library_path = paths.iter().map(|p| base.join(p)).collect();
        }
        settings.cuda_prefix = app.cuda_prefix.map(|p| base.join(p));
        settings.opencl_prefix = app.opencl_prefix.map(|p| base.join(p));

        let inst = raw.instrumentation;
        overlay!(settings, inst, {
            source_inst <- source,
            compiler_inst <- compiler,
            link_only <- link_only,
            io_inst <- io,
            keep_inst_files <- keep_files,
            reuse_inst_files <- reuse_files,
        });
        settings.select_file = inst.select_file.map(|p| base.join(p));

        overlay!(settings, raw.measurement, {
            verbose <- verbose,
            profile <- profile,
            trace <- trace,
            sample <- sample,
            metrics <- metrics,
            measure_mpi <- mpi,
            measure_openmp <- openmp,
            measure_opencl <- opencl,
            measure_pthreads <- pthreads,
            measure_cuda <- cuda,
            measure_shmem <- shmem,
            measure_mpc <- mpc,
            measure_heap_usage <- heap_usage,
            measure_memory_alloc <- memory_alloc,
            callpath_depth <- callpath,
        });

        settings
            .build()
            .with_context(|| format!("invalid feature configuration: {}", path.display()))
    }
}

fn convert_compiler(raw: RawCompiler, role: CompilerRole, base: &Path) -> InstalledCompiler {
    match raw {
        RawCompiler::Path(path) => InstalledCompiler::new(resolve_command(&path, base), role),
        RawCompiler::Detailed {
            path,
            family,
            wraps,
        } => {
            let mut compiler = InstalledCompiler::new(resolve_command(&path, base), role);
            if let Some(family) = family {
                compiler = compiler.with_family(family);
            }
            if let Some(inner) = wraps {
                compiler = compiler.wrapping(convert_compiler(*inner, role, base));
            }
            compiler
        }
    }
}

fn convert_dependency(raw: RawDependency, base: &Path) -> DependencyInstall {
    match raw {
        RawDependency::Prefix(prefix) => DependencyInstall::at(base.join(prefix)),
        RawDependency::Detailed { prefix, include } => {
            let dep = DependencyInstall::at(base.join(prefix));
            match include {
                Some(include) => dep.with_include_path(base.join(include)),
                None => dep,
            }
        }
    }
}

/// Resolve a compiler command: bare names are looked up on `PATH`, relative
/// paths are taken relative to the configuration file.
fn resolve_command(path: &Path, base: &Path) -> PathBuf {
    if path.components().count() == 1 && !path.is_absolute() {
        match which::which(path) {
            Ok(found) => found,
            Err(_) => {
                tracing::debug!("compiler `{}` not found on PATH", path.display());
                path.to_path_buf()
            }
        }
    } else {
        base.join(path)
    }
}
