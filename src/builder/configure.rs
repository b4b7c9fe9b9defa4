//! Arguments for TAU's `./configure` script.
//!
//! TAU's configure script cannot cope with absolute compiler paths or
//! versioned command names, and only accepts a single MPI include and library
//! directory, so the configuration is translated into the exact words it
//! expects.

use std::path::Path;

use anyhow::Result;

use crate::core::compiler::{CompilerRole, InstalledCompiler};
use crate::core::feature::{ConfigError, FeatureConfig, OpenmpMeasure};
use crate::core::target::tau_arch;
use crate::util::fs::first_dir_containing;

/// Flags for `./configure` that build TAU into `prefix` with every feature
/// `config` needs.
pub fn configure_args(config: &FeatureConfig, prefix: &Path) -> Result<Vec<String>> {
    let arch = tau_arch(config.target_arch, config.target_os)?;

    let mut mpiinc = None;
    let mut mpilib = None;
    let mut mpilibrary = None;

    // With MPI, the compilers wrapped by the MPI wrappers are passed instead
    let (cc, cxx, fc) = if config.mpi_support {
        if !config.mpi_include_path.is_empty() {
            match first_dir_containing(&config.mpi_include_path, "mpi.h")? {
                Some(dir) => mpiinc = Some(dir),
                None => {
                    return Err(ConfigError::MpiHeaderNotFound {
                        searched: config.mpi_include_path.clone(),
                    }
                    .into())
                }
            }
        }
        if !config.mpi_library_path.is_empty() {
            mpilib = first_dir_containing(&config.mpi_library_path, "libmpi*")?;
        }
        if !config.mpi_libraries.is_empty() {
            let libs: Vec<String> = config
                .mpi_libraries
                .iter()
                .map(|lib| format!("-l{}", lib))
                .collect();
            mpilibrary = Some(libs.join("#"));
        }

        (
            wrapped(config, CompilerRole::MpiCc),
            wrapped(config, CompilerRole::MpiCxx),
            wrapped(config, CompilerRole::MpiFc),
        )
    } else {
        (
            config.compilers.get(CompilerRole::Cc),
            config.compilers.get(CompilerRole::Cxx),
            config.compilers.get(CompilerRole::Fc),
        )
    };

    let fortran_magic = fc.map(InstalledCompiler::fortran_magic).transpose()?;

    let optional = |flag: &str, value: Option<String>| value.map(|v| format!("{}={}", flag, v));
    let switch = |flag: &str, on: bool| on.then(|| flag.to_string());

    let flags = [
        Some(format!("-prefix={}", prefix.display())),
        Some(format!("-arch={}", arch)),
        optional("-cc", cc.map(|c| c.base_command().to_string())),
        optional("-c++", cxx.map(|c| c.base_command().to_string())),
        optional("-fortran", fortran_magic.map(str::to_string)),
        optional(
            "-bfd",
            config.binutils.as_ref().map(|d| d.install_prefix.display().to_string()),
        ),
        optional(
            "-papi",
            config.papi.as_ref().map(|d| d.install_prefix.display().to_string()),
        ),
        optional(
            "-unwind",
            config.libunwind.as_ref().map(|d| d.install_prefix.display().to_string()),
        ),
        switch("-pthread", config.pthreads_support),
        switch("-mpi", config.mpi_support),
        optional("-mpiinc", mpiinc.map(|p| p.display().to_string())),
        optional("-mpilib", mpilib.map(|p| p.display().to_string())),
        optional("-mpilibrary", mpilibrary),
        optional(
            "-cuda",
            config.cuda_prefix.as_ref().map(|p| p.display().to_string()),
        ),
        optional(
            "-opencl",
            config.opencl_prefix.as_ref().map(|p| p.display().to_string()),
        ),
    ];
    let mut args: Vec<String> = flags.into_iter().flatten().collect();

    if let Some(pdt) = &config.pdt {
        args.push(format!("-pdt={}", pdt.install_prefix.display()));
        args.push(format!("-pdt_c++={}", config.cxx_compiler().base_command()));
    }

    if config.openmp_support {
        args.push("-openmp".to_string());
        match config.measure_openmp {
            OpenmpMeasure::Ompt => args.push("-ompt=download".to_string()),
            OpenmpMeasure::Opari => args.push("-opari".to_string()),
            OpenmpMeasure::None => {}
        }
    }

    if config.io_inst {
        args.push("-iowrapper".to_string());
    }

    tracing::debug!("configure arguments: {}", args.join(" "));
    Ok(args)
}

fn wrapped(config: &FeatureConfig, role: CompilerRole) -> Option<&InstalledCompiler> {
    config.compilers.get(role).map(InstalledCompiler::wrapped_or_self)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    use crate::core::compiler::CompilerSet;
    use crate::core::error::InternalError;
    use crate::core::feature::{DependencyInstall, FeatureSettings};
    use crate::core::target::{TargetArch, TargetOs};
    use crate::test_support::{gnu_settings, mpi_settings};

    fn linux(mut settings: FeatureSettings) -> FeatureSettings {
        settings.target_os = TargetOs::Linux;
        settings.target_arch = TargetArch::X86_64;
        settings
    }

    #[test]
    fn test_serial_configure() {
        let mut settings = linux(gnu_settings());
        settings.compilers.insert(InstalledCompiler::new("/usr/bin/gfortran-12", CompilerRole::Fc));
        settings.pdt = Some(DependencyInstall::at("/opt/pdt"));
        settings.papi = Some(DependencyInstall::at("/opt/papi"));
        settings.io_inst = true;
        settings.openmp_support = true;
        settings.measure_openmp = OpenmpMeasure::Ompt;
        let config = settings.build().unwrap();

        let args = configure_args(&config, Path::new("/opt/tau")).unwrap();
        assert_eq!(
            args,
            vec![
                "-prefix=/opt/tau",
                "-arch=x86_64",
                "-cc=gcc",
                "-c++=g++",
                "-fortran=gfortran",
                "-papi=/opt/papi",
                "-pdt=/opt/pdt",
                "-pdt_c++=g++",
                "-openmp",
                "-ompt=download",
                "-iowrapper",
            ]
        );
    }

    #[test]
    fn test_mpi_configure_uses_wrapped_compilers() {
        let tmp = tempfile::TempDir::new().unwrap();
        let inc_missing = tmp.path().join("inc0");
        let inc = tmp.path().join("inc1");
        let lib = tmp.path().join("lib");
        for dir in [&inc_missing, &inc, &lib] {
            fs::create_dir_all(dir).unwrap();
        }
        fs::write(inc.join("mpi.h"), "").unwrap();
        fs::write(lib.join("libmpi.so"), "").unwrap();

        let mut settings = linux(mpi_settings("/opt/intel/bin/icpc"));
        settings.mpi_include_path = vec![inc_missing, inc.clone()];
        settings.mpi_library_path = vec![lib.clone()];
        settings.mpi_libraries = vec!["mpi".to_string(), "mpi_cxx".to_string()];
        let config = settings.build().unwrap();

        let args = configure_args(&config, Path::new("/opt/tau")).unwrap();
        assert!(args.contains(&"-cc=gcc".to_string()));
        assert!(args.contains(&"-c++=icpc".to_string()));
        assert!(args.contains(&"-mpi".to_string()));
        assert!(args.contains(&format!("-mpiinc={}", inc.display())));
        assert!(args.contains(&format!("-mpilib={}", lib.display())));
        assert!(args.contains(&"-mpilibrary=-lmpi#-lmpi_cxx".to_string()));
    }

    #[test]
    fn test_missing_mpi_header_fails() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut settings = linux(mpi_settings("/usr/bin/g++"));
        settings.mpi_include_path = vec![tmp.path().to_path_buf()];
        let config = settings.build().unwrap();

        let err = configure_args(&config, Path::new("/opt/tau")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::MpiHeaderNotFound { .. })
        ));
    }

    #[test]
    fn test_unmapped_fortran_family_fails() {
        let compilers = CompilerSet::new()
            .with(InstalledCompiler::new("/usr/bin/clang++", CompilerRole::Cxx))
            .with(InstalledCompiler::new("/usr/bin/flang", CompilerRole::Fc));
        let config = linux(FeatureSettings::with_compilers(compilers))
            .build()
            .unwrap();

        let err = configure_args(&config, Path::new("/opt/tau")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InternalError>(),
            Some(InternalError::UnmappedFortranFamily { .. })
        ));
    }

    #[test]
    fn test_unsupported_target_fails() {
        let mut settings = gnu_settings();
        settings.target_os = TargetOs::Darwin;
        settings.target_arch = TargetArch::Bgq;
        let config = settings.build().unwrap();

        let err = configure_args(&config, &PathBuf::from("/opt/tau")).unwrap_err();
        assert!(err.downcast_ref::<InternalError>().is_some());
    }
}
