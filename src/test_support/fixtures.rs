//! Test fixtures for common test scenarios.
//!
//! Feature settings with realistic compiler sets, and fake TAU install trees
//! laid out the way a real installation is.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::compiler::{CompilerRole, CompilerSet, InstalledCompiler};
use crate::core::feature::FeatureSettings;
use crate::core::target::{TargetArch, TargetOs};

/// Serial settings with GNU C and C++ compilers.
pub fn gnu_settings() -> FeatureSettings {
    let compilers = CompilerSet::new()
        .with(InstalledCompiler::new("/usr/bin/gcc", CompilerRole::Cc))
        .with(InstalledCompiler::new("/usr/bin/g++", CompilerRole::Cxx));
    FeatureSettings::with_compilers(compilers)
}

/// MPI settings whose C++ compilers are `mpicxx` wrapping `cxx`.
///
/// `MPI_CC` is `mpicc` wrapping GNU `gcc`.
pub fn mpi_settings(cxx: &str) -> FeatureSettings {
    let base_cxx = InstalledCompiler::new(cxx, CompilerRole::Cxx);
    let gcc = InstalledCompiler::new("/usr/bin/gcc", CompilerRole::Cc);

    let compilers = CompilerSet::new()
        .with(gcc.clone())
        .with(InstalledCompiler::new("/usr/bin/mpicxx", CompilerRole::Cxx).wrapping(base_cxx.clone()))
        .with(InstalledCompiler::new("/usr/bin/mpicc", CompilerRole::MpiCc).wrapping(gcc))
        .with(InstalledCompiler::new("/usr/bin/mpicxx", CompilerRole::MpiCxx).wrapping(base_cxx));

    let mut settings = FeatureSettings::with_compilers(compilers);
    settings.mpi_support = true;
    settings
}

/// Pin settings to an x86_64 Linux target.
pub fn linux(mut settings: FeatureSettings) -> FeatureSettings {
    settings.target_os = TargetOs::Linux;
    settings.target_arch = TargetArch::X86_64;
    settings
}

/// A TAU install tree in a temporary directory, for x86_64 Linux.
pub struct FakeInstall {
    tmp: TempDir,
}

impl FakeInstall {
    /// Create `<prefix>/x86_64/{bin,lib}` with empty variant makefiles.
    pub fn new(makefiles: &[&str]) -> Self {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let install = FakeInstall { tmp };
        fs::create_dir_all(install.bin_dir()).expect("failed to create bin dir");
        fs::create_dir_all(install.lib_dir()).expect("failed to create lib dir");
        for name in makefiles {
            install.makefile(name, "");
        }
        install
    }

    pub fn prefix(&self) -> &Path {
        self.tmp.path()
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.prefix().join("x86_64").join("bin")
    }

    pub fn lib_dir(&self) -> PathBuf {
        self.prefix().join("x86_64").join("lib")
    }

    /// Write a variant makefile with the given contents.
    pub fn makefile(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.lib_dir().join(name);
        fs::write(&path, contents).expect("failed to write makefile");
        path
    }

    /// Create an empty file under the library directory.
    pub fn lib_file(&self, relative: &str) -> PathBuf {
        let path = self.lib_dir().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        fs::write(&path, "").expect("failed to write file");
        path
    }
}
