//! Compiler roles, families, and installed compiler descriptions.
//!
//! Both roles and families are closed enumerations; every mapping over them
//! (wrapper scripts, variant tags, Fortran magic words) is an exhaustive
//! `match`, so a new family cannot silently fall through.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::InternalError;

/// The job a compiler fills in a target configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CompilerRole {
    #[serde(rename = "CC")]
    Cc,
    #[serde(rename = "CXX")]
    Cxx,
    #[serde(rename = "FC")]
    Fc,
    #[serde(rename = "UPC")]
    Upc,
    #[serde(rename = "MPI_CC")]
    MpiCc,
    #[serde(rename = "MPI_CXX")]
    MpiCxx,
    #[serde(rename = "MPI_FC")]
    MpiFc,
}

impl CompilerRole {
    /// All roles.
    pub const ALL: &'static [CompilerRole] = &[
        CompilerRole::Cc,
        CompilerRole::Cxx,
        CompilerRole::Fc,
        CompilerRole::Upc,
        CompilerRole::MpiCc,
        CompilerRole::MpiCxx,
        CompilerRole::MpiFc,
    ];

    /// Get the role keyword, e.g. `MPI_CXX`.
    pub fn keyword(&self) -> &'static str {
        match self {
            CompilerRole::Cc => "CC",
            CompilerRole::Cxx => "CXX",
            CompilerRole::Fc => "FC",
            CompilerRole::Upc => "UPC",
            CompilerRole::MpiCc => "MPI_CC",
            CompilerRole::MpiCxx => "MPI_CXX",
            CompilerRole::MpiFc => "MPI_FC",
        }
    }

    /// The TAU compiler wrapper script for this role.
    ///
    /// C, C++, and Fortran wrappers are shared between the plain and MPI roles.
    pub fn wrapper(&self) -> WrapperScript {
        match self {
            CompilerRole::Cc | CompilerRole::MpiCc => WrapperScript::TauCc,
            CompilerRole::Cxx | CompilerRole::MpiCxx => WrapperScript::TauCxx,
            CompilerRole::Fc | CompilerRole::MpiFc => WrapperScript::TauF90,
            CompilerRole::Upc => WrapperScript::TauUpc,
        }
    }
}

impl fmt::Display for CompilerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for CompilerRole {
    type Err = CompilerParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CompilerRole::ALL
            .iter()
            .copied()
            .find(|role| role.keyword().eq_ignore_ascii_case(s))
            .ok_or_else(|| CompilerParseError::Role(s.to_string()))
    }
}

/// TAU compiler wrapper scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapperScript {
    TauCc,
    TauCxx,
    TauF90,
    TauUpc,
}

impl WrapperScript {
    /// Script command name, without path.
    pub fn command(&self) -> &'static str {
        match self {
            WrapperScript::TauCc => "tau_cc.sh",
            WrapperScript::TauCxx => "tau_cxx.sh",
            WrapperScript::TauF90 => "tau_f90.sh",
            WrapperScript::TauUpc => "tau_upc.sh",
        }
    }
}

impl fmt::Display for WrapperScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command())
    }
}

/// Compiler vendor family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompilerFamily {
    Gnu,
    Intel,
    Pgi,
    Cray,
    Ibm,
    IbmBg,
    Llvm,
    /// `mpicc`/`mpicxx`/`mpif90` wrappers from the system MPI
    SystemMpi,
    /// `mpiicc`/`mpiicpc`/`mpiifort`
    IntelMpi,
    /// `mpixlc`/`mpixlC`/`mpixlf90`
    IbmMpi,
    Other,
}

impl CompilerFamily {
    /// Get the family name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompilerFamily::Gnu => "gnu",
            CompilerFamily::Intel => "intel",
            CompilerFamily::Pgi => "pgi",
            CompilerFamily::Cray => "cray",
            CompilerFamily::Ibm => "ibm",
            CompilerFamily::IbmBg => "ibm_bg",
            CompilerFamily::Llvm => "llvm",
            CompilerFamily::SystemMpi => "system_mpi",
            CompilerFamily::IntelMpi => "intel_mpi",
            CompilerFamily::IbmMpi => "ibm_mpi",
            CompilerFamily::Other => "other",
        }
    }

    /// Guess the family from a compiler command name.
    ///
    /// Version suffixes are ignored (`gcc-12` is GNU). Unrecognized commands
    /// are `Other`.
    pub fn detect(command: &str) -> Self {
        let name = command.to_lowercase();
        let name = name.split('-').next().unwrap_or(&name);

        match name {
            "gcc" | "g++" | "cc" | "c++" | "gfortran" | "gupc" => CompilerFamily::Gnu,
            "icc" | "icpc" | "ifort" | "icx" | "icpx" | "ifx" => CompilerFamily::Intel,
            "pgcc" | "pgc++" | "pgcpp" | "pgf90" | "pgfortran" => CompilerFamily::Pgi,
            "craycc" | "craycxx" | "crayftn" | "ftn" => CompilerFamily::Cray,
            "xlc" | "xlc_r" | "xlc++" | "xlc++_r" | "xlf" | "xlf90" | "xlf_r" | "xlf90_r" => {
                CompilerFamily::Ibm
            }
            "bgxlc" | "bgxlc_r" | "bgxlc++" | "bgxlc++_r" | "bgxlf" | "bgxlf90" | "bgxlf_r" => {
                CompilerFamily::IbmBg
            }
            "clang" | "clang++" | "flang" => CompilerFamily::Llvm,
            "mpicc" | "mpicxx" | "mpic++" | "mpif77" | "mpif90" | "mpifort" => {
                CompilerFamily::SystemMpi
            }
            "mpiicc" | "mpiicpc" | "mpiifort" => CompilerFamily::IntelMpi,
            "mpixlc" | "mpixlc_r" | "mpixlcxx" | "mpixlf90" | "mpixlf90_r" => {
                CompilerFamily::IbmMpi
            }
            _ => CompilerFamily::Other,
        }
    }

    /// The word TAU's configure script expects for a Fortran compiler of this family.
    pub fn fortran_magic(&self) -> Option<&'static str> {
        match self {
            CompilerFamily::Gnu => Some("gfortran"),
            CompilerFamily::Intel => Some("intel"),
            CompilerFamily::Pgi => Some("pgi"),
            CompilerFamily::Cray => Some("cray"),
            CompilerFamily::Ibm | CompilerFamily::IbmBg | CompilerFamily::IbmMpi => Some("ibm"),
            CompilerFamily::SystemMpi => Some("mpif90"),
            CompilerFamily::IntelMpi => Some("mpiifort"),
            CompilerFamily::Llvm | CompilerFamily::Other => None,
        }
    }
}

impl fmt::Display for CompilerFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompilerFamily {
    type Err = CompilerParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "gnu" | "gcc" => Ok(CompilerFamily::Gnu),
            "intel" => Ok(CompilerFamily::Intel),
            "pgi" => Ok(CompilerFamily::Pgi),
            "cray" => Ok(CompilerFamily::Cray),
            "ibm" => Ok(CompilerFamily::Ibm),
            "ibm_bg" => Ok(CompilerFamily::IbmBg),
            "llvm" | "clang" => Ok(CompilerFamily::Llvm),
            "system_mpi" | "mpi" => Ok(CompilerFamily::SystemMpi),
            "intel_mpi" => Ok(CompilerFamily::IntelMpi),
            "ibm_mpi" => Ok(CompilerFamily::IbmMpi),
            "other" => Ok(CompilerFamily::Other),
            _ => Err(CompilerParseError::Family(s.to_string())),
        }
    }
}

/// Error returned when parsing a compiler role or family name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompilerParseError {
    #[error("invalid compiler role '{0}', valid values: CC, CXX, FC, UPC, MPI_CC, MPI_CXX, MPI_FC")]
    Role(String),
    #[error("invalid compiler family '{0}'")]
    Family(String),
}

/// A compiler found on the target system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledCompiler {
    /// Absolute path to the compiler executable
    pub absolute_path: PathBuf,
    /// Bare command name, e.g. `icpc`
    pub command: String,
    /// Vendor family
    pub family: CompilerFamily,
    /// Role this compiler fills
    pub role: CompilerRole,
    /// Compiler wrapped by this one (MPI wrappers wrap a base compiler)
    pub wrapped: Option<Box<InstalledCompiler>>,
}

impl InstalledCompiler {
    /// Describe a compiler, detecting its family from the command name.
    pub fn new(path: impl Into<PathBuf>, role: CompilerRole) -> Self {
        let absolute_path = path.into();
        let command = command_name(&absolute_path);
        let family = CompilerFamily::detect(&command);
        InstalledCompiler {
            absolute_path,
            command,
            family,
            role,
            wrapped: None,
        }
    }

    /// Override the detected family.
    pub fn with_family(mut self, family: CompilerFamily) -> Self {
        self.family = family;
        self
    }

    /// Record the compiler this one wraps.
    pub fn wrapping(mut self, inner: InstalledCompiler) -> Self {
        self.wrapped = Some(Box::new(inner));
        self
    }

    /// The innermost compiler after unwrapping every wrapper.
    pub fn innermost(&self) -> &InstalledCompiler {
        let mut compiler = self;
        while let Some(inner) = compiler.wrapped.as_deref() {
            compiler = inner;
        }
        compiler
    }

    /// The compiler directly wrapped by this one, or itself.
    pub fn wrapped_or_self(&self) -> &InstalledCompiler {
        self.wrapped.as_deref().unwrap_or(self)
    }

    /// The command without a version suffix, e.g. `gcc` for `gcc-12`.
    pub fn base_command(&self) -> &str {
        match self.command.split_once('-') {
            Some((base, version)) if version.starts_with(|c: char| c.is_ascii_digit()) => base,
            _ => &self.command,
        }
    }

    /// TAU's configure word for this compiler when used for Fortran.
    pub fn fortran_magic(&self) -> Result<&'static str, InternalError> {
        self.family
            .fortran_magic()
            .ok_or_else(|| InternalError::UnmappedFortranFamily {
                family: self.family.to_string(),
                command: self.absolute_path.display().to_string(),
            })
    }
}

fn command_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string()
}

/// The compilers of a target configuration, keyed by role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerSet {
    compilers: BTreeMap<CompilerRole, InstalledCompiler>,
}

impl CompilerSet {
    /// Create an empty compiler set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a compiler under its own role, replacing any previous one.
    pub fn insert(&mut self, compiler: InstalledCompiler) {
        self.compilers.insert(compiler.role, compiler);
    }

    /// Add a compiler (builder style).
    pub fn with(mut self, compiler: InstalledCompiler) -> Self {
        self.insert(compiler);
        self
    }

    /// Get the compiler for a role.
    pub fn get(&self, role: CompilerRole) -> Option<&InstalledCompiler> {
        self.compilers.get(&role)
    }

    /// Whether a compiler is configured for a role.
    pub fn contains(&self, role: CompilerRole) -> bool {
        self.compilers.contains_key(&role)
    }

    /// Iterate compilers in role order.
    pub fn iter(&self) -> impl Iterator<Item = &InstalledCompiler> {
        self.compilers.values()
    }
}
