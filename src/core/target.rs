//! Target system description.
//!
//! TAU installs each build under `<prefix>/<tau-arch>/`, where the arch
//! directory name is derived from the target architecture and OS.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::InternalError;

/// Target operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetOs {
    Linux,
    Darwin,
    /// Cray Compute Node Linux
    #[serde(rename = "cnl")]
    CrayCnl,
    /// IBM BlueGene/Q compute node kernel
    #[serde(rename = "bgq")]
    BlueGeneQ,
}

impl TargetOs {
    /// Get the OS name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetOs::Linux => "linux",
            TargetOs::Darwin => "darwin",
            TargetOs::CrayCnl => "cnl",
            TargetOs::BlueGeneQ => "bgq",
        }
    }

    /// Detect the host operating system.
    pub fn host() -> Self {
        match std::env::consts::OS {
            "macos" => TargetOs::Darwin,
            _ => TargetOs::Linux,
        }
    }

    /// Whether compilation must always go through the TAU compiler wrappers.
    pub fn requires_compiler_wrapper(&self) -> bool {
        matches!(self, TargetOs::CrayCnl)
    }
}

impl fmt::Display for TargetOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetOs {
    type Err = TargetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linux" => Ok(TargetOs::Linux),
            "darwin" | "macos" => Ok(TargetOs::Darwin),
            "cnl" | "craycnl" | "cray_cnl" => Ok(TargetOs::CrayCnl),
            "bgq" | "bluegeneq" => Ok(TargetOs::BlueGeneQ),
            _ => Err(TargetParseError::Os(s.to_string())),
        }
    }
}

/// Target CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetArch {
    #[serde(rename = "x86_64")]
    X86_64,
    Ppc64,
    Ppc64le,
    Aarch64,
    /// BlueGene/Q PowerPC A2
    Bgq,
}

impl TargetArch {
    /// Get the architecture name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetArch::X86_64 => "x86_64",
            TargetArch::Ppc64 => "ppc64",
            TargetArch::Ppc64le => "ppc64le",
            TargetArch::Aarch64 => "aarch64",
            TargetArch::Bgq => "bgq",
        }
    }

    /// Detect the host architecture.
    pub fn host() -> Option<Self> {
        match std::env::consts::ARCH {
            "x86_64" => Some(TargetArch::X86_64),
            "powerpc64" => Some(if cfg!(target_endian = "little") {
                TargetArch::Ppc64le
            } else {
                TargetArch::Ppc64
            }),
            "aarch64" => Some(TargetArch::Aarch64),
            _ => None,
        }
    }
}

impl fmt::Display for TargetArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetArch {
    type Err = TargetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "x86_64" | "amd64" => Ok(TargetArch::X86_64),
            "ppc64" => Ok(TargetArch::Ppc64),
            "ppc64le" => Ok(TargetArch::Ppc64le),
            "aarch64" | "arm64" => Ok(TargetArch::Aarch64),
            "bgq" => Ok(TargetArch::Bgq),
            _ => Err(TargetParseError::Arch(s.to_string())),
        }
    }
}

/// Error returned when parsing an unknown OS or architecture name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetParseError {
    #[error("invalid target OS '{0}', valid values: linux, darwin, cnl, bgq")]
    Os(String),
    #[error("invalid target architecture '{0}', valid values: x86_64, ppc64, ppc64le, aarch64, bgq")]
    Arch(String),
}

/// Name of the directory TAU installs a build into for `arch` and `os`.
pub fn tau_arch(arch: TargetArch, os: TargetOs) -> Result<&'static str, InternalError> {
    let name = match (arch, os) {
        (TargetArch::X86_64, TargetOs::Linux) => "x86_64",
        (TargetArch::X86_64, TargetOs::Darwin) => "apple",
        (TargetArch::X86_64, TargetOs::CrayCnl) => "craycnl",
        (TargetArch::Ppc64 | TargetArch::Ppc64le, TargetOs::Linux) => "ibm64linux",
        (TargetArch::Aarch64, TargetOs::Linux) => "arm64_linux",
        (TargetArch::Aarch64, TargetOs::CrayCnl) => "craycnl",
        (TargetArch::Bgq, TargetOs::BlueGeneQ) => "bgq",
        _ => {
            return Err(InternalError::UnsupportedTarget {
                arch: arch.to_string(),
                os: os.to_string(),
            })
        }
    };
    Ok(name)
}
