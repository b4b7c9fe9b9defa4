//! Installation verification.
//!
//! Checks that an install prefix has the expected layout, that a variant
//! matching the configuration exists, and that the variant was built against
//! the same binutils, libunwind, and PAPI the configuration names. Any
//! mismatch fails verification; nothing is repaired.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::ops::installation::TauInstallation;
use crate::resolver::{self, ResolveError, Selection};
use crate::sources::VariantCatalog;
use crate::util::diagnostic::{suggestions, Diagnostic, DiagnosticSink};
use crate::util::fs::glob_paths;

/// Build-metadata key holding binutils' include flag.
pub const BFD_INCLUDE_KEY: &str = "BFDINCLUDE";
/// Build-metadata key holding libunwind's include flag.
pub const UNWIND_INCLUDE_KEY: &str = "UNWIND_INC";
/// Build-metadata key holding PAPI's install prefix.
pub const PAPI_DIR_KEY: &str = "PAPIDIR";

/// Why an installation failed verification.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("'{}' does not exist or is not a directory", path.display())]
    MissingDirectory { path: PathBuf },

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("{field} in TAU Makefile doesn't match target {dependency} installation")]
    Mismatch {
        field: &'static str,
        dependency: &'static str,
        recorded: String,
        expected: String,
        makefile: PathBuf,
    },

    #[error("iowrap libraries or link options not found")]
    MissingIoWrapper { lib_dir: PathBuf },

    #[error("failed to read '{}': {message}", path.display())]
    Io { path: PathBuf, message: String },
}

impl VerifyError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            VerifyError::Resolve(e) => e.to_diagnostic(),
            VerifyError::Mismatch {
                recorded,
                expected,
                makefile,
                ..
            } => Diagnostic::error(self.to_string())
                .with_location(makefile)
                .with_context(format!("recorded: {}", recorded))
                .with_context(format!("expected: {}", expected))
                .with_suggestion(suggestions::REINSTALL),
            VerifyError::MissingIoWrapper { lib_dir } => Diagnostic::error(self.to_string())
                .with_location(lib_dir)
                .with_suggestion(suggestions::REINSTALL),
            VerifyError::MissingDirectory { .. } | VerifyError::Io { .. } => {
                Diagnostic::error(self.to_string()).with_suggestion(suggestions::REINSTALL)
            }
        }
    }
}

/// Verify an installation against its configuration.
///
/// Returns the selected variant on success.
pub fn verify(
    installation: &TauInstallation,
    sink: &dyn DiagnosticSink,
) -> Result<Selection, VerifyError> {
    for dir in [
        installation.prefix().to_path_buf(),
        installation.bin_dir(),
        installation.lib_dir(),
    ] {
        if !dir.is_dir() {
            return Err(VerifyError::MissingDirectory { path: dir });
        }
    }

    let lib_dir = installation.lib_dir();
    let catalog = VariantCatalog::scan(&lib_dir).map_err(|e| VerifyError::Io {
        path: lib_dir.clone(),
        message: format!("{:#}", e),
    })?;
    let selection = resolver::select(
        &installation.tags(),
        &installation.incompatible_tags(),
        &catalog,
        sink,
    )?;

    check_metadata(installation, &selection.variant.path)?;

    if installation.config().io_inst {
        check_io_wrapper(&lib_dir)?;
    }

    tracing::debug!(
        "TAU installation at '{}' is valid",
        installation.prefix().display()
    );
    Ok(selection)
}

fn check_metadata(installation: &TauInstallation, makefile: &Path) -> Result<(), VerifyError> {
    let config = installation.config();
    let content = std::fs::read_to_string(makefile).map_err(|e| VerifyError::Io {
        path: makefile.to_path_buf(),
        message: e.to_string(),
    })?;

    let checks = [
        (
            BFD_INCLUDE_KEY,
            "BFD",
            config.binutils.as_ref().map(|d| &d.include_path),
            true,
        ),
        (
            UNWIND_INCLUDE_KEY,
            "libunwind",
            config.libunwind.as_ref().map(|d| &d.include_path),
            true,
        ),
        (
            PAPI_DIR_KEY,
            "PAPI",
            config.papi.as_ref().map(|d| &d.install_prefix),
            false,
        ),
    ];

    for line in content.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();

        for (field, dependency, expected, include_flag) in &checks {
            let Some(expected) = expected else {
                continue;
            };
            if key != *field {
                continue;
            }

            let mut recorded = value.trim();
            if *include_flag {
                recorded = recorded.strip_prefix("-I").unwrap_or(recorded);
            }

            let expected = expected.display().to_string();
            if recorded != expected {
                tracing::debug!("{}='{}' != '{}'", field, recorded, expected);
                return Err(VerifyError::Mismatch {
                    field: *field,
                    dependency: *dependency,
                    recorded: recorded.to_string(),
                    expected,
                    makefile: makefile.to_path_buf(),
                });
            }
        }
    }

    Ok(())
}

fn check_io_wrapper(lib_dir: &Path) -> Result<(), VerifyError> {
    let shared = glob_paths(&lib_dir.join("shared"), "libTAU-iowrap*").map_err(|e| {
        VerifyError::Io {
            path: lib_dir.to_path_buf(),
            message: format!("{:#}", e),
        }
    })?;
    tracing::debug!("found iowrap shared libraries: {:?}", shared);

    let link_options = lib_dir
        .join("wrappers")
        .join("io_wrapper")
        .join("link_options.tau");

    if shared.is_empty() && !link_options.exists() {
        return Err(VerifyError::MissingIoWrapper {
            lib_dir: lib_dir.to_path_buf(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::feature::{DependencyInstall, FeatureSettings};
    use crate::test_support::{gnu_settings, linux, FakeInstall};
    use crate::util::diagnostic::CollectingSink;

    fn installation(
        fake: &FakeInstall,
        configure: impl FnOnce(&mut FeatureSettings),
    ) -> TauInstallation {
        let mut settings = linux(gnu_settings());
        configure(&mut settings);
        TauInstallation::new(fake.prefix(), settings.build().unwrap()).unwrap()
    }

    #[test]
    fn test_valid_installation() {
        let fake = FakeInstall::new(&[]);
        fake.makefile(
            "Makefile.tau-papi-pdt",
            "PAPIDIR=/opt/papi\nBFDINCLUDE=-I/opt/binutils/include\nUNWIND_INC=\n",
        );
        let install = installation(&fake, |s| {
            s.metrics = vec!["PAPI_TOT_CYC".to_string()];
            s.papi = Some(DependencyInstall::at("/opt/papi"));
            s.binutils = Some(DependencyInstall::at("/opt/binutils"));
        });

        let selection = verify(&install, &CollectingSink::new()).unwrap();
        assert!(selection.is_exact());
    }

    #[test]
    fn test_missing_arch_directory() {
        let tmp = tempfile::TempDir::new().unwrap();
        let settings = linux(gnu_settings());
        let install = TauInstallation::new(tmp.path(), settings.build().unwrap()).unwrap();

        let err = verify(&install, &CollectingSink::new()).unwrap_err();
        assert!(matches!(err, VerifyError::MissingDirectory { .. }));
    }

    #[test]
    fn test_no_matching_variant() {
        let fake = FakeInstall::new(&["Makefile.tau-mpi-pdt"]);
        let install = installation(&fake, |_| {});

        let err = verify(&install, &CollectingSink::new()).unwrap_err();
        assert!(matches!(err, VerifyError::Resolve(_)));
    }

    #[test]
    fn test_bfd_mismatch_names_field() {
        let fake = FakeInstall::new(&[]);
        fake.makefile("Makefile.tau-pdt", "BFDINCLUDE=-I/usr/include\n");
        let install = installation(&fake, |s| {
            s.binutils = Some(DependencyInstall::at("/opt/binutils"));
        });

        let err = verify(&install, &CollectingSink::new()).unwrap_err();
        match &err {
            VerifyError::Mismatch {
                field,
                recorded,
                expected,
                ..
            } => {
                assert_eq!(*field, "BFDINCLUDE");
                assert_eq!(recorded, "/usr/include");
                assert_eq!(expected, "/opt/binutils/include");
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(err.to_string().starts_with("BFDINCLUDE"));
    }

    #[test]
    fn test_papi_prefix_compared_without_flag_stripping() {
        let fake = FakeInstall::new(&[]);
        fake.makefile("Makefile.tau-papi-pdt", "PAPIDIR=/opt/papi-6\n");
        let install = installation(&fake, |s| {
            s.metrics = vec!["PAPI_FP_INS".to_string()];
            s.papi = Some(DependencyInstall::at("/opt/papi"));
        });

        let err = verify(&install, &CollectingSink::new()).unwrap_err();
        assert!(matches!(err, VerifyError::Mismatch { field: "PAPIDIR", .. }));
    }

    #[test]
    fn test_recorded_path_compared_as_text() {
        let fake = FakeInstall::new(&[]);
        fake.makefile("Makefile.tau-papi-pdt", "PAPIDIR=/opt/papi/\n");
        let install = installation(&fake, |s| {
            s.metrics = vec!["PAPI_FP_INS".to_string()];
            s.papi = Some(DependencyInstall::at("/opt/papi"));
        });

        let err = verify(&install, &CollectingSink::new()).unwrap_err();
        assert!(matches!(
            err,
            VerifyError::Mismatch { ref recorded, .. } if recorded == "/opt/papi/"
        ));
    }

    #[test]
    fn test_unconfigured_dependency_not_checked() {
        let fake = FakeInstall::new(&[]);
        fake.makefile("Makefile.tau-pdt", "UNWIND_INC=-I/somewhere/else\n");
        let install = installation(&fake, |_| {});

        assert!(verify(&install, &CollectingSink::new()).is_ok());
    }

    #[test]
    fn test_io_wrapper_required() {
        let fake = FakeInstall::new(&["Makefile.tau-pdt"]);
        let install = installation(&fake, |s| s.io_inst = true);

        let err = verify(&install, &CollectingSink::new()).unwrap_err();
        assert!(matches!(err, VerifyError::MissingIoWrapper { .. }));

        fake.lib_file("wrappers/io_wrapper/link_options.tau");
        assert!(verify(&install, &CollectingSink::new()).is_ok());
    }

    #[test]
    fn test_io_wrapper_shared_library() {
        let fake = FakeInstall::new(&["Makefile.tau-pdt"]);
        fake.lib_file("shared/libTAU-iowrap-pdt.so");
        let install = installation(&fake, |s| s.io_inst = true);

        assert!(verify(&install, &CollectingSink::new()).is_ok());
    }
}
