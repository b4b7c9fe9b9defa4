//! Install flow: verify, build if needed, verify again.

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::builder::configure::configure_args;
use crate::ops::installation::TauInstallation;
use crate::ops::verify::verify;
use crate::resolver::Selection;
use crate::util::diagnostic::DiagnosticSink;
use crate::util::process::ProcessBuilder;

/// Builds TAU from a source tree into an install prefix.
pub trait Builder {
    /// Configure and install the sources at `source` into `prefix`.
    fn build(&self, source: &Path, prefix: &Path, configure_args: &[String]) -> Result<()>;
}

/// Runs `./configure <args>` then `make install` in the source tree.
#[derive(Debug, Clone, Default)]
pub struct MakeBuilder {
    /// Parallel make jobs
    pub jobs: Option<usize>,
}

impl Builder for MakeBuilder {
    fn build(&self, source: &Path, _prefix: &Path, configure_args: &[String]) -> Result<()> {
        tracing::info!("Configuring TAU...");
        ProcessBuilder::new(source.join("configure"))
            .args(configure_args)
            .cwd(source)
            .status_and_check()
            .context("TAU configure failed")?;

        tracing::info!("Compiling and installing TAU...");
        let mut make = ProcessBuilder::new("make").arg("install").cwd(source);
        if let Some(jobs) = self.jobs {
            make = make.arg(format!("-j{}", jobs));
        }
        make.status_and_check().context("TAU make install failed")?;
        Ok(())
    }
}

/// What [`install`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The existing installation verified; nothing was built
    AlreadyInstalled(Selection),
    /// TAU was built and the result verified
    Built(Selection),
}

impl InstallOutcome {
    pub fn selection(&self) -> &Selection {
        match self {
            InstallOutcome::AlreadyInstalled(s) | InstallOutcome::Built(s) => s,
        }
    }
}

/// Make sure `installation` provides a verified variant.
///
/// Without `source`, the existing installation must already verify. With a
/// source, an installation that verifies is kept unless `force` is set;
/// otherwise TAU is built from `source` and verified again.
pub fn install(
    installation: &TauInstallation,
    source: Option<&Path>,
    force: bool,
    builder: &dyn Builder,
    sink: &dyn DiagnosticSink,
) -> Result<InstallOutcome> {
    let Some(source) = source else {
        return verify(installation, sink)
            .map(InstallOutcome::AlreadyInstalled)
            .with_context(|| {
                format!(
                    "'{}' is not a valid TAU installation. \
                     Specify source code path or URL to enable broken package reinstallation.",
                    installation.prefix().display()
                )
            });
    };

    if !force {
        match verify(installation, sink) {
            Ok(selection) => {
                tracing::info!(
                    "using existing TAU installation at '{}'",
                    installation.prefix().display()
                );
                return Ok(InstallOutcome::AlreadyInstalled(selection));
            }
            Err(e) => tracing::debug!("existing installation unusable: {}", e),
        }
    }

    if !source.is_dir() {
        bail!("TAU source directory '{}' does not exist", source.display());
    }

    let args = configure_args(installation.config(), installation.prefix())?;
    builder
        .build(source, installation.prefix(), &args)
        .with_context(|| format!("failed to build TAU from '{}'", source.display()))?;

    let selection = verify(installation, sink)
        .context("TAU was built but the installation does not verify")?;
    tracing::info!(
        "installed TAU at '{}'",
        installation.prefix().display()
    );
    Ok(InstallOutcome::Built(selection))
}
