//! Global context for taucmdr operations.
//!
//! Provides centralized access to configuration, paths, and the feature
//! file and TAU installation a command operates on.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::core::feature::FeatureConfig;
use crate::core::manifest::{FeatureManifest, FEATURE_FILE_NAME};
use crate::ops::installation::TauInstallation;
use crate::util::config::{self, Config, CONFIG_DIR_NAME};
use crate::util::diagnostic::suggestions;

/// Global context shared by all commands.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// taucmdr home directory (~/.taucmdr)
    home: PathBuf,

    /// Merged global and project configuration
    config: Config,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        let home = config::global_config_dir().unwrap_or_else(|| cwd.join(CONFIG_DIR_NAME));
        Ok(Self::with_dirs(cwd, home))
    }

    /// Create a GlobalContext with explicit working and home directories.
    pub fn with_dirs(cwd: PathBuf, home: PathBuf) -> Self {
        let mut ctx = GlobalContext {
            cwd,
            home,
            config: Config::default(),
        };
        ctx.reload_config();
        ctx
    }

    /// Re-read the global and project configuration files.
    pub fn reload_config(&mut self) {
        let project = self.project_config_path();
        self.config = config::load_config(Some(&self.config_path()), &project);
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the taucmdr home directory (~/.taucmdr/).
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Get the project-local configuration file path.
    pub fn project_config_path(&self) -> PathBuf {
        config::project_config_path(&self.cwd)
    }

    /// The merged configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Locate the feature file.
    ///
    /// An explicit path wins, then `install.features` from the configuration,
    /// then the nearest `taucmdr.toml` in the cwd or one of its ancestors.
    pub fn find_feature_file(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit.or(self.config.install.features.as_deref()) {
            let path = self.cwd.join(path);
            if !path.is_file() {
                bail!("feature file '{}' does not exist", path.display());
            }
            return Ok(path);
        }

        let mut current = self.cwd.clone();
        loop {
            let candidate = current.join(FEATURE_FILE_NAME);
            if candidate.is_file() {
                return Ok(candidate);
            }
            if !current.pop() {
                bail!(
                    "could not find `{}` in `{}` or any parent directory\n{}",
                    FEATURE_FILE_NAME,
                    self.cwd.display(),
                    suggestions::NO_CONFIG
                );
            }
        }
    }

    /// Load the feature configuration, applying configured target defaults.
    pub fn load_features(&self, explicit: Option<&Path>) -> Result<FeatureConfig> {
        let path = self.find_feature_file(explicit)?;
        tracing::debug!("loading features from {}", path.display());
        FeatureManifest::load_with_target(&path, self.config.target.os, self.config.target.arch)
    }

    /// The TAU install prefix: an explicit path, else `install.prefix`.
    pub fn install_prefix(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        match explicit.or(self.config.install.prefix.as_deref()) {
            Some(prefix) => Ok(self.cwd.join(prefix)),
            None => bail!(
                "no TAU installation prefix given\n\
                 help: pass --prefix or set `install.prefix` in {}",
                self.config_path().display()
            ),
        }
    }

    /// Pair the located feature file with the configured install prefix.
    pub fn installation(
        &self,
        features: Option<&Path>,
        prefix: Option<&Path>,
    ) -> Result<TauInstallation> {
        let config = self.load_features(features)?;
        let prefix = self.install_prefix(prefix)?;
        Ok(TauInstallation::new(prefix, config)?)
    }
}
