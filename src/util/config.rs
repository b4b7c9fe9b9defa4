//! Configuration file support for taucmdr.
//!
//! taucmdr supports two configuration file locations:
//! - Global: `~/.taucmdr/config.toml` - User-wide defaults
//! - Project: `.taucmdr/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, field by field.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::target::{TargetArch, TargetOs};

/// Name of the per-user and per-project configuration directory.
pub const CONFIG_DIR_NAME: &str = ".taucmdr";

/// taucmdr configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// TAU installation settings
    pub install: InstallConfig,

    /// Default target system
    pub target: TargetConfig,
}

/// Where TAU lives and how it is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// TAU install prefix
    pub prefix: Option<PathBuf>,

    /// TAU source tree used when (re)building
    pub source: Option<PathBuf>,

    /// Parallel `make` jobs (None = make's default)
    pub jobs: Option<usize>,

    /// Default feature configuration file
    pub features: Option<PathBuf>,
}

/// Target defaults, used when a feature file has no `[target]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub os: Option<TargetOs>,
    pub arch: Option<TargetArch>,
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Relative paths are resolved against the directory holding the
    /// `.taucmdr` directory the file lives in.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;

        if let Some(root) = path.parent().and_then(Path::parent) {
            config.install.resolve_relative(root);
        }
        Ok(config)
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.install.prefix.is_some() {
            self.install.prefix = other.install.prefix;
        }
        if other.install.source.is_some() {
            self.install.source = other.install.source;
        }
        if other.install.jobs.is_some() {
            self.install.jobs = other.install.jobs;
        }
        if other.install.features.is_some() {
            self.install.features = other.install.features;
        }

        if other.target.os.is_some() {
            self.target.os = other.target.os;
        }
        if other.target.arch.is_some() {
            self.target.arch = other.target.arch;
        }
    }
}

impl InstallConfig {
    fn resolve_relative(&mut self, root: &Path) {
        for path in [&mut self.prefix, &mut self.source, &mut self.features]
            .into_iter()
            .flatten()
        {
            if path.is_relative() {
                *path = root.join(&*path);
            }
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.taucmdr/config.toml)
/// 2. Global config (~/.taucmdr/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global taucmdr config directory (~/.taucmdr).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(CONFIG_DIR_NAME))
}

/// Get the project config path (.taucmdr/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_DIR_NAME).join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.install.prefix.is_none());
        assert!(config.target.os.is_none());
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = project_config_path(tmp.path());
        crate::util::fs::write_string(
            &config_path,
            r#"
[install]
prefix = "tau"
jobs = 8

[target]
os = "cnl"
arch = "x86_64"
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.install.prefix, Some(tmp.path().join("tau")));
        assert_eq!(config.install.jobs, Some(8));
        assert_eq!(config.target.os, Some(TargetOs::CrayCnl));
        assert_eq!(config.target.arch, Some(TargetArch::X86_64));
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        base.install.prefix = Some(PathBuf::from("/opt/tau"));
        base.install.jobs = Some(4);

        let mut override_cfg = Config::default();
        override_cfg.install.prefix = Some(PathBuf::from("/scratch/tau"));
        override_cfg.target.os = Some(TargetOs::Linux);

        base.merge(override_cfg);

        assert_eq!(base.install.prefix, Some(PathBuf::from("/scratch/tau")));
        assert_eq!(base.install.jobs, Some(4)); // Not overridden
        assert_eq!(base.target.os, Some(TargetOs::Linux));
    }

    #[test]
    fn test_load_config_precedence() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("home").join(CONFIG_DIR_NAME).join("config.toml");
        let project = project_config_path(&tmp.path().join("project"));

        crate::util::fs::write_string(&global, "[install]\nprefix = \"/opt/tau\"\njobs = 2\n")
            .unwrap();
        crate::util::fs::write_string(&project, "[install]\nprefix = \"/work/tau\"\n").unwrap();

        let config = load_config(Some(&global), &project);
        assert_eq!(config.install.prefix, Some(PathBuf::from("/work/tau")));
        assert_eq!(config.install.jobs, Some(2));
    }

    #[test]
    fn test_invalid_config_falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        let path = project_config_path(tmp.path());
        crate::util::fs::write_string(&path, "[install\nprefix = ").unwrap();

        assert_eq!(Config::load_or_default(&path), Config::default());
    }
}
