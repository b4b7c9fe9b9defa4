//! Test utilities and mocks for unit tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use taucmdr::test_support::{gnu_settings, linux, FakeInstall};
//!
//! #[test]
//! fn test_example() {
//!     let fake = FakeInstall::new(&["Makefile.tau-pdt"]);
//!     let config = linux(gnu_settings()).build().unwrap();
//!     // Point a TauInstallation at fake.prefix()...
//! }
//! ```

pub mod fixtures;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{bail, Result};

pub use fixtures::*;

use crate::ops::install::Builder;

/// One recorded call to [`MockBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCall {
    pub source: PathBuf,
    pub prefix: PathBuf,
    pub args: Vec<String>,
}

/// Builder that records calls and optionally runs a hook to populate the
/// install prefix.
pub struct MockBuilder {
    calls: Mutex<Vec<BuildCall>>,
    fail: bool,
    on_build: Option<Box<dyn Fn(&Path) + Send + Sync>>,
}

impl MockBuilder {
    /// A builder that succeeds without touching the filesystem.
    pub fn new() -> Self {
        MockBuilder {
            calls: Mutex::new(Vec::new()),
            fail: false,
            on_build: None,
        }
    }

    /// A builder whose build step always fails.
    pub fn failing() -> Self {
        MockBuilder {
            fail: true,
            ..Self::new()
        }
    }

    /// Run `hook` with the install prefix on every successful build.
    pub fn on_build(mut self, hook: impl Fn(&Path) + Send + Sync + 'static) -> Self {
        self.on_build = Some(Box::new(hook));
        self
    }

    /// Calls recorded so far.
    pub fn calls(&self) -> Vec<BuildCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder for MockBuilder {
    fn build(&self, source: &Path, prefix: &Path, configure_args: &[String]) -> Result<()> {
        self.calls.lock().unwrap().push(BuildCall {
            source: source.to_path_buf(),
            prefix: prefix.to_path_buf(),
            args: configure_args.to_vec(),
        });

        if self.fail {
            bail!("mock build failed");
        }
        if let Some(hook) = &self.on_build {
            hook(prefix);
        }
        Ok(())
    }
}
