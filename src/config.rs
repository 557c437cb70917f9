//! Run configuration.
//!
//! Everything the copier needs to know about the invocation is collected in a
//! [`Config`] up front, so that nothing downstream reads the process
//! environment.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;
use strum::Display;

use crate::CopyRule;

/// Variable PlatformIO sets to the name of the active environment.
pub const ENVIRONMENT_VAR: &str = "PIOENV";
/// Variable PlatformIO sets to the project root.
pub const PROJECT_DIR_VAR: &str = "PROJECT_DIR";

/// Default template folder, relative to the project root.
pub const DEFAULT_TEMPLATE_DIR: &str = "template files";
/// Default libdeps folder, relative to the project root.
pub const DEFAULT_LIBDEPS_DIR: &str = ".pio/libdeps";

/// Which rules may take their file from `template files/<env>/`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Display, ValueEnum)]
#[strum(serialize_all = "kebab-case")]
pub enum OverridePolicy {
    /// Only rules with `per_env` set.
    #[default]
    PerRule,
    /// Every rule, regardless of its `per_env` flag.
    AllRules,
}

/// How `envroot` rules pick their destination.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Display, ValueEnum)]
#[strum(serialize_all = "kebab-case")]
pub enum DestinationPolicy {
    /// Always copy into the dependency root.
    #[default]
    Direct,
    /// Only copy once the rule's library is installed in the dependency root.
    LibraryFirst,
}

/// Explicit description of a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    project_root: PathBuf,
    environment: Option<String>,
    template_dir: PathBuf,
    libdeps_dir: PathBuf,
    pub(crate) overrides: OverridePolicy,
    pub(crate) destination: DestinationPolicy,
}

impl Config {
    /// Create a configuration using the default PlatformIO project layout.
    pub fn new(project_root: impl Into<PathBuf>, environment: Option<String>) -> Self {
        Self {
            project_root: project_root.into(),
            environment: environment.filter(|env| !env.is_empty()),
            template_dir: PathBuf::from(DEFAULT_TEMPLATE_DIR),
            libdeps_dir: PathBuf::from(DEFAULT_LIBDEPS_DIR),
            overrides: OverridePolicy::default(),
            destination: DestinationPolicy::default(),
        }
    }

    #[must_use]
    pub fn template_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.template_dir = dir.into();
        self
    }

    #[must_use]
    pub fn libdeps_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.libdeps_dir = dir.into();
        self
    }

    #[must_use]
    pub fn overrides(mut self, policy: OverridePolicy) -> Self {
        self.overrides = policy;
        self
    }

    #[must_use]
    pub fn destination(mut self, policy: DestinationPolicy) -> Self {
        self.destination = policy;
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Name of the active environment, if one could be determined.
    pub fn environment(&self) -> Option<&str> {
        self.environment.as_deref()
    }

    /// Absolute path of the default template folder.
    pub fn template_path(&self) -> PathBuf {
        self.project_root.join(&self.template_dir)
    }

    /// Absolute path of the per-environment override folder.
    pub fn env_template_path(&self) -> Option<PathBuf> {
        self.environment().map(|env| self.template_path().join(env))
    }

    /// Absolute path of `.pio/libdeps/<env>/`.
    pub fn dependency_root(&self) -> Option<PathBuf> {
        self.environment()
            .map(|env| self.project_root.join(&self.libdeps_dir).join(env))
    }
}

/// Pick the environment name: an explicit value first, then `PIOENV`.
pub fn resolve_environment(explicit: Option<String>) -> Option<String> {
    explicit
        .filter(|env| !env.is_empty())
        .or_else(|| env::var(ENVIRONMENT_VAR).ok())
        .filter(|env| !env.is_empty())
}

/// Pick the project root: an explicit value, then `PROJECT_DIR`, then the
/// current directory. Relative paths are resolved against the current
/// directory.
pub fn resolve_project_root(explicit: Option<PathBuf>) -> Result<PathBuf> {
    let root = match explicit.or_else(|| env::var_os(PROJECT_DIR_VAR).map(PathBuf::from)) {
        Some(root) => root,
        None => env::current_dir().context("Could not determine the current directory")?,
    };

    if root.is_absolute() {
        Ok(root)
    } else {
        let cwd = env::current_dir().context("Could not determine the current directory")?;
        Ok(cwd.join(root))
    }
}

#[derive(Debug, Deserialize)]
struct RulesFile {
    #[serde(default)]
    file: Vec<CopyRule>,
}

/// Parse a TOML file containing `[[file]]` tables into a list of rules.
pub fn load_rules(path: &Path) -> Result<Vec<CopyRule>> {
    let rules = fs::read_to_string(path)
        .with_context(|| format!("Could not read {}", path.display()))?;
    let rules: RulesFile = basic_toml::from_str(&rules)
        .with_context(|| format!("Could not parse {}", path.display()))?;

    Ok(rules.file)
}
