//! Copy project configuration headers into PlatformIO's library dependencies.
//!
//! Some libraries only read their configuration from inside their own source
//! folder (`TFT_eSPI` looks for `User_Setup.h`) or from somewhere on the
//! include path (`lvgl` looks for `lv_conf.h`). Rather than editing the
//! installed copies by hand, the project keeps its versions in a template
//! folder and this tool copies them into `.pio/libdeps/<env>/` before every
//! build.

use serde::Deserialize;
use strum::Display;

pub use self::{
    config::{load_rules, Config, DestinationPolicy, OverridePolicy},
    copier::{run, Outcome, Report, SkipReason},
};

pub mod config;
pub mod copier;
pub mod copy;
pub mod resolve;

/// Prefix printed in front of every log line.
pub const LOG_TAG: &str = "[copy_template]";

/// Where a copied file should end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Target {
    /// Inside the folder of the library named by the rule.
    Libdir,
    /// Directly inside the environment's dependency root.
    Envroot,
}

/// A single file to distribute, and where it goes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CopyRule {
    /// File name, looked up in the template folder.
    pub name: String,
    /// Destination kind.
    pub target: Target,
    /// Library the file belongs to.
    #[serde(default)]
    pub lib: Option<String>,
    /// May `template files/<env>/` provide this file instead?
    #[serde(default = "per_env_default")]
    pub per_env: bool,
}

fn per_env_default() -> bool {
    true
}

impl CopyRule {
    pub fn libdir(name: impl Into<String>, lib: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: Target::Libdir,
            lib: Some(lib.into()),
            per_env: true,
        }
    }

    pub fn envroot(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: Target::Envroot,
            lib: None,
            per_env: true,
        }
    }

    #[must_use]
    pub fn lib(mut self, lib: impl Into<String>) -> Self {
        self.lib = Some(lib.into());
        self
    }

    #[must_use]
    pub fn per_env(mut self, per_env: bool) -> Self {
        self.per_env = per_env;
        self
    }
}

/// The rules used when no rules file is given.
pub fn default_rules() -> Vec<CopyRule> {
    vec![
        CopyRule::libdir("User_Setup.h", "TFT_eSPI"),
        // lv_conf.h always comes from the top-level template folder.
        CopyRule::envroot("lv_conf.h").lib("lvgl").per_env(false),
    ]
}
