//! Path resolution for copy rules.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::{Config, CopyRule, OverridePolicy};

/// Directory the rule's file should be read from.
///
/// The per-environment folder is used whenever it exists and the rule may be
/// overridden, even if that folder does not contain the rule's file.
pub fn source_dir(config: &Config, rule: &CopyRule) -> PathBuf {
    let eligible = match config.overrides {
        OverridePolicy::PerRule => rule.per_env,
        OverridePolicy::AllRules => true,
    };

    if eligible {
        if let Some(env_dir) = config.env_template_path().filter(|dir| dir.is_dir()) {
            log::debug!("Using override folder {} for {}", env_dir.display(), rule.name);
            return env_dir;
        }
    }

    config.template_path()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Match {
    Exact,
    Prefix,
}

/// Find the installed folder of `lib` inside the dependency root.
///
/// PlatformIO may append a suffix to library folders (`TFT_eSPI_ID1559`), so
/// any folder starting with `lib` is a candidate. An exact name wins, ties
/// between prefixed folders go to the lexicographically smallest name.
///
/// Returns `Ok(None)` when the dependency root does not exist yet or nothing
/// matches.
pub fn find_library_dir(dependency_root: &Path, lib: &str) -> Result<Option<PathBuf>> {
    if lib.is_empty() || !dependency_root.is_dir() {
        return Ok(None);
    }

    let entries = fs::read_dir(dependency_root)
        .with_context(|| format!("Could not list {}", dependency_root.display()))?;

    let mut best: Option<(Match, String)> = None;
    for entry in entries {
        let entry = entry?;
        // Follows symlinks, linked library folders count too.
        if !entry.path().is_dir() {
            continue;
        }

        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        let rank = if name == lib {
            Match::Exact
        } else if name.starts_with(lib) {
            Match::Prefix
        } else {
            continue;
        };

        let candidate = (rank, name);
        if best.as_ref().map_or(true, |best| candidate < *best) {
            best = Some(candidate);
        }
    }

    Ok(best.map(|(_, name)| dependency_root.join(name)))
}

/// Whether a rule's file name stays inside the directory it is joined to.
pub fn is_plain_file_name(name: &str) -> bool {
    let path = Path::new(name);
    let mut components = path.components();

    matches!(
        (components.next(), components.next()),
        (Some(std::path::Component::Normal(_)), None)
    )
}
