//! The copy run itself.
//!
//! Every rule is processed independently and in order. Nothing that goes
//! wrong for one rule stops the others, and nothing is ever reported to the
//! caller as an error: the outcome of each rule is logged and collected in a
//! [`Report`].

use std::{
    fmt,
    path::{Path, PathBuf},
};

use crate::{
    copy::copy_file,
    resolve::{find_library_dir, is_plain_file_name, source_dir},
    Config, CopyRule, DestinationPolicy, Target,
};

/// Why a rule was not copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The template file does not exist.
    SourceMissing(PathBuf),
    /// The library is not (yet) installed in the dependency root.
    LibraryMissing { lib: String, root: PathBuf },
    /// A `libdir` rule without a library name.
    NoLibrary,
    /// The rule's name is not a plain file name.
    InvalidName,
}

/// What happened to a single rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Copied {
        from: PathBuf,
        to: PathBuf,
    },
    Skipped {
        file: String,
        reason: SkipReason,
    },
    Failed {
        from: PathBuf,
        to: Option<PathBuf>,
        error: String,
    },
}

impl Outcome {
    pub fn is_copied(&self) -> bool {
        matches!(self, Outcome::Copied { .. })
    }

    fn log(&self) {
        match self {
            Outcome::Copied { .. } => log::info!("{self}"),
            Outcome::Skipped { .. } => log::warn!("{self}"),
            Outcome::Failed { .. } => log::error!("{self}"),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Copied { from, to } => {
                write!(f, "Copied: {} -> {}", from.display(), to.display())
            }
            Outcome::Skipped { file, reason } => match reason {
                SkipReason::SourceMissing(src) => {
                    write!(f, "Skipping (not found): {}", src.display())
                }
                SkipReason::LibraryMissing { lib, root } => write!(
                    f,
                    "Library '{lib}' not found in {}. {file} will be copied on the next build \
                     once dependencies are installed.",
                    root.display()
                ),
                SkipReason::NoLibrary => {
                    write!(f, "No library given for '{file}'. Skipping libdir copy.")
                }
                SkipReason::InvalidName => {
                    write!(f, "'{file}' is not a plain file name. Skipping.")
                }
            },
            Outcome::Failed {
                from,
                to: Some(to),
                error,
            } => write!(
                f,
                "ERROR copying {} -> {}: {error}",
                from.display(),
                to.display()
            ),
            Outcome::Failed {
                from,
                to: None,
                error,
            } => write!(
                f,
                "ERROR resolving destination for {}: {error}",
                from.display()
            ),
        }
    }
}

/// Result of a whole run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Report {
    /// No environment was available, nothing was attempted.
    pub aborted: bool,
    /// One entry per rule, in rule order.
    pub outcomes: Vec<Outcome>,
}

impl Report {
    /// Number of files that were copied.
    pub fn copied(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_copied()).count()
    }
}

/// Copy every rule's file to its destination.
pub fn run(config: &Config, rules: &[CopyRule]) -> Report {
    let (Some(env), Some(root)) = (config.environment(), config.dependency_root()) else {
        log::warn!("PIOENV not set. Is this running under PlatformIO? Skipping.");
        return Report {
            aborted: true,
            ..Report::default()
        };
    };

    log::debug!("Environment:     {env}");
    log::debug!("Dependency root: {}", root.display());
    log::debug!(
        "Policies:        overrides = {}, destination = {}",
        config.overrides,
        config.destination
    );

    let template_dir = config.template_path();
    if !template_dir.is_dir() {
        log::warn!("Template directory not found: {}", template_dir.display());
    }

    let mut report = Report::default();
    for rule in rules {
        let outcome = apply(config, &root, rule);
        outcome.log();
        report.outcomes.push(outcome);
    }

    report
}

fn apply(config: &Config, root: &Path, rule: &CopyRule) -> Outcome {
    let skip = |reason: SkipReason| Outcome::Skipped {
        file: rule.name.clone(),
        reason,
    };

    if !is_plain_file_name(&rule.name) {
        return skip(SkipReason::InvalidName);
    }

    let src = source_dir(config, rule).join(&rule.name);
    log::debug!("{} ({}) from {}", rule.name, rule.target, src.display());
    if !src.is_file() {
        return skip(SkipReason::SourceMissing(src));
    }

    let required_lib = match (rule.target, config.destination) {
        (Target::Libdir, _) => match rule.lib.as_deref() {
            Some(lib) => Some(lib),
            None => return skip(SkipReason::NoLibrary),
        },
        (Target::Envroot, DestinationPolicy::LibraryFirst) => rule.lib.as_deref(),
        (Target::Envroot, DestinationPolicy::Direct) => None,
    };

    let lib_dir = match required_lib.map(|lib| (lib, find_library_dir(root, lib))) {
        None => None,
        Some((_, Ok(Some(dir)))) => Some(dir),
        Some((lib, Ok(None))) => {
            return skip(SkipReason::LibraryMissing {
                lib: lib.to_string(),
                root: root.to_path_buf(),
            })
        }
        Some((_, Err(error))) => {
            return Outcome::Failed {
                from: src,
                to: None,
                error: format!("{error:#}"),
            }
        }
    };

    let dst = match (rule.target, lib_dir) {
        (Target::Libdir, Some(dir)) => dir,
        _ => root.to_path_buf(),
    }
    .join(&rule.name);

    match copy_file(&src, &dst) {
        Ok(()) => Outcome::Copied { from: src, to: dst },
        Err(error) => Outcome::Failed {
            from: src,
            to: Some(dst),
            error: format!("{error:#}"),
        },
    }
}
