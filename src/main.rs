use std::{io::Write as _, path::PathBuf};

use anyhow::Result;
use clap::Parser;
use copy_template::{
    config::{resolve_environment, resolve_project_root},
    default_rules, load_rules, run, Config, DestinationPolicy, OverridePolicy, LOG_TAG,
};

// ----------------------------------------------------------------------------
// Command-line Interface

/// Copy configuration headers from the project's template folder into the
/// active PlatformIO environment's library dependencies.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Project root (defaults to $PROJECT_DIR, then the current directory).
    #[arg(long)]
    project_dir: Option<PathBuf>,
    /// Active environment (defaults to $PIOENV).
    #[arg(long, short = 'e')]
    environment: Option<String>,
    /// Template folder, relative to the project root.
    #[arg(long, default_value = copy_template::config::DEFAULT_TEMPLATE_DIR)]
    template_dir: PathBuf,
    /// Library dependency folder, relative to the project root.
    #[arg(long, default_value = copy_template::config::DEFAULT_LIBDEPS_DIR)]
    libdeps_dir: PathBuf,
    /// TOML file with `[[file]]` rules replacing the built-in ones.
    #[arg(long)]
    rules: Option<PathBuf>,
    /// Which rules may be overridden from `<template-dir>/<environment>/`.
    #[arg(long, value_enum, default_value_t)]
    overrides: OverridePolicy,
    /// How files destined for the dependency root are placed.
    #[arg(long, value_enum, default_value_t)]
    destination: DestinationPolicy,
    /// Also print how paths were resolved.
    #[arg(long, short = 'v')]
    verbose: bool,
}

// ----------------------------------------------------------------------------
// Application

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_module("copy_template", level)
        .target(env_logger::Target::Stdout)
        .format(|buf, record| writeln!(buf, "{LOG_TAG} {}", record.args()))
        .init();

    // The build must never fail because of us.
    if let Err(error) = copy_templates(cli) {
        log::error!("{error:#}");
    }
}

fn copy_templates(cli: Cli) -> Result<()> {
    let rules = match cli.rules {
        Some(path) => load_rules(&path)?,
        None => default_rules(),
    };

    let config = Config::new(
        resolve_project_root(cli.project_dir)?,
        resolve_environment(cli.environment),
    )
    .template_dir(cli.template_dir)
    .libdeps_dir(cli.libdeps_dir)
    .overrides(cli.overrides)
    .destination(cli.destination);

    let report = run(&config, &rules);
    log::debug!(
        "{} of {} file(s) copied",
        report.copied(),
        report.outcomes.len()
    );

    Ok(())
}
