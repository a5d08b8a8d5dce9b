use std::{path::Path, process::ExitCode};

use {
    anyhow::{Context, Result},
    clap::Subcommand,
};

use sigrelay_config::{Severity, validate};

use crate::settings::Overrides;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Validate the configuration and report errors/warnings.
    Check,
    /// Print which config file would be loaded.
    Path,
}

pub fn handle_config(
    action: ConfigAction,
    explicit: Option<&Path>,
    overrides: &Overrides,
) -> Result<ExitCode> {
    match action {
        ConfigAction::Check => check(explicit, overrides),
        ConfigAction::Path => {
            match explicit
                .map(Path::to_path_buf)
                .or_else(sigrelay_config::find_config_file)
            {
                Some(path) => println!("{}", path.display()),
                None => {
                    let dir = sigrelay_config::config_dir()
                        .map(|d| d.display().to_string())
                        .unwrap_or_else(|| "(no config dir)".into());
                    eprintln!("No config file found; searched ./ and {dir}");
                },
            }
            Ok(ExitCode::SUCCESS)
        },
    }
}

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn check(explicit: Option<&Path>, overrides: &Overrides) -> Result<ExitCode> {
    let loaded = sigrelay_config::load(explicit).context("failed to load config")?;

    if let Some(ref path) = loaded.path {
        eprintln!("Checking {}\n", path.display());
    } else {
        eprintln!("No config file found; checking defaults.\n");
    }

    let config = overrides.apply(loaded.config);
    let result = validate(&config);

    for d in &result.diagnostics {
        let (color, label) = match d.severity {
            Severity::Error => (RED, "error"),
            Severity::Warning => (YELLOW, "warning"),
        };
        eprintln!("  {BOLD}{color}{label}{RESET} {}: {}", d.path, d.message);
    }

    let errors = result.count(Severity::Error);
    let warnings = result.count(Severity::Warning);

    if !result.diagnostics.is_empty() {
        eprintln!();
    }

    if errors == 0 && warnings == 0 {
        eprintln!("No issues found.");
    } else {
        eprintln!("{errors} error(s), {warnings} warning(s)");
    }

    Ok(if errors > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
