use std::io::{self, Write};
use std::path::Path;

use minver::{CheckReport, CheckStatus, Checker, combined_exit_code};
use minver_config::{MinverConfig, OutputFormat};
use minver_graph::ManifestLoader;
use tracing::debug;

use crate::cli::CheckArgs;
use crate::commands::open_store;
use crate::error::{CliError, Result};
use crate::render::{write_json, write_text};
use crate::ui;

/// Check every root and print the reports.
pub fn execute(args: CheckArgs, config_path: Option<&Path>) -> Result<u8> {
    let config = MinverConfig::load(config_path, &args.overrides())?;
    let options = config.check_options()?;
    debug!(?config, "effective configuration");

    let loader = ManifestLoader::from_file(&args.manifest).map_err(CliError::Manifest)?;
    let store = open_store(&config, args.rebuild_store)?;

    let checker = Checker::new(&loader, &store)
        .options(options)
        .no_recurse_patterns(config.no_recurse_patterns.clone());

    let reports = args
        .roots
        .iter()
        .map(|root| checker.check(root))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut out = io::stdout().lock();
    match config.format {
        OutputFormat::Text => write_text(&mut out, &reports)?,
        OutputFormat::Json => write_json(&mut out, &reports)?,
    }
    out.flush()?;

    summarize(&reports);
    Ok(combined_exit_code(&reports))
}

fn summarize(reports: &[CheckReport]) {
    for report in reports {
        let root = report.root.display();
        match report.status {
            CheckStatus::Ok => ui::success(&format!("{} requires {}", root, report.required)),
            CheckStatus::Fail => ui::error(&format!(
                "{} has {} violation(s), requires {}",
                root,
                report.violation_count(),
                report.required
            )),
            CheckStatus::NoSymbols => {
                ui::warning(&format!("{}: no imported symbol has version data", root))
            }
        }
        if !report.unresolved_modules.is_empty() {
            ui::info(&format!(
                "{}: {} unresolved module(s)",
                root,
                report.unresolved_modules.len()
            ));
        }
    }
}
