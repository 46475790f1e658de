//! Update and check command implementations
//!
//! Both commands resolve `--source` to a content fetcher, then either apply
//! the source to the working root or only compare against it.

use std::path::Path;

use colored::Colorize;

use nupd_core::{CheckStatus, DriftItem, FillSource, UpdatePlan, UpdateReport, Updater, UpdaterConfig, fetch};

use crate::error::{CliError, Result};

fn updater(root: &Path, source: &str, config: &UpdaterConfig) -> Result<Updater<Box<dyn fetch::ContentFetcher>>> {
    let fetcher = fetch::open(source, &config.http)?;
    Ok(Updater::new(root, fetcher).with_config(config.clone()))
}

/// Run the update command
///
/// With `dry_run` only the plan is computed and printed.
pub fn run_update(root: &Path, source: &str, dry_run: bool, json: bool, config: &UpdaterConfig) -> Result<()> {
    let updater = updater(root, source, config)?;

    if dry_run {
        let plan = updater.plan()?;
        if json {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        } else {
            print_plan(&plan);
        }
        return Ok(());
    }

    if !json {
        println!(
            "{} Updating {} from {}...",
            "=>".blue().bold(),
            root.display().to_string().cyan(),
            source.cyan()
        );
    }
    let report = updater.run()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_plan(plan: &UpdatePlan) {
    if plan.is_noop() {
        println!("{} Already up to date. No changes needed.", "OK".green().bold());
        return;
    }

    println!("{} Planned changes:", "=>".blue().bold());
    for request in &plan.fetch {
        println!("   {} fetch {}", "+".green(), request.path.as_str().cyan());
    }
    for path in &plan.evacuate {
        println!("   {} move aside {}", "~".yellow(), path.as_str().cyan());
    }
    for path in &plan.relocate {
        println!("   {} move out of the way {}", "~".yellow(), path.as_str().cyan());
    }
    for step in &plan.fill {
        let origin = match &step.source {
            FillSource::Local(from) => format!("copy of {}", from),
            FillSource::Evacuated(from) => format!("old content of {}", from),
            FillSource::Relocated(from) => format!("moved copy of {}", from),
            FillSource::Fetched => "fetched content".to_string(),
        };
        println!("   {} write {} ({})", "+".green(), step.path.as_str().cyan(), origin.dimmed());
    }
    println!();
    println!(
        "{} unchanged, {} left untouched",
        plan.satisfied.len(),
        plan.surplus.len()
    );
}

fn print_report(report: &UpdateReport) {
    if !report.changed() {
        println!("{} Already up to date. No changes needed.", "OK".green().bold());
        return;
    }

    println!("{} Update complete:", "OK".green().bold());
    for path in &report.filled {
        println!("   {} {}", "+".green(), path.as_str());
    }
    for moved in report.evacuated.iter().chain(&report.relocated) {
        println!("   {} {} -> {}", "~".yellow(), moved.from, moved.to.as_str().dimmed());
    }
    for displaced in &report.displaced {
        println!("   {} displaced to {}", "!".yellow(), displaced.display());
    }
    println!();
    println!(
        "{} fetched, {} written, {} unchanged",
        report.fetched.len(),
        report.filled.len(),
        report.satisfied
    );
}

/// Run the check command
///
/// Fails if the working root does not match the source.
pub fn run_check(root: &Path, source: &str, json: bool, config: &UpdaterConfig) -> Result<()> {
    if !json {
        println!("{} Checking {}...", "=>".blue().bold(), root.display().to_string().cyan());
    }

    let report = updater(root, source, config)?.check()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        match report.status {
            CheckStatus::Healthy => {
                println!("{} Working root matches the source.", "OK".green().bold());
            }
            CheckStatus::Missing => {
                println!("{} Some files are missing:", "MISSING".yellow().bold());
                print_items(&report.missing, "-");
            }
            CheckStatus::Drifted => {
                println!("{} Some files have drifted:", "DRIFTED".red().bold());
                print_items(&report.drifted, "!");
                if !report.missing.is_empty() {
                    println!();
                    println!("{} Also missing:", "MISSING".yellow().bold());
                    print_items(&report.missing, "-");
                }
            }
        }
        if !report.is_healthy() {
            println!();
            println!("Run {} to repair.", "nupd update".cyan());
        }
    }

    if report.is_healthy() {
        Ok(())
    } else {
        Err(CliError::user(format!(
            "{} missing, {} drifted",
            report.missing.len(),
            report.drifted.len()
        )))
    }
}

fn print_items(items: &[DriftItem], marker: &str) {
    for item in items {
        println!("   {} {}", marker.yellow(), item.path.as_str().cyan());
    }
}
