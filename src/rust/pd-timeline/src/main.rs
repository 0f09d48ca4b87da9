// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Simulate a protocol document and print its timeline.
//!
//! Usage: `pd-timeline [OPTIONS] <DOCUMENT>`
//!
//! Prints a JSON summary of every simulated step, or with `--flatten` the command list
//! of the whole protocol. Exits with a failure code if the protocol cannot be exported.

mod document;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use pd_common::ids::StepId;
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use step_generation::{
    Command, CommandCreatorError, CommandCreatorWarning, StepGenerationSettings, Timeline,
    generate_robot_state_timeline,
};

use crate::document::ProtocolDocument;

/// Simulate the steps of a protocol document.
#[derive(Parser, Debug)]
#[command(name = "pd-timeline", version)]
struct Args {
    /// Settings file overriding the settings of the document.
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Print the commands of the whole protocol instead of the per step summary.
    #[arg(long)]
    flatten: bool,

    /// Log per step details.
    #[arg(long)]
    diagnostics: bool,

    /// Path to the protocol document (JSON).
    #[arg(value_name = "DOCUMENT")]
    document: PathBuf,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FrameSummary<'a> {
    step_id: &'a StepId,
    commands: &'a [Command],
    warnings: &'a [CommandCreatorWarning],
    errors: &'a [CommandCreatorError],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TimelineSummary<'a> {
    frames: Vec<FrameSummary<'a>>,
    authored_steps: usize,
    exportable: bool,
}

impl<'a> From<&'a Timeline> for TimelineSummary<'a> {
    fn from(timeline: &'a Timeline) -> Self {
        let frames = timeline
            .frames
            .iter()
            .map(|frame| FrameSummary {
                step_id: &frame.step_id,
                commands: &frame.commands,
                warnings: &frame.warnings,
                errors: &frame.errors,
            })
            .collect();
        Self {
            frames,
            authored_steps: timeline.authored_steps,
            exportable: timeline.is_exportable(),
        }
    }
}

fn load_settings(path: &Path) -> anyhow::Result<StepGenerationSettings> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings '{}'", path.display()))?;
    let settings = StepGenerationSettings::from_json(&json)
        .with_context(|| format!("Invalid settings '{}'", path.display()))?;
    Ok(settings)
}

fn run(args: &Args) -> anyhow::Result<ExitCode> {
    let json = fs::read_to_string(&args.document)
        .with_context(|| format!("Failed to read document '{}'", args.document.display()))?;
    let mut document = ProtocolDocument::from_json(&json)?;
    if let Some(path) = &args.settings {
        document.invariant_context.settings = load_settings(path)?;
    }
    for change in document.invariant_context.settings.sanitize()? {
        pd_log::warn!(
            "Setting '{}' changed from {} to {}: {}",
            change.field,
            change.original,
            change.sanitized,
            change.reason
        );
    }

    let initial_robot_state = document.initial_robot_state();
    let timeline = generate_robot_state_timeline(
        &document.steps,
        &document.ordered_step_ids,
        &document.invariant_context,
        &initial_robot_state,
    );

    if !args.flatten {
        let summary = TimelineSummary::from(&timeline);
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(ExitCode::SUCCESS);
    }
    match timeline.export_commands() {
        Ok(commands) => {
            println!("{}", serde_json::to_string_pretty(&commands)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("{err}");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Route the `log` records of the library crates to a stderr subscriber.
///
/// `RUST_LOG` overrides the default `info` filter.
fn init_logging(with_diagnostics: bool) {
    pd_log::init_logging(with_diagnostics);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("Failed to initialize logging: {err}");
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.diagnostics);
    match run(&args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
