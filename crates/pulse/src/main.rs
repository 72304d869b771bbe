//! Pulse
//!
//! Issue analytics and backlog forecasting from the command line.
//! Designed for deterministic, machine-friendly outputs: every command has a
//! `--json` mode and a documented exit code.

use anyhow::{anyhow, Result};
use clap::Parser;
use pulse::capacity::EfficiencyBreakdown;
use pulse::cli::{Cli, Commands, ScenarioArgs};
use pulse::config::{PulseConfig, CONFIG_FILE};
use pulse::errors::classify;
use pulse::output::{
    render_efficiency, render_forecast, render_summary, ForecastResponse, OutputContext,
};
use pulse::{aggregate, simulate, source, telemetry, CommandSchema};
use pulse::{ExitCode, JsonError, JsonOutput, SimulationConfig};
use std::path::{Path, PathBuf};

fn command_name(command: &Option<Commands>) -> &'static str {
    match command {
        Some(Commands::Stats { .. }) => "stats",
        Some(Commands::Forecast { .. }) => "forecast",
        Some(Commands::Efficiency { .. }) => "efficiency",
        None => "pulse",
    }
}

fn wants_json(command: &Option<Commands>) -> bool {
    matches!(
        command,
        Some(Commands::Stats { json: true, .. })
            | Some(Commands::Forecast { json: true, .. })
            | Some(Commands::Efficiency { json: true, .. })
    )
}

fn main() {
    let cli = Cli::parse();
    telemetry::init_tracing(telemetry::level_for(cli.verbose));

    let json = wants_json(&cli.command);
    let command = command_name(&cli.command);
    let output_ctx = OutputContext::new(cli.quiet, json);

    let exit_code = match run(cli, &output_ctx) {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            let classified = classify(&e);
            let printed = if output_ctx.is_json() {
                let error = JsonError::new(
                    classified.code,
                    classified.actionable.message(),
                    command,
                )
                .with_suggestions(classified.actionable.remedies().to_vec());
                output_ctx.print_json_error(&error)
            } else {
                output_ctx.print_error(classified.actionable.to_error_message().trim_end())
            };
            if let Err(io_error) = printed {
                tracing::warn!(error = %io_error, "failed to report error");
            }
            classified.exit_code
        }
    };

    if exit_code != ExitCode::Success {
        std::process::exit(exit_code.code());
    }
}

/// Only the implicit `./pulse.toml` may be absent.
fn load_config(path: Option<PathBuf>) -> Result<PulseConfig> {
    match path {
        Some(path) => PulseConfig::load_required(&path),
        None => PulseConfig::load(Path::new(CONFIG_FILE)),
    }
}

fn scenario_from(config: &PulseConfig, args: &ScenarioArgs) -> SimulationConfig {
    args.apply(config.scenario())
}

fn run(cli: Cli, output_ctx: &OutputContext) -> Result<()> {
    if cli.schema {
        output_ctx.print_document(&CommandSchema::generate())?;
        return Ok(());
    }

    let command = cli
        .command
        .ok_or_else(|| anyhow!("No command provided. Use --help for usage."))?;
    let config = load_config(cli.config)?;

    match command {
        Commands::Stats { items, top, .. } => {
            let items = source::load_items(&items)?;
            let summary = aggregate(&items)?;

            output_ctx.print_json(&JsonOutput::success(&summary, "stats"))?;
            output_ctx.print_data(
                render_summary(&summary, top.unwrap_or_else(|| config.top_labels())).trim_end(),
            )?;
        }
        Commands::Forecast {
            items, scenario, ..
        } => {
            let scenario = scenario_from(&config, &scenario);
            tracing::info!(?scenario, "running forecast");

            let items = source::load_items(&items)?;
            let summary = aggregate(&items)?;
            let outcome = simulate(&summary.monthly_trends, &scenario)?;

            output_ctx.print_info(format!(
                "{} items, {} open; scenario: {:+} developers, x{} intake, {}h meetings, {}h reviews",
                summary.total,
                summary.open,
                scenario.developer_count_change,
                scenario.incoming_issue_rate,
                scenario.weekly_meeting_hours,
                scenario.code_review_avg_hours
            ))?;
            output_ctx.print_data(render_forecast(&outcome).trim_end())?;
            output_ctx.print_json(&JsonOutput::success(
                ForecastResponse::from(outcome),
                "forecast",
            ))?;
        }
        Commands::Efficiency { scenario, .. } => {
            let scenario = scenario_from(&config, &scenario);
            scenario.validate()?;
            let efficiency = EfficiencyBreakdown::from_config(&scenario);

            output_ctx.print_json(&JsonOutput::success(&efficiency, "efficiency"))?;
            output_ctx.print_data(render_efficiency(&efficiency))?;
        }
    }

    Ok(())
}
