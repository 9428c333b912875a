//! Implementation of the 'convert' subcommand.
//!
//! Maps the parsed arguments onto a `CoreConfig`, checks that the external
//! tools can be started, runs the pipeline and prints the run summary.

use crate::cli::ConvertArgs;
use crate::logging::get_timestamp;
use crate::terminal;

use imgpress_core::config::CoreConfigBuilder;
use imgpress_core::{
    CoreConfig, CoreResult, ProcessRunner, RunSummary, TargetFormat, ToolPaths, check_dependency,
    format_duration, run_pipeline,
};

use anyhow::{Context, bail};
use log::{debug, info};
use std::sync::Arc;

/// Builds the core configuration from command-line arguments.
pub fn build_config(args: &ConvertArgs) -> CoreResult<CoreConfig> {
    let mut builder = CoreConfigBuilder::new()
        .input_dir(args.input_dir.clone())
        .output_dir(args.output_dir.clone())
        .target_format(args.format)
        .worker_count(args.workers)
        .milestone_interval(args.milestone)
        .quality(args.quality)
        .tools(ToolPaths {
            jpeg_encoder: args.jpeg_encoder.clone(),
            webp_encoder: args.webp_encoder.clone(),
            avif_encoder: args.avif_encoder.clone(),
            exiftool: args.exiftool.clone(),
        });
    if let Some(extensions) = &args.extensions {
        builder = builder.convertible_extensions(extensions);
    }
    builder.build()
}

/// Verifies the encoder for the target format and exiftool can be spawned.
pub fn check_tools(config: &CoreConfig) -> CoreResult<()> {
    let encoder_check_arg = match config.target_format {
        TargetFormat::Webp => "-version",
        TargetFormat::Jpg | TargetFormat::Avif => "--version",
    };
    check_dependency(config.tools.encoder_for(config.target_format), encoder_check_arg)?;
    check_dependency(&config.tools.exiftool, "-ver")?;
    debug!("External dependency check passed.");
    Ok(())
}

/// Runs the convert command. Per-file failures only turn into an error
/// when `--fail-on-error` is set.
pub fn run_convert(args: ConvertArgs) -> anyhow::Result<RunSummary> {
    let config = build_config(&args)?;
    config.validate()?;
    if args.skip_tool_check {
        debug!("Skipping external tool check");
    } else {
        check_tools(&config)?;
    }

    terminal::print_section("Convert");
    terminal::print_status("Started", &get_timestamp(), false);
    terminal::print_status("Input", &config.input_dir.display().to_string(), false);
    terminal::print_status("Output", &config.output_dir.display().to_string(), false);
    terminal::print_status("Format", &config.target_format.to_string(), true);
    terminal::print_status("Workers", &config.worker_count.to_string(), false);
    info!("");

    let error_log_path = config.error_log_path();
    let summary = run_pipeline(config, Arc::new(ProcessRunner)).context("Conversion run aborted")?;

    print_summary(&summary);
    if summary.failed > 0 {
        terminal::print_warning(&format!(
            "{} file(s) failed; details in {}",
            summary.failed,
            error_log_path.display()
        ));
        if args.fail_on_error {
            bail!(
                "{} file(s) failed to convert or copy (see {})",
                summary.failed,
                error_log_path.display()
            );
        }
    } else {
        terminal::print_success("All files processed");
    }

    Ok(summary)
}

fn print_summary(summary: &RunSummary) {
    terminal::print_section("Summary");
    terminal::print_status("Processed", &format!("{} / {}", summary.processed, summary.total), true);
    terminal::print_status("Converted", &summary.converted.to_string(), false);
    terminal::print_status("Skipped", &summary.skipped.to_string(), false);
    terminal::print_status("Copied", &summary.copied.to_string(), false);
    terminal::print_status("Failed", &summary.failed.to_string(), summary.failed > 0);
    terminal::print_status("Elapsed", &format_duration(summary.elapsed), false);
}
