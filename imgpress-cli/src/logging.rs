// ============================================================================
// imgpress-cli/src/logging.rs
// ============================================================================
//
// LOGGING: env_logger Setup for the CLI
//
// The core library and the terminal module both write through the `log`
// facade; this module installs env_logger as the backend. Info lines are
// printed bare so that the terminal output reads as plain text; every other
// level carries a colored level tag.
//
// USAGE:
// - default: info and above
// - --verbose: debug and above (per-file decisions, every external command)
// - RUST_LOG still overrides either, e.g. RUST_LOG=imgpress_core=trace

use crate::terminal::should_use_color;

use log::{Level, LevelFilter, debug};
use owo_colors::OwoColorize;
use std::io::Write;

/// Installs the global logger. Call once, before any other output.
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .format(|buf, record| {
            if record.level() == Level::Info {
                return writeln!(buf, "{}", record.args());
            }
            let tag = match record.level() {
                Level::Error => "ERROR",
                Level::Warn => "WARN ",
                Level::Info => "INFO ",
                Level::Debug => "DEBUG",
                Level::Trace => "TRACE",
            };
            let tag = if should_use_color() {
                match record.level() {
                    Level::Error => tag.bright_red().to_string(),
                    Level::Warn => tag.yellow().to_string(),
                    Level::Debug => tag.blue().to_string(),
                    _ => tag.magenta().to_string(),
                }
            } else {
                tag.to_string()
            };
            writeln!(buf, "{tag} {}", record.args())
        })
        .filter_level(level)
        .parse_default_env()
        .init();

    debug!("Logger initialized with level: {level}");
}

/// Returns the current local timestamp formatted as "YYYY-MM-DD HH:MM:SS".
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
