// imgpress-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Parser, Subcommand};
use imgpress_core::TargetFormat;
use imgpress_core::config::{
    DEFAULT_AVIF_ENCODER, DEFAULT_EXIFTOOL, DEFAULT_JPEG_ENCODER, DEFAULT_MILESTONE_INTERVAL,
    DEFAULT_QUALITY, DEFAULT_WEBP_ENCODER, DEFAULT_WORKER_COUNT,
};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "imgpress: Batch image conversion tool",
    long_about = "Converts a directory tree of images to JPEG, WebP or AVIF with external encoders, \
                  copying every other file through and mirroring the tree under the output directory."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging (per-file decisions and every external command)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Converts images from an input directory tree into an output directory tree
    Convert(ConvertArgs),
}

#[derive(Parser, Debug)]
pub struct ConvertArgs {
    /// Root directory to convert
    #[arg(short = 'i', long = "input", required = true, value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Root directory for converted and copied files (created if missing)
    #[arg(short = 'o', long = "output", required = true, value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Target format: jpg, webp or avif
    #[arg(short = 'f', long, value_name = "FORMAT", default_value_t = TargetFormat::Jpg)]
    pub format: TargetFormat,

    /// Number of conversions running at once
    #[arg(
        short = 'j',
        long,
        value_name = "COUNT",
        env = "IMGPRESS_WORKERS",
        default_value_t = DEFAULT_WORKER_COUNT
    )]
    pub workers: usize,

    /// Comma-separated extensions to convert (default: .jpg,.jpeg,.png,.bmp)
    #[arg(long, value_delimiter = ',', value_name = "EXTS")]
    pub extensions: Option<Vec<String>>,

    /// Print a progress summary every N processed files
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MILESTONE_INTERVAL)]
    pub milestone: usize,

    /// Encoder quality passed to the converter
    #[arg(
        short = 'q',
        long,
        value_name = "1-100",
        default_value_t = DEFAULT_QUALITY,
        value_parser = clap::value_parser!(u8).range(1..=100)
    )]
    pub quality: u8,

    // --- Tool Overrides ---
    /// JPEG encoder executable
    #[arg(long, value_name = "PATH", default_value = DEFAULT_JPEG_ENCODER)]
    pub jpeg_encoder: String,

    /// WebP encoder executable
    #[arg(long, value_name = "PATH", default_value = DEFAULT_WEBP_ENCODER)]
    pub webp_encoder: String,

    /// AVIF encoder executable
    #[arg(long, value_name = "PATH", default_value = DEFAULT_AVIF_ENCODER)]
    pub avif_encoder: String,

    /// exiftool executable
    #[arg(long, value_name = "PATH", default_value = DEFAULT_EXIFTOOL)]
    pub exiftool: String,

    /// Do not check that the external tools can be started before the run
    #[arg(long)]
    pub skip_tool_check: bool,

    /// Exit with status 1 if any file failed to convert or copy
    #[arg(long)]
    pub fail_on_error: bool,
}
