//! Root CLI structure and global options.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Narrate Korean articles with synchronized captions.
#[derive(Parser, Debug)]
#[command(name = "readaloud")]
#[command(about = "Narrate Korean articles with synchronized captions")]
#[command(version)]
pub struct Cli {
    /// Origin of the reading app's TTS and dictionary endpoints
    #[arg(
        long,
        env = "READALOUD_BASE_URL",
        default_value = "http://localhost:3000",
        global = true
    )]
    pub base_url: String,

    /// Narration voice
    #[arg(long, env = "READALOUD_VOICE", global = true)]
    pub voice: Option<String>,

    /// Synthesize with a local edge-tts executable instead of the HTTP endpoint
    #[arg(
        long,
        value_name = "PROGRAM",
        num_args = 0..=1,
        default_missing_value = "edge-tts",
        global = true
    )]
    pub edge_tts: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}
