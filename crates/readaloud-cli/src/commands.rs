//! Subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch the narration for an article and print its caption table
    Captions {
        /// Article text file
        file: PathBuf,
        /// Print captions as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Find the caption matching a text fragment (offline)
    Match {
        /// Caption JSON file, as printed by `captions --json`
        captions: PathBuf,
        /// Text fragment to look up
        fragment: String,
    },

    /// Narrate an article, printing each highlighted sentence
    Play(PlayArgs),

    /// Play the pronunciation clip for a word
    Pronounce {
        word: String,
        /// Synthesis speed requested from the clip endpoint
        #[arg(long)]
        speed: Option<f32>,
    },

    /// Print the dictionary entry for a word
    Define { word: String },
}

/// Arguments of the `play` command.
#[derive(Args, Debug)]
pub struct PlayArgs {
    /// Article text file
    pub file: PathBuf,

    /// Start from the sentence matching this fragment
    #[arg(long)]
    pub from: Option<String>,

    /// Playback rate (snapped to 0.75, 1, 1.25, 1.5 or 2)
    #[arg(long, default_value_t = 1.0)]
    pub rate: f32,

    /// Repeat the narration until interrupted
    #[arg(long = "loop")]
    pub looping: bool,
}
