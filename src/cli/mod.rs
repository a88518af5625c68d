//! CLI module for vidseek.

pub mod commands;
mod output;

pub use output::{format_seconds, Output};

use clap::{Parser, Subcommand};

/// vidseek - semantic search over video transcripts
///
/// Import transcribed videos, index their transcript windows and chapter
/// titles, and jump straight to the moment that answers a question.
#[derive(Parser, Debug)]
#[command(name = "vidseek")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "VIDSEEK_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register a video with its transcript and description
    Import {
        /// Video URL (watch, youtu.be, embed or shorts form)
        url: String,

        /// Video title
        #[arg(short, long)]
        title: String,

        /// File holding the transcript text
        #[arg(long)]
        transcript: Option<String>,

        /// File holding the description; chapter lines are parsed from it
        #[arg(long)]
        description: Option<String>,

        /// Short summary of the video
        #[arg(long)]
        summary: Option<String>,

        /// Upload date as reported by the platform (e.g. 20240131)
        #[arg(long)]
        upload_date: Option<String>,

        /// Duration in seconds
        #[arg(long)]
        duration: Option<u32>,

        /// Tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Index the video right after importing it
        #[arg(long)]
        index: bool,
    },

    /// Add transcript chunks and chapters of a video to the indexes
    Index {
        /// Video id to index
        #[arg(required_unless_present = "all")]
        video_id: Option<u32>,

        /// Index every transcribed video that is not indexed yet
        #[arg(long, conflicts_with = "video_id")]
        all: bool,
    },

    /// Find the moment in your library that best matches a query
    Search {
        /// Search query
        query: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List imported videos
    List,

    /// Show a video's details and chapters
    Show {
        /// Video id
        video_id: u32,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the current configuration to the config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
