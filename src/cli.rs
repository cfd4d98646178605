use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "vss-mapper")]
#[command(about = "Convert vehicle signal specifications into an enriched vehicle HAL property model")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert a spec into the unified signal model (JSON)
    Convert {
        /// Root specification file; includes resolve relative to its directory
        spec: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Write the model to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run the full pipeline and print diagnostics only
    Check {
        /// Root specification file; includes resolve relative to its directory
        spec: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },
}

/// Options shared by every command that runs the pipeline
#[derive(clap::Args, Debug, Clone)]
pub struct PipelineArgs {
    /// Directory with typemap.yml, property_heuristics.yml and
    /// unit_conversion_rules.yml (empty tables when omitted)
    #[arg(short, long)]
    pub config_dir: Option<PathBuf>,

    /// Exit with an error if any warning or error diagnostic was recorded
    #[arg(long)]
    pub deny_warnings: bool,
}
