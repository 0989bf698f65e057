//! CLI argument definitions

use std::path::PathBuf;

use clap::{ArgAction, Parser};

/// Report Alchemy - convert problem reports between formats
#[derive(Parser, Debug)]
#[command(name = "report-alchemy")]
#[command(about, long_about = None, disable_version_flag = true)]
pub struct Cli {
    /// A path to a configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the version and exit
    #[arg(short = 'v', long, action = ArgAction::SetTrue)]
    pub version: bool,
}
