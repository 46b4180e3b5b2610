use clap::{Args, Parser, Subcommand};
use slitchain::engine::config::FixMode;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "slitchain CLI - build bond-fluctuation-model chains confined in a slit and measure the local force on chain units.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a linear chain inside a slit and write it as a conformation file.
    Create(CreateArgs),
    /// Estimate the local force on chain units over a sequence of conformation files.
    Force(ForceArgs),
}

/// Arguments for the `create` subcommand.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Path for the output conformation file.
    #[arg(short, long, default_value = "config.conf", value_name = "PATH")]
    pub output: PathBuf,

    /// Optional configuration file in TOML format (`[chain]` table).
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Number of units in the chain.
    #[arg(short = 'n', long, value_name = "INT")]
    pub chain_length: Option<usize>,

    /// Width of the slit along Z, in lattice units.
    #[arg(short, long, value_name = "INT")]
    pub slit_size: Option<u32>,

    /// Box extent along X and Y, in lattice units.
    #[arg(short, long = "box-xy", value_name = "INT")]
    pub box_xy: Option<u32>,

    /// How the chain ends are pinned: 0 (bottom), 1 (walls) or 2 (space).
    #[arg(short = 'm', long, value_name = "MODE")]
    pub fix_mode: Option<FixMode>,

    /// Height of the in-space fixpoint above the bottom wall (mode 2 only).
    #[arg(short = 'p', long = "distance", value_name = "INT")]
    pub distance_fixpoint_wall: Option<u32>,

    /// Seed for the random number generator. A fresh seed is drawn if omitted.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,
}

/// Arguments for the `force` subcommand.
#[derive(Args, Debug)]
pub struct ForceArgs {
    /// Conformation files to analyse, in trajectory order.
    #[arg(required = true, num_args = 1.., value_name = "PATH")]
    pub inputs: Vec<PathBuf>,

    /// Optional configuration file in TOML format (`[force]` table).
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Ids of the units to track. Repeat or separate with commas.
    #[arg(short = 'u', long = "units", value_name = "ID", num_args = 1.., value_delimiter = ',')]
    pub tracked_units: Vec<usize>,

    /// Conformations younger than this age are skipped.
    #[arg(long, value_name = "INT")]
    pub begin_age: Option<u64>,

    /// Path for the force table.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}
