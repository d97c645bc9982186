use clap::{Parser, Subcommand};
use utils::version;

use crate::config::run::{DescribeArgs, RunArgs};

#[derive(Parser)]
#[command(about, long_about, version = &**version::VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the worker workload, wait for it and launch the master
    Run(Box<RunArgs>),
    /// Decode a manifest file and list the objects it contains
    Describe(DescribeArgs),
}
