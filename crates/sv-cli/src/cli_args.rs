use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "sv-cli")]
#[command(about = "Runs step-variable scenarios")]
pub struct Cli {
    /// Log every variable change and step to stderr.
    #[arg(long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub(crate) command: Mode,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    Run(RunArgs),
}

#[derive(Debug, Args)]
pub(crate) struct RunArgs {
    #[arg(long = "scenarios-dir")]
    pub(crate) scenarios_dir: String,
    /// JSON runtime options applied to scenarios without their own.
    #[arg(long = "config")]
    pub(crate) config: Option<String>,
}
