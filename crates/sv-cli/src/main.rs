use clap::Parser;
use sv_cli::Cli;
use tracing::Level;
use tracing_subscriber::fmt;

fn main() {
    let cli = Cli::parse();
    let max_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::ERROR
    };
    fmt()
        .with_max_level(max_level)
        .with_writer(std::io::stderr)
        .init();
    std::process::exit(sv_cli::run_cli(cli));
}
