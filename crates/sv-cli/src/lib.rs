use std::ffi::OsString;
use std::fs;
use std::path::Path;

use anyhow::Context;
use clap::Parser;
use sv_runtime::RuntimeOptions;
use sv_tool::{assert_scenario, read_scenarios_from_dir, run_scenarios, Scenario};
use tracing::error;

mod cli_args;
mod error_map;
mod models;

pub use cli_args::Cli;
pub(crate) use cli_args::{Mode, RunArgs};
pub(crate) use error_map::{emit_error, map_cli_config_read, scenarios_failed};
pub(crate) use models::{ScenarioLine, ScenarioStatus};

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => return error.exit_code(),
    };
    run_cli(cli)
}

pub fn run_cli(cli: Cli) -> i32 {
    match run(cli) {
        Ok(code) => code,
        Err(failure) => {
            error!(error = %format!("{:#}", failure), "run failed");
            emit_error(&failure)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    match cli.command {
        Mode::Run(args) => run_scenarios_dir(args),
    }
}

fn load_options(config: Option<&str>) -> anyhow::Result<RuntimeOptions> {
    let Some(path) = config else {
        return Ok(RuntimeOptions::default());
    };
    let raw = fs::read_to_string(path)
        .map_err(map_cli_config_read)
        .with_context(|| format!("reading config {}", path))?;
    RuntimeOptions::from_json_str(&raw).with_context(|| format!("parsing config {}", path))
}

fn run_scenarios_dir(args: RunArgs) -> anyhow::Result<i32> {
    let options = load_options(args.config.as_deref())?;
    let sources = read_scenarios_from_dir(Path::new(&args.scenarios_dir))
        .with_context(|| format!("loading scenarios from {}", args.scenarios_dir))?;

    let (paths, scenarios): (Vec<String>, Vec<Scenario>) = sources.into_iter().unzip();
    let results = run_scenarios(&options, &scenarios);

    let mut failed = 0usize;
    for ((path, scenario), result) in paths.into_iter().zip(&scenarios).zip(results) {
        let outcome = result.and_then(|report| {
            assert_scenario(scenario, &report)?;
            Ok(report)
        });
        let line = match outcome {
            Ok(report) => ScenarioLine {
                path,
                name: scenario.name.clone(),
                status: ScenarioStatus::Ok,
                steps: Some(report.steps),
                error_code: None,
                message: None,
            },
            Err(failure) => {
                failed += 1;
                ScenarioLine {
                    path,
                    name: scenario.name.clone(),
                    status: ScenarioStatus::Error,
                    steps: None,
                    error_code: Some(failure.code().to_string()),
                    message: Some(failure.to_string()),
                }
            }
        };
        println!("SCENARIO_JSON:{}", serde_json::to_string(&line)?);
    }

    if failed > 0 {
        return Err(scenarios_failed(failed, scenarios.len()).into());
    }
    println!("RESULT:OK");
    println!("SCENARIOS:{}", scenarios.len());
    Ok(0)
}
