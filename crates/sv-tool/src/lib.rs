mod runner;
mod scenario;
mod source;

pub use runner::{
    assert_scenario, execute_step, run_scenario, run_scenario_with, run_scenarios, Collaborators,
    RunReport,
};
pub use scenario::{Scenario, StepCall, SCENARIO_SCHEMA_V1};
pub use source::{read_scenario, read_scenarios_from_dir, SCENARIO_FILE_SUFFIX};

use std::path::PathBuf;

use sv_core::StepVarsError;
use sv_steps::StepError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SvToolError {
    #[error("Failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse scenario {path}: {source}")]
    ParseScenario {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid scenario schema version \"{found}\", expected \"{expected}\".")]
    InvalidSchemaVersion { expected: String, found: String },
    #[error("No .scenario.json files under {path}.")]
    SourceEmpty { path: PathBuf },
    #[error(transparent)]
    Vars(#[from] StepVarsError),
    #[error("Scenario \"{scenario}\" failed at step {index} ({step}): {source}")]
    Step {
        scenario: String,
        index: usize,
        step: &'static str,
        source: StepError,
    },
    #[error("Scenario \"{scenario}\": variable \"{name}\" expected \"{expected}\", actual {actual}.")]
    VariableMismatch {
        scenario: String,
        name: String,
        expected: String,
        actual: String,
    },
    #[error("Scenario \"{scenario}\" panicked.")]
    Panicked { scenario: String },
}

impl SvToolError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ReadFile { .. } => "SCENARIO_READ",
            Self::ParseScenario { .. } => "SCENARIO_PARSE",
            Self::InvalidSchemaVersion { .. } => "SCENARIO_SCHEMA",
            Self::SourceEmpty { .. } => "SCENARIO_SOURCE_EMPTY",
            Self::Vars(error) => error.code(),
            Self::Step { source, .. } => source.code(),
            Self::VariableMismatch { .. } => "VARIABLE_MISMATCH",
            Self::Panicked { .. } => "SCENARIO_PANICKED",
        }
    }
}
