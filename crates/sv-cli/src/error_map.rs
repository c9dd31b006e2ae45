use std::fmt::Display;

use sv_core::StepVarsError;
use sv_tool::SvToolError;
use thiserror::Error;

/// Failure raised by the CLI itself, with a stable code.
#[derive(Debug, Error)]
#[error("{message}")]
pub(crate) struct CliError {
    pub(crate) code: &'static str,
    pub(crate) message: String,
}

fn map_error(code: &'static str, error: impl Display) -> CliError {
    CliError {
        code,
        message: error.to_string(),
    }
}

pub(crate) fn map_cli_config_read(error: std::io::Error) -> CliError {
    map_error("CLI_CONFIG_READ", error)
}

pub(crate) fn scenarios_failed(failed: usize, total: usize) -> CliError {
    map_error(
        "CLI_SCENARIOS_FAILED",
        format!("{} of {} scenarios failed", failed, total),
    )
}

/// First recognised code along the error chain.
pub(crate) fn error_code(error: &anyhow::Error) -> &'static str {
    for cause in error.chain() {
        if let Some(error) = cause.downcast_ref::<CliError>() {
            return error.code;
        }
        if let Some(error) = cause.downcast_ref::<SvToolError>() {
            return error.code();
        }
        if let Some(error) = cause.downcast_ref::<StepVarsError>() {
            return error.code();
        }
    }
    "CLI_INTERNAL"
}

pub(crate) fn emit_error(error: &anyhow::Error) -> i32 {
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", error_code(error));
    println!(
        "ERROR_MSG_JSON:{}",
        serde_json::to_string(&format!("{:#}", error))
            .unwrap_or_else(|_| "\"Unknown error\"".to_string())
    );
    1
}
