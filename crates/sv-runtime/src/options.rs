use serde::{Deserialize, Serialize};
use sv_core::StepVarsError;

pub const DEFAULT_MAX_INTERPOLATION_DEPTH: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPlaceholderPolicy {
    /// Unresolved `{name}` fails the whole resolution.
    #[default]
    Fail,
    /// Unresolved `{name}` is copied to the output verbatim.
    Keep,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuntimeOptions {
    pub max_interpolation_depth: usize,
    pub missing_placeholder: MissingPlaceholderPolicy,
    pub random_seed: Option<u32>,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            max_interpolation_depth: DEFAULT_MAX_INTERPOLATION_DEPTH,
            missing_placeholder: MissingPlaceholderPolicy::default(),
            random_seed: None,
        }
    }
}

impl RuntimeOptions {
    pub fn from_json_str(raw: &str) -> Result<Self, StepVarsError> {
        let options: Self =
            serde_json::from_str(raw).map_err(|error| StepVarsError::InvalidOptions {
                message: error.to_string(),
            })?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), StepVarsError> {
        if self.max_interpolation_depth == 0 {
            return Err(StepVarsError::InvalidOptions {
                message: "maxInterpolationDepth must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
