pub mod error;
pub mod types;
pub mod value;

pub use error::StepVarsError;
pub use types::*;
pub use value::*;
