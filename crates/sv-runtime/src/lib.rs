pub mod accessors;
pub mod coerce;
pub mod interpolate;
pub mod options;
pub mod rng;
pub mod scope;
pub mod store;

pub use accessors::{at_index, by_key, random_from_mapping, random_from_sequence};
pub use coerce::{
    parse, parse_datetime, parse_named, parse_sequence, render, render_present,
    split_to_sequence, NO_VALUE_TEXT, RENDER_DATETIME_FORMAT,
};
pub use interpolate::{has_placeholders, Interpolator};
pub use options::{MissingPlaceholderPolicy, RuntimeOptions, DEFAULT_MAX_INTERPOLATION_DEPTH};
pub use rng::SeededRng;
pub use scope::{FlowContext, ScopeHandle, ScopeId, ScopeManager};
pub use store::VariableStore;
