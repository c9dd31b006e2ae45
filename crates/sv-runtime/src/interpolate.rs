use std::sync::OnceLock;

use regex::Regex;
use sv_core::StepVarsError;
use tracing::{debug, warn};

use crate::coerce::render;
use crate::options::{MissingPlaceholderPolicy, RuntimeOptions, DEFAULT_MAX_INTERPOLATION_DEPTH};
use crate::store::VariableStore;

/// `{name}` where `name` has no braces or quotes and does not start or end
/// with whitespace, so JSON and padded prose braces pass through untouched.
fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r#"\{([^{}\s"']+(?:\s+[^{}\s"']+)*)\}"#)
            .expect("placeholder regex must compile")
    })
}

fn first_placeholder(text: &str) -> Option<String> {
    placeholder_regex()
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|name| name.as_str().to_string())
}

pub fn has_placeholders(text: &str) -> bool {
    placeholder_regex().is_match(text)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpolator {
    max_depth: usize,
    missing: MissingPlaceholderPolicy,
}

impl Default for Interpolator {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_INTERPOLATION_DEPTH,
            missing: MissingPlaceholderPolicy::Fail,
        }
    }
}

impl Interpolator {
    pub fn new(max_depth: usize, missing: MissingPlaceholderPolicy) -> Self {
        Self {
            max_depth: max_depth.max(1),
            missing,
        }
    }

    pub fn from_options(options: &RuntimeOptions) -> Self {
        Self::new(options.max_interpolation_depth, options.missing_placeholder)
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn missing_policy(&self) -> MissingPlaceholderPolicy {
        self.missing
    }

    pub fn resolve(&self, store: &VariableStore, text: &str) -> Result<String, StepVarsError> {
        if !has_placeholders(text) {
            return Ok(text.to_string());
        }
        let mut resolved = self.resolve_in(store, text, &mut Vec::new())?;
        // Substitution can assemble new placeholders (`{{x}}` with x = "a"),
        // so rescan until nothing is left or a pass changes nothing.
        let mut rescans: Vec<String> = Vec::new();
        while let Some(name) = first_placeholder(&resolved) {
            if rescans.len() >= self.max_depth {
                return Err(circular(&rescans, &name));
            }
            let next = self.resolve_in(store, &resolved, &mut Vec::new())?;
            if next == resolved {
                break;
            }
            rescans.push(name);
            resolved = next;
        }
        debug!(template = text, resolved = %resolved, "resolved placeholders");
        Ok(resolved)
    }

    /// `chain` holds the placeholder names whose values are being expanded.
    fn resolve_in(
        &self,
        store: &VariableStore,
        text: &str,
        chain: &mut Vec<String>,
    ) -> Result<String, StepVarsError> {
        let mut output = String::with_capacity(text.len());
        let mut last_index = 0usize;

        for captures in placeholder_regex().captures_iter(text) {
            let (Some(full), Some(name)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            output.push_str(&text[last_index..full.start()]);
            last_index = full.end();
            let name = name.as_str();

            let Some(value) = store.get_value(name) else {
                match self.missing {
                    MissingPlaceholderPolicy::Fail => {
                        return Err(StepVarsError::variable_not_found(name));
                    }
                    MissingPlaceholderPolicy::Keep => {
                        warn!(placeholder = name, "no variable for placeholder, keeping it");
                        output.push_str(full.as_str());
                        continue;
                    }
                }
            };

            if chain.iter().any(|seen| seen == name) {
                return Err(circular(chain, name));
            }

            let rendered = render(&value);
            if has_placeholders(&rendered) {
                if chain.len() >= self.max_depth {
                    return Err(circular(chain, name));
                }
                chain.push(name.to_string());
                let nested = self.resolve_in(store, &rendered, chain)?;
                chain.pop();
                output.push_str(&nested);
            } else {
                output.push_str(&rendered);
            }
        }

        output.push_str(&text[last_index..]);
        Ok(output)
    }
}

fn circular(chain: &[String], name: &str) -> StepVarsError {
    let mut cycle = chain.to_vec();
    cycle.push(name.to_string());
    StepVarsError::CircularReference { chain: cycle }
}

#[cfg(test)]
mod interpolate_tests {
    use super::*;

    use sv_core::TypedValue;

    fn store_with(entries: &[(&str, &str)]) -> VariableStore {
        let store = VariableStore::new();
        for (name, value) in entries {
            store.set(name, TypedValue::string(*value)).expect("set");
        }
        store
    }

    #[test]
    fn text_without_placeholders_passes_through() {
        let store = VariableStore::new();
        let engine = Interpolator::default();
        assert_eq!(
            engine.resolve(&store, "no placeholders here").expect("literal"),
            "no placeholders here"
        );
        assert_eq!(
            engine.resolve(&store, r#"{"json": {"a": 1}}"#).expect("json braces"),
            r#"{"json": {"a": 1}}"#
        );
        assert_eq!(engine.resolve(&store, "{ spaced }").expect("spaced"), "{ spaced }");
    }

    #[test]
    fn names_with_inner_spaces_are_placeholders() {
        let store = store_with(&[("user name", "Ann")]);
        let engine = Interpolator::default();
        assert_eq!(engine.resolve(&store, "hi {user name}").expect("spaced name"), "hi Ann");
        assert_eq!(engine.resolve(&store, "{ user name}").expect("padded"), "{ user name}");
    }

    #[test]
    fn placeholders_built_by_substitution_are_resolved() {
        let store = store_with(&[("x", "a"), ("a", "Z")]);
        let engine = Interpolator::default();
        assert_eq!(engine.resolve(&store, "{{x}}").expect("assembled"), "Z");
        assert_eq!(engine.resolve(&store, "[{{x}}]").expect("wrapped"), "[Z]");
    }

    #[test]
    fn assembled_placeholders_respect_depth_bound() {
        let store = store_with(&[("x", "y"), ("y", "z"), ("z", "end")]);
        assert_eq!(Interpolator::default().resolve(&store, "{{{x}}}").expect("two rescans"), "end");

        let shallow = Interpolator::new(1, MissingPlaceholderPolicy::Fail);
        let error = shallow.resolve(&store, "{{{x}}}").expect_err("too many rescans");
        assert!(matches!(
            error,
            StepVarsError::CircularReference { ref chain } if chain == &["y", "z"]
        ));
    }

    #[test]
    fn kept_placeholders_stop_rescanning() {
        let store = store_with(&[("x", "gone")]);
        let lenient = Interpolator::new(10, MissingPlaceholderPolicy::Keep);
        assert_eq!(lenient.resolve(&store, "{{x}}").expect("kept"), "{gone}");
    }

    #[test]
    fn placeholders_are_replaced_with_rendered_values() {
        let store = store_with(&[("name", "World")]);
        store.set("count", TypedValue::Long(3)).expect("set count");
        store.set("nothing", TypedValue::Null).expect("set null");
        let engine = Interpolator::default();
        assert_eq!(
            engine.resolve(&store, "Hello {name}").expect("basic"),
            "Hello World"
        );
        assert_eq!(
            engine.resolve(&store, "{name}: {count} items{nothing}.").expect("mixed"),
            "World: 3 items."
        );
    }

    #[test]
    fn nested_references_resolve_recursively() {
        let store = store_with(&[("a", "{b}"), ("b", "X"), ("greeting", "hi {a}{a}")]);
        let engine = Interpolator::default();
        assert_eq!(engine.resolve(&store, "{a}").expect("nested"), "X");
        assert_eq!(engine.resolve(&store, "{greeting}!").expect("twice"), "hi XX!");
    }

    #[test]
    fn self_reference_fails_with_chain() {
        let store = store_with(&[("a", "{a}")]);
        let error = Interpolator::default()
            .resolve(&store, "{a}")
            .expect_err("cycle");
        assert_eq!(
            error,
            StepVarsError::CircularReference {
                chain: vec!["a".to_string(), "a".to_string()]
            }
        );
    }

    #[test]
    fn indirect_cycle_names_every_link() {
        let store = store_with(&[("a", "x{b}"), ("b", "y{c}"), ("c", "{a}")]);
        let error = Interpolator::default()
            .resolve(&store, "start {a}")
            .expect_err("cycle");
        assert!(matches!(
            error,
            StepVarsError::CircularReference { ref chain } if chain == &["a", "b", "c", "a"]
        ));
    }

    #[test]
    fn depth_bound_stops_long_chains() {
        let store = store_with(&[("v1", "{v2}"), ("v2", "{v3}"), ("v3", "{v4}"), ("v4", "end")]);
        let shallow = Interpolator::new(2, MissingPlaceholderPolicy::Fail);
        let error = shallow.resolve(&store, "{v1}").expect_err("too deep");
        assert!(matches!(error, StepVarsError::CircularReference { ref chain } if chain.len() == 3));

        let deep = Interpolator::new(3, MissingPlaceholderPolicy::Fail);
        assert_eq!(deep.resolve(&store, "{v1}").expect("fits"), "end");
    }

    #[test]
    fn missing_placeholder_policy_controls_failure() {
        let store = store_with(&[("known", "K")]);
        let strict = Interpolator::default();
        let error = strict
            .resolve(&store, "{known} and {unknown}")
            .expect_err("missing fails");
        assert_eq!(error, StepVarsError::variable_not_found("unknown"));

        let lenient = Interpolator::new(10, MissingPlaceholderPolicy::Keep);
        assert_eq!(
            lenient.resolve(&store, "{known} and {unknown}").expect("kept"),
            "K and {unknown}"
        );
    }

    #[test]
    fn missing_reference_inside_value_is_reported() {
        let store = store_with(&[("outer", "see {inner}")]);
        let error = Interpolator::default()
            .resolve(&store, "{outer}")
            .expect_err("inner missing");
        assert_eq!(error, StepVarsError::variable_not_found("inner"));
    }

    #[test]
    fn options_configure_engine() {
        let options = RuntimeOptions {
            max_interpolation_depth: 4,
            missing_placeholder: MissingPlaceholderPolicy::Keep,
            random_seed: None,
        };
        let engine = Interpolator::from_options(&options);
        assert_eq!(engine.max_depth(), 4);
        assert_eq!(engine.missing_policy(), MissingPlaceholderPolicy::Keep);
    }
}
