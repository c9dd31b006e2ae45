use indexmap::IndexMap;
use sv_core::{StepVarsError, TypedValue, Variable};

use crate::rng::SeededRng;

fn sequence_items(variable: &Variable) -> Result<&[TypedValue], StepVarsError> {
    variable
        .value
        .as_sequence()
        .ok_or_else(|| StepVarsError::NotACollection {
            name: variable.name.clone(),
            expected: "sequence".to_string(),
        })
}

fn mapping_entries(variable: &Variable) -> Result<&IndexMap<String, TypedValue>, StepVarsError> {
    variable
        .value
        .as_mapping()
        .ok_or_else(|| StepVarsError::NotACollection {
            name: variable.name.clone(),
            expected: "mapping".to_string(),
        })
}

pub fn random_from_sequence(
    variable: &Variable,
    rng: &mut SeededRng,
) -> Result<TypedValue, StepVarsError> {
    let items = sequence_items(variable)?;
    if items.is_empty() {
        return Err(StepVarsError::EmptyCollection {
            name: variable.name.clone(),
        });
    }
    Ok(items[rng.next_index(items.len())].clone())
}

/// Zero-based; negative positions cannot be expressed.
pub fn at_index(variable: &Variable, index: usize) -> Result<TypedValue, StepVarsError> {
    let items = sequence_items(variable)?;
    items
        .get(index)
        .cloned()
        .ok_or_else(|| StepVarsError::IndexOutOfRange {
            name: variable.name.clone(),
            index,
            length: items.len(),
        })
}

pub fn random_from_mapping(
    variable: &Variable,
    rng: &mut SeededRng,
) -> Result<TypedValue, StepVarsError> {
    let entries = mapping_entries(variable)?;
    if entries.is_empty() {
        return Err(StepVarsError::EmptyCollection {
            name: variable.name.clone(),
        });
    }
    entries
        .get_index(rng.next_index(entries.len()))
        .map(|(_, value)| value.clone())
        .ok_or_else(|| StepVarsError::EmptyCollection {
            name: variable.name.clone(),
        })
}

pub fn by_key(variable: &Variable, key: &str) -> Result<TypedValue, StepVarsError> {
    mapping_entries(variable)?
        .get(key)
        .cloned()
        .ok_or_else(|| StepVarsError::KeyNotFound {
            name: variable.name.clone(),
            key: key.to_string(),
        })
}

#[cfg(test)]
mod accessors_tests {
    use super::*;

    use sv_core::Kind;

    fn numbers() -> Variable {
        Variable::new(
            "numbers",
            TypedValue::sequence(
                Kind::Int,
                vec![TypedValue::Int(1), TypedValue::Int(2), TypedValue::Int(3)],
            )
            .expect("int sequence"),
        )
        .expect("variable")
    }

    fn dictionary(pairs: &[(&str, &str)]) -> Variable {
        let entries: IndexMap<String, TypedValue> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), TypedValue::string(*value)))
            .collect();
        Variable::new(
            "dictionary",
            TypedValue::mapping(Kind::String, entries).expect("mapping"),
        )
        .expect("variable")
    }

    #[test]
    fn at_index_is_zero_based_and_bounded() {
        let variable = numbers();
        assert_eq!(at_index(&variable, 2).expect("last"), TypedValue::Int(3));
        assert_eq!(at_index(&variable, 0).expect("first"), TypedValue::Int(1));
        let error = at_index(&variable, 3).expect_err("past end");
        assert_eq!(
            error,
            StepVarsError::IndexOutOfRange {
                name: "numbers".to_string(),
                index: 3,
                length: 3
            }
        );
    }

    #[test]
    fn random_from_sequence_picks_an_element() {
        let variable = numbers();
        let mut rng = SeededRng::new(5);
        for _ in 0..20 {
            let picked = random_from_sequence(&variable, &mut rng).expect("non-empty");
            assert!(variable.value.as_sequence().expect("sequence").contains(&picked));
        }
    }

    #[test]
    fn empty_collections_fail() {
        let empty_sequence = Variable::new(
            "none",
            TypedValue::sequence(Kind::String, Vec::new()).expect("empty"),
        )
        .expect("variable");
        let mut rng = SeededRng::new(1);
        let error = random_from_sequence(&empty_sequence, &mut rng).expect_err("empty sequence");
        assert!(matches!(error, StepVarsError::EmptyCollection { ref name } if name == "none"));

        let error = random_from_mapping(&dictionary(&[]), &mut rng).expect_err("empty mapping");
        assert_eq!(error.code(), "EMPTY_COLLECTION");
    }

    #[test]
    fn by_key_reports_missing_key() {
        let variable = dictionary(&[("k", "v")]);
        assert_eq!(by_key(&variable, "k").expect("present"), TypedValue::string("v"));
        let error = by_key(&variable, "missing").expect_err("absent key");
        assert_eq!(
            error,
            StepVarsError::KeyNotFound {
                name: "dictionary".to_string(),
                key: "missing".to_string()
            }
        );
    }

    #[test]
    fn random_from_mapping_returns_a_value() {
        let variable = dictionary(&[("a", "1"), ("b", "2")]);
        let mut rng = SeededRng::new(2);
        let picked = random_from_mapping(&variable, &mut rng).expect("non-empty");
        assert!(picked == TypedValue::string("1") || picked == TypedValue::string("2"));
    }

    #[test]
    fn accessors_reject_wrong_container() {
        let scalar = Variable::new("scalar", TypedValue::Int(1)).expect("variable");
        let error = at_index(&scalar, 0).expect_err("not a sequence");
        assert!(matches!(
            error,
            StepVarsError::NotACollection { ref expected, .. } if expected == "sequence"
        ));
        let error = by_key(&numbers(), "k").expect_err("not a mapping");
        assert!(matches!(
            error,
            StepVarsError::NotACollection { ref expected, .. } if expected == "mapping"
        ));
    }
}
