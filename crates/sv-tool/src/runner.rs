use std::collections::BTreeMap;
use std::thread;

use sv_runtime::{render, RuntimeOptions, ScopeHandle, ScopeManager};
use sv_steps::{
    self as steps, DataGenerator, FileProvider, LocalFileProvider, SeededGenerator, StepError,
};
use tracing::{debug, info};

use crate::{Scenario, StepCall, SvToolError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub scenario: String,
    pub steps: usize,
    /// Rendered text of every variable left in the scope, by name.
    pub variables: BTreeMap<String, String>,
}

/// External services the steps lean on.
pub struct Collaborators {
    pub generator: Box<dyn DataGenerator>,
    pub files: Box<dyn FileProvider>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            generator: Box::new(SeededGenerator),
            files: Box::new(LocalFileProvider),
        }
    }
}

pub fn run_scenario(manager: &ScopeManager, scenario: &Scenario) -> Result<RunReport, SvToolError> {
    run_scenario_with(manager, scenario, &Collaborators::default())
}

/// Runs the steps in a fresh scope. The scope is ended whether or not a
/// step fails.
pub fn run_scenario_with(
    manager: &ScopeManager,
    scenario: &Scenario,
    collaborators: &Collaborators,
) -> Result<RunReport, SvToolError> {
    let scope = match &scenario.options {
        Some(options) => {
            options.validate()?;
            manager.begin_with(options)
        }
        None => manager.begin(),
    };
    info!(scenario = %scenario.name, scope = scope.id().get(), "scenario started");

    let outcome = run_steps(&scope, scenario, collaborators);
    manager.end(&scope);

    match &outcome {
        Ok(report) => info!(scenario = %scenario.name, steps = report.steps, "scenario finished"),
        Err(error) => info!(scenario = %scenario.name, code = error.code(), "scenario failed"),
    }
    outcome
}

fn run_steps(
    scope: &ScopeHandle,
    scenario: &Scenario,
    collaborators: &Collaborators,
) -> Result<RunReport, SvToolError> {
    for (index, call) in scenario.steps.iter().enumerate() {
        debug!(scenario = %scenario.name, index, step = call.step_name(), "executing step");
        execute_step(scope, call, collaborators).map_err(|source| SvToolError::Step {
            scenario: scenario.name.clone(),
            index,
            step: call.step_name(),
            source,
        })?;
    }

    let variables = scope
        .store()?
        .snapshot()
        .into_iter()
        .map(|(name, value)| (name, render(&value)))
        .collect();
    Ok(RunReport {
        scenario: scenario.name.clone(),
        steps: scenario.steps.len(),
        variables,
    })
}

pub fn execute_step(
    scope: &ScopeHandle,
    call: &StepCall,
    collaborators: &Collaborators,
) -> Result<(), StepError> {
    let generator = collaborators.generator.as_ref();
    let files = collaborators.files.as_ref();
    match call {
        StepCall::StoreText { text, name } => steps::store_text(scope, text, name),
        StepCall::StoreMultilineText { name, lines } => {
            steps::store_multiline_text(scope, name, lines)
        }
        StepCall::StoreXmlText { name, xml } => steps::store_xml_text(scope, name, xml),
        StepCall::StoreNumber { number, name } => steps::store_number(scope, number, name),
        StepCall::ChangeVariable { name, value } => steps::change_variable(scope, name, value),
        StepCall::EmptyVariable { name } => steps::empty_variable(scope, name),
        StepCall::DeleteVariable { name } => steps::delete_variable(scope, name),
        StepCall::CopyValue { from, to } => steps::copy_value(scope, from, to),
        StepCall::CopyText { from, to } => steps::copy_text(scope, from, to),
        StepCall::SubstituteVariable { name, template, to } => {
            steps::substitute_variable(scope, name, template, to)
        }
        StepCall::StoreSequence { name, table } => steps::store_sequence(scope, name, table),
        StepCall::StoreTypedSequence { kind, name, table } => {
            steps::store_typed_sequence(scope, kind, name, table)
        }
        StepCall::StoreRandomElement { collection, name } => {
            steps::store_random_element(scope, collection, name)
        }
        StepCall::StoreElementAt {
            collection,
            index,
            name,
        } => steps::store_element_at(scope, collection, index, name),
        StepCall::SplitIntoSequence {
            name,
            separators,
            to,
        } => steps::split_into_sequence(scope, name, separators, to),
        StepCall::StoreMapping { name, table } => steps::store_mapping(scope, name, table),
        StepCall::StoreRandomValue { mapping, name } => {
            steps::store_random_value(scope, mapping, name)
        }
        StepCall::StoreValueByKey { mapping, key, name } => {
            steps::store_value_by_key(scope, mapping, key, name)
        }
        StepCall::AssertText {
            name,
            check,
            expected,
        } => steps::assert_text(scope, name, *check, expected),
        StepCall::AssertNull { name } => steps::assert_null(scope, name),
        StepCall::AssertNotNull { name } => steps::assert_not_null(scope, name),
        StepCall::AssertEmpty { name } => steps::assert_empty(scope, name),
        StepCall::AssertNotEmpty { name } => steps::assert_not_empty(scope, name),
        StepCall::StoreDate { date, format, name } => {
            steps::store_date(scope, *date, format.as_deref(), name)
        }
        StepCall::StoreTime { time, format, name } => {
            steps::store_time(scope, *time, format.as_deref(), name)
        }
        StepCall::StoreDatetime {
            date,
            time,
            format,
            name,
        } => steps::store_datetime(scope, *date, *time, format.as_deref(), name),
        StepCall::StoreCurrentDate { format, name } => {
            steps::store_current_date(scope, generator, format.as_deref(), name)
        }
        StepCall::StoreRandomDate { format, name } => {
            steps::store_random_date(scope, generator, format.as_deref(), name)
        }
        StepCall::StoreShiftedDate {
            shift,
            direction,
            from,
            format,
            name,
        } => steps::store_shifted_date(
            scope,
            generator,
            *shift,
            *direction,
            from.as_deref(),
            format.as_deref(),
            name,
        ),
        StepCall::StoreRandomText {
            charset,
            length,
            prefix,
            postfix,
            name,
        } => steps::store_random_text(
            scope,
            generator,
            *charset,
            *length,
            prefix.as_deref(),
            postfix.as_deref(),
            name,
        ),
        StepCall::StoreUuid { name } => steps::store_uuid(scope, generator, name),
        StepCall::StoreRandomPhone { mask, name } => {
            steps::store_random_phone(scope, generator, mask, name)
        }
        StepCall::StoreRandomMonth { name } => steps::store_random_month(scope, generator, name),
        StepCall::StoreRandomWeekday { name } => {
            steps::store_random_weekday(scope, generator, name)
        }
        StepCall::StoreRandomEmail { provider, name } => {
            steps::store_random_email(scope, generator, provider, name)
        }
        StepCall::StoreRandomIp { name } => steps::store_random_ip(scope, generator, name),
        StepCall::StoreRandomUrl { name } => steps::store_random_url(scope, generator, name),
        StepCall::CreateFiles { files: specs } => steps::create_files(scope, files, specs),
        StepCall::AssertFilesExist { files: specs } => {
            steps::assert_files_exist(scope, files, specs)
        }
        StepCall::StoreFileContent { path, name } => {
            steps::store_file_content(scope, files, path, name)
        }
        StepCall::WriteVariableToFile { name, path } => {
            steps::write_variable_to_file(scope, files, name, path)
        }
    }
}

/// Runs each scenario on its own thread against one shared manager.
/// Reports come back in input order.
pub fn run_scenarios(
    options: &RuntimeOptions,
    scenarios: &[Scenario],
) -> Vec<Result<RunReport, SvToolError>> {
    let manager = ScopeManager::new(options.clone());
    let collaborators = Collaborators::default();
    thread::scope(|threads| {
        let handles: Vec<_> = scenarios
            .iter()
            .map(|scenario| {
                let manager = &manager;
                let collaborators = &collaborators;
                threads.spawn(move || run_scenario_with(manager, scenario, collaborators))
            })
            .collect();
        handles
            .into_iter()
            .zip(scenarios)
            .map(|(handle, scenario)| {
                handle.join().unwrap_or_else(|_| {
                    Err(SvToolError::Panicked {
                        scenario: scenario.name.clone(),
                    })
                })
            })
            .collect()
    })
}

/// Checks the report against the scenario's expected variables.
pub fn assert_scenario(scenario: &Scenario, report: &RunReport) -> Result<(), SvToolError> {
    for (name, expected) in &scenario.expected_variables {
        let actual = report.variables.get(name);
        if actual != Some(expected) {
            return Err(SvToolError::VariableMismatch {
                scenario: scenario.name.clone(),
                name: name.clone(),
                expected: expected.clone(),
                actual: actual
                    .map(|text| format!("\"{}\"", text))
                    .unwrap_or_else(|| "<missing>".to_string()),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod runner_tests {
    use super::*;

    use sv_core::StepVarsError;
    use sv_runtime::MissingPlaceholderPolicy;
    use sv_steps::TextCheck;

    use crate::SCENARIO_SCHEMA_V1;

    fn scenario(name: &str, steps: Vec<StepCall>) -> Scenario {
        Scenario {
            schema_version: SCENARIO_SCHEMA_V1.to_string(),
            name: name.to_string(),
            options: None,
            steps,
            expected_variables: BTreeMap::new(),
        }
    }

    fn store_text(text: &str, name: &str) -> StepCall {
        StepCall::StoreText {
            text: text.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn run_scenario_reports_rendered_variables() {
        let manager = ScopeManager::default();
        let greeting = scenario(
            "greeting",
            vec![
                store_text("World", "who"),
                store_text("Hello {who}", "greeting"),
                StepCall::StoreNumber {
                    number: "2,5".to_string(),
                    name: "ratio".to_string(),
                },
                StepCall::AssertText {
                    name: "greeting".to_string(),
                    check: TextCheck::EndsWith,
                    expected: "{who}".to_string(),
                },
            ],
        );
        let report = run_scenario(&manager, &greeting).expect("scenario passes");
        assert_eq!(report.steps, 4);
        assert_eq!(
            report.variables.keys().cloned().collect::<Vec<_>>(),
            vec!["greeting", "ratio", "who"]
        );
        assert_eq!(report.variables["greeting"], "Hello World");
        assert_eq!(report.variables["ratio"], "2.5");
        assert_eq!(manager.live_scopes(), 0);
    }

    #[test]
    fn failing_step_names_its_position_and_still_ends_scope() {
        let manager = ScopeManager::default();
        let broken = scenario(
            "broken",
            vec![store_text("a", "x"), store_text("b", "x")],
        );
        let error = run_scenario(&manager, &broken).expect_err("second store collides");
        assert!(matches!(
            error,
            SvToolError::Step { index: 1, step: "storeText", ref scenario, .. } if scenario == "broken"
        ));
        assert_eq!(error.code(), "VAR_EXISTS");
        assert_eq!(manager.live_scopes(), 0);
    }

    #[test]
    fn scenario_options_replace_manager_options() {
        let manager = ScopeManager::default();
        let mut lenient = scenario("lenient", vec![store_text("keep {unknown}", "text")]);
        lenient.options = Some(RuntimeOptions {
            missing_placeholder: MissingPlaceholderPolicy::Keep,
            ..RuntimeOptions::default()
        });
        let report = run_scenario(&manager, &lenient).expect("kept placeholder");
        assert_eq!(report.variables["text"], "keep {unknown}");

        let strict = scenario("strict", vec![store_text("keep {unknown}", "text")]);
        let error = run_scenario(&manager, &strict).expect_err("missing placeholder");
        assert_eq!(error.code(), "VAR_NOT_FOUND");

        let mut invalid = scenario("invalid", Vec::new());
        invalid.options = Some(RuntimeOptions {
            max_interpolation_depth: 0,
            ..RuntimeOptions::default()
        });
        let error = run_scenario(&manager, &invalid).expect_err("zero depth");
        assert!(matches!(
            error,
            SvToolError::Vars(StepVarsError::InvalidOptions { .. })
        ));
    }

    #[test]
    fn parallel_scenarios_never_share_variables() {
        let scenarios: Vec<Scenario> = (0..8)
            .map(|flow| {
                let mut steps = Vec::new();
                for round in 0..20 {
                    steps.push(store_text(&format!("{}-{}", flow, round), &format!("v{}", round)));
                }
                steps.push(store_text(&flow.to_string(), "flow"));
                scenario(&format!("flow-{}", flow), steps)
            })
            .collect();

        let results = run_scenarios(&RuntimeOptions::default(), &scenarios);
        assert_eq!(results.len(), 8);
        for (flow, result) in results.into_iter().enumerate() {
            let report = result.expect("each flow passes");
            assert_eq!(report.scenario, format!("flow-{}", flow));
            assert_eq!(report.variables.len(), 21);
            assert_eq!(report.variables["flow"], flow.to_string());
            assert_eq!(report.variables["v7"], format!("{}-7", flow));
        }
    }

    #[test]
    fn assert_scenario_compares_expected_text() {
        let manager = ScopeManager::default();
        let mut checked = scenario("checked", vec![store_text("42", "answer")]);
        checked
            .expected_variables
            .insert("answer".to_string(), "42".to_string());
        let report = run_scenario(&manager, &checked).expect("runs");
        assert_scenario(&checked, &report).expect("matches");

        checked
            .expected_variables
            .insert("missing".to_string(), "x".to_string());
        let error = assert_scenario(&checked, &report).expect_err("missing variable");
        assert!(matches!(
            error,
            SvToolError::VariableMismatch { ref name, ref actual, .. } if name == "missing" && actual == "<missing>"
        ));
    }

    #[test]
    fn created_files_are_checked_and_recorded() {
        let dir = std::env::temp_dir().join(format!("sv-tool-files-{}", std::process::id()));
        let dir_text = dir.display().to_string();
        let spec = |name: &str| sv_steps::FileSpec {
            name: name.to_string(),
            path: Some("{dir}".to_string()),
            content: "for {dir}".to_string(),
        };
        let manager = ScopeManager::default();
        let files = scenario(
            "files",
            vec![
                store_text(&dir_text, "dir"),
                StepCall::CreateFiles {
                    files: vec![spec("one.txt"), spec("two.txt")],
                },
                StepCall::AssertFilesExist {
                    files: vec![spec("one.txt"), spec("two.txt")],
                },
                StepCall::StoreFileContent {
                    path: "{one.txt}".to_string(),
                    name: "content".to_string(),
                },
            ],
        );
        let report = run_scenario(&manager, &files).expect("files created");
        assert_eq!(report.variables["content"], format!("for {}", dir_text));
        assert_eq!(
            report.variables["two.txt"],
            dir.join("two.txt").display().to_string()
        );

        let missing = scenario(
            "missing",
            vec![
                store_text(&dir_text, "dir"),
                StepCall::AssertFilesExist {
                    files: vec![spec("three.txt")],
                },
            ],
        );
        let error = run_scenario(&manager, &missing).expect_err("no such file");
        assert!(matches!(
            error,
            SvToolError::Step { step: "assertFilesExist", .. }
        ));
        assert_eq!(error.code(), "ASSERTION_FAILED");
        std::fs::remove_dir_all(&dir).expect("cleanup");
    }

    #[test]
    fn seeded_scenarios_are_reproducible() {
        let mut seeded = scenario(
            "seeded",
            vec![
                StepCall::StoreUuid {
                    name: "id".to_string(),
                },
                StepCall::StoreSequence {
                    name: "pool".to_string(),
                    table: sv_steps::StepTable::from_cells(&["a", "b", "c", "d"], &[]),
                },
                StepCall::StoreRandomElement {
                    collection: "pool".to_string(),
                    name: "pick".to_string(),
                },
            ],
        );
        seeded.options = Some(RuntimeOptions {
            random_seed: Some(2024),
            ..RuntimeOptions::default()
        });
        let manager = ScopeManager::default();
        let first = run_scenario(&manager, &seeded).expect("first run");
        let second = run_scenario(&manager, &seeded).expect("second run");
        assert_eq!(first.variables, second.variables);
    }
}
