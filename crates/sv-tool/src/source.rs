use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use walkdir::WalkDir;

use crate::{Scenario, SvToolError, SCENARIO_SCHEMA_V1};

pub const SCENARIO_FILE_SUFFIX: &str = ".scenario.json";

/// Reads every `*.scenario.json` under `dir`, keyed by `/`-separated
/// relative path. Unnamed scenarios take their file name.
pub fn read_scenarios_from_dir(dir: &Path) -> Result<BTreeMap<String, Scenario>, SvToolError> {
    let metadata = fs::metadata(dir).map_err(|source| SvToolError::ReadFile {
        path: dir.to_path_buf(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(SvToolError::ReadFile {
            path: dir.to_path_buf(),
            source: io::Error::other("not a directory"),
        });
    }

    let mut scenarios = BTreeMap::new();

    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry.map_err(|error| SvToolError::ReadFile {
            path: error.path().unwrap_or(dir).to_path_buf(),
            source: io::Error::from(error),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let file_name = entry.file_name().to_string_lossy();
        let Some(stem) = file_name.strip_suffix(SCENARIO_FILE_SUFFIX) else {
            continue;
        };

        let Ok(relative) = path.strip_prefix(dir) else {
            continue;
        };
        let relative = relative.to_string_lossy().replace('\\', "/");

        let mut scenario = read_scenario(path)?;
        if scenario.name.is_empty() {
            scenario.name = stem.to_string();
        }
        scenarios.insert(relative, scenario);
    }

    if scenarios.is_empty() {
        return Err(SvToolError::SourceEmpty {
            path: dir.to_path_buf(),
        });
    }

    Ok(scenarios)
}

pub fn read_scenario(path: &Path) -> Result<Scenario, SvToolError> {
    let raw = fs::read_to_string(path).map_err(|source| SvToolError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: Scenario =
        serde_json::from_str(&raw).map_err(|source| SvToolError::ParseScenario {
            path: path.to_path_buf(),
            source,
        })?;

    if parsed.schema_version != SCENARIO_SCHEMA_V1 {
        return Err(SvToolError::InvalidSchemaVersion {
            expected: SCENARIO_SCHEMA_V1.to_string(),
            found: parsed.schema_version,
        });
    }

    Ok(parsed)
}

#[cfg(test)]
mod source_tests {
    use super::*;

    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(name: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should move forward")
            .as_nanos();
        std::env::temp_dir().join(format!("sv-tool-{}-{}", name, nanos))
    }

    fn write_file(path: &Path, content: &str) {
        let parent = path.parent().expect("path should have parent");
        fs::create_dir_all(parent).expect("parent dir should be created");
        fs::write(path, content).expect("file should be written");
    }

    const MINIMAL: &str = r#"{"schemaVersion":"sv-scenario.v1","steps":[]}"#;

    #[test]
    fn read_scenarios_from_dir_collects_sorted_scenarios() {
        let root = temp_dir("scenarios");
        write_file(&root.join("b.scenario.json"), MINIMAL);
        write_file(
            &root.join("nested").join("a.scenario.json"),
            r#"{"schemaVersion":"sv-scenario.v1","name":"named"}"#,
        );
        write_file(&root.join("notes.json"), "{}");
        write_file(&root.join("readme.txt"), "skip");

        let scenarios = read_scenarios_from_dir(&root).expect("scan should pass");
        assert_eq!(
            scenarios.keys().cloned().collect::<Vec<_>>(),
            vec!["b.scenario.json".to_string(), "nested/a.scenario.json".to_string()]
        );
        assert_eq!(scenarios["b.scenario.json"].name, "b");
        assert_eq!(scenarios["nested/a.scenario.json"].name, "named");
    }

    #[test]
    fn read_scenarios_from_dir_fails_when_nothing_matches() {
        let root = temp_dir("empty-scenarios");
        write_file(&root.join("ignore.txt"), "skip");

        let error = read_scenarios_from_dir(&root).expect_err("empty source should fail");
        assert!(matches!(error, SvToolError::SourceEmpty { .. }));
    }

    #[test]
    fn read_scenarios_from_dir_reports_missing_or_non_directory_source() {
        let missing = temp_dir("absent-scenarios");
        let error = read_scenarios_from_dir(&missing).expect_err("missing dir");
        assert!(matches!(error, SvToolError::ReadFile { ref path, .. } if path == &missing));
        assert_eq!(error.code(), "SCENARIO_READ");

        let file = temp_dir("file-source").join("one.scenario.json");
        write_file(&file, MINIMAL);
        let error = read_scenarios_from_dir(&file).expect_err("file is not a dir");
        assert!(matches!(error, SvToolError::ReadFile { .. }));
    }

    #[test]
    fn read_scenario_reports_read_parse_and_schema_errors() {
        let root = temp_dir("scenario-errors");
        fs::create_dir_all(&root).expect("root should be created");

        let error = read_scenario(&root.join("missing.scenario.json")).expect_err("missing");
        assert!(matches!(error, SvToolError::ReadFile { .. }));

        let bad_json = root.join("bad.scenario.json");
        write_file(&bad_json, "{");
        let error = read_scenario(&bad_json).expect_err("parse should fail");
        assert!(matches!(error, SvToolError::ParseScenario { .. }));

        let bad_schema = root.join("old.scenario.json");
        write_file(&bad_schema, r#"{"schemaVersion":"v0"}"#);
        let error = read_scenario(&bad_schema).expect_err("schema should fail");
        assert!(matches!(
            error,
            SvToolError::InvalidSchemaVersion { ref found, .. } if found == "v0"
        ));
    }
}
