use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sv_core::TypedValue;
use sv_runtime::ScopeHandle;
use tracing::debug;

use crate::error::StepError;

pub trait FileProvider: Send + Sync {
    fn read_text(&self, path: &Path) -> Result<String, StepError>;
    fn write_text(&self, path: &Path, content: &str) -> Result<(), StepError>;
    fn exists(&self, path: &Path) -> bool;
}

/// Variable naming the directory used by file rows that carry no path.
/// Without it the working directory is used.
pub const USER_DIR_VARIABLE: &str = "USER_DIR";

/// One row of a create-files or check-files table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSpec {
    pub name: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileProvider;

fn file_error(path: &Path, error: std::io::Error) -> StepError {
    StepError::File {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}

impl FileProvider for LocalFileProvider {
    fn read_text(&self, path: &Path) -> Result<String, StepError> {
        fs::read_to_string(path).map_err(|error| file_error(path, error))
    }

    fn write_text(&self, path: &Path, content: &str) -> Result<(), StepError> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|error| file_error(path, error))?;
        }
        fs::write(path, content).map_err(|error| file_error(path, error))
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

fn spec_path(scope: &ScopeHandle, spec: &FileSpec) -> Result<(String, PathBuf), StepError> {
    let name = scope.resolve(&spec.name)?;
    let dir = match &spec.path {
        Some(path) => PathBuf::from(scope.resolve(path)?),
        None => scope
            .store()?
            .get_value_text(USER_DIR_VARIABLE)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    let full = dir.join(&name);
    Ok((name, full))
}

/// Writes each file and stores its full path under the file name.
pub fn create_files(
    scope: &ScopeHandle,
    files: &dyn FileProvider,
    specs: &[FileSpec],
) -> Result<(), StepError> {
    let store = scope.store()?;
    for spec in specs {
        let (name, path) = spec_path(scope, spec)?;
        let content = scope.resolve(&spec.content)?;
        files.write_text(&path, &content)?;
        debug!(path = %path.display(), "created file");
        store.set(&name, TypedValue::String(path.display().to_string()))?;
    }
    Ok(())
}

pub fn assert_files_exist(
    scope: &ScopeHandle,
    files: &dyn FileProvider,
    specs: &[FileSpec],
) -> Result<(), StepError> {
    for spec in specs {
        let (_, path) = spec_path(scope, spec)?;
        if !files.exists(&path) {
            return Err(StepError::assertion(format!(
                "file \"{}\" does not exist",
                path.display()
            )));
        }
    }
    Ok(())
}

pub fn store_file_content(
    scope: &ScopeHandle,
    files: &dyn FileProvider,
    path: &str,
    name: &str,
) -> Result<(), StepError> {
    let store = scope.store()?;
    store.require_absent(name)?;
    let path = scope.resolve(path)?;
    let content = files.read_text(Path::new(&path))?;
    debug!(path = %path, variable = name, "read file into variable");
    store.set(name, TypedValue::String(content))?;
    Ok(())
}

/// Writes the rendered text of `name`; a null value writes an empty file.
pub fn write_variable_to_file(
    scope: &ScopeHandle,
    files: &dyn FileProvider,
    name: &str,
    path: &str,
) -> Result<(), StepError> {
    let store = scope.store()?;
    store.require_exists(name)?;
    let content = store.get_value_text(name).unwrap_or_default();
    let path = scope.resolve(path)?;
    files.write_text(Path::new(&path), &content)?;
    debug!(path = %path, variable = name, "wrote variable to file");
    Ok(())
}

#[cfg(test)]
mod files_tests {
    use super::*;

    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use sv_runtime::ScopeManager;

    fn temp_dir(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock after epoch")
            .as_nanos();
        std::env::temp_dir().join(format!("sv-steps-{}-{}", label, nanos))
    }

    #[test]
    fn variable_text_round_trips_through_a_file() {
        let dir = temp_dir("files");
        let manager = ScopeManager::default();
        let scope = manager.begin();
        let store = scope.store().expect("active");
        store
            .set("dir", TypedValue::string(dir.display().to_string()))
            .expect("set dir");
        store.set("body", TypedValue::Long(12345)).expect("set body");

        write_variable_to_file(&scope, &LocalFileProvider, "body", "{dir}/nested/out.txt")
            .expect("write");
        store_file_content(&scope, &LocalFileProvider, "{dir}/nested/out.txt", "copy")
            .expect("read");
        assert_eq!(store.get_value_text("copy"), Some("12345".to_string()));

        fs::remove_dir_all(&dir).expect("cleanup");
    }

    #[test]
    fn missing_file_reports_path() {
        let manager = ScopeManager::default();
        let scope = manager.begin();
        let missing = temp_dir("missing").join("absent.txt");
        let error = store_file_content(
            &scope,
            &LocalFileProvider,
            &missing.display().to_string(),
            "content",
        )
        .expect_err("missing file");
        assert!(matches!(
            error,
            StepError::File { ref path, .. } if path.ends_with("absent.txt")
        ));
        assert!(!scope.store().expect("active").contains("content"));
    }

    fn spec(name: &str, path: Option<&str>, content: &str) -> FileSpec {
        FileSpec {
            name: name.to_string(),
            path: path.map(str::to_string),
            content: content.to_string(),
        }
    }

    #[test]
    fn created_files_exist_and_record_their_paths() {
        let dir = temp_dir("create");
        let other = temp_dir("create-other");
        let manager = ScopeManager::default();
        let scope = manager.begin();
        let store = scope.store().expect("active");
        store
            .set(USER_DIR_VARIABLE, TypedValue::string(dir.display().to_string()))
            .expect("set user dir");
        store.set("who", TypedValue::string("Ann")).expect("set who");

        let specs = vec![
            spec("hello.txt", None, "hi {who}"),
            spec("notes.txt", Some(&other.display().to_string()), ""),
        ];
        create_files(&scope, &LocalFileProvider, &specs).expect("create");
        assert_files_exist(&scope, &LocalFileProvider, &specs).expect("both exist");

        let hello = dir.join("hello.txt");
        assert_eq!(fs::read_to_string(&hello).expect("read"), "hi Ann");
        assert_eq!(
            store.get_value_text("hello.txt"),
            Some(hello.display().to_string())
        );
        assert_eq!(
            store.get_value_text("notes.txt"),
            Some(other.join("notes.txt").display().to_string())
        );

        fs::remove_dir_all(&dir).expect("cleanup");
        fs::remove_dir_all(&other).expect("cleanup other");
    }

    #[test]
    fn missing_file_fails_existence_check() {
        let dir = temp_dir("absent-files");
        let manager = ScopeManager::default();
        let scope = manager.begin();
        let specs = vec![spec("ghost.txt", Some(&dir.display().to_string()), "")];
        let error = assert_files_exist(&scope, &LocalFileProvider, &specs).expect_err("absent");
        assert!(matches!(
            error,
            StepError::AssertionFailed { ref message } if message.contains("ghost.txt")
        ));
    }

    #[test]
    fn writing_needs_an_existing_variable() {
        let manager = ScopeManager::default();
        let scope = manager.begin();
        let error = write_variable_to_file(&scope, &LocalFileProvider, "nothing", "ignored.txt")
            .expect_err("missing variable");
        assert_eq!(error.code(), "VAR_NOT_FOUND");
    }
}
