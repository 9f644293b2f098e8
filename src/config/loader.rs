//! Applications file loading and validation.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use log::debug;
use serde::Deserialize;

use crate::check::Application;
use crate::config::constants::ALLOWED_CONFIG_PATHS;
use crate::error_handling::ConfigError;

/// Top-level shape of an applications file.
///
/// ```yaml
/// applications:
///   - name: catalog
///     url: https://catalog.example.com
///     expected_status: 200
///     timeout: 5s
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct ApplicationsFile {
    /// Declared applications, in file order
    #[serde(default)]
    pub applications: Vec<Application>,
}

/// Loads and validates the applications declared in `path`.
///
/// Unless `skip_allowlist_check` is set, `path` must be one of
/// `ALLOWED_CONFIG_PATHS` after lexical cleaning.
///
/// # Errors
///
/// Returns a `ConfigError` if the path is not allowed, the file cannot be read
/// or parsed, an application lacks a required field, or a name is declared
/// twice.
pub fn load_applications(
    path: &Path,
    skip_allowlist_check: bool,
) -> Result<Vec<Application>, ConfigError> {
    if !skip_allowlist_check && !is_allowed_path(path) {
        return Err(ConfigError::PathNotAllowed(path.to_path_buf()));
    }

    let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let file: ApplicationsFile = serde_yaml::from_str(&data)?;
    validate(&file.applications)?;

    debug!(
        "Loaded {} application(s) from {}",
        file.applications.len(),
        path.display()
    );
    Ok(file.applications)
}

/// Returns true if an application called `name` is declared.
pub fn contains_app(applications: &[Application], name: &str) -> bool {
    applications.iter().any(|app| app.name == name)
}

fn validate(applications: &[Application]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for (index, app) in applications.iter().enumerate() {
        if !app.has_required_fields() {
            return Err(ConfigError::MissingRequiredFields { index });
        }
        if !seen.insert(app.name.as_str()) {
            return Err(ConfigError::DuplicateName(app.name.clone()));
        }
    }
    Ok(())
}

fn is_allowed_path(path: &Path) -> bool {
    let cleaned = clean_path(path);
    ALLOWED_CONFIG_PATHS
        .iter()
        .any(|allowed| cleaned == Path::new(allowed))
}

/// Lexically normalizes a path: drops `.` components and folds `..` into the
/// preceding normal component. The filesystem is not consulted.
fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let ends_with_normal =
                    matches!(cleaned.components().next_back(), Some(Component::Normal(_)));
                if ends_with_normal {
                    cleaned.pop();
                } else {
                    cleaned.push(component.as_os_str());
                }
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}
