use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::model::SourceModule;
use crate::utils::error::{ExportError, Result};

use super::parser;

/// File extension the SDK source modules use.
pub const SOURCE_EXTENSION: &str = "py";

/// Attempts to find and load a module from the given path.
///
/// `path` may name the module file itself or a directory containing
/// `<module_name>.py`. A missing path or file is `Ok(None)`; a file that
/// exists but cannot be read as Python source is a load error.
pub fn find_module(path: &str, module_name: &str) -> Result<Option<SourceModule>> {
    let mut module_path = PathBuf::from(path);
    if !module_path.exists() {
        return Ok(None);
    }
    if module_path.is_dir() {
        module_path.push(format!("{}.{}", module_name, SOURCE_EXTENSION));
        if !module_path.exists() {
            return Ok(None);
        }
    }
    load_module(&module_path, module_name).map(Some)
}

fn load_module(module_path: &Path, module_name: &str) -> Result<SourceModule> {
    let source = fs::read_to_string(module_path).map_err(|e| ExportError::ModuleLoadError {
        path: module_path.display().to_string(),
        message: e.to_string(),
    })?;
    let bindings = parser::parse_module(&source).map_err(|e| ExportError::ModuleLoadError {
        path: module_path.display().to_string(),
        message: e.to_string(),
    })?;
    tracing::debug!(
        "Loaded {} binding(s) from {}",
        bindings.len(),
        module_path.display()
    );
    Ok(SourceModule::new(module_name, module_path, bindings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::PyValue;
    use tempfile::TempDir;

    #[test]
    fn test_find_module_in_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("fit.py"), "BASE_TYPE = {'enum': 0x00}\n").unwrap();

        let module = find_module(dir.path().to_str().unwrap(), "fit")
            .unwrap()
            .unwrap();

        assert_eq!(module.name(), "fit");
        assert!(module.path().ends_with("fit.py"));
        assert!(module.contains("BASE_TYPE"));
    }

    #[test]
    fn test_find_module_missing_path_is_none() {
        assert!(find_module("/definitely/not/here", "profile")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_find_module_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(find_module(dir.path().to_str().unwrap(), "profile")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_find_module_path_naming_a_file_directly() {
        // when the path is a file it is loaded as-is, whatever the module name
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("custom_profile.py");
        fs::write(&file, "Profile = {'a': 1}\n").unwrap();

        let module = find_module(file.to_str().unwrap(), "profile")
            .unwrap()
            .unwrap();

        assert_eq!(module.name(), "profile");
        assert_eq!(module.path(), file.as_path());
        assert!(module.contains("Profile"));
    }

    #[test]
    fn test_find_module_rejects_invalid_source() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("fit.py"), "BASE_TYPE = {'enum': 0\n").unwrap();

        let err = find_module(dir.path().to_str().unwrap(), "fit").unwrap_err();

        match err {
            ExportError::ModuleLoadError { path, message } => {
                assert!(path.ends_with("fit.py"));
                assert!(message.contains("line 1"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_find_module_rejects_non_utf8_source() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("fit.py"), [0xFF, 0xFE, 0x00, 0x41]).unwrap();

        let err = find_module(dir.path().to_str().unwrap(), "fit").unwrap_err();
        assert!(matches!(err, ExportError::ModuleLoadError { .. }));
    }

    #[test]
    fn test_reloading_yields_equal_bindings() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("profile.py"),
            "Profile = {'types': {0: 'file'}, 'version': '21.171.00'}\n",
        )
        .unwrap();

        let first = find_module(dir.path().to_str().unwrap(), "profile")
            .unwrap()
            .unwrap();
        let second = find_module(dir.path().to_str().unwrap(), "profile")
            .unwrap()
            .unwrap();

        assert_eq!(first.get("Profile"), second.get("Profile"));
        assert_eq!(
            first.get("Profile"),
            Some(&PyValue::Dict(vec![
                (
                    PyValue::Str("types".to_string()),
                    PyValue::Dict(vec![(PyValue::Int(0), PyValue::Str("file".to_string()))])
                ),
                (
                    PyValue::Str("version".to_string()),
                    PyValue::Str("21.171.00".to_string())
                ),
            ]))
        );
    }
}
