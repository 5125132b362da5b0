use crate::config::{DEFAULT_OUTPUT_DIR, DEFAULT_SDK_PATH};
use crate::core::ConfigProvider;
use crate::utils::error::{ExportError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub source: SourceSection,
    #[serde(default)]
    pub output: OutputSection,
    pub monitoring: Option<MonitoringSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSection {
    /// SDK 目錄（包含 profile.py 與 fit.py），或單一模組檔案
    #[serde(default = "default_sdk_path")]
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    #[serde(default = "default_output_dir")]
    pub directory: String,
    #[serde(default)]
    pub pretty: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringSection {
    pub enabled: bool,
}

impl Default for SourceSection {
    fn default() -> Self {
        Self {
            path: default_sdk_path(),
        }
    }
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            pretty: false,
        }
    }
}

fn default_sdk_path() -> String {
    DEFAULT_SDK_PATH.to_string()
}

fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.to_string()
}

impl FileConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let origin = path.as_ref().display().to_string();
        let content =
            std::fs::read_to_string(&path).map_err(|e| ExportError::ConfigParseError {
                path: origin.clone(),
                message: e.to_string(),
            })?;
        Self::parse(&content, &origin)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Self::parse(content, "inline TOML")
    }

    fn parse(content: &str, origin: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ExportError::ConfigParseError {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// 替換環境變數 (例如 ${FIT_SDK_HOME})
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        // 使用正規表達式匹配 ${VAR_NAME} 格式
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    /// 取得監控設定
    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl ConfigProvider for FileConfig {
    fn sdk_path(&self) -> &str {
        &self.source.path
    }

    fn output_path(&self) -> &str {
        &self.output.directory
    }

    fn pretty(&self) -> bool {
        self.output.pretty
    }
}

impl Validate for FileConfig {
    fn validate(&self) -> Result<()> {
        crate::utils::validation::validate_path("source.path", &self.source.path)?;
        crate::utils::validation::validate_path("output.directory", &self.output.directory)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[source]
path = "/opt/fit-sdk/py/garmin_fit_sdk"

[output]
directory = "exported"
pretty = true

[monitoring]
enabled = true
"#;
        let config = FileConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.source.path, "/opt/fit-sdk/py/garmin_fit_sdk");
        assert_eq!(config.output.directory, "exported");
        assert!(config.output.pretty);
        assert!(config.monitoring_enabled());
    }

    #[test]
    fn test_missing_sections_fall_back_to_defaults() {
        let config = FileConfig::from_toml_str("").unwrap();
        assert_eq!(config.source.path, DEFAULT_SDK_PATH);
        assert_eq!(config.output.directory, DEFAULT_OUTPUT_DIR);
        assert!(!config.output.pretty);
        assert!(!config.monitoring_enabled());

        let config = FileConfig::from_toml_str("[output]\npretty = true\n").unwrap();
        assert_eq!(config.source.path, DEFAULT_SDK_PATH);
        assert!(config.output.pretty);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("FIT_EXPORT_TEST_SDK", "/sdk/from/env");
        let config =
            FileConfig::from_toml_str("[source]\npath = \"${FIT_EXPORT_TEST_SDK}\"\n").unwrap();
        assert_eq!(config.source.path, "/sdk/from/env");
        std::env::remove_var("FIT_EXPORT_TEST_SDK");
    }

    #[test]
    fn test_unset_env_var_is_left_as_is() {
        let config =
            FileConfig::from_toml_str("[source]\npath = \"${FIT_EXPORT_UNSET_VAR}\"\n").unwrap();
        assert_eq!(config.source.path, "${FIT_EXPORT_UNSET_VAR}");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = FileConfig::from_toml_str("not toml at all [").unwrap_err();
        assert!(matches!(err, ExportError::ConfigParseError { .. }));
    }

    #[test]
    fn test_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[output]\ndirectory = \"from_file\"\n")
            .unwrap();
        let config = FileConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.output.directory, "from_file");
    }

    #[test]
    fn test_from_missing_file_is_config_error() {
        let err = FileConfig::from_file("/definitely/missing.toml").unwrap_err();
        match err {
            ExportError::ConfigParseError { path, .. } => assert!(path.contains("missing.toml")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_empty_directory() {
        let mut config = FileConfig::default();
        config.output.directory = String::new();
        assert!(config.validate().is_err());
    }
}
