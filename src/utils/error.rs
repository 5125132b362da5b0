use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Could not find or load {module} module at {path}")]
    ModuleNotFoundError { module: String, path: String },

    #[error("Failed to load {path}: {message}")]
    ModuleLoadError { path: String, message: String },

    #[error("The {module} module does not contain a '{name}' object")]
    MissingObjectError { module: String, name: String },

    #[error("Could not extract required objects from {module} module")]
    EmptyExtractionError { module: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to load config file '{path}': {message}")]
    ConfigParseError { path: String, message: String },

    #[error("Export failed: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Serialization,
    Resolution,
    Shape,
    Config,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ExportError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ExportError::IoError(_) => ErrorCategory::Io,
            ExportError::SerializationError(_) => ErrorCategory::Serialization,
            ExportError::ModuleNotFoundError { .. } | ExportError::ModuleLoadError { .. } => {
                ErrorCategory::Resolution
            }
            ExportError::MissingObjectError { .. } | ExportError::EmptyExtractionError { .. } => {
                ErrorCategory::Shape
            }
            ExportError::InvalidConfigValueError { .. } | ExportError::ConfigParseError { .. } => {
                ErrorCategory::Config
            }
            ExportError::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Io => ErrorSeverity::Critical,
            ErrorCategory::Config => ErrorSeverity::Medium,
            ErrorCategory::Resolution
            | ErrorCategory::Shape
            | ErrorCategory::Serialization
            | ErrorCategory::Processing => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ExportError::IoError(_) => {
                "Check filesystem permissions and available disk space for the output directory"
                    .to_string()
            }
            ExportError::SerializationError(_) => {
                "Check that the source objects only contain JSON-compatible data".to_string()
            }
            ExportError::ModuleNotFoundError { module, .. } => format!(
                "Make sure --path points to the SDK directory containing {}.py",
                module
            ),
            ExportError::ModuleLoadError { .. } => {
                "Check that the module file is readable UTF-8 Python source".to_string()
            }
            ExportError::MissingObjectError { name, .. } => format!(
                "Check that this SDK release defines a top-level '{}' object",
                name
            ),
            ExportError::EmptyExtractionError { .. } => {
                "Check that the fit module defines BASE_TYPE, FIELD_TYPE_TO_BASE_TYPE, \
                 BASE_TYPE_DEFINITIONS or NUMERIC_FIELD_TYPES"
                    .to_string()
            }
            ExportError::InvalidConfigValueError { field, .. } => {
                format!("Adjust the '{}' setting and retry", field)
            }
            ExportError::ConfigParseError { .. } => {
                "Make sure the file exists and is valid TOML format".to_string()
            }
            ExportError::ProcessingError { .. } => {
                "Re-run with --verbose to see the per-file diagnostics".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ExportError::IoError(e) => format!("A filesystem operation failed: {}", e),
            ExportError::SerializationError(e) => {
                format!("A value could not be represented as JSON: {}", e)
            }
            ExportError::ModuleNotFoundError { module, path } => {
                format!("Could not find or load {} module at {}", module, path)
            }
            ExportError::ModuleLoadError { path, message } => {
                format!("The source file {} could not be loaded: {}", path, message)
            }
            ExportError::MissingObjectError { module, name } => {
                format!("The {} module does not contain a '{}' object", module, name)
            }
            ExportError::EmptyExtractionError { module } => format!(
                "Could not extract any of the expected objects from the {} module",
                module
            ),
            ExportError::InvalidConfigValueError {
                field,
                value,
                reason,
            } => format!("Invalid value for {}: '{}' ({})", field, value, reason),
            ExportError::ConfigParseError { path, message } => {
                format!("Failed to load config file '{}': {}", path, message)
            }
            ExportError::ProcessingError { message } => format!("Export failed: {}", message),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
