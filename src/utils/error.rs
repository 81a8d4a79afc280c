use crate::x9::X9Error;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("{message}")]
    UsageError { message: String },

    #[error("Failed to create output directory {path}: {source}")]
    OutputDirError {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to open {path}: {source}")]
    InputOpenError {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to read file {path}: {source}")]
    ParseError { path: String, source: X9Error },

    #[error("Failed to convert check to JSON: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to create file {path}: {source}")]
    WriteError {
        path: String,
        source: std::io::Error,
    },

    #[error("On-Us field '{on_us}' has no check number subfield and Auxiliary On-Us is empty")]
    MalformedOnUsField { on_us: String },

    #[error("Check {id} carries no image view data")]
    MissingImageData { id: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ExtractError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Usage,
    OutputDirectory,
    InputFile,
    Format,
    Serialization,
    Write,
    MalformedRecord,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Only one check is lost.
    Low,
    /// One input file is lost.
    Medium,
    /// The run cannot continue.
    High,
    Critical,
}

/// How far the damage of a failure reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorScope {
    Run,
    File,
    Check,
}

pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USAGE: i32 = 1;
    pub const OUTPUT_DIRECTORY: i32 = 2;
    pub const INPUT_FILE: i32 = 3;
    pub const FORMAT: i32 = 4;
    pub const SERIALIZATION: i32 = 5;
    pub const WRITE: i32 = 6;
    pub const MALFORMED_RECORD: i32 = 7;
    pub const CONFIGURATION: i32 = 8;
}

impl ExtractError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ExtractError::UsageError { .. } => ErrorCategory::Usage,
            ExtractError::OutputDirError { .. } => ErrorCategory::OutputDirectory,
            ExtractError::InputOpenError { .. } => ErrorCategory::InputFile,
            ExtractError::ParseError { .. } => ErrorCategory::Format,
            ExtractError::SerializationError(_) => ErrorCategory::Serialization,
            ExtractError::WriteError { .. } | ExtractError::IoError(_) => ErrorCategory::Write,
            ExtractError::MalformedOnUsField { .. } | ExtractError::MissingImageData { .. } => {
                ErrorCategory::MalformedRecord
            }
            ExtractError::ConfigError { .. }
            | ExtractError::InvalidConfigValueError { .. }
            | ExtractError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn scope(&self) -> ErrorScope {
        match self.category() {
            ErrorCategory::Usage | ErrorCategory::OutputDirectory | ErrorCategory::Configuration => {
                ErrorScope::Run
            }
            ErrorCategory::InputFile | ErrorCategory::Format => ErrorScope::File,
            ErrorCategory::Serialization | ErrorCategory::Write | ErrorCategory::MalformedRecord => {
                ErrorScope::Check
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.scope() {
            ErrorScope::Check => ErrorSeverity::Low,
            ErrorScope::File => ErrorSeverity::Medium,
            ErrorScope::Run => match self.category() {
                ErrorCategory::OutputDirectory => ErrorSeverity::Critical,
                _ => ErrorSeverity::High,
            },
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Usage => exit_codes::USAGE,
            ErrorCategory::OutputDirectory => exit_codes::OUTPUT_DIRECTORY,
            ErrorCategory::InputFile => exit_codes::INPUT_FILE,
            ErrorCategory::Format => exit_codes::FORMAT,
            ErrorCategory::Serialization => exit_codes::SERIALIZATION,
            ErrorCategory::Write => exit_codes::WRITE,
            ErrorCategory::MalformedRecord => exit_codes::MALFORMED_RECORD,
            ErrorCategory::Configuration => exit_codes::CONFIGURATION,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Usage => "Run with <outputDir> followed by at least one X9 file",
            ErrorCategory::OutputDirectory => {
                "Check that the output path is writable and not an existing regular file"
            }
            ErrorCategory::InputFile => "Check that the X9 file exists and is readable",
            ErrorCategory::Format => {
                "Check the encoding/framing settings, or disable control total validation for files with known bad totals"
            }
            ErrorCategory::Serialization => "Report the check record that failed to serialize",
            ErrorCategory::Write => "Check free disk space and permissions on the output directory",
            ErrorCategory::MalformedRecord => {
                "Inspect the check record; its MICR fields or image records are incomplete"
            }
            ErrorCategory::Configuration => "Fix the configuration file or command line options",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ExtractError::UsageError { message } => message.clone(),
            ExtractError::OutputDirError { path, .. } => {
                format!("Cannot create output directory '{}'", path)
            }
            ExtractError::InputOpenError { path, .. } => format!("Cannot open X9 file '{}'", path),
            ExtractError::ParseError { path, source } => {
                format!("'{}' is not a readable X9 file: {}", path, source)
            }
            ExtractError::MalformedOnUsField { on_us } => {
                format!("Check has an On-Us field without a check number: '{}'", on_us)
            }
            other => other.to_string(),
        }
    }
}
