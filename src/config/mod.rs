pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::domain::model::{ErrorPolicy, OutputOptions};
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_extension, validate_path, validate_paths, validate_range, Validate,
};
use crate::x9::ReaderOptions;
use toml_config::TomlConfig;

const MIN_RECORD_SIZE: usize = 80;
const MAX_RECORD_SIZE: usize = 1024 * 1024 * 1024;
const MAX_JSON_INDENT: usize = 8;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "x9-extract")]
#[command(version)]
#[command(about = "Extract check images and metadata from X9 image cash letter files")]
pub struct CliConfig {
    /// Directory receiving check-<n>.tiff and check-<n>.json, created if missing
    pub output_dir: String,

    /// X9 files, processed in the given order
    #[arg(required = true, num_args = 1..)]
    pub x9_files: Vec<String>,

    /// TOML file with reader, output and error handling settings
    #[arg(long)]
    pub config: Option<String>,

    /// Stop at the first failed file or check
    #[arg(long)]
    pub fail_fast: bool,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    pub summary: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Log lines as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// Log CPU and memory usage per input file
    #[arg(long)]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Merge the optional TOML file with the command line; flags win.
    pub fn to_settings(&self) -> Result<ExtractSettings> {
        let file_config = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };

        let mut settings =
            ExtractSettings::from_toml(self.output_dir.clone(), self.x9_files.clone(), &file_config);
        if self.fail_fast {
            settings.error_policy = ErrorPolicy::FailFast;
        }
        Ok(settings)
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractSettings {
    pub output_dir: String,
    pub input_files: Vec<String>,
    pub reader: ReaderOptions,
    pub output: OutputOptions,
    pub error_policy: ErrorPolicy,
}

impl ExtractSettings {
    pub fn new(output_dir: String, input_files: Vec<String>) -> Self {
        Self::from_toml(output_dir, input_files, &TomlConfig::default())
    }

    pub fn from_toml(output_dir: String, input_files: Vec<String>, config: &TomlConfig) -> Self {
        Self {
            output_dir,
            input_files,
            reader: config.reader_options(),
            output: config.output_options(),
            error_policy: config.error_policy(),
        }
    }
}

impl Validate for ExtractSettings {
    fn validate(&self) -> Result<()> {
        validate_path("output_dir", &self.output_dir)?;
        validate_paths("x9_files", &self.input_files)?;
        validate_range(
            "reader.max_record_size",
            self.reader.max_record_size,
            MIN_RECORD_SIZE,
            MAX_RECORD_SIZE,
        )?;
        validate_range("output.json_indent", self.output.json_indent, 0, MAX_JSON_INDENT)?;
        validate_extension("output.image_extension", &self.output.image_extension)?;
        Ok(())
    }
}

impl ConfigProvider for ExtractSettings {
    fn output_dir(&self) -> &str {
        &self.output_dir
    }

    fn input_files(&self) -> &[String] {
        &self.input_files
    }

    fn reader_options(&self) -> ReaderOptions {
        self.reader
    }

    fn output_options(&self) -> &OutputOptions {
        &self.output
    }

    fn error_policy(&self) -> ErrorPolicy {
        self.error_policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ExtractError;

    #[test]
    fn test_default_settings_validate() {
        let settings = ExtractSettings::new("out".to_string(), vec!["a.x9".to_string()]);
        assert!(settings.validate().is_ok());
        assert_eq!(settings.error_policy, ErrorPolicy::Continue);
        assert_eq!(settings.output.json_indent, 3);
    }

    #[test]
    fn test_settings_reject_bad_values() {
        let mut settings = ExtractSettings::new("out".to_string(), vec!["a.x9".to_string()]);
        settings.reader.max_record_size = 10;
        assert!(matches!(
            settings.validate(),
            Err(ExtractError::InvalidConfigValueError { ref field, .. }) if field == "reader.max_record_size"
        ));

        let settings = ExtractSettings::new("out".to_string(), vec![]);
        assert!(matches!(
            settings.validate(),
            Err(ExtractError::MissingConfigError { .. })
        ));
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_cli_parsing() {
        use clap::Parser;

        let cli = CliConfig::try_parse_from(["x9-extract", "out", "a.x9", "b.x9", "--fail-fast"])
            .unwrap();
        assert_eq!(cli.output_dir, "out");
        assert_eq!(cli.x9_files, vec!["a.x9", "b.x9"]);

        let settings = cli.to_settings().unwrap();
        assert_eq!(settings.error_policy, ErrorPolicy::FailFast);
        assert_eq!(settings.input_files.len(), 2);
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_cli_requires_an_input_file() {
        use clap::Parser;

        let err = CliConfig::try_parse_from(["x9-extract", "out"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
        let err = CliConfig::try_parse_from(["x9-extract"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
