use crate::domain::model::{ErrorPolicy, OutputOptions};
use crate::utils::error::{ExtractError, Result};
use crate::x9::{Encoding, Framing, ReaderOptions};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional settings file. Every key may be omitted; the defaults read EBCDIC,
/// length-prefixed files and write `check-<n>.tiff` with 3-space indented JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TomlConfig {
    pub reader: ReaderConfig,
    pub output: OutputConfig,
    pub error_handling: ErrorHandlingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReaderConfig {
    pub encoding: Option<Encoding>,
    pub framing: Option<Framing>,
    pub max_record_size: Option<usize>,
    pub validate_control_totals: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub image_extension: Option<String>,
    pub json_indent: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ErrorHandlingConfig {
    pub on_error: Option<ErrorPolicy>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ExtractError::ConfigError {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ExtractError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${X9_ENCODING})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ExtractError::ConfigError {
            message: format!("environment substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn reader_options(&self) -> ReaderOptions {
        let defaults = ReaderOptions::default();
        ReaderOptions {
            encoding: self.reader.encoding.unwrap_or(defaults.encoding),
            framing: self.reader.framing.unwrap_or(defaults.framing),
            max_record_size: self
                .reader
                .max_record_size
                .unwrap_or(defaults.max_record_size),
            validate_control_totals: self
                .reader
                .validate_control_totals
                .unwrap_or(defaults.validate_control_totals),
        }
    }

    pub fn output_options(&self) -> OutputOptions {
        let defaults = OutputOptions::default();
        OutputOptions {
            image_extension: self
                .output
                .image_extension
                .clone()
                .unwrap_or(defaults.image_extension),
            json_indent: self.output.json_indent.unwrap_or(defaults.json_indent),
        }
    }

    pub fn error_policy(&self) -> ErrorPolicy {
        self.error_handling.on_error.unwrap_or_default()
    }
}
