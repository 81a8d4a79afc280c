pub mod config;
pub mod core;
pub mod domain;
pub mod utils;
pub mod x9;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::TomlConfig, ExtractSettings};

pub use core::{etl::EtlEngine, pipeline::X9Pipeline};
pub use domain::model::{CheckInfo, ExtractionSummary};
pub use utils::error::{ExtractError, Result};
