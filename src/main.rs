use anyhow::Context;
use clap::Parser;
use x9_extract::utils::{logger, validation::Validate};
use x9_extract::{CliConfig, EtlEngine, ExtractError, LocalStorage, X9Pipeline};

const USAGE: &str = "Usage: x9-extract <outputDir> <x9File1> [<x9File2> ...]";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = match CliConfig::try_parse() {
        Ok(config) => config,
        Err(e) => match e.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => e.exit(),
            _ => {
                println!("{}", USAGE);
                report_and_exit(ExtractError::UsageError {
                    message: e.to_string(),
                });
            }
        },
    };

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting x9-extract");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 合併設定檔並驗證
    let settings = match config.to_settings().and_then(|s| s.validate().map(|_| s)) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    };

    if config.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(settings.output_dir.clone());
    let pipeline = X9Pipeline::new(storage, settings);
    let mut engine = EtlEngine::new_with_monitoring(pipeline, config.monitor);

    match engine.run().await {
        Ok(summary) => {
            if config.summary {
                let json = serde_json::to_string_pretty(&summary)
                    .context("Failed to render the run summary")?;
                println!("{}", json);
            }

            if summary.is_clean() {
                tracing::info!("✅ Extraction completed successfully");
            } else {
                tracing::warn!(
                    "⚠️ Extraction completed with {} failures",
                    summary.failures.len()
                );
                std::process::exit(summary.exit_code());
            }
        }
        Err(e) => report_and_exit(e),
    }

    Ok(())
}

fn report_and_exit(e: ExtractError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Extraction failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    std::process::exit(e.exit_code());
}
