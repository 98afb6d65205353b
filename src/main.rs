use clap::Parser;
use hurricane_etl::core::ConfigProvider;
use hurricane_etl::utils::error::ErrorSeverity;
use hurricane_etl::utils::{logger, validation::Validate};
use hurricane_etl::{CliConfig, EtlEngine, EtlError, HurricanePipeline, PipelineOutcome, TomlConfig};

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting hurricane-etl");
    tracing::debug!("CLI config: {:?}", config);

    let exit_code = match config.config.clone() {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path);
            match TomlConfig::from_file(&path) {
                Ok(file_config) => {
                    tracing::info!("Pipeline: {}", file_config.pipeline_name());
                    run(file_config.with_api_key_fallback(config.api_key.clone())).await
                }
                Err(e) => report_config_error(&e),
            }
        }
        None => run(config).await,
    };

    std::process::exit(exit_code);
}

async fn run<C: ConfigProvider + Validate>(config: C) -> i32 {
    // 驗證配置
    if let Err(e) = config.validate() {
        return report_config_error(&e);
    }

    tracing::info!("Source: {}", config.source_url());
    tracing::info!(
        "Output: {}/{}",
        config.output_path().trim_end_matches('/'),
        config.output_file()
    );

    let pipeline = match HurricanePipeline::from_config(&config) {
        Ok(pipeline) => pipeline,
        Err(e) => return report_config_error(&e),
    };

    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        PipelineOutcome::Completed {
            output_path,
            records_written,
            rejected_lines,
        } => {
            println!("✅ Wrote {} storms to {}", records_written, output_path);
            if rejected_lines > 0 {
                println!("⚠️  {} reply lines could not be parsed (see log)", rejected_lines);
            }
            0
        }
        PipelineOutcome::Aborted {
            stage,
            reason,
            error,
        } => {
            eprintln!("❌ Pipeline aborted at {}: {}", stage, reason);
            match error {
                Some(e) => {
                    eprintln!("   {}", e.user_friendly_message());
                    eprintln!("💡 {}", e.recovery_suggestion());
                    // 寫檔失敗屬於系統錯誤
                    if e.severity() == ErrorSeverity::Critical {
                        3
                    } else {
                        1
                    }
                }
                None => 1,
            }
        }
    }
}

fn report_config_error(e: &EtlError) -> i32 {
    tracing::error!(
        "Configuration validation failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    2
}
