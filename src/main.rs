use clap::Parser;
use fit_export::core::ConfigProvider;
use fit_export::utils::error::{ErrorSeverity, ExportError};
use fit_export::utils::{logger, validation::Validate};
use fit_export::{CliConfig, ExportEngine, FileConfig, LocalStorage, SdkExportPipeline};

fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting fit-export CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Some(config_path) = cli.config.clone() {
        tracing::info!("📁 Loading configuration from: {}", config_path);
        let config = match FileConfig::from_file(&config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("❌ Failed to load configuration: {}", e);
                eprintln!("❌ {}", e.user_friendly_message());
                eprintln!("💡 建議: {}", e.recovery_suggestion());
                std::process::exit(exit_code(&e));
            }
        };
        let monitor_enabled = cli.monitor || config.monitoring_enabled();
        run(config, monitor_enabled)
    } else {
        let monitor_enabled = cli.monitor;
        run(cli, monitor_enabled)
    }
}

fn run<C>(config: C, monitor_enabled: bool) -> anyhow::Result<()>
where
    C: ConfigProvider + Validate,
{
    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(exit_code(&e));
    }

    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 創建存儲和管道
    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = SdkExportPipeline::new(storage, config);

    // 創建引擎並運行
    let engine = ExportEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run() {
        Ok(output_path) => {
            tracing::info!("✅ Export completed successfully!");
            tracing::info!("📁 Output saved to: {}", output_path);
            println!("✅ Export completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Export failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            // 輸出用戶友好的錯誤信息
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            let code = exit_code(&e);
            if code > 0 {
                std::process::exit(code);
            }
        }
    }

    Ok(())
}

// 根據錯誤嚴重程度決定退出碼
fn exit_code(e: &ExportError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,      // 警告，但成功
        ErrorSeverity::Medium => 2,   // 配置錯誤
        ErrorSeverity::High => 1,     // 處理錯誤
        ErrorSeverity::Critical => 3, // 系統錯誤
    }
}
