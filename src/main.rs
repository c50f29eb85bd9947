//! ops-fanout 主入口

use clap::Parser;
use ops_fanout::{
    app::{self, RunRequest},
    cli::Cli,
    config::{AppConfig, ConfigOverrides},
    ssh::SshExecutor,
    telemetry, DispatchPool,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 加载 .env 文件（可选）
    dotenv::dotenv().ok();

    // 1. 加载配置，命令行参数优先
    let overrides = ConfigOverrides {
        worker_limit: cli.workers,
        report_path: cli.output.as_ref().map(|p| p.display().to_string()),
    };
    let config = AppConfig::load(&overrides)
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    // 2. 初始化日志
    telemetry::init_telemetry(&config.logging);

    // 3. 构建执行器与分发池
    let executor = SshExecutor::from_settings(&config.ssh)?;
    let pool = DispatchPool::new(executor, config.dispatch.worker_limit);

    let request = RunRequest {
        inventory_file: cli.inventory_file,
        credentials_file: cli.credentials_file,
        command: cli.command,
        report_file: config.report.path.clone().into(),
        sanitize: config.report.sanitize,
    };

    // 4. 执行
    let outcome = app::run(&request, &pool).await?;

    tracing::debug!(bytes = outcome.report_bytes, "Report written");
    Ok(())
}
