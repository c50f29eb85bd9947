//! 单次运行编排
//!
//! 加载清单与凭据 → 分发执行 → 追加写入报告。
//! 清单或凭据缺失时在任何网络操作之前返回错误。

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, Instrument};

use crate::dispatch::{DispatchPool, HostResult, RunSummary};
use crate::error::{AppError, Result};
use crate::inventory::{load_credentials, load_hosts};
use crate::models::RunContext;
use crate::output::ReportWriter;
use crate::ssh::{ReachabilityProbe, RemoteShell};

/// 一次运行的输入
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub inventory_file: PathBuf,
    pub credentials_file: PathBuf,
    pub command: String,
    pub report_file: PathBuf,
    pub sanitize: bool,
}

/// 一次运行的结果
#[derive(Debug)]
pub struct RunOutcome {
    pub results: Vec<HostResult>,
    pub summary: RunSummary,
    pub report_bytes: usize,
}

/// 执行一次完整运行
pub async fn run<P, S>(request: &RunRequest, pool: &DispatchPool<P, S>) -> Result<RunOutcome>
where
    P: ReachabilityProbe + 'static,
    S: RemoteShell + 'static,
{
    let hosts = load_hosts(&request.inventory_file)?;
    let credentials = load_credentials(&request.credentials_file)?;

    let context = Arc::new(RunContext::new(credentials, request.command.clone()));
    let span = tracing::info_span!("run", run_id = %context.run_id);

    async move {
        info!(
            hosts = hosts.len(),
            command = %context.command,
            worker_limit = pool.worker_limit(),
            "Run started"
        );

        let results = pool.run(&hosts, context.clone()).await;

        let writer = ReportWriter::from_flag(request.sanitize);
        let report_bytes =
            writer.append_to_file(&request.report_file, &context.command, &results)?;

        let summary = RunSummary::from_results(&results);
        info!(
            total = summary.total,
            with_output = summary.with_output,
            empty = summary.empty,
            failed = summary.failed(),
            report = %request.report_file.display(),
            "Run completed"
        );

        Ok::<_, AppError>(RunOutcome {
            results,
            summary,
            report_bytes,
        })
    }
    .instrument(span)
    .await
}
