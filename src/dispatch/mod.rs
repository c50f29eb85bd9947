//! 分发池
//!
//! 每台主机一个任务，信号量限制同时在途的执行数；全部任务完成后才返回。
//! 结果按提交顺序返回（与完成顺序无关），单个任务失败不影响其它任务。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::error::{FailureKind, HostError};
use crate::models::{Host, RunContext};
use crate::ssh::{ReachabilityProbe, RemoteExecutor, RemoteShell};

/// 默认并发上限
pub const DEFAULT_WORKER_LIMIT: usize = 10;

/// 单主机执行结果
#[derive(Debug, Clone)]
pub struct HostResult {
    pub host: Host,
    pub outcome: Result<Vec<String>, HostError>,
    pub duration: Duration,
}

impl HostResult {
    /// 输出行；失败时为空
    pub fn lines(&self) -> &[String] {
        match &self.outcome {
            Ok(lines) => lines,
            Err(_) => &[],
        }
    }

    pub fn error(&self) -> Option<&HostError> {
        self.outcome.as_ref().err()
    }

    fn outcome_label(&self) -> &'static str {
        match &self.outcome {
            Ok(lines) if lines.is_empty() => "empty",
            Ok(_) => "output",
            Err(e) => e.kind().as_str(),
        }
    }
}

/// 分发池
pub struct DispatchPool<P, S> {
    executor: Arc<RemoteExecutor<P, S>>,
    worker_limit: usize,
}

impl<P, S> DispatchPool<P, S>
where
    P: ReachabilityProbe + 'static,
    S: RemoteShell + 'static,
{
    pub fn new(executor: RemoteExecutor<P, S>, worker_limit: usize) -> Self {
        Self {
            executor: Arc::new(executor),
            worker_limit: worker_limit.max(1),
        }
    }

    pub fn worker_limit(&self) -> usize {
        self.worker_limit
    }

    pub fn executor(&self) -> &RemoteExecutor<P, S> {
        &self.executor
    }

    /// 在所有主机上执行命令，返回按提交顺序排列的结果
    pub async fn run(&self, hosts: &[Host], context: Arc<RunContext>) -> Vec<HostResult> {
        let semaphore = Arc::new(Semaphore::new(self.worker_limit));

        debug!(
            run_id = %context.run_id,
            hosts = hosts.len(),
            worker_limit = self.worker_limit,
            "Dispatching command"
        );

        let handles: Vec<_> = hosts
            .iter()
            .cloned()
            .map(|host| {
                let executor = self.executor.clone();
                let context = context.clone();
                let semaphore = semaphore.clone();

                tokio::spawn(async move {
                    let _permit = match semaphore.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(e) => {
                            let result = HostResult {
                                outcome: Err(HostError::aborted(host.as_str(), e)),
                                host,
                                duration: Duration::ZERO,
                            };
                            record_outcome(&result);
                            return result;
                        }
                    };

                    let start = Instant::now();
                    let outcome = executor
                        .execute(&host, &context.credentials, &context.command)
                        .await;

                    let result = HostResult {
                        host,
                        outcome,
                        duration: start.elapsed(),
                    };
                    // 主机完成时立即输出诊断，不等待整批结束
                    record_outcome(&result);
                    result
                })
            })
            .collect();

        // 等待所有任务完成（join_all 保持提交顺序）
        join_all(handles)
            .await
            .into_iter()
            .zip(hosts)
            .map(|(joined, host)| match joined {
                Ok(result) => result,
                Err(e) => {
                    let result = HostResult {
                        host: host.clone(),
                        outcome: Err(HostError::aborted(host.as_str(), e)),
                        duration: Duration::ZERO,
                    };
                    record_outcome(&result);
                    result
                }
            })
            .collect()
    }
}

/// 记录单主机结果：失败时输出诊断信息，并更新指标
fn record_outcome(result: &HostResult) {
    metrics::counter!("fanout_hosts_total", "outcome" => result.outcome_label()).increment(1);
    metrics::histogram!("fanout_host_duration_seconds").record(result.duration.as_secs_f64());

    if let Err(e) = &result.outcome {
        warn!(host = %result.host, kind = %e.kind(), "{}", e);
    }
}

/// 运行统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// 主机总数（含重复项）
    pub total: usize,
    /// 有输出的主机数
    pub with_output: usize,
    /// 执行成功但无输出的主机数
    pub empty: usize,
    /// 按失败类型统计
    pub failures: HashMap<FailureKind, usize>,
}

impl RunSummary {
    pub fn from_results(results: &[HostResult]) -> Self {
        let mut summary = RunSummary {
            total: results.len(),
            ..Default::default()
        };

        for result in results {
            match &result.outcome {
                Ok(lines) if lines.is_empty() => summary.empty += 1,
                Ok(_) => summary.with_output += 1,
                Err(e) => *summary.failures.entry(e.kind()).or_insert(0) += 1,
            }
        }

        summary
    }

    /// 失败主机数
    pub fn failed(&self) -> usize {
        self.failures.values().sum()
    }

    pub fn failures_of(&self, kind: FailureKind) -> usize {
        self.failures.get(&kind).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(host: &str, outcome: Result<Vec<String>, HostError>) -> HostResult {
        HostResult {
            host: Host::parse(host).unwrap(),
            outcome,
            duration: Duration::ZERO,
        }
    }

    #[test]
    fn test_host_result_lines() {
        let ok = result("a", Ok(vec!["x".to_string()]));
        assert_eq!(ok.lines().to_vec(), vec!["x".to_string()]);
        assert!(ok.error().is_none());

        let failed = result("b", Err(HostError::connect_timeout("b")));
        assert!(failed.lines().is_empty());
        assert_eq!(failed.outcome_label(), "connect_timeout");
    }

    #[test]
    fn test_run_summary_counts() {
        let results = vec![
            result("a", Ok(vec!["x".to_string()])),
            result("b", Ok(vec![])),
            result("c", Err(HostError::port_closed("c", 22))),
            result("d", Err(HostError::port_closed("d", 22))),
            result("e", Err(HostError::auth_or_protocol("e", "denied"))),
        ];

        let summary = RunSummary::from_results(&results);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.with_output, 1);
        assert_eq!(summary.empty, 1);
        assert_eq!(summary.failed(), 3);
        assert_eq!(summary.failures_of(FailureKind::PortClosed), 2);
        assert_eq!(summary.failures_of(FailureKind::ConnectTimeout), 0);
    }
}
