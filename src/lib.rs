//! 批量远程命令执行库
//! 将同一条命令并发分发到主机清单中的每台主机，汇总输出为报告

pub mod app;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod inventory;
pub mod models;
pub mod output;
pub mod ssh;
pub mod telemetry;

pub use dispatch::{DispatchPool, HostResult, RunSummary};
pub use error::{AppError, FailureKind, HostError};
