//! 统一错误模型
//! 区分整次运行级别的致命错误（AppError）与单主机级别的可恢复错误（HostError）

use serde::Serialize;
use thiserror::Error;

/// 结果类型别名
pub type Result<T> = std::result::Result<T, AppError>;

/// 运行级错误：在分发开始前出现，终止整次运行
#[derive(Debug, Error)]
pub enum AppError {
    #[error("The file {0} does not exist.")]
    InventoryFileMissing(String),

    #[error("The file {0} does not exist.")]
    CredentialsFileMissing(String),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Known hosts file error: {0}")]
    KnownHostsFile(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to write report: {0}")]
    Report(#[source] std::io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// 从 config::ConfigError 转换
impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

/// 单主机失败分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// 端口未监听
    PortClosed,
    /// 连接超时
    ConnectTimeout,
    /// 认证或协议失败
    AuthOrProtocol,
    /// 工作任务异常终止
    Aborted,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::PortClosed => "port_closed",
            FailureKind::ConnectTimeout => "connect_timeout",
            FailureKind::AuthOrProtocol => "auth_or_protocol",
            FailureKind::Aborted => "aborted",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 主机级错误：只影响当前主机，批次继续执行
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("host {host} is not listening on port {port}")]
    PortClosed { host: String, port: u16 },

    #[error("timed out connecting to {host}")]
    ConnectTimeout { host: String },

    #[error(
        "unable to connect to {host} with provided credentials; \
         the host may have non-standard credentials: {reason}"
    )]
    AuthOrProtocolFailure { host: String, reason: String },

    #[error("worker for {host} aborted: {reason}")]
    TaskAborted { host: String, reason: String },
}

impl HostError {
    pub fn port_closed(host: &str, port: u16) -> Self {
        HostError::PortClosed {
            host: host.to_string(),
            port,
        }
    }

    pub fn connect_timeout(host: &str) -> Self {
        HostError::ConnectTimeout {
            host: host.to_string(),
        }
    }

    pub fn auth_or_protocol(host: &str, reason: impl std::fmt::Display) -> Self {
        HostError::AuthOrProtocolFailure {
            host: host.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn aborted(host: &str, reason: impl std::fmt::Display) -> Self {
        HostError::TaskAborted {
            host: host.to_string(),
            reason: reason.to_string(),
        }
    }

    /// 失败分类
    pub fn kind(&self) -> FailureKind {
        match self {
            HostError::PortClosed { .. } => FailureKind::PortClosed,
            HostError::ConnectTimeout { .. } => FailureKind::ConnectTimeout,
            HostError::AuthOrProtocolFailure { .. } => FailureKind::AuthOrProtocol,
            HostError::TaskAborted { .. } => FailureKind::Aborted,
        }
    }
}
