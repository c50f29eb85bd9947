//! 单主机执行器
//!
//! 先做端口探测，端口不通时不会发起握手；否则交给远程 shell 执行命令。
//! 所有失败都以 `HostError` 返回，由分发池转换为诊断信息。

use async_trait::async_trait;
use tracing::debug;

use super::client::SshClient;
use super::host_key::HostKeyPolicy;
use super::probe::{ReachabilityProbe, TcpProbe};
use crate::config::SshSettings;
use crate::error::{AppError, HostError};
use crate::inventory::load_known_hosts;
use crate::models::{Credentials, Host};

/// 远程 shell：建立会话、认证、执行命令并返回标准输出行
#[async_trait]
pub trait RemoteShell: Send + Sync {
    async fn run(
        &self,
        host: &Host,
        port: u16,
        credentials: &Credentials,
        command: &str,
    ) -> Result<Vec<String>, HostError>;
}

/// 单主机执行器
pub struct RemoteExecutor<P, S> {
    probe: P,
    shell: S,
    port: u16,
}

/// 生产环境使用的执行器
pub type SshExecutor = RemoteExecutor<TcpProbe, SshClient>;

impl<P, S> RemoteExecutor<P, S>
where
    P: ReachabilityProbe,
    S: RemoteShell,
{
    pub fn new(probe: P, shell: S, port: u16) -> Self {
        Self { probe, shell, port }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    pub fn shell(&self) -> &S {
        &self.shell
    }

    /// 在一台主机上执行命令
    pub async fn execute(
        &self,
        host: &Host,
        credentials: &Credentials,
        command: &str,
    ) -> Result<Vec<String>, HostError> {
        if !self.probe.probe(host.as_str(), self.port).await {
            return Err(HostError::port_closed(host.as_str(), self.port));
        }

        debug!(host = %host, port = self.port, user = %credentials.username, "Executing command");

        self.shell.run(host, self.port, credentials, command).await
    }
}

impl SshExecutor {
    /// 根据配置构造执行器（读取已知主机文件，不做任何网络操作）
    pub fn from_settings(settings: &SshSettings) -> Result<Self, AppError> {
        let known_hosts = match &settings.known_hosts_file {
            Some(path) => load_known_hosts(path)?,
            None => Default::default(),
        };
        let policy = HostKeyPolicy::new(settings.accept_unknown_host_identity, known_hosts);

        Ok(Self::new(
            TcpProbe::new(settings.connect_timeout()),
            SshClient::new(settings.connect_timeout(), policy),
            settings.port,
        ))
    }
}

/// 将标准输出切分为行（不保留行尾换行符）
pub fn split_output_lines(stdout: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(str::to_string)
        .collect()
}
