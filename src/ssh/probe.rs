//! 可达性探测
//!
//! 在进行 SSH 握手前先做一次 TCP 连接检查，端口不通时直接跳过该主机。

use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

#[async_trait]
pub trait ReachabilityProbe: Send + Sync {
    /// 端口是否可连接；不重试
    async fn probe(&self, host: &str, port: u16) -> bool;
}

/// 基于 TCP 连接的探测器
#[derive(Debug, Clone, Default)]
pub struct TcpProbe {
    /// 连接超时，None 表示使用系统默认
    connect_timeout: Option<Duration>,
}

impl TcpProbe {
    pub fn new(connect_timeout: Option<Duration>) -> Self {
        Self { connect_timeout }
    }
}

#[async_trait]
impl ReachabilityProbe for TcpProbe {
    async fn probe(&self, host: &str, port: u16) -> bool {
        let connect = TcpStream::connect((host, port));

        let result = match self.connect_timeout {
            Some(limit) => match timeout(limit, connect).await {
                Ok(result) => result,
                Err(_) => {
                    debug!(host = %host, port = port, "TCP probe timed out");
                    return false;
                }
            },
            None => connect.await,
        };

        match result {
            // 连接立即关闭
            Ok(stream) => {
                drop(stream);
                true
            }
            Err(e) => {
                debug!(host = %host, port = port, error = %e, "TCP probe failed");
                false
            }
        }
    }
}
