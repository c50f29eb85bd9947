//! russh 客户端
//!
//! 建立会话、认证、执行一条命令并读取标准输出。会话在任何退出路径上都会断开。

use std::io::ErrorKind;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use russh::client::{self, Config, Handle};
use russh::{ChannelMsg, Disconnect};
use russh_keys::key::PublicKey;
use russh_keys::load_secret_key;
use russh_keys::PublicKeyBase64;
use secrecy::ExposeSecret;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use super::executor::{split_output_lines, RemoteShell};
use super::host_key::{HostKeyDecision, HostKeyPolicy};
use crate::error::HostError;
use crate::models::{Credentials, Host, SshAuth};

/// SSH客户端
#[derive(Debug, Clone)]
pub struct SshClient {
    /// 连接超时，None 表示使用系统默认
    connect_timeout: Option<Duration>,
    host_keys: Arc<HostKeyPolicy>,
}

impl SshClient {
    pub fn new(connect_timeout: Option<Duration>, host_keys: HostKeyPolicy) -> Self {
        Self {
            connect_timeout,
            host_keys: Arc::new(host_keys),
        }
    }

    fn create_session(&self, host: &Host, port: u16) -> SshSession {
        SshSession {
            policy: self.host_keys.clone(),
            host: host.to_string(),
            port,
        }
    }

    async fn connect(&self, host: &Host, port: u16) -> Result<Handle<SshSession>, HostError> {
        let client_config = Arc::new(Config {
            preferred: russh::Preferred::default(),
            ..Default::default()
        });
        let session = self.create_session(host, port);
        let connect = client::connect(client_config, (host.to_string(), port), session);

        let connected = match self.connect_timeout {
            Some(limit) => timeout(limit, connect)
                .await
                .map_err(|_| HostError::connect_timeout(host.as_str()))?,
            None => connect.await,
        };

        connected.map_err(|e| classify_connect_error(host, e))
    }

    /// 认证并执行命令（调用方负责断开连接）
    async fn exec_on(
        handle: &mut Handle<SshSession>,
        host: &Host,
        credentials: &Credentials,
        command: &str,
    ) -> Result<Vec<String>, HostError> {
        let authenticated = match credentials.auth() {
            Some(SshAuth::Password(password)) => {
                handle
                    .authenticate_password(credentials.username.clone(), password.expose_secret())
                    .await
            }
            Some(SshAuth::Key { path, passphrase }) => {
                let key = load_secret_key(
                    &path,
                    passphrase.as_ref().map(|p| p.expose_secret().as_str()),
                )
                .map_err(|e| {
                    error!(host = %host, error = %e, "Failed to load private key");
                    HostError::auth_or_protocol(
                        host.as_str(),
                        format!("failed to load private key: {}", e),
                    )
                })?;

                handle
                    .authenticate_publickey(credentials.username.clone(), Arc::new(key))
                    .await
            }
            None => {
                return Err(HostError::auth_or_protocol(
                    host.as_str(),
                    "no usable credentials",
                ))
            }
        }
        .map_err(|e| HostError::auth_or_protocol(host.as_str(), e))?;

        if !authenticated {
            return Err(HostError::auth_or_protocol(
                host.as_str(),
                "Authentication failed.",
            ));
        }

        debug!(host = %host, "SSH authenticated, executing command");

        let mut channel = handle
            .channel_open_session()
            .await
            .map_err(|e| HostError::auth_or_protocol(host.as_str(), e))?;

        channel
            .exec(true, command)
            .await
            .map_err(|e| HostError::auth_or_protocol(host.as_str(), e))?;

        let mut stdout = Vec::new();
        let mut exit_status = None;

        while let Some(msg) = channel.wait().await {
            match msg {
                ChannelMsg::Data { ref data } => stdout.extend_from_slice(data),
                ChannelMsg::ExitStatus { exit_status: code } => exit_status = Some(code),
                ChannelMsg::Close => break,
                _ => {}
            }
        }

        let _ = channel.close().await;

        debug!(
            host = %host,
            exit_status = ?exit_status,
            stdout_len = stdout.len(),
            "Command finished"
        );

        Ok(split_output_lines(&stdout))
    }
}

#[async_trait]
impl RemoteShell for SshClient {
    async fn run(
        &self,
        host: &Host,
        port: u16,
        credentials: &Credentials,
        command: &str,
    ) -> Result<Vec<String>, HostError> {
        let mut handle = self.connect(host, port).await?;

        let outcome = Self::exec_on(&mut handle, host, credentials, command).await;

        if let Err(e) = handle
            .disconnect(Disconnect::ByApplication, "", "English")
            .await
        {
            debug!(host = %host, error = %e, "Disconnect failed");
        }

        outcome
    }
}

/// 区分连接超时与其它连接错误
fn classify_connect_error(host: &Host, e: russh::Error) -> HostError {
    match e {
        russh::Error::IO(ref io) if io.kind() == ErrorKind::TimedOut => {
            HostError::connect_timeout(host.as_str())
        }
        other => HostError::auth_or_protocol(host.as_str(), other),
    }
}

/// SSH 客户端会话处理器
struct SshSession {
    policy: Arc<HostKeyPolicy>,
    host: String,
    port: u16,
}

#[async_trait]
impl client::Handler for SshSession {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        let fingerprint = HostKeyPolicy::fingerprint(&server_public_key.public_key_base64());
        let decision = self.policy.check(&self.host, self.port, &fingerprint);

        match &decision {
            HostKeyDecision::Verified => {
                debug!(host = %self.host, port = self.port, "Host key verified");
            }
            HostKeyDecision::AcceptedUnknown => {
                info!(
                    host = %self.host,
                    port = self.port,
                    fingerprint = %fingerprint,
                    "Unknown host identity accepted"
                );
            }
            HostKeyDecision::RejectedUnknown => {
                warn!(
                    host = %self.host,
                    port = self.port,
                    fingerprint = %fingerprint,
                    "Unknown host identity rejected"
                );
            }
            HostKeyDecision::Mismatch { expected } => {
                error!(
                    host = %self.host,
                    port = self.port,
                    expected = %expected,
                    actual = %fingerprint,
                    "Host key mismatch"
                );
            }
        }

        Ok(decision.is_accepted())
    }
}
