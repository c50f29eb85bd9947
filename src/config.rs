//! 配置系统
//! 默认值 + 环境变量（前缀 FANOUT_）分层加载

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别: trace, debug, info, warn, error
    pub level: String,
    /// 日志格式: json, pretty, compact
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SshSettings {
    /// 远程 shell 端口
    pub port: u16,
    /// TCP 连接超时（秒），未设置时使用系统默认
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
    /// 是否自动接受未知主机密钥（首次信任）
    pub accept_unknown_host_identity: bool,
    /// 已知主机指纹文件（JSON: "host:port" -> sha256 hex）
    #[serde(default)]
    pub known_hosts_file: Option<String>,
}

impl SshSettings {
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for SshSettings {
    fn default() -> Self {
        Self {
            port: 22,
            connect_timeout_secs: None,
            accept_unknown_host_identity: true,
            known_hosts_file: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    /// 同时执行的最大主机数
    pub worker_limit: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self { worker_limit: 10 }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// 报告文件路径（追加写入）
    pub path: String,
    /// 写入前是否对输出脱敏
    pub sanitize: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub ssh: SshSettings,
    pub dispatch: DispatchConfig,
    pub report: ReportConfig,
}

/// 命令行覆盖项，优先级高于环境变量
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub worker_limit: Option<usize>,
    pub report_path: Option<String>,
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(&ConfigOverrides::default())
    }

    /// 加载配置并应用覆盖项，合并完成后统一校验
    pub fn load(overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("logging.level", "info")?
            .set_default("logging.format", "compact")?
            .set_default("ssh.port", 22)?
            .set_default("ssh.accept_unknown_host_identity", true)?
            .set_default("dispatch.worker_limit", 10)?
            .set_default("report.path", "cli_response_text.txt")?
            .set_default("report.sanitize", false)?
            .add_source(
                Environment::with_prefix("FANOUT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option(
                "dispatch.worker_limit",
                overrides.worker_limit.map(|w| w as u64),
            )?
            .set_override_option("report.path", overrides.report_path.clone())?;

        let config: AppConfig = settings.build()?.try_deserialize()?;

        config.validate()?;

        Ok(config)
    }

    /// 验证配置合法性
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                )))
            }
        }

        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" | "compact" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log format: {}. Must be one of: json, pretty, compact",
                    self.logging.format
                )))
            }
        }

        if self.ssh.port == 0 {
            return Err(ConfigError::Message("ssh.port must be > 0".to_string()));
        }

        if self.ssh.connect_timeout_secs == Some(0) {
            return Err(ConfigError::Message(
                "ssh.connect_timeout_secs must be > 0 when set".to_string(),
            ));
        }

        if self.dispatch.worker_limit == 0 {
            return Err(ConfigError::Message(
                "dispatch.worker_limit must be >= 1".to_string(),
            ));
        }

        Ok(())
    }
}
