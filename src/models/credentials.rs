//! SSH 凭据模型
//!
//! 一次运行内所有主机共享同一组凭据，加载后只读。

use secrecy::Secret;
use serde::Deserialize;
use std::path::PathBuf;

/// 凭据记录（credentials.json）
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    /// 用户名
    pub username: String,

    /// 密码（使用 Secret 包装，防止日志泄露）
    #[serde(default)]
    pub password: Option<Secret<String>>,

    /// 私钥文件路径（可选）
    #[serde(default)]
    pub private_key_path: Option<PathBuf>,

    /// 私钥密码（可选）
    #[serde(default)]
    pub passphrase: Option<Secret<String>>,
}

/// SSH 认证方式
#[derive(Debug, Clone)]
pub enum SshAuth {
    /// 密码认证
    Password(Secret<String>),
    /// 私钥认证
    Key {
        path: PathBuf,
        passphrase: Option<Secret<String>>,
    },
}

impl Credentials {
    /// 创建使用密码认证的凭据
    pub fn with_password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Some(Secret::new(password.into())),
            private_key_path: None,
            passphrase: None,
        }
    }

    /// 校验凭据完整性
    pub fn validate(&self) -> Result<(), String> {
        if self.username.trim().is_empty() {
            return Err("username must not be empty".to_string());
        }
        if self.password.is_none() && self.private_key_path.is_none() {
            return Err("either password or private_key_path is required".to_string());
        }
        Ok(())
    }

    /// 认证方式：配置了私钥时优先使用私钥
    pub fn auth(&self) -> Option<SshAuth> {
        if let Some(path) = &self.private_key_path {
            return Some(SshAuth::Key {
                path: path.clone(),
                passphrase: self.passphrase.clone(),
            });
        }
        self.password.clone().map(SshAuth::Password)
    }
}
