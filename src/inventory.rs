//! 输入加载：主机清单、凭据与已知主机指纹

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use crate::error::{AppError, Result};
use crate::models::{Credentials, Host};

/// 加载主机清单：每行一个主机，去除首尾空白，跳过空行，保留重复项
pub fn load_hosts(path: impl AsRef<Path>) -> Result<Vec<Host>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => AppError::InventoryFileMissing(path.display().to_string()),
        _ => AppError::Io(e),
    })?;

    let hosts = parse_hosts(&content);
    debug!(path = %path.display(), hosts = hosts.len(), "Inventory loaded");
    Ok(hosts)
}

/// 解析清单文本
pub fn parse_hosts(content: &str) -> Vec<Host> {
    content.lines().filter_map(Host::parse).collect()
}

/// 加载凭据文件（JSON）
pub fn load_credentials(path: impl AsRef<Path>) -> Result<Credentials> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => AppError::CredentialsFileMissing(path.display().to_string()),
        _ => AppError::Io(e),
    })?;

    let credentials: Credentials = serde_json::from_str(&content)
        .map_err(|e| AppError::InvalidCredentials(e.to_string()))?;
    credentials.validate().map_err(AppError::InvalidCredentials)?;

    Ok(credentials)
}

/// 加载已知主机指纹（JSON: "host:port" -> sha256 hex）
pub fn load_known_hosts(path: impl AsRef<Path>) -> Result<HashMap<String, String>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| AppError::KnownHostsFile(format!("{}: {}", path.display(), e)))?;

    serde_json::from_str(&content)
        .map_err(|e| AppError::KnownHostsFile(format!("{}: {}", path.display(), e)))
}
