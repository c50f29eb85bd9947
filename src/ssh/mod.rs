//! SSH执行模块
//! 可达性探测、主机密钥策略、russh 客户端与单主机执行器

pub mod client;
pub mod executor;
pub mod host_key;
pub mod probe;

pub use client::SshClient;
pub use executor::{split_output_lines, RemoteExecutor, RemoteShell, SshExecutor};
pub use host_key::{HostKeyDecision, HostKeyPolicy};
pub use probe::{ReachabilityProbe, TcpProbe};
