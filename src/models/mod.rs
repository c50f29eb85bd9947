//! 数据模型模块
//! 主机、凭据与单次运行上下文

pub mod context;
pub mod credentials;
pub mod host;

pub use context::RunContext;
pub use credentials::{Credentials, SshAuth};
pub use host::Host;
