//! 单次运行上下文
//!
//! 运行开始时构造一次，以只读方式共享给分发池和每个主机任务。

use uuid::Uuid;

use super::Credentials;

#[derive(Debug)]
pub struct RunContext {
    /// 运行标识（用于日志关联）
    pub run_id: Uuid,
    /// 共享凭据
    pub credentials: Credentials,
    /// 在每台主机上执行的命令
    pub command: String,
}

impl RunContext {
    pub fn new(credentials: Credentials, command: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            credentials,
            command: command.into(),
        }
    }
}
