//! 测试公共模块
//! 提供可编排的探测器与远程 shell 替身

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tracing_subscriber::fmt::MakeWriter;
use ops_fanout::{
    models::{Credentials, Host},
    ssh::{ReachabilityProbe, RemoteExecutor, RemoteShell},
    DispatchPool, HostError,
};

/// 可指定不可达主机的探测器
#[derive(Default)]
pub struct FakeProbe {
    closed: HashSet<String>,
    pub calls: AtomicUsize,
}

impl FakeProbe {
    pub fn open() -> Self {
        Self::default()
    }

    pub fn with_closed(hosts: &[&str]) -> Self {
        Self {
            closed: hosts.iter().map(|h| h.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ReachabilityProbe for FakeProbe {
    async fn probe(&self, host: &str, _port: u16) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        !self.closed.contains(host)
    }
}

/// 单主机的预设行为
#[derive(Clone)]
pub enum Behavior {
    Output(Vec<String>),
    Fail(HostError),
    Panic,
}

/// 远程 shell 替身：记录调用次数与最大并发
#[derive(Default)]
pub struct FakeShell {
    behaviors: HashMap<String, Behavior>,
    delays: HashMap<String, Duration>,
    default_delay: Duration,
    pub calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    pub fn output(mut self, host: &str, lines: &[&str]) -> Self {
        self.behaviors.insert(
            host.to_string(),
            Behavior::Output(lines.iter().map(|l| l.to_string()).collect()),
        );
        self
    }

    pub fn fail(mut self, host: &str, error: HostError) -> Self {
        self.behaviors.insert(host.to_string(), Behavior::Fail(error));
        self
    }

    pub fn panic_on(mut self, host: &str) -> Self {
        self.behaviors.insert(host.to_string(), Behavior::Panic);
        self
    }

    pub fn delay(mut self, host: &str, delay: Duration) -> Self {
        self.delays.insert(host.to_string(), delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteShell for FakeShell {
    async fn run(
        &self,
        host: &Host,
        _port: u16,
        _credentials: &Credentials,
        command: &str,
    ) -> Result<Vec<String>, HostError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let delay = self
            .delays
            .get(host.as_str())
            .copied()
            .unwrap_or(self.default_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.behaviors.get(host.as_str()) {
            Some(Behavior::Output(lines)) => Ok(lines.clone()),
            Some(Behavior::Fail(error)) => Err(error.clone()),
            Some(Behavior::Panic) => panic!("shell blew up on {}", host),
            None => Ok(vec![format!("{} ran {}", host, command)]),
        }
    }
}

pub type FakePool = DispatchPool<FakeProbe, FakeShell>;

pub fn pool(probe: FakeProbe, shell: FakeShell, worker_limit: usize) -> FakePool {
    DispatchPool::new(RemoteExecutor::new(probe, shell, 22), worker_limit)
}

pub fn hosts(names: &[&str]) -> Vec<Host> {
    names.iter().map(|n| Host::parse(n).unwrap()).collect()
}

pub fn credentials() -> Credentials {
    Credentials::with_password("root", "VMware1!")
}

/// 写入清单文件
pub fn write_inventory(dir: &Path, names: &[&str]) -> std::path::PathBuf {
    let path = dir.join("hosts.txt");
    std::fs::write(&path, names.join("\n")).unwrap();
    path
}

/// 写入凭据文件
pub fn write_credentials(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("credentials.json");
    std::fs::write(&path, r#"{"username": "root", "password": "VMware1!"}"#).unwrap();
    path
}

/// 收集 tracing 输出的内存缓冲区
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
