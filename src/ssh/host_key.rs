//! 主机密钥验证策略
//!
//! 指纹为服务端公钥 base64 的 SHA-256（hex）。已记录的指纹不匹配时一律拒绝；
//! 未记录的主机是否接受由 `accept_unknown_host_identity` 决定。

use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// 验证结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostKeyDecision {
    /// 与已知指纹一致
    Verified,
    /// 未知主机，首次信任
    AcceptedUnknown,
    /// 未知主机，严格模式拒绝
    RejectedUnknown,
    /// 指纹不匹配
    Mismatch { expected: String },
}

impl HostKeyDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, HostKeyDecision::Verified | HostKeyDecision::AcceptedUnknown)
    }
}

#[derive(Debug, Clone)]
pub struct HostKeyPolicy {
    accept_unknown: bool,
    known_hosts: HashMap<String, String>,
}

impl Default for HostKeyPolicy {
    fn default() -> Self {
        Self::trust_on_first_use()
    }
}

impl HostKeyPolicy {
    pub fn new(accept_unknown: bool, known_hosts: HashMap<String, String>) -> Self {
        Self {
            accept_unknown,
            known_hosts,
        }
    }

    /// 自动接受所有未知主机
    pub fn trust_on_first_use() -> Self {
        Self::new(true, HashMap::new())
    }

    /// 计算公钥指纹
    pub fn fingerprint(public_key_base64: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(public_key_base64.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn check(&self, host: &str, port: u16, fingerprint: &str) -> HostKeyDecision {
        let host_key = format!("{}:{}", host, port);

        match self.known_hosts.get(&host_key) {
            Some(stored) if stored.eq_ignore_ascii_case(fingerprint) => HostKeyDecision::Verified,
            Some(stored) => HostKeyDecision::Mismatch {
                expected: stored.clone(),
            },
            None if self.accept_unknown => HostKeyDecision::AcceptedUnknown,
            None => HostKeyDecision::RejectedUnknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_fingerprint_is_sha256_hex() {
        let fp = HostKeyPolicy::fingerprint("AAAAC3NzaC1lZDI1NTE5");
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(fp, HostKeyPolicy::fingerprint("AAAAC3NzaC1lZDI1NTE5"));
    }

    #[test]
    fn test_trust_on_first_use_accepts_unknown() {
        let policy = HostKeyPolicy::trust_on_first_use();
        let decision = policy.check("esx01", 22, "abc");
        assert_eq!(decision, HostKeyDecision::AcceptedUnknown);
        assert!(decision.is_accepted());
    }

    #[test]
    fn test_strict_rejects_unknown() {
        let policy = HostKeyPolicy::new(false, HashMap::new());
        assert!(!policy.check("esx01", 22, "abc").is_accepted());
    }

    #[test]
    fn test_known_host_verified_and_mismatch() {
        let policy = HostKeyPolicy::new(true, known(&[("esx01:22", "ABC")]));

        assert_eq!(policy.check("esx01", 22, "abc"), HostKeyDecision::Verified);

        let decision = policy.check("esx01", 22, "def");
        assert_eq!(
            decision,
            HostKeyDecision::Mismatch {
                expected: "ABC".to_string()
            }
        );
        assert!(!decision.is_accepted());

        // 端口不同视为另一台主机
        assert_eq!(policy.check("esx01", 2222, "def"), HostKeyDecision::AcceptedUnknown);
    }
}
