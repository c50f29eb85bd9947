//! 分发池性质测试
//!
//! 对任意主机数 N 与并发上限 C：恰好完成 N 个任务，且同时在途数不超过 C。

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{credentials, hosts, pool, FakeProbe, FakeShell};
use ops_fanout::models::RunContext;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn completes_every_host_within_limit(n in 0usize..40, limit in 1usize..12) {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(4)
            .enable_all()
            .build()
            .unwrap();

        let names: Vec<String> = (0..n).map(|i| format!("h{}", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let shell = FakeShell::new().with_default_delay(Duration::from_millis(2));
        let pool = pool(FakeProbe::open(), shell, limit);

        let results = runtime.block_on(async {
            let context = Arc::new(RunContext::new(credentials(), "uptime"));
            pool.run(&hosts(&refs), context).await
        });

        prop_assert_eq!(results.len(), n);
        prop_assert_eq!(pool.executor().shell().calls(), n);
        prop_assert!(pool.executor().shell().max_in_flight() <= limit);

        let order: Vec<String> = results.iter().map(|r| r.host.to_string()).collect();
        prop_assert_eq!(order, names);
    }
}
