//! Shared helpers for session integration tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use harness_session::{
    FileSessionStore, LoginContext, LoginFlow, LoginFlowConfig, StoreConfig,
};

/// Login flow stub that counts invocations and saves fixed meta.
pub struct StubFlow {
    pub calls: Arc<AtomicUsize>,
    pub delay: Duration,
    pub meta: Vec<(String, String)>,
}

impl StubFlow {
    pub fn counting(calls: Arc<AtomicUsize>) -> Self {
        Self {
            calls,
            delay: Duration::ZERO,
            meta: vec![],
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_meta(mut self, key: &str, value: &str) -> Self {
        self.meta.push((key.to_string(), value.to_string()));
        self
    }
}

#[async_trait]
impl LoginFlow for StubFlow {
    async fn run(&self, ctx: LoginContext<'_>) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        ctx.meta.save_pair("userKey", ctx.user_key);
        for (key, value) in &self.meta {
            ctx.meta.save_pair(key.clone(), value.clone());
        }
        Ok(())
    }
}

/// Flow that always fails, for error-path tests.
pub struct FailingFlow;

#[async_trait]
impl LoginFlow for FailingFlow {
    async fn run(&self, _ctx: LoginContext<'_>) -> anyhow::Result<()> {
        anyhow::bail!("login form never appeared")
    }
}

/// Counting flow wrapped in a default config.
pub fn counting_config(calls: Arc<AtomicUsize>) -> LoginFlowConfig {
    LoginFlowConfig::new(Arc::new(StubFlow::counting(calls)))
}

/// Store config with test-friendly poll/timeout intervals.
pub fn fast_config(tmp: &TempDir) -> StoreConfig {
    StoreConfig {
        root: tmp.path().to_path_buf(),
        poll_interval: Duration::from_millis(20),
        wait_timeout: Duration::from_secs(5),
    }
}

pub async fn file_store(tmp: &TempDir) -> Arc<FileSessionStore> {
    Arc::new(FileSessionStore::new(fast_config(tmp)).await.unwrap())
}

/// Point `<KEY>_USERNAME` / `<KEY>_PASSWORD` at dummy values. Use a
/// user key unique to the calling test; tests share one process
/// environment.
pub fn set_creds(user_key: &str) {
    std::env::set_var(format!("{user_key}_USERNAME"), "user");
    std::env::set_var(format!("{user_key}_PASSWORD"), "secret");
}
