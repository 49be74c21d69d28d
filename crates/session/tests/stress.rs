//! Single-flight stress harness
//!
//! Hammers one cache key with many concurrent workers, each with its
//! own manager and store handle over a shared directory, and verifies
//! the at-most-one-creation property plus record agreement.
//! Run with: cargo test --package harness-session --test stress -- --workers 64

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

use common::{set_creds, StubFlow};
use harness_browser::fake::FakeEngine;
use harness_session::{
    FileSessionStore, LoginFlowConfig, SessionManager, SessionResult, StoreConfig,
};

#[derive(Parser, Debug)]
#[command(name = "harness-session-stress")]
#[command(about = "Single-flight stress scenario for the session cache")]
struct Args {
    /// Number of concurrent workers racing for the same cache key
    #[arg(long, default_value = "32")]
    workers: usize,

    /// Simulated login flow duration in milliseconds
    #[arg(long, default_value = "150")]
    login_ms: u64,

    /// User key under test (credentials are injected)
    #[arg(long, default_value = "STRESS_ADMIN")]
    user_key: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let args = Args::parse();

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    match rt.block_on(run(args)) {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("stress scenario failed: {e}");
            std::process::exit(1);
        }
    }
}

async fn run(args: Args) -> SessionResult<()> {
    set_creds(&args.user_key);
    let tmp = TempDir::new().expect("tempdir");
    let calls = Arc::new(AtomicUsize::new(0));
    let engine = FakeEngine::new();

    let start = Instant::now();
    let mut workers = tokio::task::JoinSet::new();
    for _ in 0..args.workers {
        let config = StoreConfig {
            root: tmp.path().to_path_buf(),
            poll_interval: Duration::from_millis(20),
            wait_timeout: Duration::from_secs(30),
        };
        let user_key = args.user_key.clone();
        let flow = StubFlow::counting(calls.clone())
            .with_delay(Duration::from_millis(args.login_ms));
        let engine = Arc::new(engine.clone());

        workers.spawn(async move {
            let store = Arc::new(FileSessionStore::new(config).await?);
            let manager = SessionManager::new(store, engine)
                .register_flow("default", LoginFlowConfig::new(Arc::new(flow)));
            manager.get_session(&user_key, Some("default")).await
        });
    }

    let mut records = Vec::new();
    while let Some(joined) = workers.join_next().await {
        records.push(joined.expect("worker panicked")?);
    }

    let creations = calls.load(Ordering::SeqCst);
    println!(
        "{} workers, {} login flow invocation(s), {} launch(es), {:?} total",
        args.workers,
        creations,
        engine.launches(),
        start.elapsed()
    );

    assert_eq!(creations, 1, "login flow must run exactly once");
    assert_eq!(engine.launches(), 1, "exactly one browser launch");
    for record in &records {
        assert_eq!(record, &records[0], "all workers must agree on the record");
    }
    println!("ok: single-flight held across {} workers", args.workers);
    Ok(())
}
