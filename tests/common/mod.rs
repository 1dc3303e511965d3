//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use dynroute::config::ServerConfig;
use dynroute::lifecycle::{Shutdown, Startup};
use dynroute::RouteRegistry;
use sdk_rust::RouteHostClient;
use tempfile::TempDir;

/// A server running on an ephemeral loopback port.
pub struct TestServer {
    pub base_url: String,
    pub registry: Arc<RouteRegistry>,
    pub shutdown: Shutdown,
    pub dir: TempDir,
}

impl TestServer {
    pub fn client(&self) -> RouteHostClient {
        RouteHostClient::new(&self.base_url)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Write a handler manifest into the server's temp directory.
    pub fn manifest(&self, name: &str, content: &str) -> String {
        write_manifest(&self.dir, name, content).display().to_string()
    }

    pub fn echo_manifest(&self) -> String {
        self.manifest("echo.toml", "kind = \"echo\"\nparam = \"echo\"\n")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub fn write_manifest(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Conventional config with the probe answering `ok`.
pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::local();
    config.expected_test_output = "ok".to_string();
    config
}

pub async fn start_server() -> TestServer {
    start_server_with(test_config(), |_, _| {}).await
}

/// Start a server after `prepare` has seen the temp directory, so seeded
/// services can point at manifests inside it.
pub async fn start_server_with<F>(mut config: ServerConfig, prepare: F) -> TestServer
where
    F: FnOnce(&mut ServerConfig, &TempDir),
{
    let dir = tempfile::tempdir().unwrap();
    prepare(&mut config, &dir);

    let startup = Startup::prepare(config).await.unwrap();
    let base_url = format!("http://127.0.0.1:{}", startup.address().port);
    let registry = startup.registry().clone();

    let shutdown = Shutdown::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            let _ = startup.serve(&shutdown).await;
        }
    });

    wait_until_ready(&base_url).await;
    TestServer {
        base_url,
        registry,
        shutdown,
        dir,
    }
}

async fn wait_until_ready(base_url: &str) {
    let client = RouteHostClient::new(base_url);
    for _ in 0..50 {
        if client.test().await.is_ok() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("server at {} never became ready", base_url);
}
