//! Common test utilities for integration tests.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use osreport_collector::InventoryFileCollector;
use osreport_domain::DomainServices;
use osreport_server::{Server, ServerConfig};
use osreport_session::SessionRegistry;
use osreport_store::{DEFAULT_BACKUP_RETENTION, FileReportStore};

/// Address presented via `X-Forwarded-For` so requests are not treated as
/// coming from loopback.
pub const EXTERNAL_CLIENT: &str = "203.0.113.50";

/// A two-project inventory with five resources.
pub const SAMPLE_INVENTORY: &str = r#"{
  "projects": [
    {"id": "p-infra", "name": "infra"},
    {"id": "p-web", "name": "web"}
  ],
  "resources": [
    {"id": "vm-1", "name": "db-1", "type": "server", "project_id": "p-infra", "status": "ACTIVE"},
    {"id": "vm-2", "name": "web-1", "type": "server", "project_id": "p-web", "status": "SHUTOFF"},
    {"id": "vol-1", "name": "db-data", "type": "volume", "project_id": "p-infra", "status": "in-use"},
    {"id": "net-1", "name": "private", "type": "network", "project_id": "p-web", "status": "ACTIVE"},
    {"id": "fip-1", "type": "floating_ip", "project_id": "p-web", "status": "DOWN"}
  ]
}"#;

/// A test server that runs in the background.
pub struct TestServer {
    /// The server's address.
    pub addr: SocketAddr,
    /// The API token for the server.
    pub token: String,
    /// HTTP client configured for this server.
    pub client: Client,
    /// Handle to the server task.
    _handle: JoinHandle<()>,
    /// Holds the inventory file and the data directory.
    pub temp_dir: TempDir,
}

impl TestServer {
    /// Start a server over the sample inventory with an empty data directory.
    pub async fn start() -> Result<Self> {
        Self::start_with_inventory(SAMPLE_INVENTORY).await
    }

    /// Start a server over the given inventory JSON.
    pub async fn start_with_inventory(inventory: &str) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let token = "test-token".to_string();

        let inventory_path = temp_dir.path().join("inventory.json");
        std::fs::write(&inventory_path, inventory)?;

        let addr = find_available_port().await?;

        let services = DomainServices::new(
            Arc::new(InventoryFileCollector::new(inventory_path)),
            Arc::new(FileReportStore::new(temp_dir.path().join("data"))),
            SessionRegistry::default(),
            DEFAULT_BACKUP_RETENTION,
        );

        let config = ServerConfig::new(Some(token.clone()))
            .with_bind_address(addr)
            .with_request_logging(false);

        let server = Server::new(services, config);
        let handle = tokio::spawn(async move {
            let _ = server.run_on(addr).await;
        });

        let client = Client::new();
        wait_for_server(&client, addr).await?;

        Ok(Self {
            addr,
            token,
            client,
            _handle: handle,
            temp_dir,
        })
    }

    /// Get the base URL for the server.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Data directory the report store writes to.
    pub fn data_dir(&self) -> PathBuf {
        self.temp_dir.path().join("data")
    }

    /// Path of the inventory file the collector reads.
    pub fn inventory_path(&self) -> PathBuf {
        self.temp_dir.path().join("inventory.json")
    }

    /// A request from an external client without credentials.
    pub fn external(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url(), path))
            .header("X-Forwarded-For", EXTERNAL_CLIENT)
    }

    /// An authenticated GET from an external client.
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.external(reqwest::Method::GET, path)
            .bearer_auth(&self.token)
    }

    /// An authenticated POST from an external client.
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.external(reqwest::Method::POST, path)
            .bearer_auth(&self.token)
    }

    /// Check if server is healthy.
    pub async fn health(&self) -> Result<bool> {
        let resp = self
            .client
            .get(format!("{}/health", self.base_url()))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }
}

/// Find an available port for the test server.
async fn find_available_port() -> Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(addr)
}

/// Wait for the server to become ready.
async fn wait_for_server(client: &Client, addr: SocketAddr) -> Result<()> {
    let url = format!("http://{}/health", addr);

    let result = timeout(Duration::from_secs(5), async {
        loop {
            match client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => return,
                _ => tokio::time::sleep(Duration::from_millis(50)).await,
            }
        }
    })
    .await;

    match result {
        Ok(()) => Ok(()),
        Err(_) => anyhow::bail!("Timeout waiting for server to start"),
    }
}

/// Parse the JSON payloads out of an SSE body.
pub fn sse_events(body: &str) -> Vec<serde_json::Value> {
    body.lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .filter_map(|data| serde_json::from_str(data.trim_start()).ok())
        .collect()
}
