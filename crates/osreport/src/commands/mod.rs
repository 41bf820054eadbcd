//! CLI command handlers.

pub mod projects;
pub mod refresh;
pub mod report;
pub mod start;
pub mod status;

use anyhow::Result;

use crate::client::Client;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Server URL to connect to.
    pub server_url: String,
    /// API token for protected routes.
    pub token: Option<String>,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// A client for the configured server.
    pub fn client(&self) -> Result<Client> {
        Client::new(&self.server_url, self.token.clone())
    }
}
