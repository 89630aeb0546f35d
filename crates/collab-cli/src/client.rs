//! Thin HTTP client for the local collaboration server. A short timeout keeps
//! every command snappy when the server is down.

use anyhow::{anyhow, Result};
use collab_core::config::Config;
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3847;

pub struct Client {
    agent: ureq::Agent,
    base: String,
}

impl Client {
    pub fn new(port: u16) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(2))
            .build();
        Client {
            agent,
            base: format!("http://127.0.0.1:{port}"),
        }
    }

    /// Connect to whatever port the last `planq serve` recorded.
    pub fn from_config() -> Self {
        let config = Config::load();
        Self::new(config.port.unwrap_or(DEFAULT_PORT))
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    pub fn get(&self, path: &str) -> Result<serde_json::Value> {
        let url = format!("{}{}", self.base, path);
        let response = self.agent.get(&url).call().map_err(request_error)?;
        Ok(response.into_json()?)
    }

    pub fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<serde_json::Value> {
        let url = format!("{}{}", self.base, path);
        let response = self
            .agent
            .post(&url)
            .send_json(serde_json::to_value(body)?)
            .map_err(request_error)?;
        Ok(response.into_json()?)
    }
}

fn request_error(err: ureq::Error) -> anyhow::Error {
    match err {
        ureq::Error::Status(code, response) => {
            let body = response.into_string().unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v["error"].as_str().map(str::to_string))
                .unwrap_or(body);
            anyhow!("server returned {code}: {message}")
        }
        ureq::Error::Transport(_) => {
            anyhow!("Server not running. Start with: planq serve")
        }
    }
}
