//! Optional public URL through an `ngrok` tunnel.
//!
//! The tunnel is a convenience: if ngrok is missing or never reports a URL,
//! a warning is logged and the server keeps running locally.

use std::process::Stdio;
use std::time::Duration;

use serde::Deserialize;
use tokio::process::{Child, Command};
use tracing::{info, warn};

/// ngrok's local inspection API.
const TUNNELS_API: &str = "http://127.0.0.1:4040/api/tunnels";

const POLL_INTERVAL: Duration = Duration::from_millis(500);
const POLL_ATTEMPTS: u32 = 20;

#[derive(Debug, Deserialize)]
struct TunnelList {
    tunnels: Vec<TunnelInfo>,
}

#[derive(Debug, Deserialize)]
struct TunnelInfo {
    public_url: String,
}

/// A running ngrok process. Dropping it stops the tunnel.
pub struct Tunnel {
    _child: Child,
    pub public_url: Option<String>,
}

impl Tunnel {
    /// Launch `ngrok http <port>` and wait briefly for its public URL.
    ///
    /// Returns `None` if the binary could not be started.
    pub async fn start(port: u16, binary: &str) -> Option<Tunnel> {
        let child = match Command::new(binary)
            .args(["http", &port.to_string(), "--log", "stdout"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                warn!(binary, error = %e, "failed to start ngrok");
                if cfg!(target_os = "macos") {
                    info!("Install ngrok with: brew install ngrok");
                } else {
                    info!("Install ngrok with: sudo apt install ngrok");
                }
                return None;
            }
        };

        let public_url = poll_public_url(TUNNELS_API).await;
        match &public_url {
            Some(url) => {
                info!("ngrok tunnel active: {}", url);
                info!("print endpoint: {}/print", url);
                info!("devices endpoint: {}/devices", url);
            }
            None => warn!("ngrok started but no tunnels found"),
        }

        Some(Tunnel {
            _child: child,
            public_url,
        })
    }
}

/// First public URL the inspection API reports, if any shows up in time.
async fn poll_public_url(api: &str) -> Option<String> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
        .ok()?;

    for _ in 0..POLL_ATTEMPTS {
        tokio::time::sleep(POLL_INTERVAL).await;

        let response = match client.get(api).send().await {
            Ok(response) => response,
            Err(_) => continue,
        };
        match response.json::<TunnelList>().await {
            Ok(list) => {
                if let Some(tunnel) = list.tunnels.into_iter().next() {
                    return Some(tunnel.public_url);
                }
            }
            Err(e) => warn!(error = %e, "could not read ngrok tunnel list"),
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tunnel_list_parses() {
        let body = r#"{
            "tunnels": [
                {"name": "command_line", "public_url": "https://abc123.ngrok.app", "proto": "https"}
            ],
            "uri": "/api/tunnels"
        }"#;
        let list: TunnelList = serde_json::from_str(body).unwrap();
        assert_eq!(list.tunnels[0].public_url, "https://abc123.ngrok.app");
    }

    #[tokio::test]
    async fn test_missing_binary_is_not_fatal() {
        assert!(Tunnel::start(5000, "/nonexistent/ngrok").await.is_none());
    }
}
