//! Mattermost relay — sends formatted extraction output via the Mattermost
//! Incoming Webhook API.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use postlens_core::NotificationSink;

pub struct MattermostRelay {
    webhook_url: Option<String>,
    http: Client,
}

impl MattermostRelay {
    /// `None` means "unset destination": delivery becomes a successful no-op.
    pub fn new(webhook_url: Option<String>) -> Self {
        if webhook_url.is_none() {
            info!("Mattermost webhook URL not configured; relay disabled");
        }
        Self {
            webhook_url,
            http: Client::new(),
        }
    }
}

#[async_trait]
impl NotificationSink for MattermostRelay {
    fn name(&self) -> &str {
        "Mattermost"
    }

    async fn deliver(&self, text: &str) -> Result<()> {
        let Some(url) = &self.webhook_url else {
            debug!("Webhook unset; skipping relay");
            return Ok(());
        };
        self.http
            .post(url)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .context("webhook request failed")?
            .error_for_status()
            .context("webhook rejected the message")?;
        debug!(bytes = text.len(), "Relayed message to Mattermost");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    async fn spawn_mock(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn unset_url_is_a_successful_noop() {
        let relay = MattermostRelay::new(None);
        relay.deliver("### Alice\nHello").await.unwrap();
    }

    #[tokio::test]
    async fn posts_text_payload() {
        let seen: Arc<Mutex<Vec<serde_json::Value>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let app = Router::new().route(
            "/hooks/abc",
            post(move |Json(body): Json<serde_json::Value>| async move {
                sink.lock().unwrap().push(body);
                StatusCode::OK
            }),
        );
        let base = spawn_mock(app).await;

        let relay = MattermostRelay::new(Some(format!("{base}/hooks/abc")));
        relay.deliver("### Alice\nHello").await.unwrap();

        let recorded = seen.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0], serde_json::json!({ "text": "### Alice\nHello" }));
    }

    #[tokio::test]
    async fn non_2xx_is_an_error() {
        let app = Router::new().route(
            "/hooks/abc",
            post(|| async { StatusCode::FORBIDDEN }),
        );
        let base = spawn_mock(app).await;

        let relay = MattermostRelay::new(Some(format!("{base}/hooks/abc")));
        assert!(relay.deliver("hi").await.is_err());
    }
}
