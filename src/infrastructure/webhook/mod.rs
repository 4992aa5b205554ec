use crate::error::{AppError, AppResult};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct WebhookPayload<'a> {
    pub title: &'a str,
    pub mode: &'a str,
    pub timestamp: String,
    pub content: &'a str,
}

/// Publishes the narrated script to an external endpoint after a run.
pub struct WebhookPoster {
    http: reqwest::Client,
    url: String,
}

impl WebhookPoster {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    pub async fn post(&self, title: &str, mode: &str, content: &str) -> AppResult<()> {
        let payload = WebhookPayload {
            title,
            mode,
            timestamp: chrono::Local::now().to_rfc3339(),
            content,
        };

        let response = self
            .http
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Webhook request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::ExternalService(format!(
                "Webhook returned status {}",
                status.as_u16()
            )));
        }

        tracing::info!(url = %self.url, title = %title, mode = %mode, "Script posted to webhook");
        Ok(())
    }
}
