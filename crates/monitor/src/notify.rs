// Copyright 2025 RISC Zero, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use url::Url;

pub type NotificationSinkObj = Arc<dyn NotificationSink + Send + Sync>;

/// Outcome of handing a message to a [NotificationSink].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// The sink was reached but refused the message.
    Rejected(String),
}

/// Destination of formatted notification messages.
#[async_trait]
pub trait NotificationSink {
    /// Deliver one message. An error means the sink could not be reached at all.
    async fn send(&self, message: &str) -> Result<Delivery>;
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
}

/// Slack-compatible incoming webhook. Messages are posted as `{"text": <message>}`.
#[derive(Debug, Clone)]
pub struct SlackWebhook {
    client: reqwest::Client,
    url: Url,
}

impl SlackWebhook {
    pub fn new(url: Url) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl NotificationSink for SlackWebhook {
    async fn send(&self, message: &str) -> Result<Delivery> {
        let response = self
            .client
            .post(self.url.clone())
            .json(&WebhookPayload { text: message })
            .send()
            .await
            .context("failed to post to webhook")?;

        let status = response.status();
        if status.is_success() {
            return Ok(Delivery::Delivered);
        }
        let body = response.text().await.unwrap_or_default();
        Ok(Delivery::Rejected(format!("HTTP {status}: {body}")))
    }
}

/// Sink that only logs messages. Used for dry runs.
#[derive(Debug, Clone, Default)]
pub struct TracingSink;

#[async_trait]
impl NotificationSink for TracingSink {
    async fn send(&self, message: &str) -> Result<Delivery> {
        tracing::info!("Notification: {message}");
        Ok(Delivery::Delivered)
    }
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;
    use wiremock::{
        matchers::{body_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;

    #[tokio::test]
    async fn posts_text_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/services/hook"))
            .and(body_json(serde_json::json!({ "text": "hello\nworld" })))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/services/hook", server.uri())).unwrap();
        let sink = SlackWebhook::new(url).unwrap();
        assert_eq!(sink.send("hello\nworld").await.unwrap(), Delivery::Delivered);
    }

    #[tokio::test]
    async fn non_success_status_is_a_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no_service"))
            .mount(&server)
            .await;

        let sink = SlackWebhook::new(Url::parse(&server.uri()).unwrap()).unwrap();
        match sink.send("hello").await.unwrap() {
            Delivery::Rejected(reason) => {
                assert!(reason.contains("404"));
                assert!(reason.contains("no_service"));
            }
            other => panic!("unexpected delivery {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_webhook_is_an_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = Url::parse(&format!("http://{}/hook", listener.local_addr().unwrap())).unwrap();
        drop(listener);

        let sink = SlackWebhook::new(url).unwrap();
        assert!(sink.send("hello").await.is_err());
    }

    #[tokio::test]
    #[traced_test]
    async fn tracing_sink_logs_message() {
        assert_eq!(TracingSink.send("dry run message").await.unwrap(), Delivery::Delivered);
        assert!(logs_contain("Notification: dry run message"));
    }
}
