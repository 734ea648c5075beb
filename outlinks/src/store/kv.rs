use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{Store, StoreError};
use crate::types::OutLink;

/// Store backed by a hosted Redis-compatible KV service, spoken to over its REST
/// command endpoint. The whole collection lives under one key as a JSON string.
pub struct KvStore {
    client: reqwest::Client,
    url: String,
    key: String,
}

#[derive(Debug, Deserialize)]
struct KvReply {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

impl KvStore {
    pub fn new(
        url: String,
        token: String,
        key: String,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| StoreError::InvalidConfiguration(format!("invalid KV token: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(KvStore {
            client,
            url: url.trim_end_matches('/').to_string(),
            key,
        })
    }

    async fn command(&self, command: Value) -> Result<Option<Value>, StoreError> {
        let response = self.client.post(&self.url).json(&command).send().await?;
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<KvReply>(&body) {
            Ok(KvReply {
                error: Some(error), ..
            }) => Err(StoreError::Remote(error)),
            _ if !status.is_success() => Err(StoreError::UnexpectedStatus(status.as_u16())),
            Ok(reply) => Ok(reply.result),
            Err(e) => Err(StoreError::UnexpectedReply(e.to_string())),
        }
    }
}

#[async_trait]
impl Store for KvStore {
    async fn read_all(&self) -> Result<Option<Vec<OutLink>>, StoreError> {
        let result = self.command(json!(["GET", self.key])).await?;

        let outlinks = match result {
            None | Some(Value::Null) => None,
            Some(Value::String(raw)) => Some(serde_json::from_str::<Vec<OutLink>>(&raw)?),
            // Some clients store the parsed array rather than its string form.
            Some(value @ Value::Array(_)) => Some(serde_json::from_value::<Vec<OutLink>>(value)?),
            Some(other) => {
                return Err(StoreError::UnexpectedReply(format!(
                    "GET {} returned {}",
                    self.key, other
                )))
            }
        };

        tracing::debug!(
            key = %self.key,
            count = outlinks.as_ref().map_or(0, Vec::len),
            "Read outlinks from KV"
        );
        Ok(outlinks)
    }

    async fn write_all(&self, outlinks: &[OutLink]) -> Result<(), StoreError> {
        let payload = serde_json::to_string(outlinks)?;
        let result = self.command(json!(["SET", self.key, payload])).await?;

        match result {
            Some(Value::String(ok)) if ok == "OK" => {
                tracing::debug!(key = %self.key, count = outlinks.len(), "Wrote outlinks to KV");
                Ok(())
            }
            other => Err(StoreError::UnexpectedReply(format!(
                "SET {} returned {:?}",
                self.key, other
            ))),
        }
    }

    fn backend_name(&self) -> &'static str {
        "kv"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OutLinkFields;
    use chrono::{TimeZone, Utc};
    use httpmock::prelude::*;

    fn outlink(id: &str) -> OutLink {
        OutLink::new(
            id.to_string(),
            OutLinkFields {
                name: "A".to_string(),
                description: "d".to_string(),
                is_applied: true,
                category: "c".to_string(),
                user_page_url: "http://x".to_string(),
                admin_page_url: Some("http://admin.x".to_string()),
            },
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        )
    }

    fn store_for(server: &MockServer) -> KvStore {
        KvStore::new(
            server.base_url(),
            "secret-token".to_string(),
            "outlinks".to_string(),
            Duration::from_secs(2),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_read_missing_key_is_none() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/")
                    .header("authorization", "Bearer secret-token")
                    .json_body(json!(["GET", "outlinks"]));
                then.status(200).json_body(json!({ "result": null }));
            })
            .await;

        let store = store_for(&server);
        assert_eq!(store.read_all().await.unwrap(), None);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_read_parses_stored_string() {
        let server = MockServer::start_async().await;
        let stored = serde_json::to_string(&vec![outlink("1"), outlink("2")]).unwrap();
        server
            .mock_async(|when, then| {
                when.method(POST).json_body(json!(["GET", "outlinks"]));
                then.status(200).json_body(json!({ "result": stored }));
            })
            .await;

        let store = store_for(&server);
        let outlinks = store.read_all().await.unwrap().unwrap();
        assert_eq!(outlinks, vec![outlink("1"), outlink("2")]);
    }

    #[tokio::test]
    async fn test_write_sets_serialized_collection() {
        let server = MockServer::start_async().await;
        let outlinks = vec![outlink("1")];
        let expected = serde_json::to_string(&outlinks).unwrap();
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .header("authorization", "Bearer secret-token")
                    .json_body(json!(["SET", "outlinks", expected]));
                then.status(200).json_body(json!({ "result": "OK" }));
            })
            .await;

        let store = store_for(&server);
        store.write_all(&outlinks).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_remote_error_is_surfaced() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(401).json_body(json!({ "error": "WRONGPASS invalid token" }));
            })
            .await;

        let store = store_for(&server);
        match store.read_all().await {
            Err(StoreError::Remote(message)) => assert_eq!(message, "WRONGPASS invalid token"),
            other => panic!("expected remote error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_failure_reports_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(502).body("bad gateway");
            })
            .await;

        let store = store_for(&server);
        match store.write_all(&[]).await {
            Err(StoreError::UnexpectedStatus(status)) => assert_eq!(status, 502),
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_corrupt_value_is_a_serialization_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).json_body(json!({ "result": "not json" }));
            })
            .await;

        let store = store_for(&server);
        assert!(matches!(
            store.read_all().await,
            Err(StoreError::Serialization(_))
        ));
    }
}
