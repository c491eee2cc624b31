//! Elasticsearch HTTP client
//!
//! Speaks the REST API directly over `reqwest`. Connection failures, 429 and
//! 5xx answers are retried with exponential backoff; everything else is
//! returned to the caller on the first attempt.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::store::{BulkItemError, BulkResponse, DocumentStore, IndexAction, TermCount};
use crate::config::EtlConfig;
use crate::error::{EtlError, Result};

/// Buckets requested per terms aggregation
const TERMS_AGGREGATION_SIZE: usize = 50;

const AGGREGATION_NAME: &str = "by_field";

#[derive(Debug, Clone, Deserialize)]
pub struct ClusterHealth {
    pub cluster_name: String,
    /// green, yellow or red
    pub status: String,
    #[serde(default)]
    pub number_of_nodes: u32,
}

#[derive(Debug, Deserialize)]
struct BulkApiResponse {
    #[serde(default)]
    items: Vec<HashMap<String, BulkApiItem>>,
}

#[derive(Debug, Deserialize)]
struct BulkApiItem {
    #[serde(rename = "_id", default)]
    id: Option<String>,
    status: u16,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    aggregations: HashMap<String, TermsAggregation>,
}

#[derive(Debug, Deserialize)]
struct TermsAggregation {
    buckets: Vec<TermsBucket>,
}

#[derive(Debug, Deserialize)]
struct TermsBucket {
    key: Value,
    doc_count: u64,
}

#[derive(Debug, Deserialize)]
struct GetResponse {
    #[serde(default)]
    found: bool,
    #[serde(rename = "_source", default)]
    source: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct ElasticsearchClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl ElasticsearchClient {
    pub fn new(config: &EtlConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.read_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.es_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries.max(1),
            retry_delay: config.retry_delay(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `{index}/_doc/{id}` with both names percent-encoded as single path segments
    fn document_url(&self, index: &str, id: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| EtlError::config(format!("Invalid Elasticsearch URL '{}': {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| EtlError::config(format!("Elasticsearch URL '{}' cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend([index, "_doc", id]);
        Ok(url)
    }

    /// Cluster name, status and node count
    pub async fn health(&self) -> Result<ClusterHealth> {
        let url = self.url("_cluster/health");
        let response = self
            .execute("cluster health", || self.client.get(&url))
            .await?;
        let response = expect_success("cluster health", response).await?;
        Ok(response.json().await?)
    }

    /// Send the request built by `build`, retrying transient failures
    async fn execute<F>(&self, what: &str, build: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder + Send + Sync,
    {
        let mut attempt = 0u32;
        loop {
            attempt += 1;

            let err = match build().send().await {
                Ok(response) if !is_retryable_status(response.status()) => return Ok(response),
                Ok(response) => EtlError::store(format!("{} returned HTTP {}", what, response.status())),
                Err(e) => EtlError::Http(e),
            };

            let retryable = matches!(err, EtlError::Store(_)) || err.is_transient();
            if !retryable || attempt >= self.max_retries {
                return Err(err);
            }

            let delay = self.retry_delay * 2u32.saturating_pow(attempt - 1);
            warn!(
                request = what,
                attempt,
                max_retries = self.max_retries,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Elasticsearch request failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

/// Turn a non-2xx answer into a store error carrying the response body
async fn expect_success(what: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(EtlError::store(format!("{} returned HTTP {}: {}", what, status, body)))
}

/// Newline-delimited bulk body: one action line and one source line per document
fn bulk_body(index: &str, actions: &[IndexAction]) -> Result<String> {
    let mut body = String::new();
    for action in actions {
        let header = json!({ "index": { "_index": index, "_id": action.id } });
        body.push_str(&serde_json::to_string(&header)?);
        body.push('\n');
        body.push_str(&serde_json::to_string(&action.document)?);
        body.push('\n');
    }
    Ok(body)
}

fn error_reason(error: &Value) -> String {
    match (error.get("type").and_then(Value::as_str), error.get("reason").and_then(Value::as_str)) {
        (Some(kind), Some(reason)) => format!("{}: {}", kind, reason),
        (None, Some(reason)) => reason.to_string(),
        _ => error.to_string(),
    }
}

fn parse_bulk_response(parsed: BulkApiResponse, actions: &[IndexAction]) -> BulkResponse {
    let mut response = BulkResponse::default();

    for (position, item) in parsed.items.into_iter().enumerate() {
        let Some(result) = item.into_values().next() else {
            continue;
        };

        let failed = result.error.is_some() || !(200..300).contains(&result.status);
        if failed {
            let id = result
                .id
                .or_else(|| actions.get(position).map(|a| a.id.clone()))
                .unwrap_or_default();
            let reason = result
                .error
                .as_ref()
                .map(error_reason)
                .unwrap_or_else(|| format!("HTTP {}", result.status));
            response.failed += 1;
            response.errors.push(BulkItemError {
                id,
                status: result.status,
                reason,
            });
        } else {
            response.succeeded += 1;
        }
    }

    // Items the store never acknowledged count as failures
    let acknowledged = response.succeeded + response.failed;
    if acknowledged < actions.len() {
        response.failed += actions.len() - acknowledged;
    }

    response
}

#[async_trait]
impl DocumentStore for ElasticsearchClient {
    fn name(&self) -> &str {
        "elasticsearch"
    }

    async fn index_exists(&self, index: &str) -> Result<bool> {
        let url = self.url(index);
        let response = self.execute("index exists", || self.client.head(&url)).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(EtlError::store(format!("index exists check returned HTTP {}", status))),
        }
    }

    async fn create_index(&self, index: &str, mapping: &Value) -> Result<()> {
        let url = self.url(index);
        let response = self
            .execute("create index", || self.client.put(&url).json(mapping))
            .await?;

        if response.status() == StatusCode::BAD_REQUEST {
            let body = response.text().await.unwrap_or_default();
            if body.contains("resource_already_exists_exception") {
                return Err(EtlError::IndexExists(index.to_string()));
            }
            return Err(EtlError::store(format!("create index returned HTTP 400: {}", body)));
        }

        expect_success("create index", response).await?;
        Ok(())
    }

    async fn delete_index(&self, index: &str) -> Result<bool> {
        let url = self.url(index);
        let response = self.execute("delete index", || self.client.delete(&url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        expect_success("delete index", response).await?;
        Ok(true)
    }

    async fn bulk_index(&self, index: &str, actions: &[IndexAction]) -> Result<BulkResponse> {
        if actions.is_empty() {
            return Ok(BulkResponse::default());
        }

        let body = bulk_body(index, actions)?;
        let url = self.url("_bulk");
        debug!(index, documents = actions.len(), bytes = body.len(), "Submitting bulk request");

        let response = self
            .execute("bulk", || {
                self.client
                    .post(&url)
                    .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
                    .body(body.clone())
            })
            .await?;
        let response = expect_success("bulk", response).await?;
        let parsed: BulkApiResponse = response.json().await?;

        Ok(parse_bulk_response(parsed, actions))
    }

    async fn refresh(&self, index: &str) -> Result<()> {
        let url = self.url(&format!("{}/_refresh", index));
        let response = self.execute("refresh", || self.client.post(&url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(EtlError::IndexNotFound(index.to_string()));
        }
        expect_success("refresh", response).await?;
        Ok(())
    }

    async fn count(&self, index: &str) -> Result<u64> {
        let url = self.url(&format!("{}/_count", index));
        let response = self.execute("count", || self.client.get(&url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(EtlError::IndexNotFound(index.to_string()));
        }
        let response = expect_success("count", response).await?;
        let parsed: CountResponse = response.json().await?;
        Ok(parsed.count)
    }

    async fn terms_aggregation(&self, index: &str, field: &str) -> Result<Vec<TermCount>> {
        let url = self.url(&format!("{}/_search", index));
        let mut aggs = serde_json::Map::new();
        aggs.insert(
            AGGREGATION_NAME.to_string(),
            json!({ "terms": { "field": field, "size": TERMS_AGGREGATION_SIZE } }),
        );
        let query = json!({ "size": 0, "aggs": aggs });

        let response = self
            .execute("terms aggregation", || self.client.post(&url).json(&query))
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(EtlError::IndexNotFound(index.to_string()));
        }
        let response = expect_success("terms aggregation", response).await?;
        let mut parsed: SearchResponse = response.json().await?;

        let buckets = parsed
            .aggregations
            .remove(AGGREGATION_NAME)
            .map(|agg| agg.buckets)
            .unwrap_or_default();

        Ok(buckets
            .into_iter()
            .map(|bucket| TermCount {
                term: match bucket.key {
                    Value::String(s) => s,
                    other => other.to_string(),
                },
                count: bucket.doc_count,
            })
            .collect())
    }

    async fn get(&self, index: &str, id: &str) -> Result<Option<Value>> {
        let url = self.document_url(index, id)?;
        let response = self.execute("get document", || self.client.get(url.clone())).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = expect_success("get document", response).await?;
        let parsed: GetResponse = response.json().await?;
        Ok(if parsed.found { parsed.source } else { None })
    }

    async fn delete(&self, index: &str, id: &str) -> Result<bool> {
        let url = self.document_url(index, id)?;
        let response = self.execute("delete document", || self.client.delete(url.clone())).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        expect_success("delete document", response).await?;
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_document_url_escapes_id() {
        let config = EtlConfig {
            es_url: "http://es:9200/".to_string(),
            ..Default::default()
        };
        let client = ElasticsearchClient::new(&config).unwrap();

        let url = client.document_url("t", "plane-N1").unwrap();
        assert_eq!(url.as_str(), "http://es:9200/t/_doc/plane-N1");

        let url = client.document_url("t", "train-A/B?c#d").unwrap();
        assert_eq!(url.as_str(), "http://es:9200/t/_doc/train-A%2FB%3Fc%23d");
    }

    #[test]
    fn test_bulk_body_is_ndjson() {
        let actions = vec![
            IndexAction::new("plane-N1", json!({"transport_type": "plane"})),
            IndexAction::new("plane-N2", json!({"transport_type": "plane"})),
        ];
        let body = bulk_body("transport-unified", &actions).unwrap();
        let lines: Vec<&str> = body.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(body.ends_with('\n'));
        let header: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(header["index"]["_index"], "transport-unified");
        assert_eq!(header["index"]["_id"], "plane-N1");
        assert_eq!(lines[1], r#"{"transport_type":"plane"}"#);
    }

    #[test]
    fn test_parse_bulk_response_counts_item_errors() {
        let actions = vec![
            IndexAction::new("a", json!({})),
            IndexAction::new("b", json!({})),
            IndexAction::new("c", json!({})),
        ];
        let raw = json!({
            "took": 3,
            "errors": true,
            "items": [
                {"index": {"_id": "a", "status": 201}},
                {"index": {"_id": "b", "status": 400, "error": {"type": "mapper_parsing_exception", "reason": "failed to parse field [year]"}}},
                {"index": {"_id": "c", "status": 200}}
            ]
        });
        let parsed: BulkApiResponse = serde_json::from_value(raw).unwrap();
        let response = parse_bulk_response(parsed, &actions);

        assert_eq!(response.succeeded, 2);
        assert_eq!(response.failed, 1);
        assert_eq!(response.errors[0].id, "b");
        assert_eq!(response.errors[0].status, 400);
        assert!(response.errors[0].reason.starts_with("mapper_parsing_exception"));
    }

    #[test]
    fn test_unacknowledged_items_are_failures() {
        let actions = vec![IndexAction::new("a", json!({})), IndexAction::new("b", json!({}))];
        let parsed: BulkApiResponse =
            serde_json::from_value(json!({"items": [{"index": {"_id": "a", "status": 201}}]})).unwrap();
        let response = parse_bulk_response(parsed, &actions);
        assert_eq!(response.succeeded, 1);
        assert_eq!(response.failed, 1);
    }

    #[test]
    fn test_url_joining() {
        let config = EtlConfig {
            es_url: "http://es:9200/".to_string(),
            ..Default::default()
        };
        let client = ElasticsearchClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://es:9200");
        assert_eq!(client.url("/_bulk"), "http://es:9200/_bulk");
    }
}
