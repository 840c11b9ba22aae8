/**
 * Remote Row Store Client
 *
 * Talks to the spreadsheet web app: one GET returns every sheet, one POST
 * applies one mutation. Neither call retries; callers decide what a failure
 * means. The POST uses `text/plain` so browsers hitting the same endpoint skip
 * the CORS preflight; the script parses the body as JSON either way.
 *
 * A write that times out after the script applied it looks exactly like a
 * failed write, so the same mutation can be delivered more than once.
 */

use crate::shared::error::SyncError;
use crate::shared::mutation::Mutation;
use crate::shared::sheet::SheetSnapshot;
use crate::tracker::config::Config;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value;

/// Status string the script returns for an applied write
const SUCCESS_STATUS: &str = "success";

/// Read-all / write-one access to the external row store
#[async_trait]
pub trait RemoteRowStore: Send + Sync {
    /// Fetch every sheet
    async fn fetch_all(&self) -> Result<SheetSnapshot, SyncError>;

    /// Apply one mutation remotely
    async fn write_one(&self, mutation: &Mutation) -> Result<(), SyncError>;
}

/// HTTP client for the spreadsheet web app
#[derive(Debug, Clone)]
pub struct HttpRowClient {
    endpoint: Option<String>,
    client: Client,
}

impl HttpRowClient {
    pub fn new(config: &Config) -> Result<Self, SyncError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| SyncError::network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            endpoint: config.endpoint_url().map(str::to_string),
            client,
        })
    }

    fn endpoint(&self) -> Result<&str, SyncError> {
        self.endpoint.as_deref().ok_or(SyncError::NotConfigured)
    }
}

/// Interpret the body of a write response.
///
/// Empty or non-JSON bodies count as bare success, as do JSON bodies without a
/// `status` field. Any other status rejects the write.
pub fn interpret_write_response(body: &str) -> Result<(), SyncError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Ok(());
    }
    let Ok(value) = serde_json::from_str::<Value>(trimmed) else {
        return Ok(());
    };
    match value.get("status") {
        None => Ok(()),
        Some(Value::String(status)) if status == SUCCESS_STATUS => Ok(()),
        Some(Value::String(status)) => Err(SyncError::Rejected { status: status.clone() }),
        Some(other) => Err(SyncError::Rejected { status: other.to_string() }),
    }
}

#[async_trait]
impl RemoteRowStore for HttpRowClient {
    async fn fetch_all(&self) -> Result<SheetSnapshot, SyncError> {
        let url = self.endpoint()?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SyncError::network(format!("GET failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(SyncError::network(format!("GET failed: {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SyncError::network(format!("Failed to read response: {}", e)))?;
        let payload: Value =
            serde_json::from_str(&body).map_err(|e| SyncError::parse(format!("Invalid JSON: {}", e)))?;
        let snapshot = SheetSnapshot::from_json(&payload)?;

        tracing::debug!(sheets = snapshot.sheet_names().count(), "fetched row snapshot");
        Ok(snapshot)
    }

    async fn write_one(&self, mutation: &Mutation) -> Result<(), SyncError> {
        let url = self.endpoint()?;
        let body = serde_json::to_string(mutation)?;

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "text/plain;charset=utf-8")
            .body(body)
            .send()
            .await
            .map_err(|e| SyncError::network(format!("POST failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| status.to_string());
            return Err(SyncError::network(format!("POST failed: {} - {}", status, error_text)));
        }

        // A 2xx means the script ran; an unreadable body is treated as empty
        let body = response.text().await.unwrap_or_else(|e| {
            tracing::debug!("could not read write response body: {}", e);
            String::new()
        });
        interpret_write_response(&body)?;

        tracing::debug!(
            action = mutation.action(),
            sheet = %mutation.sheet_name(),
            "row store accepted write"
        );
        Ok(())
    }
}
