//! JSON-over-HTTP implementation of the log service gateway.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{Credential, RemoteLogGateway};
use crate::config::{normalize_api_base_url, ClientConfig};
use crate::error::{Error, Result};
use crate::models::{ExportPermission, LogEntry, NewLog, RemoteLogId, Summary, TimeWindow};
use crate::util::compact_text;

/// `RemoteLogGateway` backed by the Evident REST API
#[derive(Clone)]
pub struct HttpLogGateway {
    base_url: String,
    client: Client,
}

impl HttpLogGateway {
    pub fn new(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let base_url = normalize_api_base_url(base_url.as_ref())?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| Error::Config(format!("failed to build HTTP client: {error}")))?;
        Ok(Self { base_url, client })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(config.api_base_url(), config.request_timeout())
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorized(request: RequestBuilder, credential: &Credential) -> RequestBuilder {
        request
            .bearer_auth(credential.token())
            .header("Accept", "application/json")
    }
}

#[derive(Debug, Serialize)]
struct SyncRequest<'a> {
    logs: &'a [NewLog],
}

#[derive(Debug, Deserialize)]
struct SyncResponse {
    synced: usize,
}

#[derive(Debug, Deserialize)]
struct DeleteResponse {
    #[serde(default = "default_deleted")]
    deleted: bool,
}

const fn default_deleted() -> bool {
    true
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    start_date: chrono::NaiveDate,
    end_date: chrono::NaiveDate,
}

impl RemoteLogGateway for HttpLogGateway {
    async fn create_log(&self, credential: &Credential, log: &NewLog) -> Result<LogEntry> {
        let request = self.client.post(self.url("/logs")).json(log);
        read_json(Self::authorized(request, credential)).await
    }

    async fn list_logs(
        &self,
        credential: &Credential,
        window: TimeWindow,
    ) -> Result<Vec<LogEntry>> {
        let request = self
            .client
            .get(self.url(&format!("/logs/{}", window.as_str())));
        read_json(Self::authorized(request, credential)).await
    }

    async fn delete_log(&self, credential: &Credential, id: &RemoteLogId) -> Result<bool> {
        let path = format!("/logs/{}", urlencoding::encode(id.as_str()));
        let request = self.client.delete(self.url(&path));
        let response: DeleteResponse = read_json(Self::authorized(request, credential)).await?;
        Ok(response.deleted)
    }

    async fn sync_logs(&self, credential: &Credential, logs: &[NewLog]) -> Result<usize> {
        let request = self
            .client
            .post(self.url("/logs/sync"))
            .json(&SyncRequest { logs });
        let response: SyncResponse = read_json(Self::authorized(request, credential)).await?;
        Ok(response.synced)
    }

    async fn generate_summary(
        &self,
        credential: &Credential,
        window: TimeWindow,
    ) -> Result<Summary> {
        let (start_date, end_date) = window.date_range(chrono::Local::now().date_naive());
        let request = self
            .client
            .post(self.url("/exports/generate"))
            .json(&GenerateRequest {
                start_date,
                end_date,
            });
        read_json(Self::authorized(request, credential)).await
    }

    async fn can_export(&self, credential: &Credential) -> Result<ExportPermission> {
        let request = self.client.get(self.url("/users/can-export"));
        read_json(Self::authorized(request, credential)).await
    }
}

/// Send `request` and decode a JSON body, mapping failures to error kinds.
pub(crate) async fn read_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let response = request.send().await.map_err(map_transport_error)?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(status_error(status, &body));
    }

    response.json::<T>().await.map_err(map_transport_error)
}

fn map_transport_error(error: reqwest::Error) -> Error {
    if error.is_decode() {
        Error::Server(format!("unexpected response payload: {error}"))
    } else if error.is_timeout() {
        Error::Network(format!("request timed out: {error}"))
    } else {
        Error::Network(error.to_string())
    }
}

fn status_error(status: StatusCode, body: &str) -> Error {
    let message = parse_api_error(status, body);
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        Error::Unauthorized(message)
    } else {
        Error::Server(message)
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", compact_text(&message), status.as_u16());
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", compact_text(trimmed), status.as_u16())
    }
}
