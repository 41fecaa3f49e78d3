//! SplitterApiV1 — concrete implementation of the `SplitterApi` trait over
//! the backend's `/api/upload` and `/api/split` endpoints.

use regex::Regex;

use super::{
    SplitParams, SplitPayload, SplitterApi, UploadParams, UploadResponse, FALLBACK_DOWNLOAD_NAME,
};
use crate::error::AppError;
use crate::models::settings::ClientSettings;
use crate::signals::milestone;

const USER_AGENT: &str = "SheetSplitterClient/0.1.0";

pub struct SplitterApiV1 {
    client: reqwest::Client,
    base_url: String,
}

impl SplitterApiV1 {
    pub fn new(settings: &ClientSettings) -> crate::error::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build from the environment (`SPLITTER_API_URL`, default local dev).
    pub fn from_env() -> crate::error::Result<Self> {
        Self::new(&ClientSettings::from_env())
    }

    pub(crate) fn upload_url(&self) -> String {
        format!("{}/api/upload", self.base_url)
    }

    pub(crate) fn split_url(&self) -> String {
        format!("{}/api/split", self.base_url)
    }

    /// Extract the filename hint from an attachment-disposition header value.
    ///
    /// The pattern is deliberately tolerant: it accepts both
    /// `filename="name"` and unquoted `filename=name`. Returns `None` when no
    /// hint can be parsed. Separated as pub(crate) for unit testing without
    /// network.
    pub(crate) fn extract_attachment_filename(header: &str) -> Option<String> {
        let re = Regex::new(r#"filename="?([^";]+)"?"#).ok()?;
        re.captures(header)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|name| !name.is_empty())
    }
}

/// Pull the backend's `{ "error": string }` message out of a failure
/// response, if the body parses as such.
async fn backend_error_message(resp: reqwest::Response) -> Option<String> {
    let body: serde_json::Value = resp.json().await.ok()?;
    body["error"].as_str().map(|s| s.to_string())
}

impl SplitterApi for SplitterApiV1 {
    async fn upload(&self, params: UploadParams) -> crate::error::Result<UploadResponse> {
        let form = reqwest::multipart::Form::new().part(
            "file",
            reqwest::multipart::Part::bytes(params.data)
                .file_name(params.file_name.clone())
                .mime_str("application/octet-stream")
                .map_err(|e| AppError::Internal(format!("MIME parse error: {}", e)))?,
        );

        let resp = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await?;
        params.progress.set(milestone::UPLOAD_HEADERS);

        if !resp.status().is_success() {
            let status = resp.status();
            let msg = backend_error_message(resp)
                .await
                .unwrap_or_else(|| format!("upload rejected with status {}", status));
            return Err(AppError::Upload(msg));
        }

        let body: UploadResponse = resp.json().await?;
        // Ready implies a non-empty sheet list; a workbook with no sheets is
        // a backend contract violation surfaced as an upload failure.
        if body.sheets.is_empty() {
            return Err(AppError::Upload(
                "no sheets found in the uploaded file".to_string(),
            ));
        }
        Ok(body)
    }

    async fn split(&self, params: SplitParams) -> crate::error::Result<SplitPayload> {
        let SplitParams { request, progress } = params;
        let resp = self
            .client
            .post(self.split_url())
            .json(&request)
            .send()
            .await?;
        progress.set(milestone::SPLIT_HEADERS);

        if !resp.status().is_success() {
            let status = resp.status();
            let msg = backend_error_message(resp)
                .await
                .unwrap_or_else(|| format!("split rejected with status {}", status));
            return Err(AppError::Split(msg));
        }

        let file_name = resp
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(Self::extract_attachment_filename)
            .unwrap_or_else(|| FALLBACK_DOWNLOAD_NAME.to_string());
        let data = resp.bytes().await?.to_vec();

        Ok(SplitPayload { file_name, data })
    }
}
