//! HTTP client for the journal backend.
//!
//! One multipart upload endpoint plus two read endpoints. Uploads are
//! single-shot: a failure is surfaced to the caller and never retried
//! automatically.

use std::path::Path;

use crate::api::model::{Entry, EventSummary, UploadResponse};

/// An audio payload packaged for upload, consumed exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPayload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadPayload {
    /// Packages an encoded live recording under the default filename.
    pub fn recording(bytes: Vec<u8>) -> Self {
        Self {
            file_name: "recording.ogg".to_string(),
            mime_type: "audio/ogg".to_string(),
            bytes,
        }
    }

    /// Packages a user-supplied WAV file, keeping its own name.
    ///
    /// # Errors
    /// - If the file cannot be read
    pub fn wav_file(path: &Path) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload.wav".to_string());
        Ok(Self {
            file_name,
            mime_type: "audio/wav".to_string(),
            bytes,
        })
    }
}

/// Client for the voice-journal backend API.
pub struct JournalClient {
    http: reqwest::Client,
    base_url: String,
}

impl JournalClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// Uploads an audio payload and returns the transcription text.
    ///
    /// Issues exactly one `POST /api/entries/upload` with the payload as
    /// the multipart `file` field.
    ///
    /// # Errors
    /// - On network failure (connection, timeout)
    /// - On a non-success HTTP status, including server detail if present
    /// - When the backend reports a handled failure in the response body
    pub async fn upload(&self, payload: UploadPayload) -> anyhow::Result<String> {
        let url = format!("{}/api/entries/upload", self.base_url);
        tracing::info!(
            "Uploading {} ({} bytes) to {}",
            payload.file_name,
            payload.bytes.len(),
            url
        );

        let part = reqwest::multipart::Part::bytes(payload.bytes)
            .file_name(payload.file_name)
            .mime_str(&payload.mime_type)
            .map_err(|e| anyhow::anyhow!("Failed to create upload part: {e}"))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| request_error("upload", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(
                "Upload failed (status {status}): {detail}"
            ));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse upload response: {e}"))?;

        body.into_transcription()
            .map_err(|detail| anyhow::anyhow!("Upload failed: {detail}"))
    }

    /// Fetches the chronological entry timeline.
    pub async fn timeline(&self) -> anyhow::Result<Vec<Entry>> {
        self.get_json("/api/timeline", "timeline").await
    }

    /// Fetches the aggregate event-frequency view.
    pub async fn main_events(&self) -> anyhow::Result<EventSummary> {
        self.get_json("/api/events/main", "events").await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        what: &str,
    ) -> anyhow::Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| request_error(what, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(
                "Failed to fetch {what} (status {status}): {detail}"
            ));
        }

        response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse {what} response: {e}"))
    }
}

/// Maps reqwest transport failures to human-readable messages.
fn request_error(what: &str, e: reqwest::Error) -> anyhow::Error {
    let message = if e.is_connect() {
        format!("Could not connect to the journal backend for {what}. Is it running?")
    } else if e.is_timeout() {
        format!("The journal backend timed out during {what}.")
    } else {
        format!("Network error during {what}: {e}")
    };
    anyhow::anyhow!(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn upload_sends_one_multipart_request_and_returns_transcription() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/entries/upload"))
            .and(body_string_contains("name=\"file\""))
            .and(body_string_contains("filename=\"recording.ogg\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "entry_id": "e1",
                "transcription": "Today was a good day"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = JournalClient::new(server.uri());
        let payload = UploadPayload::recording(b"fake-ogg-bytes".to_vec());
        let transcription = client.upload(payload).await.unwrap();
        assert_eq!(transcription, "Today was a good day");
    }

    #[tokio::test]
    async fn upload_http_error_surfaces_server_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/entries/upload"))
            .respond_with(ResponseTemplate::new(500).set_body_string("disk full"))
            .expect(1)
            .mount(&server)
            .await;

        let client = JournalClient::new(server.uri());
        let err = client
            .upload(UploadPayload::recording(b"audio".to_vec()))
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("status 500"), "got: {message}");
        assert!(message.contains("disk full"), "got: {message}");
    }

    #[tokio::test]
    async fn upload_handled_backend_failure_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/entries/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "error",
                "message": "Received empty file"
            })))
            .mount(&server)
            .await;

        let client = JournalClient::new(server.uri());
        let err = client
            .upload(UploadPayload::recording(b"audio".to_vec()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Received empty file"));
    }

    #[tokio::test]
    async fn upload_connection_failure_is_reported() {
        // Nothing listens on this port.
        let client = JournalClient::new("http://127.0.0.1:9");
        let err = client
            .upload(UploadPayload::recording(b"audio".to_vec()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("journal backend"));
    }

    #[tokio::test]
    async fn wav_payload_keeps_its_own_filename() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("morning-note.wav");
        std::fs::write(&path, b"RIFFdata").unwrap();

        let payload = UploadPayload::wav_file(&path).unwrap();
        assert_eq!(payload.file_name, "morning-note.wav");
        assert_eq!(payload.mime_type, "audio/wav");
        assert_eq!(payload.bytes, b"RIFFdata");
    }

    #[tokio::test]
    async fn timeline_decodes_entries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/timeline"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "id": "a",
                    "created_at": {"seconds": 1700000000},
                    "sentiment_score": -0.2,
                    "transcription": "Rough morning",
                    "events_tagged": "[\"work\"]"
                },
                {"id": "b"}
            ])))
            .mount(&server)
            .await;

        let client = JournalClient::new(server.uri());
        let entries = client.timeline().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].sentiment(), -0.2);
        assert_eq!(entries[1].id, "b");
    }

    #[tokio::test]
    async fn main_events_decodes_summary() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/events/main"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "main_events": ["hiking", "dinner"],
                "all_events": {"hiking": 4, "dinner": 2, "move": 1}
            })))
            .mount(&server)
            .await;

        let client = JournalClient::new(server.uri());
        let summary = client.main_events().await.unwrap();
        assert_eq!(summary.main_events.len(), 2);
        assert_eq!(summary.all_events.len(), 3);
    }

    #[tokio::test]
    async fn fetch_error_status_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/timeline"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let client = JournalClient::new(server.uri());
        let err = client.timeline().await.unwrap_err();
        assert!(err.to_string().contains("status 503"));
    }
}
