//! Upload workflow: HTML file → Google Doc.
//!
//! Three sequential Drive API calls modeled as an explicit short-lived state
//! machine: multipart upload of the HTML, copy-conversion into a Google Doc,
//! then deletion of the temporary HTML file. Each transition is fallible and
//! a failure surfaces the partial state reached instead of retrying.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::info;
use ureq::Agent;

use super::{ApiError, DEFAULT_TIMEOUT, DriveConfig};

/// Fixed multipart boundary for the metadata + file upload request.
const BOUNDARY: &str = "----DocportFormBoundary7MA4YWxkTrZu0gW";

/// A successfully created Google Doc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedDoc {
    pub doc_id: String,
    pub url: String,
}

/// Workflow failure, tagged with the partial state reached.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// The initial upload failed; nothing was created.
    #[error("upload failed")]
    Upload(#[source] ApiError),

    /// The HTML file was uploaded but conversion failed, leaving the
    /// temporary file behind.
    #[error("uploaded file {file_id} but conversion to a Google Doc failed")]
    Convert {
        file_id: String,
        #[source]
        source: ApiError,
    },

    /// The document was created but deleting the temporary upload failed.
    #[error("created document {doc_id} but cleanup of temporary file {file_id} failed")]
    Cleanup {
        file_id: String,
        doc_id: String,
        #[source]
        source: ApiError,
    },
}

/// Minimal Drive file representation returned by the upload and copy calls.
#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

/// One-shot upload workflow; owns the HTTP agent for its three calls.
pub struct UploadWorkflow<'a> {
    config: &'a DriveConfig,
    agent: Agent,
}

impl<'a> UploadWorkflow<'a> {
    #[must_use]
    pub fn new(config: &'a DriveConfig) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();
        Self { config, agent }
    }

    /// Runs the full upload → convert → cleanup sequence.
    ///
    /// # Errors
    ///
    /// Returns a [`WorkflowError`] naming the step that failed and the
    /// partial state reached (e.g. an uploaded-but-unconverted file id).
    pub fn run(&self, title: &str, html: &str) -> Result<UploadedDoc, WorkflowError> {
        let file_id = self.upload(title, html).map_err(WorkflowError::Upload)?;
        info!(file_id, "uploaded HTML to Drive");

        let doc_id = self.convert(&file_id, title).map_err(|source| {
            WorkflowError::Convert {
                file_id: file_id.clone(),
                source,
            }
        })?;
        info!(doc_id, "converted to Google Doc");

        self.cleanup(&file_id).map_err(|source| WorkflowError::Cleanup {
            file_id: file_id.clone(),
            doc_id: doc_id.clone(),
            source,
        })?;
        info!(file_id, "deleted temporary upload");

        Ok(UploadedDoc {
            url: doc_url(&doc_id),
            doc_id,
        })
    }

    /// Step 1: multipart upload of the HTML file, yielding its Drive file id.
    fn upload(&self, title: &str, html: &str) -> Result<String, ApiError> {
        let url = format!(
            "{}/upload/drive/v3/files?uploadType=multipart",
            self.config.api_base
        );
        let metadata = json!({
            "name": format!("{title}.html"),
            "mimeType": "text/html",
        });
        let body = multipart_body(&metadata.to_string(), title, html);

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.bearer())
            .header(
                "Content-Type",
                &format!("multipart/related; boundary={BOUNDARY}"),
            )
            .send(&body[..])?;
        let file: DriveFile = read_json_response(response)?;
        Ok(file.id)
    }

    /// Step 2: copy the uploaded file as a Google Doc, yielding the doc id.
    fn convert(&self, file_id: &str, title: &str) -> Result<String, ApiError> {
        let url = format!("{}/drive/v3/files/{file_id}/copy", self.config.api_base);
        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.bearer())
            .send_json(json!({
                "name": title,
                "mimeType": "application/vnd.google-apps.document",
            }))?;
        let doc: DriveFile = read_json_response(response)?;
        Ok(doc.id)
    }

    /// Step 3: delete the temporary HTML upload.
    fn cleanup(&self, file_id: &str) -> Result<(), ApiError> {
        let url = format!("{}/drive/v3/files/{file_id}", self.config.api_base);
        let response = self
            .agent
            .delete(&url)
            .header("Authorization", &self.bearer())
            .call()?;
        check_status(response.status().as_u16(), response.into_body())?;
        Ok(())
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.config.access_token)
    }
}

fn doc_url(doc_id: &str) -> String {
    format!("https://docs.google.com/document/d/{doc_id}/edit")
}

/// Builds the two-part `multipart/related` body: JSON metadata + HTML file.
fn multipart_body(metadata: &str, title: &str, html: &str) -> Vec<u8> {
    let mut body = Vec::with_capacity(html.len() + metadata.len() + 512);
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"metadata\"\r\n");
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata.as_bytes());
    body.extend_from_slice(format!("\r\n--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{title}.html\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: text/html\r\n\r\n");
    body.extend_from_slice(html.as_bytes());
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Checks the HTTP status and deserializes a JSON API response.
fn read_json_response<T: serde::de::DeserializeOwned>(
    response: ureq::http::Response<ureq::Body>,
) -> Result<T, ApiError> {
    let status = response.status().as_u16();
    let mut body = check_status(status, response.into_body())?;
    Ok(body.read_json()?)
}

/// Surfaces a non-2xx status as [`ApiError::Status`] with the response body.
fn check_status(status: u16, mut body: ureq::Body) -> Result<ureq::Body, ApiError> {
    if status >= 400 {
        let text = body
            .read_to_string()
            .unwrap_or_else(|_| "(unable to read error body)".to_owned());
        return Err(ApiError::Status { status, body: text });
    }
    Ok(body)
}
