// Copyright 2025 Memophor Labs
// SPDX-License-Identifier: Apache-2.0

//! HTTP transport seam for the Rentloop client.
//!
//! The client builds a [`RequestDescriptor`] per call and hands it to a
//! [`Transport`]. The production implementation wraps `reqwest`; tests swap in
//! mocks so timeouts and failures can be driven deterministically.

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Everything needed to perform one HTTP exchange.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
    /// Deadline applied by the client around the transport call.
    pub timeout: Option<Duration>,
}

impl RequestDescriptor {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(FormData),
}

/// A binary attachment for a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    Text { name: String, value: String },
    File { name: String, file: FileUpload },
}

/// Ordered multipart form; repeated field names are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    parts: Vec<FormPart>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten a serializable object into text parts.
    ///
    /// Strings are sent as-is, nulls are skipped, everything else is sent as
    /// its JSON text.
    pub fn from_fields<T: Serialize>(fields: &T) -> Result<Self, serde_json::Error> {
        let mut form = Self::new();
        if let Value::Object(map) = serde_json::to_value(fields)? {
            for (name, value) in map {
                match value {
                    Value::Null => {}
                    Value::String(text) => form.push_text(name, text),
                    other => form.push_text(name, other.to_string()),
                }
            }
        }
        Ok(form)
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_text(name, value);
        self
    }

    pub fn file(mut self, name: impl Into<String>, file: FileUpload) -> Self {
        self.push_file(name, file);
        self
    }

    pub fn files(mut self, name: &str, files: impl IntoIterator<Item = FileUpload>) -> Self {
        for file in files {
            self.push_file(name, file);
        }
        self
    }

    pub fn push_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parts.push(FormPart::Text {
            name: name.into(),
            value: value.into(),
        });
    }

    pub fn push_file(&mut self, name: impl Into<String>, file: FileUpload) {
        self.parts.push(FormPart::File {
            name: name.into(),
            file,
        });
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    pub fn file_names(&self, field: &str) -> Vec<&str> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                FormPart::File { name, file } if name == field => Some(file.file_name.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn text_value(&self, field: &str) -> Option<&str> {
        self.parts.iter().find_map(|part| match part {
            FormPart::Text { name, value } if name == field => Some(value.as_str()),
            _ => None,
        })
    }

    fn into_reqwest(self) -> Result<reqwest::multipart::Form, TransportError> {
        let mut form = reqwest::multipart::Form::new();
        for part in self.parts {
            form = match part {
                FormPart::Text { name, value } => form.text(name, value),
                FormPart::File { name, file } => {
                    let mut body = reqwest::multipart::Part::bytes(file.bytes)
                        .file_name(file.file_name);
                    if let Some(mime) = file.mime {
                        body = body
                            .mime_str(&mime)
                            .map_err(|e| TransportError::Other(format!("invalid mime type: {e}")))?;
                    }
                    form.part(name, body)
                }
            };
        }
        Ok(form)
    }
}

/// Status line and raw body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            status_text: reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|code| code.canonical_reason())
                .unwrap_or_default()
                .to_string(),
            body: body.to_string().into_bytes(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The server could not be reached at all.
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("{0}")]
    Other(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: RequestDescriptor) -> Result<RawResponse, TransportError>;
}

/// `reqwest`-backed transport. Deadlines are enforced by the caller.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn try_new() -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: RequestDescriptor) -> Result<RawResponse, TransportError> {
        let RequestDescriptor {
            method,
            url,
            query,
            headers,
            body,
            ..
        } = request;

        let mut builder = self.client.request(method, url);
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        for (name, value) in headers {
            builder = builder.header(name, value);
        }

        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.body(value.to_string()),
            RequestBody::Multipart(form) => builder.multipart(form.into_reqwest()?),
        };

        let response = builder.send().await.map_err(classify)?;
        let status = response.status();
        let body = response.bytes().await.map_err(classify)?;

        Ok(RawResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body: body.to_vec(),
        })
    }
}

fn classify(error: reqwest::Error) -> TransportError {
    if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else {
        TransportError::Other(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Fields {
        name: &'static str,
        price_per_day: u32,
        tags: Vec<&'static str>,
        description: Option<&'static str>,
    }

    #[test]
    fn form_fields_flatten_to_text() {
        let form = FormData::from_fields(&Fields {
            name: "Camping tent",
            price_per_day: 250,
            tags: vec!["outdoor"],
            description: None,
        })
        .unwrap();

        assert_eq!(form.text_value("name"), Some("Camping tent"));
        assert_eq!(form.text_value("pricePerDay"), Some("250"));
        assert_eq!(form.text_value("tags"), Some("[\"outdoor\"]"));
        assert!(form.text_value("description").is_none());
    }

    #[test]
    fn repeated_file_fields_keep_order() {
        let form = FormData::new()
            .file("images", FileUpload::new("front.jpg", vec![1]))
            .file("images", FileUpload::new("back.jpg", vec![2]));

        assert_eq!(form.file_names("images"), vec!["front.jpg", "back.jpg"]);
        assert!(form.file_names("image").is_empty());
    }

    #[test]
    fn raw_json_response_carries_reason() {
        let response = RawResponse::json(404, &serde_json::json!({ "success": false }));
        assert_eq!(response.status_text, "Not Found");
        assert!(!response.is_success());
    }
}
