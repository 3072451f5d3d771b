// Copyright 2025 Memophor Labs
// SPDX-License-Identifier: Apache-2.0

//! API gateway client for the rental marketplace backend.
//!
//! Owns base-URL resolution, bearer auth for the user and admin scopes,
//! deadlines, multipart uploads and error normalization. Endpoint methods live
//! in [`crate::endpoints`] and are thin wrappers over the primitives here.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::Instant;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::metrics::ClientMetrics;
use crate::model::{Ack, Envelope, ListQuery};
use crate::session::{AuthScope, Session};
use crate::transport::{
    FormData, RawResponse, RequestBody, RequestDescriptor, ReqwestTransport, Transport,
    TransportError,
};

/// Per-call options for a JSON request.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    pub query: Vec<(String, String)>,
    pub timeout: Option<Duration>,
    pub auth: AuthScope,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            body: None,
            query: Vec::new(),
            timeout: None,
            auth: AuthScope::User,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post(body: Value) -> Self {
        Self::with_body(Method::POST, body)
    }

    pub fn put(body: Value) -> Self {
        Self::with_body(Method::PUT, body)
    }

    pub fn patch(body: Value) -> Self {
        Self::with_body(Method::PATCH, body)
    }

    pub fn delete() -> Self {
        Self {
            method: Method::DELETE,
            ..Self::default()
        }
    }

    fn with_body(method: Method, body: Value) -> Self {
        Self {
            method,
            body: Some(body),
            ..Self::default()
        }
    }

    pub fn query(mut self, query: &ListQuery) -> Self {
        self.query.extend(query.to_pairs());
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn scope(mut self, auth: AuthScope) -> Self {
        self.auth = auth;
        self
    }

    pub fn anonymous(self) -> Self {
        self.scope(AuthScope::Anonymous)
    }
}

/// Shared handle to the marketplace API. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    session: Session,
    request_timeout: Duration,
    upload_timeout: Duration,
    metrics: Option<ClientMetrics>,
}

impl ApiClient {
    /// Construct a client backed by `reqwest`.
    pub fn try_new(config: &ClientConfig, session: Session) -> anyhow::Result<Self> {
        let transport = ReqwestTransport::try_new()?;
        Ok(Self::with_transport(config, session, Arc::new(transport)))
    }

    pub fn with_transport(
        config: &ClientConfig,
        session: Session,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            transport,
            session,
            request_timeout: config.request_timeout,
            upload_timeout: config.upload_timeout,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: ClientMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn metrics(&self) -> Option<&ClientMetrics> {
        self.metrics.as_ref()
    }

    pub fn set_token(&self, token: Option<String>) {
        self.session.set_token(token);
    }

    pub fn set_admin_token(&self, token: Option<String>) {
        self.session.set_admin_token(token);
    }

    pub fn url_for(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }

    /// JSON request. Returns the parsed response body verbatim.
    pub async fn request(&self, endpoint: &str, options: RequestOptions) -> Result<Value, ApiError> {
        let RequestOptions {
            method,
            body,
            query,
            timeout,
            auth,
        } = options;

        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        headers.extend(self.auth_header(auth));

        let descriptor = RequestDescriptor {
            method,
            url: self.url_for(endpoint),
            query,
            headers,
            body: body.map(RequestBody::Json).unwrap_or(RequestBody::Empty),
            timeout,
        };

        let response = match timeout {
            Some(limit) => self.fetch_with_timeout(descriptor, limit).await?,
            None => self.dispatch(descriptor).await?,
        };

        decode_json(response)
    }

    /// JSON request bounded by the configured request timeout unless the
    /// options already carry one.
    pub async fn request_with_timeout(
        &self,
        endpoint: &str,
        mut options: RequestOptions,
    ) -> Result<Value, ApiError> {
        if options.timeout.is_none() {
            options.timeout = Some(self.request_timeout);
        }
        self.request(endpoint, options).await
    }

    /// Run `descriptor` and fail with a request timeout once `limit` elapses.
    pub async fn fetch_with_timeout(
        &self,
        descriptor: RequestDescriptor,
        limit: Duration,
    ) -> Result<RawResponse, ApiError> {
        let url = descriptor.url.clone();
        match tokio::time::timeout(limit, self.dispatch(descriptor)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(%url, timeout_ms = limit.as_millis() as u64, "request timed out");
                self.record_failure(&ApiError::request_timeout());
                Err(ApiError::request_timeout())
            }
        }
    }

    /// Multipart POST authenticated with the user token.
    pub async fn upload_file(&self, endpoint: &str, form: FormData) -> Result<Value, ApiError> {
        self.upload(endpoint, Method::POST, form, AuthScope::User).await
    }

    /// Multipart request with an explicit method and auth scope.
    ///
    /// No `Content-Type` is set here; the transport supplies the boundary.
    pub async fn upload(
        &self,
        endpoint: &str,
        method: Method,
        form: FormData,
        auth: AuthScope,
    ) -> Result<Value, ApiError> {
        let descriptor = RequestDescriptor {
            method,
            url: self.url_for(endpoint),
            query: Vec::new(),
            headers: self.auth_header(auth).into_iter().collect(),
            body: RequestBody::Multipart(form),
            timeout: Some(self.upload_timeout),
        };

        if let Some(metrics) = &self.metrics {
            metrics.record_upload();
        }

        let url = descriptor.url.clone();
        let response = match tokio::time::timeout(self.upload_timeout, self.dispatch(descriptor)).await {
            Ok(Ok(response)) => response,
            Ok(Err(ApiError::Network { message })) => {
                let message = if message.starts_with("Network error") {
                    message
                } else {
                    format!("Network error: {message}")
                };
                return Err(ApiError::network(message));
            }
            Ok(Err(other)) => return Err(other),
            Err(_) => {
                tracing::warn!(%url, "upload timed out");
                let error = ApiError::upload_timeout();
                self.record_failure(&error);
                return Err(error);
            }
        };

        decode_json(response)
    }

    /// JSON request authenticated with the admin token.
    pub async fn admin_request(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Value, ApiError> {
        self.request(endpoint, options.scope(AuthScope::Admin)).await
    }

    /// Multipart request authenticated with the admin token.
    pub async fn admin_upload(
        &self,
        endpoint: &str,
        method: Method,
        form: FormData,
    ) -> Result<Value, ApiError> {
        self.upload(endpoint, method, form, AuthScope::Admin).await
    }

    /// JSON request whose envelope `data` is decoded into `T`.
    pub async fn get_data<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        into_data(self.request(endpoint, options).await?)
    }

    /// JSON request that only needs the envelope to report success.
    pub async fn send_ack(&self, endpoint: &str, options: RequestOptions) -> Result<Ack, ApiError> {
        into_ack(self.request(endpoint, options).await?)
    }

    fn auth_header(&self, scope: AuthScope) -> Option<(String, String)> {
        // read at call time so tokens set after construction are honoured
        self.session
            .token_for(scope)
            .map(|token| ("Authorization".to_string(), format!("Bearer {token}")))
    }

    async fn dispatch(&self, descriptor: RequestDescriptor) -> Result<RawResponse, ApiError> {
        let method = descriptor.method.clone();
        let url = descriptor.url.clone();
        let started = Instant::now();

        if let Some(metrics) = &self.metrics {
            metrics.record_request();
        }
        tracing::debug!(%method, %url, "api request");

        let result = self.transport.execute(descriptor).await;
        let elapsed = started.elapsed();
        if let Some(metrics) = &self.metrics {
            metrics.record_latency(elapsed.as_secs_f64());
        }

        match result {
            Ok(response) => {
                tracing::debug!(
                    %method,
                    %url,
                    status = response.status,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "api response"
                );
                if !response.is_success() {
                    if let Some(metrics) = &self.metrics {
                        metrics.record_failure("http");
                    }
                }
                Ok(response)
            }
            Err(TransportError::Connect(reason)) => {
                tracing::error!(%method, %url, %reason, "could not connect to api");
                let error = ApiError::connection_failed();
                self.record_failure(&error);
                Err(error)
            }
            Err(TransportError::Other(reason)) => {
                tracing::error!(%method, %url, %reason, "api transport failure");
                let error = ApiError::network(format!("Network error: {reason}"));
                self.record_failure(&error);
                Err(error)
            }
        }
    }

    fn record_failure(&self, error: &ApiError) {
        if let Some(metrics) = &self.metrics {
            metrics.record_failure(error.kind());
        }
    }
}

/// Turn a raw response into JSON, normalizing non-2xx statuses.
pub fn decode_json(response: RawResponse) -> Result<Value, ApiError> {
    if !response.is_success() {
        return Err(http_error(&response));
    }

    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }

    serde_json::from_slice(&response.body).map_err(|e| ApiError::parse(e.to_string()))
}

fn http_error(response: &RawResponse) -> ApiError {
    let server_message = serde_json::from_slice::<Value>(&response.body)
        .ok()
        .and_then(|body| {
            ["message", "error"]
                .iter()
                .find_map(|field| body.get(*field).and_then(Value::as_str).map(str::to_string))
        })
        .filter(|message| !message.trim().is_empty());

    let message = server_message
        .unwrap_or_else(|| format!("HTTP {}: {}", response.status, response.status_text));

    ApiError::http(response.status, message)
}

/// Decode an envelope and return its `data`, rejecting `success: false`.
pub fn into_data<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    let envelope: Envelope<T> =
        serde_json::from_value(body).map_err(|e| ApiError::schema(e.to_string()))?;

    if !envelope.success {
        return Err(ApiError::rejected(
            envelope.message.unwrap_or_else(|| "Request failed".to_string()),
        ));
    }

    envelope
        .data
        .ok_or_else(|| ApiError::schema("response envelope has no data"))
}

/// Decode an envelope whose payload is irrelevant.
pub fn into_ack(body: Value) -> Result<Ack, ApiError> {
    let envelope: Envelope<Value> =
        serde_json::from_value(body).map_err(|e| ApiError::schema(e.to_string()))?;

    if !envelope.success {
        return Err(ApiError::rejected(
            envelope.message.unwrap_or_else(|| "Request failed".to_string()),
        ));
    }

    Ok(Ack {
        message: envelope.message,
    })
}
