//! Scripted transport shared by unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::client::ApiClient;
use crate::config::ClientConfig;
use crate::session::Session;
use crate::transport::{RawResponse, RequestDescriptor, Transport, TransportError};

pub const TEST_BASE_URL: &str = "http://api.test/api";

#[derive(Clone)]
pub struct StubRoute {
    pub status: u16,
    pub body: Value,
    pub delay: Duration,
}

/// Answers by endpoint path and records every request it sees.
#[derive(Default)]
pub struct StubTransport {
    routes: Mutex<HashMap<String, StubRoute>>,
    calls: Mutex<Vec<RequestDescriptor>>,
}

impl StubTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, path: &str, status: u16, body: Value) {
        self.respond_after(path, status, body, Duration::ZERO);
    }

    pub fn respond_after(&self, path: &str, status: u16, body: Value, delay: Duration) {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), StubRoute { status, body, delay });
    }

    pub fn calls(&self) -> Vec<RequestDescriptor> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        let url = format!("{TEST_BASE_URL}{path}");
        self.calls.lock().unwrap().iter().filter(|c| c.url == url).count()
    }

    pub fn last_call(&self) -> RequestDescriptor {
        self.calls.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn execute(&self, request: RequestDescriptor) -> Result<RawResponse, TransportError> {
        let path = request
            .url
            .strip_prefix(TEST_BASE_URL)
            .unwrap_or(&request.url)
            .to_string();
        let route = self.routes.lock().unwrap().get(&path).cloned();
        self.calls.lock().unwrap().push(request);

        let route = route.unwrap_or(StubRoute {
            status: 404,
            body: json!({ "success": false, "message": format!("no route for {path}") }),
            delay: Duration::ZERO,
        });

        if !route.delay.is_zero() {
            tokio::time::sleep(route.delay).await;
        }

        Ok(RawResponse::json(route.status, &route.body))
    }
}

pub fn client_for(transport: Arc<StubTransport>) -> ApiClient {
    let config = ClientConfig::default().with_base_url(TEST_BASE_URL);
    ApiClient::with_transport(&config, Session::in_memory(), transport)
}
