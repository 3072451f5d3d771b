// Copyright 2025 Memophor Labs
// SPDX-License-Identifier: Apache-2.0

//! Rentloop client.
//!
//! Typed gateway to the rental marketplace REST API ([`ApiClient`]) plus a
//! cached, parallel loader for landing-page data ([`HeroLoader`]).

pub mod cache;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod loader;
pub mod metrics;
pub mod model;
pub mod session;
pub mod telemetry;
pub mod transport;

#[cfg(test)]
mod testing;

pub use cache::{CachedValue, TtlCache};
pub use client::{ApiClient, RequestOptions};
pub use config::{ClientConfig, RuntimeMode};
pub use endpoints::DocumentKind;
pub use error::{ApiError, TimeoutKind};
pub use loader::{HeroLoader, HeroPayload, HeroResource, HeroSnapshot, LoadSummary};
pub use metrics::ClientMetrics;
pub use session::{AuthScope, FileTokenStore, MemoryTokenStore, Session, TokenCell, TokenStore};
pub use transport::{FileUpload, FormData, ReqwestTransport, Transport};
