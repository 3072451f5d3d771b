// Copyright 2025 Memophor Labs
// SPDX-License-Identifier: Apache-2.0

//! Endpoint catalog, grouped by resource.
//!
//! Each submodule adds methods to [`ApiClient`](crate::client::ApiClient):
//!
//! - `auth` - OTP, register, login, logout, session
//! - `account` - profile, preferences, identity documents, own listings
//! - `admin` - admin auth and CRUD for users, catalog and listing moderation
//! - `public` - unauthenticated catalog reads, including featured variants
//! - `reviews` - product reviews and voting
//! - `favorites` - favorite toggling and listing

mod account;
mod admin;
mod auth;
mod favorites;
mod public;
mod reviews;

pub use account::DocumentKind;

use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::transport::{FileUpload, FormData};

fn json_body<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::parse(format!("failed to encode body: {e}")))
}

/// Text fields from `fields` followed by every file under `file_field`.
fn form_with_files<T: Serialize>(
    fields: &T,
    file_field: &str,
    files: impl IntoIterator<Item = FileUpload>,
) -> Result<FormData, ApiError> {
    let form = FormData::from_fields(fields)
        .map_err(|e| ApiError::parse(format!("failed to encode form: {e}")))?;
    Ok(form.files(file_field, files))
}
