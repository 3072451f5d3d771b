// Copyright 2025 Memophor Labs
// SPDX-License-Identifier: Apache-2.0

//! Admin-scoped endpoints.
//!
//! Every call here authenticates with the admin token, read from the session
//! at call time. Catalog mutations are multipart so images travel with the
//! record: products and categories use repeated `images`, banners a single
//! `image`.

use reqwest::Method;
use serde_json::json;

use super::{form_with_files, json_body};
use crate::client::{into_ack, into_data, ApiClient, RequestOptions};
use crate::error::ApiError;
use crate::model::{
    Ack, AdminAuthPayload, AdminRecord, AdminUser, Banner, BannerInput, BannerList, BannerRecord,
    Category, CategoryInput, CategoryList, CategoryRecord, DashboardStats, ListQuery, Product,
    ProductInput, ProductList, ProductRecord, RentalRequest, RentalRequestList,
    RentalRequestRecord, RentalStatus, RentalStatusUpdate, User, UserList, UserRecord,
};
use crate::transport::FileUpload;

impl ApiClient {
    pub async fn admin_login(&self, email: &str, password: &str) -> Result<AdminAuthPayload, ApiError> {
        let body = self
            .request(
                "/admin/login",
                RequestOptions::post(json!({ "email": email, "password": password })).anonymous(),
            )
            .await?;
        let payload: AdminAuthPayload = into_data(body)?;
        if payload.token.trim().is_empty() {
            return Err(ApiError::schema("admin auth response carried an empty token"));
        }

        self.set_admin_token(Some(payload.token.clone()));
        self.session().store_admin_user(&payload.admin);
        tracing::info!(admin = %payload.admin.email, "admin session established");
        Ok(payload)
    }

    pub async fn admin_logout(&self) -> Result<Ack, ApiError> {
        let body = self
            .admin_request("/admin/logout", RequestOptions::post(json!({})))
            .await?;
        let ack = into_ack(body)?;
        self.session().clear_admin();
        tracing::info!("admin session cleared");
        Ok(ack)
    }

    pub async fn admin_profile(&self) -> Result<AdminUser, ApiError> {
        let record: AdminRecord = into_data(
            self.admin_request("/admin/profile", RequestOptions::get())
                .await?,
        )?;
        Ok(record.admin)
    }

    pub async fn admin_stats(&self) -> Result<DashboardStats, ApiError> {
        into_data(self.admin_request("/admin/stats", RequestOptions::get()).await?)
    }

    // Users

    pub async fn admin_users(&self, query: &ListQuery) -> Result<UserList, ApiError> {
        into_data(
            self.admin_request("/admin/users", RequestOptions::get().query(query))
                .await?,
        )
    }

    pub async fn admin_user(&self, id: &str) -> Result<User, ApiError> {
        let record: UserRecord = into_data(
            self.admin_request(&format!("/admin/users/{id}"), RequestOptions::get())
                .await?,
        )?;
        Ok(record.user)
    }

    pub async fn admin_set_user_active(&self, id: &str, active: bool) -> Result<User, ApiError> {
        let record: UserRecord = into_data(
            self.admin_request(
                &format!("/admin/users/{id}/status"),
                RequestOptions::patch(json!({ "isActive": active })),
            )
            .await?,
        )?;
        Ok(record.user)
    }

    pub async fn admin_delete_user(&self, id: &str) -> Result<Ack, ApiError> {
        self.admin_delete(&format!("/admin/users/{id}")).await
    }

    // Products

    pub async fn admin_products(&self, query: &ListQuery) -> Result<ProductList, ApiError> {
        into_data(
            self.admin_request("/admin/products", RequestOptions::get().query(query))
                .await?,
        )
    }

    pub async fn admin_create_product(
        &self,
        input: &ProductInput,
        images: Vec<FileUpload>,
    ) -> Result<Product, ApiError> {
        let form = form_with_files(input, "images", images)?;
        let record: ProductRecord =
            into_data(self.admin_upload("/admin/products", Method::POST, form).await?)?;
        Ok(record.product)
    }

    pub async fn admin_update_product(
        &self,
        id: &str,
        input: &ProductInput,
        images: Vec<FileUpload>,
    ) -> Result<Product, ApiError> {
        let form = form_with_files(input, "images", images)?;
        let record: ProductRecord = into_data(
            self.admin_upload(&format!("/admin/products/{id}"), Method::PUT, form)
                .await?,
        )?;
        Ok(record.product)
    }

    pub async fn admin_delete_product(&self, id: &str) -> Result<Ack, ApiError> {
        self.admin_delete(&format!("/admin/products/{id}")).await
    }

    // Categories

    pub async fn admin_categories(&self, query: &ListQuery) -> Result<CategoryList, ApiError> {
        into_data(
            self.admin_request("/admin/categories", RequestOptions::get().query(query))
                .await?,
        )
    }

    pub async fn admin_create_category(
        &self,
        input: &CategoryInput,
        images: Vec<FileUpload>,
    ) -> Result<Category, ApiError> {
        let form = form_with_files(input, "images", images)?;
        let record: CategoryRecord =
            into_data(self.admin_upload("/admin/categories", Method::POST, form).await?)?;
        Ok(record.category)
    }

    pub async fn admin_update_category(
        &self,
        id: &str,
        input: &CategoryInput,
        images: Vec<FileUpload>,
    ) -> Result<Category, ApiError> {
        let form = form_with_files(input, "images", images)?;
        let record: CategoryRecord = into_data(
            self.admin_upload(&format!("/admin/categories/{id}"), Method::PUT, form)
                .await?,
        )?;
        Ok(record.category)
    }

    pub async fn admin_delete_category(&self, id: &str) -> Result<Ack, ApiError> {
        self.admin_delete(&format!("/admin/categories/{id}")).await
    }

    // Banners

    pub async fn admin_banners(&self, query: &ListQuery) -> Result<BannerList, ApiError> {
        into_data(
            self.admin_request("/admin/banners", RequestOptions::get().query(query))
                .await?,
        )
    }

    pub async fn admin_create_banner(
        &self,
        input: &BannerInput,
        image: FileUpload,
    ) -> Result<Banner, ApiError> {
        let form = form_with_files(input, "image", Some(image))?;
        let record: BannerRecord =
            into_data(self.admin_upload("/admin/banners", Method::POST, form).await?)?;
        Ok(record.banner)
    }

    /// Update a banner; the image is only replaced when one is given.
    pub async fn admin_update_banner(
        &self,
        id: &str,
        input: &BannerInput,
        image: Option<FileUpload>,
    ) -> Result<Banner, ApiError> {
        let form = form_with_files(input, "image", image)?;
        let record: BannerRecord = into_data(
            self.admin_upload(&format!("/admin/banners/{id}"), Method::PUT, form)
                .await?,
        )?;
        Ok(record.banner)
    }

    pub async fn admin_delete_banner(&self, id: &str) -> Result<Ack, ApiError> {
        self.admin_delete(&format!("/admin/banners/{id}")).await
    }

    // Rental request moderation

    pub async fn admin_rental_requests(&self, query: &ListQuery) -> Result<RentalRequestList, ApiError> {
        into_data(
            self.admin_request("/admin/rental-requests", RequestOptions::get().query(query))
                .await?,
        )
    }

    pub async fn admin_rental_request(&self, id: &str) -> Result<RentalRequest, ApiError> {
        let record: RentalRequestRecord = into_data(
            self.admin_request(&format!("/admin/rental-requests/{id}"), RequestOptions::get())
                .await?,
        )?;
        Ok(record.rental_request)
    }

    /// Move a listing to a new moderation state. The server owns the
    /// transition rules; nothing is enforced here.
    pub async fn admin_update_rental_status(
        &self,
        id: &str,
        update: &RentalStatusUpdate,
    ) -> Result<RentalRequest, ApiError> {
        let record: RentalRequestRecord = into_data(
            self.admin_request(
                &format!("/admin/rental-requests/{id}/status"),
                RequestOptions::patch(json_body(update)?),
            )
            .await?,
        )?;
        tracing::info!(
            listing_id = %id,
            status = update.status.as_str(),
            "rental request moderated"
        );
        Ok(record.rental_request)
    }

    pub async fn admin_approve_rental(&self, id: &str) -> Result<RentalRequest, ApiError> {
        self.admin_update_rental_status(
            id,
            &RentalStatusUpdate {
                status: RentalStatus::Approved,
                rejection_reason: None,
            },
        )
        .await
    }

    pub async fn admin_reject_rental(&self, id: &str, reason: &str) -> Result<RentalRequest, ApiError> {
        self.admin_update_rental_status(
            id,
            &RentalStatusUpdate {
                status: RentalStatus::Rejected,
                rejection_reason: Some(reason.to_string()),
            },
        )
        .await
    }

    pub async fn admin_delete_rental_request(&self, id: &str) -> Result<Ack, ApiError> {
        self.admin_delete(&format!("/admin/rental-requests/{id}")).await
    }

    async fn admin_delete(&self, endpoint: &str) -> Result<Ack, ApiError> {
        into_ack(self.admin_request(endpoint, RequestOptions::delete()).await?)
    }
}
