use serde_json::json;

use crate::client::{ApiClient, RequestOptions};
use crate::error::ApiError;
use crate::model::{FavoriteList, FavoriteToggle, ListQuery};

impl ApiClient {
    /// Flip a product in or out of the user's favorites.
    pub async fn toggle_favorite(&self, product_id: &str) -> Result<FavoriteToggle, ApiError> {
        self.get_data(
            &format!("/favorites/{product_id}/toggle"),
            RequestOptions::post(json!({})),
        )
        .await
    }

    pub async fn favorites(&self, query: &ListQuery) -> Result<FavoriteList, ApiError> {
        self.get_data("/favorites", RequestOptions::get().query(query))
            .await
    }
}
