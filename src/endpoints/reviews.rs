use serde_json::json;

use super::json_body;
use crate::client::{ApiClient, RequestOptions};
use crate::error::ApiError;
use crate::model::{Ack, ListQuery, Review, ReviewInput, ReviewList, ReviewRecord};

impl ApiClient {
    pub async fn product_reviews(
        &self,
        product_id: &str,
        query: &ListQuery,
    ) -> Result<ReviewList, ApiError> {
        self.get_data(
            &format!("/reviews/product/{product_id}"),
            RequestOptions::get().query(query).anonymous(),
        )
        .await
    }

    pub async fn create_review(&self, input: &ReviewInput) -> Result<Review, ApiError> {
        if !(1..=5).contains(&input.rating) {
            return Err(ApiError::rejected("Rating must be between 1 and 5"));
        }
        let record: ReviewRecord = self
            .get_data("/reviews", RequestOptions::post(json_body(input)?))
            .await?;
        Ok(record.review)
    }

    pub async fn update_review(
        &self,
        id: &str,
        rating: u8,
        comment: Option<&str>,
    ) -> Result<Review, ApiError> {
        if !(1..=5).contains(&rating) {
            return Err(ApiError::rejected("Rating must be between 1 and 5"));
        }
        let record: ReviewRecord = self
            .get_data(
                &format!("/reviews/{id}"),
                RequestOptions::put(json!({ "rating": rating, "comment": comment })),
            )
            .await?;
        Ok(record.review)
    }

    pub async fn delete_review(&self, id: &str) -> Result<Ack, ApiError> {
        self.send_ack(&format!("/reviews/{id}"), RequestOptions::delete())
            .await
    }

    /// Mark a review helpful or not; returns the updated vote counts.
    pub async fn vote_review(&self, id: &str, helpful: bool) -> Result<Review, ApiError> {
        let record: ReviewRecord = self
            .get_data(
                &format!("/reviews/{id}/vote"),
                RequestOptions::post(json!({ "helpful": helpful })),
            )
            .await?;
        Ok(record.review)
    }
}
