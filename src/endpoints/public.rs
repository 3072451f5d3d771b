use crate::client::{into_data, ApiClient, RequestOptions};
use crate::error::ApiError;
use crate::model::{
    Banner, BannerList, Category, CategoryList, CategoryRecord, ListQuery, Product, ProductList,
    ProductRecord, RentalRequest, RentalRequestList, RentalRequestRecord,
};

// Storefront reads. None of these send a token.
impl ApiClient {
    pub async fn products(&self, query: &ListQuery) -> Result<ProductList, ApiError> {
        self.get_data("/products", RequestOptions::get().query(query).anonymous())
            .await
    }

    /// Featured products, bounded by the request timeout.
    pub async fn featured_products(&self, limit: u32) -> Result<Vec<Product>, ApiError> {
        let body = self
            .request_with_timeout(
                "/products/featured",
                RequestOptions::get().param("limit", limit).anonymous(),
            )
            .await?;
        let list: ProductList = into_data(body)?;
        Ok(list.products)
    }

    pub async fn product(&self, id: &str) -> Result<Product, ApiError> {
        let record: ProductRecord = self
            .get_data(&format!("/products/{id}"), RequestOptions::get().anonymous())
            .await?;
        Ok(record.product)
    }

    pub async fn categories(&self, query: &ListQuery) -> Result<CategoryList, ApiError> {
        self.get_data("/categories", RequestOptions::get().query(query).anonymous())
            .await
    }

    pub async fn category(&self, id: &str) -> Result<Category, ApiError> {
        let record: CategoryRecord = self
            .get_data(&format!("/categories/{id}"), RequestOptions::get().anonymous())
            .await?;
        Ok(record.category)
    }

    /// Active banners in display order.
    pub async fn banners(&self, query: &ListQuery) -> Result<Vec<Banner>, ApiError> {
        let body = self
            .request_with_timeout("/banners", RequestOptions::get().query(query).anonymous())
            .await?;
        let mut list: BannerList = into_data(body)?;
        list.banners.sort_by_key(|banner| banner.order.unwrap_or(i32::MAX));
        Ok(list.banners)
    }

    /// Approved listings only; moderation queues are admin-side.
    pub async fn rental_requests(&self, query: &ListQuery) -> Result<RentalRequestList, ApiError> {
        self.get_data("/rental-requests", RequestOptions::get().query(query).anonymous())
            .await
    }

    pub async fn featured_rental_requests(&self, limit: u32) -> Result<Vec<RentalRequest>, ApiError> {
        let body = self
            .request_with_timeout(
                "/rental-requests/featured",
                RequestOptions::get().param("limit", limit).anonymous(),
            )
            .await?;
        let list: RentalRequestList = into_data(body)?;
        Ok(list.rental_requests)
    }

    pub async fn rental_request(&self, id: &str) -> Result<RentalRequest, ApiError> {
        let record: RentalRequestRecord = self
            .get_data(&format!("/rental-requests/{id}"), RequestOptions::get().anonymous())
            .await?;
        Ok(record.rental_request)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::error::ApiError;
    use crate::model::ListQuery;
    use crate::testing::{client_for, StubTransport};

    #[tokio::test]
    async fn featured_products_send_limit_without_token() {
        let transport = StubTransport::new();
        transport.respond(
            "/products/featured",
            200,
            json!({ "success": true, "data": { "products": [
                { "_id": "p1", "name": "Tent", "isFeatured": true },
                { "_id": "p2", "name": "Kayak", "isFeatured": true }
            ] } }),
        );
        let client = client_for(transport.clone());
        client.set_token(Some("user".to_string()));

        let products = client.featured_products(12).await.unwrap();
        assert_eq!(products.len(), 2);

        let call = transport.last_call();
        assert!(call.header("authorization").is_none());
        assert_eq!(call.query, vec![("limit".to_string(), "12".to_string())]);
        assert!(call.timeout.is_some());
    }

    #[tokio::test]
    async fn banners_come_back_in_display_order() {
        let transport = StubTransport::new();
        transport.respond(
            "/banners",
            200,
            json!({ "success": true, "data": { "banners": [
                { "_id": "late", "order": 3 },
                { "_id": "unordered" },
                { "_id": "first", "order": 1 }
            ] } }),
        );

        let banners = client_for(transport)
            .banners(&ListQuery::default())
            .await
            .unwrap();
        let ids: Vec<_> = banners.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "late", "unordered"]);
    }

    #[tokio::test]
    async fn banner_filters_travel_as_query_pairs() {
        let transport = StubTransport::new();
        transport.respond("/banners", 200, json!({ "success": true, "data": { "banners": [] } }));

        let query = ListQuery::page(2, 5).with_status("active");
        client_for(transport.clone()).banners(&query).await.unwrap();

        let call = transport.last_call();
        assert_eq!(call.query, query.to_pairs());
        assert!(call.query.contains(&("page".to_string(), "2".to_string())));
        assert!(call.query.contains(&("limit".to_string(), "5".to_string())));
        assert!(call.query.contains(&("status".to_string(), "active".to_string())));
    }

    #[tokio::test]
    async fn malformed_listing_payload_is_schema_error() {
        let transport = StubTransport::new();
        transport.respond(
            "/rental-requests/featured",
            200,
            json!({ "success": true, "data": { "rentalRequests": [{ "_id": "r1" }] } }),
        );

        let err = client_for(transport)
            .featured_rental_requests(4)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Schema { .. }));
    }
}
