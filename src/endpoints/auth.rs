use serde_json::json;

use super::json_body;
use crate::client::{into_data, ApiClient, RequestOptions};
use crate::error::ApiError;
use crate::model::{Ack, AuthPayload, LoginRequest, RegisterRequest, User, UserRecord};

impl ApiClient {
    pub async fn send_otp(&self, phone: &str) -> Result<Ack, ApiError> {
        self.send_ack(
            "/auth/send-otp",
            RequestOptions::post(json!({ "phone": phone })).anonymous(),
        )
        .await
    }

    /// Verify an OTP and adopt the returned session.
    pub async fn verify_otp(&self, phone: &str, otp: &str) -> Result<AuthPayload, ApiError> {
        let body = self
            .request(
                "/auth/verify-otp",
                RequestOptions::post(json!({ "phone": phone, "otp": otp })).anonymous(),
            )
            .await?;
        self.adopt_user_session(into_data(body)?)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthPayload, ApiError> {
        let body = self
            .request(
                "/auth/register",
                RequestOptions::post(json_body(request)?).anonymous(),
            )
            .await?;
        self.adopt_user_session(into_data(body)?)
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthPayload, ApiError> {
        let body = self
            .request("/auth/login", RequestOptions::post(json_body(request)?).anonymous())
            .await?;
        self.adopt_user_session(into_data(body)?)
    }

    /// Tell the server to end the session, then forget it locally.
    pub async fn logout(&self) -> Result<Ack, ApiError> {
        let ack = self
            .send_ack("/auth/logout", RequestOptions::post(json!({})))
            .await?;
        self.session().clear_user();
        tracing::info!("user session cleared");
        Ok(ack)
    }

    /// Fetch the user behind the current token and refresh the stored snapshot.
    pub async fn current_session(&self) -> Result<User, ApiError> {
        let record: UserRecord = self.get_data("/auth/me", RequestOptions::get()).await?;
        self.session().store_user(&record.user);
        Ok(record.user)
    }

    fn adopt_user_session(&self, payload: AuthPayload) -> Result<AuthPayload, ApiError> {
        if payload.token.trim().is_empty() {
            return Err(ApiError::schema("auth response carried an empty token"));
        }
        self.set_token(Some(payload.token.clone()));
        self.session().store_user(&payload.user);
        tracing::info!(user_id = %payload.user.id, "user session established");
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::error::ApiError;
    use crate::model::{LoginRequest, User};
    use crate::testing::{client_for, StubTransport};

    fn login_request() -> LoginRequest {
        LoginRequest {
            email: "asha@rentloop.test".to_string(),
            password: "secret".to_string(),
        }
    }

    #[tokio::test]
    async fn login_stores_token_and_user() {
        let transport = StubTransport::new();
        transport.respond(
            "/auth/login",
            200,
            json!({
                "success": true,
                "data": { "token": "jwt-1", "user": { "_id": "u1", "name": "Asha" } }
            }),
        );
        let client = client_for(transport.clone());

        let payload = client.login(&login_request()).await.unwrap();
        assert_eq!(payload.user.id, "u1");
        assert_eq!(client.session().user_token().get().as_deref(), Some("jwt-1"));
        let stored: User = client.session().stored_user().unwrap();
        assert_eq!(stored.name.as_deref(), Some("Asha"));

        let sent = transport.last_call();
        assert!(sent.header("authorization").is_none());
    }

    #[tokio::test]
    async fn failed_login_leaves_session_untouched() {
        let transport = StubTransport::new();
        transport.respond(
            "/auth/login",
            401,
            json!({ "success": false, "message": "Invalid credentials" }),
        );
        let client = client_for(transport);
        client.set_token(Some("previous".to_string()));

        let err = client.login(&login_request()).await.unwrap_err();
        assert_eq!(err, ApiError::http(401, "Invalid credentials"));
        assert_eq!(client.session().user_token().get().as_deref(), Some("previous"));
    }

    #[tokio::test]
    async fn logout_clears_only_on_success() {
        let transport = StubTransport::new();
        transport.respond("/auth/logout", 500, json!({ "message": "boom" }));
        let client = client_for(transport.clone());
        client.set_token(Some("live".to_string()));

        assert!(client.logout().await.is_err());
        assert!(client.session().user_token().is_set());

        transport.respond("/auth/logout", 200, json!({ "success": true, "message": "Logged out" }));
        let ack = client.logout().await.unwrap();
        assert_eq!(ack.message.as_deref(), Some("Logged out"));
        assert!(!client.session().user_token().is_set());
    }
}
