use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use uuid::Uuid;

use super::TaleApi;
use crate::{
    auth::{Credentials, RegisterRequest},
    config::settings::Settings,
    error::ApiError,
    response::{self, AuthResponse, ErrorBody, LikeStatus},
    tales::{Draft, GeneratedTale, GenerationRequest, Tale, TaleId},
};

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// reqwest-backed gateway to the TaleWeaver API.
#[derive(Clone)]
pub struct HttpTaleApi {
    base_url: String,
    client: Client,
}

impl HttpTaleApi {
    pub fn new(settings: &Settings) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()?;

        Ok(Self {
            base_url: settings.api_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
    }

    async fn send(&self, request: RequestBuilder, token: Option<&str>) -> Result<Response, ApiError> {
        let request_id = Uuid::new_v4();
        let mut request = request.header(REQUEST_ID_HEADER, request_id.to_string());
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!(%request_id, "request failed: {:?}", e);
            ApiError::from(e)
        })?;

        let status = response.status();
        tracing::debug!(%request_id, url = %response.url(), %status, "api response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        let message = ErrorBody::message_from(&body);
        tracing::warn!(%request_id, %status, message = ?message, "api rejected request");

        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let body = response.bytes().await?;
        response::decode(&body)
    }
}

#[async_trait]
impl TaleApi for HttpTaleApi {
    async fn generate(
        &self,
        token: &str,
        request: &GenerationRequest,
    ) -> Result<GeneratedTale, ApiError> {
        let response = self
            .send(
                self.request(Method::POST, "/api/tales/generate").json(request),
                Some(token),
            )
            .await?;
        Self::json(response).await
    }

    async fn create_tale(&self, token: &str, draft: &Draft) -> Result<Option<Tale>, ApiError> {
        let response = self
            .send(self.request(Method::POST, "/api/tales").json(draft), Some(token))
            .await?;

        // The save already happened; an unexpected body must not look like a failure.
        let body = response.bytes().await?;
        Ok(response::decode(&body).ok())
    }

    async fn user_tales(&self, token: &str) -> Result<Vec<Tale>, ApiError> {
        let response = self
            .send(self.request(Method::GET, "/api/tales/user"), Some(token))
            .await?;
        Self::json(response).await
    }

    async fn set_visibility(
        &self,
        token: &str,
        id: &TaleId,
        is_public: bool,
    ) -> Result<(), ApiError> {
        self.send(
            self.request(Method::PATCH, &format!("/api/tales/{id}"))
                .json(&json!({ "isPublic": is_public })),
            Some(token),
        )
        .await?;
        Ok(())
    }

    async fn delete_tale(&self, token: &str, id: &TaleId) -> Result<(), ApiError> {
        self.send(
            self.request(Method::DELETE, &format!("/api/tales/{id}")),
            Some(token),
        )
        .await?;
        Ok(())
    }

    async fn public_tales(&self, token: Option<&str>) -> Result<Vec<Tale>, ApiError> {
        let response = self
            .send(self.request(Method::GET, "/api/tales/public"), token)
            .await?;
        Self::json(response).await
    }

    async fn like_tale(&self, token: &str, id: &TaleId) -> Result<LikeStatus, ApiError> {
        let response = self
            .send(
                self.request(Method::POST, &format!("/api/tales/{id}/like"))
                    .json(&json!({})),
                Some(token),
            )
            .await?;
        Self::json(response).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        self.send(
            self.request(Method::POST, "/api/auth/register").json(request),
            None,
        )
        .await?;
        Ok(())
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        let response = self
            .send(
                self.request(Method::POST, "/api/auth/login").json(credentials),
                None,
            )
            .await?;
        Self::json(response).await
    }
}
