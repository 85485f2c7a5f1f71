use async_trait::async_trait;

use crate::{
    auth::{Credentials, RegisterRequest},
    error::ApiError,
    response::{AuthResponse, LikeStatus},
    tales::{Draft, GeneratedTale, GenerationRequest, Tale, TaleId},
};

mod http;

pub use http::HttpTaleApi;

/// The backend surface the client consumes. Authenticated calls take the
/// bearer token explicitly.
#[async_trait]
pub trait TaleApi: Send + Sync {
    /// `POST /api/tales/generate`
    async fn generate(
        &self,
        token: &str,
        request: &GenerationRequest,
    ) -> Result<GeneratedTale, ApiError>;

    /// `POST /api/tales`. Returns the persisted tale when the body decodes.
    async fn create_tale(&self, token: &str, draft: &Draft) -> Result<Option<Tale>, ApiError>;

    /// `GET /api/tales/user`
    async fn user_tales(&self, token: &str) -> Result<Vec<Tale>, ApiError>;

    /// `PATCH /api/tales/{id}`
    async fn set_visibility(&self, token: &str, id: &TaleId, is_public: bool)
        -> Result<(), ApiError>;

    /// `DELETE /api/tales/{id}`
    async fn delete_tale(&self, token: &str, id: &TaleId) -> Result<(), ApiError>;

    /// `GET /api/tales/public`. The token is optional and only lets the
    /// server fill in `isLiked` for the viewer.
    async fn public_tales(&self, token: Option<&str>) -> Result<Vec<Tale>, ApiError>;

    /// `POST /api/tales/{id}/like`
    async fn like_tale(&self, token: &str, id: &TaleId) -> Result<LikeStatus, ApiError>;

    /// `POST /api/auth/register`
    async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError>;

    /// `POST /api/auth/login`
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError>;
}
