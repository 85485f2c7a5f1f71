use serde::{Deserialize, Serialize};
use validator::Validate;

pub mod handler;
pub mod jwt;
pub mod session;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// The signed-in user together with the bearer token the API accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user: User,
    pub token: String,
}

impl Identity {
    pub fn new(user: User, token: impl Into<String>) -> Self {
        Self {
            user,
            token: token.into(),
        }
    }

    /// Rebuilds an identity from a saved token, reading the profile from its
    /// claims when the token is a JWT.
    pub fn from_token(token: impl Into<String>) -> Self {
        let token = token.into();
        let user = jwt::inspect(&token)
            .map(|claims| User {
                id: claims.sub.unwrap_or_default(),
                name: claims.name.unwrap_or_default(),
                email: claims.email.unwrap_or_default(),
            })
            .unwrap_or_default();
        Self { user, token }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[serde(skip_serializing, default)]
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Credentials {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

impl From<&RegisterRequest> for Credentials {
    fn from(request: &RegisterRequest) -> Self {
        Credentials {
            email: request.email.clone(),
            password: request.password.clone(),
        }
    }
}
