use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};

/// Set by the authentication gate in front of this service.
pub const ACTOR_HEADER: &str = "x-user-id";

/// The authenticated user making the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: String,
}

#[derive(Debug)]
pub enum AuthError {
    MissingHeader,
    Malformed,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = match self {
            AuthError::MissingHeader => "Missing user id",
            AuthError::Malformed => "Malformed user id",
        };
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(ACTOR_HEADER)
            .ok_or(AuthError::MissingHeader)?;

        let user_id = value
            .to_str()
            .map_err(|_| AuthError::Malformed)?
            .trim();

        if user_id.is_empty() {
            return Err(AuthError::MissingHeader);
        }

        Ok(Actor {
            user_id: user_id.to_string(),
        })
    }
}
