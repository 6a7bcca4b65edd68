use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::{
    extract::CookieJar,
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use std::convert::Infallible;

/// Cookie carrying the signed-in user's token.
pub const AUTH_COOKIE: &str = "auth-token";

/// Token of the caller, read from the `auth-token` cookie or else from an
/// `Authorization: Bearer` header.
#[derive(Debug, Clone, Default)]
pub struct BearerToken(pub Option<String>);

impl BearerToken {
    pub fn header_value(&self) -> Option<String> {
        self.0.as_ref().map(|token| format!("Bearer {}", token))
    }
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state).await?;
        if let Some(cookie) = jar.get(AUTH_COOKIE).filter(|c| !c.value().is_empty()) {
            return Ok(Self(Some(cookie.value().to_string())));
        }

        let header = TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .ok();
        Ok(Self(header.map(|TypedHeader(Authorization(bearer))| bearer.token().to_string())))
    }
}

/// The inbound `Authorization` header, untouched.
#[derive(Debug, Clone, Default)]
pub struct ForwardedAuthorization(pub Option<String>);

impl<S> FromRequestParts<S> for ForwardedAuthorization
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Ok(Self(value))
    }
}
