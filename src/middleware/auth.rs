use std::convert::Infallible;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

/// The caller's own upstream session token, read from its `Authorization` header.
///
/// The portal never keeps tokens itself; each upstream request carries the token of
/// the browser that caused it, or none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bearer(Option<String>);

impl Bearer {
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        let token = token.trim();
        Self((!token.is_empty()).then(|| token.to_string()))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(Self::new)
            .unwrap_or_default()
    }

    pub fn token(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Bearer
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
