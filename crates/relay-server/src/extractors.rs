//! Request extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::convert::Infallible;

/// Header carrying the caller-supplied request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Extracts the request id from `x-request-id`, generating one when the
/// caller did not supply it.
#[derive(Debug, Clone)]
pub struct RequestId(pub relay_core::RequestId);

#[axum::async_trait]
impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map_or_else(relay_core::RequestId::generate, relay_core::RequestId::new);

        Ok(Self(id))
    }
}
