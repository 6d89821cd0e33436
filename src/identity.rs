//! Identity provider contract reduced to request headers.
//!
//! Real authentication happens upstream (a gateway or the managed auth
//! provider); by the time a request reaches this service the gateway has
//! stamped a stable user id and display name onto it. The extractor reads
//! them once per operation and never subscribes to identity changes.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};

use crate::error::AppError;

/// Header carrying the stable opaque user id.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the display name; optional, falls back to the id.
pub const USER_NAME_HEADER: &str = "x-user-name";

/// A connected client's identity as supplied by the external provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Stable opaque user id; doubles as the player key inside sessions.
    pub id: String,
    /// Human-facing display name.
    pub display_name: String,
}

impl Identity {
    /// Read the identity from request headers, if present.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let id = headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())?;
        let display_name = headers
            .get(USER_NAME_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(id);
        Some(Self {
            id: id.to_owned(),
            display_name: display_name.to_owned(),
        })
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Identity::from_headers(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("authentication required".into()))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn reads_id_and_name() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("u-1"));
        headers.insert(USER_NAME_HEADER, HeaderValue::from_static("Ana"));
        let identity = Identity::from_headers(&headers).unwrap();
        assert_eq!(identity.id, "u-1");
        assert_eq!(identity.display_name, "Ana");
    }

    #[test]
    fn name_falls_back_to_id() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("u-2"));
        let identity = Identity::from_headers(&headers).unwrap();
        assert_eq!(identity.display_name, "u-2");
    }

    #[test]
    fn missing_or_blank_id_is_rejected() {
        assert!(Identity::from_headers(&HeaderMap::new()).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("   "));
        assert!(Identity::from_headers(&headers).is_none());
    }
}
