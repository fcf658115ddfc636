//! Acting-user identity extraction.
//!
//! The identity provider is an external collaborator: upstream auth resolves
//! the user and forwards `{id, name}` in headers. This extractor only reads
//! that hand-off; request bodies still carry the user ids their contracts
//! name (userA/userB payloads, resolvedBy).

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};

use crate::AppState;

const USER_ID_HEADER: &str = "x-user-id";
const USER_NAME_HEADER: &str = "x-user-name";

/// Acting user forwarded by the identity provider.
#[derive(Debug, Clone)]
pub struct Identity {
    #[allow(dead_code)]
    pub user_id: String,
    #[allow(dead_code)]
    pub user_name: String,
}

impl FromRequestParts<AppState> for Identity {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
        };

        match header(USER_ID_HEADER) {
            Some(user_id) => Ok(Identity {
                user_id: user_id.to_string(),
                user_name: header(USER_NAME_HEADER).unwrap_or(user_id).to_string(),
            }),
            None if state.config.require_identity => {
                Err((StatusCode::UNAUTHORIZED, "Missing identity headers"))
            }
            None => Ok(Identity {
                user_id: "anonymous".to_string(),
                user_name: "anonymous".to_string(),
            }),
        }
    }
}
