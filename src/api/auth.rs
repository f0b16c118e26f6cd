use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, StatusCode},
};
use uuid::Uuid;

use crate::model::UserContext;

/// Axum extractor for UserContext from request headers.
///
/// The authenticating gateway in front of this service forwards the
/// caller's identity:
/// - Authorization: bearer token, passed through to the controller
/// - X-User-Guid: caller identifier
/// - X-User-Name: caller display name
/// - X-Roles: comma-separated granted roles
///
/// Requests without identity headers proceed as an anonymous caller;
/// the controller rejects them downstream where it matters.
#[async_trait]
impl<S> FromRequestParts<S> for UserContext
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let headers = &parts.headers;

        let mut user = match header_value(headers, "x-user-guid")
            .and_then(|raw| Uuid::parse_str(&raw).ok())
        {
            Some(guid) => {
                let name =
                    header_value(headers, "x-user-name").unwrap_or_else(|| guid.to_string());
                UserContext::new(guid, name)
            }
            None => UserContext::anonymous(),
        };

        if let Some(roles) = header_value(headers, "x-roles") {
            user.roles = roles
                .split(',')
                .map(str::trim)
                .filter(|role| !role.is_empty())
                .map(String::from)
                .collect();
        }
        user.token = bearer_token(headers).unwrap_or_default();

        Ok(user)
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let raw = header_value(headers, "authorization")?;
    let (scheme, token) = raw.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") {
        Some(token.trim().to_string())
    } else {
        None
    }
}
