use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{Error, Result};
use crate::AppState;

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Numeric user id assigned by the identity provider.
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
}

/// Identity injected into request extensions by [`require_bearer_auth`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub role: Option<String>,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role
            .as_deref()
            .map(|r| r.eq_ignore_ascii_case(ADMIN_ROLE))
            .unwrap_or(false)
    }

    /// Resolves the `user_id` query parameter and refuses anything but the
    /// caller's own id. There is no role-based bypass.
    pub fn require_self(&self, user_id: Option<&str>) -> Result<i64> {
        let raw = user_id
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::BadRequest("user_id is required".into()))?;
        let requested: i64 = raw
            .parse()
            .map_err(|_| Error::BadRequest(format!("user_id must be an integer, got '{}'", raw)))?;
        if requested != self.id {
            tracing::warn!(
                requester = self.id,
                requested,
                "rejected cross-user read"
            );
            return Err(Error::Forbidden(
                "You may only access your own practice data".into(),
            ));
        }
        Ok(requested)
    }
}

fn unauthorized(code: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": code }))).into_response()
}

fn authenticate(headers: &HeaderMap, secret: &str) -> std::result::Result<AuthUser, Response> {
    let Some(auth_header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Err(unauthorized("missing_authorization"));
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return Err(unauthorized("bad_authorization"));
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err(unauthorized("unsupported_scheme"));
    };

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| unauthorized("invalid_token"))?;

    let Ok(id) = data.claims.sub.parse::<i64>() else {
        return Err(unauthorized("invalid_subject"));
    };

    Ok(AuthUser {
        id,
        role: data.claims.role,
    })
}

pub async fn require_bearer_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    match authenticate(req.headers(), &state.config.jwt_secret) {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(resp) => resp,
    }
}

pub async fn require_admin(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    match authenticate(req.headers(), &state.config.jwt_secret) {
        Ok(user) if user.is_admin() => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Ok(_) => (StatusCode::FORBIDDEN, Json(json!({ "error": "forbidden" }))).into_response(),
        Err(resp) => resp,
    }
}

/// Guards stored recordings: the caller must be authenticated and the file
/// name must carry the caller's `user{id}_` prefix. No role bypass, same as
/// history reads.
pub async fn require_media_owner(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let user = match authenticate(req.headers(), &state.config.jwt_secret) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let prefix = format!("user{}_", user.id);
    let owned = req
        .uri()
        .path()
        .rsplit('/')
        .next()
        .map(|name| name.starts_with(&prefix))
        .unwrap_or(false);
    if !owned {
        tracing::warn!(requester = user.id, path = %req.uri().path(), "rejected foreign media read");
        return (StatusCode::FORBIDDEN, Json(json!({ "error": "forbidden" }))).into_response();
    }
    next.run(req).await
}

/// Signs a token the way the identity provider does. Used by tooling and
/// tests; the service itself only verifies.
pub fn issue_token(secret: &str, user_id: i64, role: Option<&str>, ttl_secs: i64) -> Result<String> {
    let exp = (chrono::Utc::now().timestamp() + ttl_secs).max(0) as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp,
        role: role.map(str::to_string),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("Failed to sign token: {}", e)))
}
