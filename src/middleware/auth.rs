use crate::error::Result;
use crate::identity::{non_blank_user_id, IdentityProvider};
use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;

const ADMIN_ROLES: [&str; 2] = ["admin", "hr"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        let role = self.role.as_deref().unwrap_or_default();
        ADMIN_ROLES.iter().any(|r| r.eq_ignore_ascii_case(role))
    }
}

/// The authenticated caller is the respondent.
impl IdentityProvider for Claims {
    fn current_user_id(&self) -> Result<String> {
        non_blank_user_id(&self.sub)
    }
}

fn reject(status: StatusCode, code: &str) -> Response {
    (status, Json(json!({ "error": code }))).into_response()
}

pub async fn require_bearer_auth(mut req: Request, next: Next) -> Response {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return reject(StatusCode::UNAUTHORIZED, "missing_authorization");
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return reject(StatusCode::UNAUTHORIZED, "bad_authorization");
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return reject(StatusCode::UNAUTHORIZED, "unsupported_scheme");
    };

    let config = crate::config::get_config();
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => {
            req.extensions_mut().insert(data.claims);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "rejected bearer token");
            reject(StatusCode::UNAUTHORIZED, "invalid_token")
        }
    }
}

/// Must run inside `require_bearer_auth`.
pub async fn require_admin(req: Request, next: Next) -> Response {
    match req.extensions().get::<Claims>() {
        Some(claims) if claims.is_admin() => next.run(req).await,
        Some(claims) => {
            tracing::warn!(user_id = %claims.sub, role = ?claims.role, "admin route refused");
            reject(StatusCode::FORBIDDEN, "forbidden")
        }
        None => reject(StatusCode::UNAUTHORIZED, "missing_authorization"),
    }
}
