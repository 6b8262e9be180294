//! Session extraction from `Authorization: Bearer <jwt>`.
//!
//! Tokens are issued elsewhere; this service only verifies HS256 signatures
//! with `JWT_SECRET` and reads the claims.

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use store::{Error, model::Role};

use crate::{config::AppState, error::ApiError};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id as hex
    pub sub: String,
    pub role: Role,
    /// Session id, scopes identity verification
    pub sid: String,
    pub exp: i64,
}

pub fn encode_token(claims: &Claims, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// Caller identity taken from a verified session token.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: ObjectId,
    pub role: Role,
    pub session_id: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn ensure_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(Error::Auth("admin role required".to_string()).into())
        }
    }

    pub fn ensure_self(&self, user_id: ObjectId) -> Result<(), ApiError> {
        if self.user_id == user_id {
            Ok(())
        } else {
            Err(Error::Auth(format!("cannot act on behalf of user {user_id}")).into())
        }
    }

    pub fn ensure_self_or_admin(&self, user_id: ObjectId) -> Result<(), ApiError> {
        if self.is_admin() {
            return Ok(());
        }
        self.ensure_self(user_id)
    }

    fn from_token(token: &str, secret: &str) -> Result<Self, ApiError> {
        let claims = decode_token(token, secret)
            .map_err(|_| Error::Auth("invalid or expired token".to_string()))?;
        let user_id = ObjectId::parse_str(&claims.sub)
            .map_err(|_| Error::Auth("token subject is not a user id".to_string()))?;

        Ok(AuthUser {
            user_id,
            role: claims.role,
            session_id: claims.sid,
        })
    }
}

fn bearer(parts: &Parts) -> Option<Result<&str, ApiError>> {
    let header = parts.headers.get(AUTHORIZATION)?;
    let token: Result<&str, ApiError> = header
        .to_str()
        .ok()
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| {
            Error::Auth("expected Authorization: Bearer <token>".to_string()).into()
        });
    Some(token)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer(parts)
            .ok_or_else(|| Error::Auth("missing Authorization header".to_string()))??;
        AuthUser::from_token(token, &state.env_vars.jwt_secret)
    }
}

/// Anonymous when the header is absent. A present but invalid token is still rejected.
impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        match bearer(parts) {
            None => Ok(None),
            Some(token) => AuthUser::from_token(token?, &state.env_vars.jwt_secret).map(Some),
        }
    }
}
