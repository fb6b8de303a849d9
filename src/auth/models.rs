use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::{Duration, Utc};
use clinic_agenda::schema::users;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::env;
use uuid::Uuid;
use validator::Validate;

use crate::utils::error::{AppError, internal_error};
use crate::utils::types::Pool;

pub const ACCESS_TOKEN_TTL_MINUTES: i64 = 15;
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 7;

#[derive(Queryable, Selectable, Insertable, Debug, PartialEq, Identifiable)]
#[diesel(table_name=users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub hashed_rt: Option<String>,
}

#[derive(Queryable, Selectable, Debug, PartialEq, Serialize)]
#[diesel(table_name=users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SafeUser {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterUser {
    #[validate(email(message = "E-mail inválido"))]
    pub email: String,
    #[validate(length(min = 8, message = "Senha deve ter pelo menos 8 caracteres"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshPayload {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn issue(user_id: Uuid) -> Result<Self, AppError> {
        Ok(TokenPair {
            access_token: AccessTokenClaims::new(user_id).encode()?,
            refresh_token: RefreshTokenClaims::new(user_id).encode()?,
        })
    }
}

fn access_secret() -> Result<String, AppError> {
    env::var("JWT_SECRET").map_err(internal_error)
}

fn refresh_secret() -> Result<String, AppError> {
    env::var("JWT_REFRESH_SECRET").map_err(internal_error)
}

fn encode_claims<C: Serialize>(claims: &C, secret: &str) -> Result<String, AppError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(internal_error)
}

fn decode_claims<C: serde::de::DeserializeOwned>(token: &str, secret: &str) -> Result<C, AppError> {
    decode::<C>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

impl AccessTokenClaims {
    pub fn new(user_id: Uuid) -> Self {
        let now = Utc::now();
        AccessTokenClaims {
            sub: user_id.to_string(),
            iat: now.timestamp() as usize,
            exp: (now + Duration::minutes(ACCESS_TOKEN_TTL_MINUTES)).timestamp() as usize,
        }
    }

    pub fn encode(&self) -> Result<String, AppError> {
        encode_claims(self, &access_secret()?)
    }

    pub fn decode(token: &str) -> Result<Self, AppError> {
        decode_claims(token, &access_secret()?)
    }

    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::Unauthorized)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

impl RefreshTokenClaims {
    pub fn new(user_id: Uuid) -> Self {
        let now = Utc::now();
        RefreshTokenClaims {
            sub: user_id.to_string(),
            iat: now.timestamp() as usize,
            exp: (now + Duration::days(REFRESH_TOKEN_TTL_DAYS)).timestamp() as usize,
        }
    }

    pub fn encode(&self) -> Result<String, AppError> {
        encode_claims(self, &refresh_secret()?)
    }

    pub fn decode(token: &str) -> Result<Self, AppError> {
        decode_claims(token, &refresh_secret()?)
    }

    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::Unauthorized)
    }
}

impl<S> FromRequestParts<S> for AccessTokenClaims
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::Unauthorized)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(AppError::Unauthorized)?;
        AccessTokenClaims::decode(token)
    }
}

/// The caller's identity plus the clinic every scoped query runs against.
/// Resolved once per request and handed to handlers explicitly.
#[derive(Debug, Clone, Copy)]
pub struct ClinicContext {
    pub user_id: Uuid,
    pub clinic_id: Uuid,
}

impl FromRequestParts<Pool> for ClinicContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, pool: &Pool) -> Result<Self, Self::Rejection> {
        use clinic_agenda::schema::users_to_clinics;

        let claims = AccessTokenClaims::from_request_parts(parts, pool).await?;
        let user_id = claims.user_id()?;

        let mut conn = pool.get().await.map_err(internal_error)?;

        // The most recent membership is the active clinic.
        let clinic_id = users_to_clinics::table
            .filter(users_to_clinics::user_id.eq(&user_id))
            .order(users_to_clinics::created_at.desc())
            .select(users_to_clinics::clinic_id)
            .first::<Uuid>(&mut conn)
            .await
            .optional()
            .map_err(internal_error)?
            .ok_or(AppError::ClinicRequired)?;

        Ok(ClinicContext { user_id, clinic_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_claims_round_trip() {
        let user_id = Uuid::new_v4();
        let claims = AccessTokenClaims::new(user_id);
        let token = encode_claims(&claims, "test-secret").unwrap();
        let decoded: AccessTokenClaims = decode_claims(&token, "test-secret").unwrap();
        assert_eq!(decoded.sub, user_id.to_string());
        assert_eq!(decoded.user_id().unwrap(), user_id);
    }

    #[test]
    fn wrong_secret_is_unauthorized() {
        let claims = AccessTokenClaims::new(Uuid::new_v4());
        let token = encode_claims(&claims, "test-secret").unwrap();
        let result: Result<AccessTokenClaims, _> = decode_claims(&token, "other-secret");
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[test]
    fn malformed_subject_is_unauthorized() {
        let claims = AccessTokenClaims {
            sub: "not-a-uuid".to_owned(),
            iat: 0,
            exp: usize::MAX,
        };
        assert!(matches!(claims.user_id(), Err(AppError::Unauthorized)));
    }

    #[test]
    fn refresh_tokens_outlive_access_tokens() {
        let user_id = Uuid::new_v4();
        let access = AccessTokenClaims::new(user_id);
        let refresh = RefreshTokenClaims::new(user_id);
        assert!(refresh.exp > access.exp);
    }
}
