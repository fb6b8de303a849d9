use super::models::{
    AccessTokenClaims, Credentials, RefreshPayload, RefreshTokenClaims, RegisterUser, SafeUser,
    TokenPair, User,
};
use crate::utils::error::AppError;
use crate::utils::extract::ValidatedJson;
use crate::utils::internal_error;
use crate::utils::types::{JsonResult, Pool};
use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use bcrypt::{DEFAULT_COST, hash, verify};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

pub async fn create_user(
    State(pool): State<Pool>,
    ValidatedJson(payload): ValidatedJson<RegisterUser>,
) -> JsonResult<SafeUser> {
    use clinic_agenda::schema::users;

    let mut conn = pool.get().await.map_err(internal_error)?;

    let hashed_pass = create_password_hash(payload.password).await?;

    let user_data = User {
        id: Uuid::new_v4(),
        email: payload.email,
        password_hash: hashed_pass,
        hashed_rt: None,
    };

    let res = diesel::insert_into(users::table)
        .values(&user_data)
        .returning(SafeUser::as_returning())
        .get_result(&mut conn)
        .await
        .map_err(|err| match err {
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ) => AppError::field("email", "E-mail já cadastrado"),
            other => other.into(),
        })?;

    Ok(Json(res))
}

pub async fn login_user(
    State(pool): State<Pool>,
    Json(payload): Json<Credentials>,
) -> JsonResult<TokenPair> {
    use clinic_agenda::schema::users;

    let mut conn = pool.get().await.map_err(internal_error)?;

    let user = users::table
        .filter(users::email.eq(&payload.email))
        .select(User::as_select())
        .first(&mut conn)
        .await
        .optional()
        .map_err(internal_error)?
        .ok_or(AppError::Unauthorized)?;

    let password = payload.password;
    let password_hash = user.password_hash.clone();
    let matches = tokio::task::spawn_blocking(move || verify(password, &password_hash))
        .await
        .map_err(internal_error)?
        .map_err(internal_error)?;

    if !matches {
        return Err(AppError::Unauthorized);
    }

    let tokens = TokenPair::issue(user.id)?;
    let hashed_rt = create_password_hash(tokens.refresh_token.clone()).await?;

    diesel::update(users::table.find(&user.id))
        .set(users::hashed_rt.eq(Some(hashed_rt)))
        .execute(&mut conn)
        .await
        .map_err(internal_error)?;

    Ok(Json(tokens))
}

pub async fn refresh_token(
    State(pool): State<Pool>,
    Json(payload): Json<RefreshPayload>,
) -> JsonResult<TokenPair> {
    use clinic_agenda::schema::users;

    let claims = RefreshTokenClaims::decode(&payload.refresh_token)?;
    let user_id = claims.user_id()?;

    let mut conn = pool.get().await.map_err(internal_error)?;

    let user = users::table
        .find(&user_id)
        .select(User::as_select())
        .first(&mut conn)
        .await
        .optional()
        .map_err(internal_error)?
        .ok_or(AppError::Unauthorized)?;

    let stored_hash = user.hashed_rt.ok_or(AppError::Unauthorized)?;
    let presented = payload.refresh_token;
    let matches = tokio::task::spawn_blocking(move || verify(presented, &stored_hash))
        .await
        .map_err(internal_error)?
        .map_err(internal_error)?;

    if !matches {
        return Err(AppError::Unauthorized);
    }

    let tokens = TokenPair::issue(user.id)?;
    let hashed_rt = create_password_hash(tokens.refresh_token.clone()).await?;

    diesel::update(users::table.find(&user.id))
        .set(users::hashed_rt.eq(Some(hashed_rt)))
        .execute(&mut conn)
        .await
        .map_err(internal_error)?;

    Ok(Json(tokens))
}

pub async fn logout(
    State(pool): State<Pool>,
    claims: AccessTokenClaims,
) -> Result<StatusCode, AppError> {
    use clinic_agenda::schema::users;

    let user_id = claims.user_id()?;
    let mut conn = pool.get().await.map_err(internal_error)?;

    diesel::update(users::table.find(&user_id))
        .set(users::hashed_rt.eq(None::<String>))
        .execute(&mut conn)
        .await
        .map_err(internal_error)?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_current_user(
    State(pool): State<Pool>,
    claims: AccessTokenClaims,
) -> JsonResult<SafeUser> {
    use clinic_agenda::schema::users;

    let user_id = claims.user_id()?;
    let mut conn = pool.get().await.map_err(internal_error)?;

    let res = users::table
        .find(&user_id)
        .select(SafeUser::as_select())
        .first(&mut conn)
        .await
        .optional()
        .map_err(internal_error)?
        .ok_or(AppError::Unauthorized)?;

    Ok(Json(res))
}

async fn create_password_hash(password: String) -> Result<String, AppError> {
    let hashed_password = tokio::task::spawn_blocking(move || hash(password, DEFAULT_COST))
        .await
        .map_err(internal_error)?
        .map_err(internal_error)?;

    Ok(hashed_password)
}
