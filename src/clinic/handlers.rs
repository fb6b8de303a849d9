use super::models::{Clinic, CreateClinic, NewClinic, UserClinic};
use crate::auth::models::AccessTokenClaims;
use crate::utils::extract::ValidatedJson;
use crate::utils::internal_error;
use crate::utils::types::{JsonResult, Pool};
use axum::extract::{Json, State};
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

/// Inserts the clinic and the caller's membership atomically, which makes
/// the new clinic the caller's active one.
pub async fn create_clinic(
    State(pool): State<Pool>,
    claims: AccessTokenClaims,
    ValidatedJson(payload): ValidatedJson<CreateClinic>,
) -> JsonResult<Clinic> {
    use clinic_agenda::schema::{clinics, users_to_clinics};

    let user_id = claims.user_id()?;
    let mut conn = pool.get().await.map_err(internal_error)?;

    let clinic_data = NewClinic {
        id: Uuid::new_v4(),
        name: payload.name.trim().to_owned(),
    };

    let res = conn
        .transaction::<Clinic, diesel::result::Error, _>(move |conn| {
            Box::pin(async move {
                let clinic = diesel::insert_into(clinics::table)
                    .values(&clinic_data)
                    .returning(Clinic::as_returning())
                    .get_result(conn)
                    .await?;

                let membership = UserClinic {
                    user_id,
                    clinic_id: clinic.id,
                };

                diesel::insert_into(users_to_clinics::table)
                    .values(&membership)
                    .execute(conn)
                    .await?;

                Ok(clinic)
            })
        })
        .await
        .map_err(internal_error)?;

    Ok(Json(res))
}

pub async fn get_clinics(
    State(pool): State<Pool>,
    claims: AccessTokenClaims,
) -> JsonResult<Vec<Clinic>> {
    use clinic_agenda::schema::{clinics, users_to_clinics};

    let user_id = claims.user_id()?;
    let mut conn = pool.get().await.map_err(internal_error)?;

    let res = users_to_clinics::table
        .inner_join(clinics::table)
        .filter(users_to_clinics::user_id.eq(&user_id))
        .select(Clinic::as_select())
        .load(&mut conn)
        .await
        .map_err(internal_error)?;

    Ok(Json(res))
}
