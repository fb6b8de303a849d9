use super::models::{NewPatient, Patient, PatientChangeset, UpsertPatient};
use crate::auth::models::ClinicContext;
use crate::utils::error::AppError;
use crate::utils::extract::ValidatedJson;
use crate::utils::internal_error;
use crate::utils::types::{JsonResult, Pool};
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

pub async fn upsert_patient(
    State(pool): State<Pool>,
    ctx: ClinicContext,
    ValidatedJson(payload): ValidatedJson<UpsertPatient>,
) -> JsonResult<Patient> {
    use clinic_agenda::schema::patients;

    let phone_number = payload.normalized_phone();

    let mut conn = pool.get().await.map_err(internal_error)?;

    let res = match payload.id {
        Some(id) => {
            let changes = PatientChangeset {
                name: payload.name.trim().to_owned(),
                email: payload.email,
                phone_number,
                sex: payload.sex,
                updated_at: Utc::now(),
            };

            diesel::update(
                patients::table
                    .filter(patients::id.eq(&id))
                    .filter(patients::clinic_id.eq(&ctx.clinic_id)),
            )
            .set(&changes)
            .returning(Patient::as_returning())
            .get_result(&mut conn)
            .await?
        }
        None => {
            let patient_data = NewPatient {
                id: Uuid::new_v4(),
                clinic_id: ctx.clinic_id,
                name: payload.name.trim().to_owned(),
                email: payload.email,
                phone_number,
                sex: payload.sex,
            };

            diesel::insert_into(patients::table)
                .values(&patient_data)
                .returning(Patient::as_returning())
                .get_result(&mut conn)
                .await?
        }
    };

    Ok(Json(res))
}

pub async fn get_patients(
    State(pool): State<Pool>,
    ctx: ClinicContext,
) -> JsonResult<Vec<Patient>> {
    use clinic_agenda::schema::patients;

    let mut conn = pool.get().await.map_err(internal_error)?;

    let res = patients::table
        .filter(patients::clinic_id.eq(&ctx.clinic_id))
        .select(Patient::as_select())
        .load(&mut conn)
        .await
        .map_err(internal_error)?;

    Ok(Json(res))
}

pub async fn delete_patient(
    Path(id): Path<Uuid>,
    State(pool): State<Pool>,
    ctx: ClinicContext,
) -> Result<StatusCode, AppError> {
    use clinic_agenda::schema::patients;

    let mut conn = pool.get().await.map_err(internal_error)?;

    // The patient's appointments go with the row via the FK cascade.
    let deleted = diesel::delete(
        patients::table
            .filter(patients::id.eq(&id))
            .filter(patients::clinic_id.eq(&ctx.clinic_id)),
    )
    .execute(&mut conn)
    .await
    .map_err(internal_error)?;

    if deleted == 0 {
        return Err(AppError::NotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}
