use super::models::{Doctor, DoctorChangeset, NewDoctor, UpsertDoctor};
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

pub async fn upsert_doctor(
    State(pool): State<Pool>,
    ctx: ClinicContext,
    ValidatedJson(payload): ValidatedJson<UpsertDoctor>,
) -> JsonResult<Doctor> {
    use clinic_agenda::schema::doctors;

    let (available_from_time, available_to_time) = payload.available_times()?;
    let (available_from_weekday, available_to_weekday) = payload.weekday_range()?;

    let mut conn = pool.get().await.map_err(internal_error)?;

    let res = match payload.id {
        Some(id) => {
            let changes = DoctorChangeset {
                name: payload.name.trim().to_owned(),
                specialty: payload.specialty.trim().to_owned(),
                available_from_weekday,
                available_to_weekday,
                available_from_time,
                available_to_time,
                appointment_price_in_cents: payload.appointment_price_in_cents,
                updated_at: Utc::now(),
            };

            diesel::update(
                doctors::table
                    .filter(doctors::id.eq(&id))
                    .filter(doctors::clinic_id.eq(&ctx.clinic_id)),
            )
            .set(&changes)
            .returning(Doctor::as_returning())
            .get_result(&mut conn)
            .await?
        }
        None => {
            let doctor_data = NewDoctor {
                id: Uuid::new_v4(),
                clinic_id: ctx.clinic_id,
                name: payload.name.trim().to_owned(),
                specialty: payload.specialty.trim().to_owned(),
                available_from_weekday,
                available_to_weekday,
                available_from_time,
                available_to_time,
                appointment_price_in_cents: payload.appointment_price_in_cents,
            };

            diesel::insert_into(doctors::table)
                .values(&doctor_data)
                .returning(Doctor::as_returning())
                .get_result(&mut conn)
                .await?
        }
    };

    Ok(Json(res))
}

pub async fn get_doctors(State(pool): State<Pool>, ctx: ClinicContext) -> JsonResult<Vec<Doctor>> {
    use clinic_agenda::schema::doctors;

    let mut conn = pool.get().await.map_err(internal_error)?;

    let res = doctors::table
        .filter(doctors::clinic_id.eq(&ctx.clinic_id))
        .select(Doctor::as_select())
        .load(&mut conn)
        .await
        .map_err(internal_error)?;

    Ok(Json(res))
}

pub async fn delete_doctor(
    Path(id): Path<Uuid>,
    State(pool): State<Pool>,
    ctx: ClinicContext,
) -> Result<StatusCode, AppError> {
    use clinic_agenda::schema::doctors;

    let mut conn = pool.get().await.map_err(internal_error)?;

    // Appointments referencing the doctor go with the row via the FK cascade.
    let deleted = diesel::delete(
        doctors::table
            .filter(doctors::id.eq(&id))
            .filter(doctors::clinic_id.eq(&ctx.clinic_id)),
    )
    .execute(&mut conn)
    .await
    .map_err(internal_error)?;

    if deleted == 0 {
        return Err(AppError::NotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}
