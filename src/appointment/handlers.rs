use super::models::{Appointment, CreateAppointment, NewAppointment};
use crate::auth::models::ClinicContext;
use crate::utils::error::AppError;
use crate::utils::extract::ValidatedJson;
use crate::utils::internal_error;
use crate::utils::types::{JsonResult, Pool};
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

pub async fn create_appointment(
    State(pool): State<Pool>,
    ctx: ClinicContext,
    ValidatedJson(payload): ValidatedJson<CreateAppointment>,
) -> JsonResult<Appointment> {
    use clinic_agenda::schema::{appointments, doctors, patients};

    let scheduled_at = payload.scheduled_at()?;

    let mut conn = pool.get().await.map_err(internal_error)?;

    // Both referenced rows must belong to the caller's clinic.
    doctors::table
        .filter(doctors::id.eq(&payload.doctor_id))
        .filter(doctors::clinic_id.eq(&ctx.clinic_id))
        .select(doctors::id)
        .first::<Uuid>(&mut conn)
        .await
        .optional()
        .map_err(internal_error)?
        .ok_or(AppError::NotFound)?;

    patients::table
        .filter(patients::id.eq(&payload.patient_id))
        .filter(patients::clinic_id.eq(&ctx.clinic_id))
        .select(patients::id)
        .first::<Uuid>(&mut conn)
        .await
        .optional()
        .map_err(internal_error)?
        .ok_or(AppError::NotFound)?;

    let appointment_data = NewAppointment {
        id: Uuid::new_v4(),
        date: scheduled_at,
        appointment_date_time: scheduled_at,
        patient_id: payload.patient_id,
        doctor_id: payload.doctor_id,
        clinic_id: ctx.clinic_id,
    };

    let res = diesel::insert_into(appointments::table)
        .values(&appointment_data)
        .returning(Appointment::as_returning())
        .get_result(&mut conn)
        .await?;

    Ok(Json(res))
}

pub async fn get_appointments(
    State(pool): State<Pool>,
    ctx: ClinicContext,
) -> JsonResult<Vec<Appointment>> {
    use clinic_agenda::schema::appointments;

    let mut conn = pool.get().await.map_err(internal_error)?;

    let res = appointments::table
        .filter(appointments::clinic_id.eq(&ctx.clinic_id))
        .select(Appointment::as_select())
        .load(&mut conn)
        .await
        .map_err(internal_error)?;

    Ok(Json(res))
}

pub async fn delete_appointment(
    Path(id): Path<Uuid>,
    State(pool): State<Pool>,
    ctx: ClinicContext,
) -> Result<StatusCode, AppError> {
    use clinic_agenda::schema::appointments;

    let mut conn = pool.get().await.map_err(internal_error)?;

    let deleted = diesel::delete(
        appointments::table
            .filter(appointments::id.eq(&id))
            .filter(appointments::clinic_id.eq(&ctx.clinic_id)),
    )
    .execute(&mut conn)
    .await
    .map_err(internal_error)?;

    if deleted == 0 {
        return Err(AppError::NotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}
