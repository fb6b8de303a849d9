use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clinic_agenda::schema::appointments;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::utils::error::AppError;

#[derive(Queryable, Selectable, Debug, PartialEq, Identifiable, Serialize)]
#[diesel(table_name=appointments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Appointment {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub appointment_date_time: DateTime<Utc>,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub clinic_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = appointments)]
pub struct NewAppointment {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub appointment_date_time: DateTime<Utc>,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub clinic_id: Uuid,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAppointment {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
}

impl CreateAppointment {
    /// The scheduled instant, composed from the date and the time-of-day.
    pub fn scheduled_at(&self) -> Result<DateTime<Utc>, AppError> {
        if self.time.trim().is_empty() {
            return Err(AppError::field("time", "Horário é obrigatório"));
        }
        let time = NaiveTime::parse_from_str(&self.time, "%H:%M:%S")
            .map_err(|_| AppError::field("time", "Horário inválido"))?;
        Ok(self.date.and_time(time).and_utc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> CreateAppointment {
        CreateAppointment {
            patient_id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2025, 7, 14).unwrap(),
            time: "09:30:00".to_owned(),
        }
    }

    #[test]
    fn date_and_time_compose_into_one_instant() {
        let scheduled = payload().scheduled_at().unwrap();
        assert_eq!(scheduled.to_rfc3339(), "2025-07-14T09:30:00+00:00");
    }

    #[test]
    fn empty_time_fails_on_the_time_field() {
        let mut missing = payload();
        missing.time = "  ".to_owned();
        match missing.scheduled_at().unwrap_err() {
            AppError::Validation(fields) => {
                assert_eq!(fields[0].field, "time");
                assert_eq!(fields[0].message, "Horário é obrigatório");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_time_is_rejected() {
        let mut garbled = payload();
        garbled.time = "9h30".to_owned();
        assert!(garbled.scheduled_at().is_err());
    }
}
