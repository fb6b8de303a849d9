use chrono::{DateTime, NaiveTime, Utc};
use clinic_agenda::schema::doctors;
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::prelude::*;
use diesel::serialize::{self, Output, ToSql};
use diesel::sql_types::Integer;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::utils::error::AppError;

/// Day of week as stored in the availability columns, Sunday = 0.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, AsExpression,
    FromSqlRow,
)]
#[diesel(sql_type = Integer)]
#[serde(into = "i32", try_from = "i32")]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

#[derive(Debug, thiserror::Error)]
#[error("weekday out of range: {0}")]
pub struct WeekdayOutOfRange(pub i32);

impl From<Weekday> for i32 {
    fn from(day: Weekday) -> i32 {
        match day {
            Weekday::Sunday => 0,
            Weekday::Monday => 1,
            Weekday::Tuesday => 2,
            Weekday::Wednesday => 3,
            Weekday::Thursday => 4,
            Weekday::Friday => 5,
            Weekday::Saturday => 6,
        }
    }
}

impl TryFrom<i32> for Weekday {
    type Error = WeekdayOutOfRange;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Weekday::Sunday),
            1 => Ok(Weekday::Monday),
            2 => Ok(Weekday::Tuesday),
            3 => Ok(Weekday::Wednesday),
            4 => Ok(Weekday::Thursday),
            5 => Ok(Weekday::Friday),
            6 => Ok(Weekday::Saturday),
            other => Err(WeekdayOutOfRange(other)),
        }
    }
}

impl ToSql<Integer, Pg> for Weekday {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match self {
            Weekday::Sunday => <i32 as ToSql<Integer, Pg>>::to_sql(&0, &mut out.reborrow()),
            Weekday::Monday => <i32 as ToSql<Integer, Pg>>::to_sql(&1, &mut out.reborrow()),
            Weekday::Tuesday => <i32 as ToSql<Integer, Pg>>::to_sql(&2, &mut out.reborrow()),
            Weekday::Wednesday => <i32 as ToSql<Integer, Pg>>::to_sql(&3, &mut out.reborrow()),
            Weekday::Thursday => <i32 as ToSql<Integer, Pg>>::to_sql(&4, &mut out.reborrow()),
            Weekday::Friday => <i32 as ToSql<Integer, Pg>>::to_sql(&5, &mut out.reborrow()),
            Weekday::Saturday => <i32 as ToSql<Integer, Pg>>::to_sql(&6, &mut out.reborrow()),
        }
    }
}

impl FromSql<Integer, Pg> for Weekday {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        let value = <i32 as FromSql<Integer, Pg>>::from_sql(bytes)?;
        Weekday::try_from(value).map_err(Into::into)
    }
}

#[derive(Queryable, Selectable, Debug, PartialEq, Identifiable, Serialize)]
#[diesel(table_name=doctors)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Doctor {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub name: String,
    pub specialty: String,
    pub available_from_weekday: Weekday,
    pub available_to_weekday: Weekday,
    pub available_from_time: NaiveTime,
    pub available_to_time: NaiveTime,
    pub appointment_price_in_cents: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = doctors)]
pub struct NewDoctor {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub name: String,
    pub specialty: String,
    pub available_from_weekday: Weekday,
    pub available_to_weekday: Weekday,
    pub available_from_time: NaiveTime,
    pub available_to_time: NaiveTime,
    pub appointment_price_in_cents: i32,
}

#[derive(AsChangeset)]
#[diesel(table_name = doctors)]
pub struct DoctorChangeset {
    pub name: String,
    pub specialty: String,
    pub available_from_weekday: Weekday,
    pub available_to_weekday: Weekday,
    pub available_from_time: NaiveTime,
    pub available_to_time: NaiveTime,
    pub appointment_price_in_cents: i32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpsertDoctor {
    pub id: Option<Uuid>,
    #[validate(custom(function = required_name))]
    pub name: String,
    #[validate(custom(function = required_specialty))]
    pub specialty: String,
    pub available_from_weekday: i32,
    pub available_to_weekday: i32,
    pub available_from_time: String,
    pub available_to_time: String,
    #[validate(range(min = 1, message = "Preço da consulta é obrigatório"))]
    pub appointment_price_in_cents: i32,
}

impl UpsertDoctor {
    /// Parses the availability window. Empty or malformed times fail on their
    /// own field; an unordered window fails on the "to" field.
    pub fn available_times(&self) -> Result<(NaiveTime, NaiveTime), AppError> {
        let from = parse_time(
            "available_from_time",
            &self.available_from_time,
            "Hora de início é obrigatória",
        )?;
        let to = parse_time(
            "available_to_time",
            &self.available_to_time,
            "Hora de término é obrigatória",
        )?;
        if from >= to {
            return Err(AppError::field(
                "available_to_time",
                "O horário de início não pode ser anterior ao horário de término",
            ));
        }
        Ok((from, to))
    }

    pub fn weekday_range(&self) -> Result<(Weekday, Weekday), AppError> {
        let from = Weekday::try_from(self.available_from_weekday)
            .map_err(|_| AppError::field("available_from_weekday", "Dia da semana inválido"))?;
        let to = Weekday::try_from(self.available_to_weekday)
            .map_err(|_| AppError::field("available_to_weekday", "Dia da semana inválido"))?;
        Ok((from, to))
    }
}

fn parse_time(field: &str, value: &str, required_message: &str) -> Result<NaiveTime, AppError> {
    if value.trim().is_empty() {
        return Err(AppError::field(field, required_message));
    }
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .map_err(|_| AppError::field(field, "Horário inválido"))
}

fn required_name(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("required");
        error.message = Some("Nome é obrigatório".into());
        return Err(error);
    }
    Ok(())
}

fn required_specialty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("required");
        error.message = Some("Especialidade é obrigatória".into());
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> UpsertDoctor {
        UpsertDoctor {
            id: None,
            name: "Dr. Ana".to_owned(),
            specialty: "Cardiologia".to_owned(),
            available_from_weekday: 1,
            available_to_weekday: 5,
            available_from_time: "08:00:00".to_owned(),
            available_to_time: "18:00:00".to_owned(),
            appointment_price_in_cents: 20000,
        }
    }

    fn field_of(err: AppError) -> (String, String) {
        match err {
            AppError::Validation(mut fields) => {
                let first = fields.remove(0);
                (first.field, first.message)
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn weekly_cardiology_schedule_is_accepted() {
        let payload = payload();
        assert!(payload.validate().is_ok());
        let (from, to) = payload.available_times().unwrap();
        assert!(from < to);
        assert_eq!(
            payload.weekday_range().unwrap(),
            (Weekday::Monday, Weekday::Friday)
        );
    }

    #[test]
    fn blank_name_and_specialty_are_rejected() {
        let mut blank_name = payload();
        blank_name.name = "  ".to_owned();
        let err: AppError = blank_name.validate().unwrap_err().into();
        assert_eq!(
            field_of(err),
            ("name".to_owned(), "Nome é obrigatório".to_owned())
        );

        let mut blank_specialty = payload();
        blank_specialty.specialty = String::new();
        let err: AppError = blank_specialty.validate().unwrap_err().into();
        assert_eq!(
            field_of(err),
            (
                "specialty".to_owned(),
                "Especialidade é obrigatória".to_owned()
            )
        );
    }

    #[test]
    fn non_positive_price_is_rejected() {
        let mut free = payload();
        free.appointment_price_in_cents = 0;
        let err: AppError = free.validate().unwrap_err().into();
        assert_eq!(field_of(err).0, "appointment_price_in_cents");
    }

    #[test]
    fn empty_times_fail_on_their_own_field() {
        let mut no_from = payload();
        no_from.available_from_time = String::new();
        let (field, message) = field_of(no_from.available_times().unwrap_err());
        assert_eq!(field, "available_from_time");
        assert_eq!(message, "Hora de início é obrigatória");

        let mut no_to = payload();
        no_to.available_to_time = "   ".to_owned();
        let (field, message) = field_of(no_to.available_times().unwrap_err());
        assert_eq!(field, "available_to_time");
        assert_eq!(message, "Hora de término é obrigatória");
    }

    #[test]
    fn unordered_window_fails_on_the_to_field() {
        let mut backwards = payload();
        backwards.available_from_time = "18:00:00".to_owned();
        backwards.available_to_time = "08:00:00".to_owned();
        let (field, _) = field_of(backwards.available_times().unwrap_err());
        assert_eq!(field, "available_to_time");

        let mut degenerate = payload();
        degenerate.available_to_time = degenerate.available_from_time.clone();
        assert!(degenerate.available_times().is_err());
    }

    #[test]
    fn malformed_time_is_rejected() {
        let mut garbled = payload();
        garbled.available_from_time = "8h".to_owned();
        let (field, message) = field_of(garbled.available_times().unwrap_err());
        assert_eq!(field, "available_from_time");
        assert_eq!(message, "Horário inválido");
    }

    #[test]
    fn weekdays_cover_sunday_zero_through_saturday_six() {
        assert_eq!(Weekday::try_from(0).unwrap(), Weekday::Sunday);
        assert_eq!(Weekday::try_from(6).unwrap(), Weekday::Saturday);
        assert!(Weekday::try_from(7).is_err());
        assert!(Weekday::try_from(-1).is_err());
        assert_eq!(i32::from(Weekday::Wednesday), 3);
    }

    #[test]
    fn out_of_range_weekday_fails_its_field() {
        let mut bad = payload();
        bad.available_to_weekday = 7;
        let (field, message) = field_of(bad.weekday_range().unwrap_err());
        assert_eq!(field, "available_to_weekday");
        assert_eq!(message, "Dia da semana inválido");
    }
}
