use chrono::{DateTime, Utc};
use clinic_agenda::schema::patients;
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};
use std::io::Write;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl ToSql<Text, Pg> for Sex {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match self {
            Sex::Male => out.write_all(b"male")?,
            Sex::Female => out.write_all(b"female")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for Sex {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"male" => Ok(Sex::Male),
            b"female" => Ok(Sex::Female),
            other => Err(format!("unrecognized sex value: {:?}", other).into()),
        }
    }
}

#[derive(Queryable, Selectable, Debug, PartialEq, Identifiable, Serialize)]
#[diesel(table_name=patients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Patient {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub sex: Sex,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = patients)]
pub struct NewPatient {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub sex: Sex,
}

#[derive(AsChangeset)]
#[diesel(table_name = patients)]
pub struct PatientChangeset {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub sex: Sex,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpsertPatient {
    pub id: Option<Uuid>,
    #[validate(custom(function = required_name))]
    pub name: String,
    #[validate(email(message = "E-mail inválido"))]
    pub email: String,
    #[validate(custom(function = eleven_digit_phone))]
    pub phone_number: String,
    pub sex: Sex,
}

impl UpsertPatient {
    /// The stored form of the phone: digits only, formatting stripped.
    pub fn normalized_phone(&self) -> String {
        normalize_phone(&self.phone_number)
    }
}

pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn required_name(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("required");
        error.message = Some("Nome é obrigatório".into());
        return Err(error);
    }
    Ok(())
}

fn eleven_digit_phone(value: &str) -> Result<(), ValidationError> {
    if normalize_phone(value).len() != 11 {
        let mut error = ValidationError::new("phone_number");
        error.message = Some("Telefone deve conter 11 dígitos".into());
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::AppError;

    fn payload() -> UpsertPatient {
        UpsertPatient {
            id: None,
            name: "João".to_owned(),
            email: "joao@x.com".to_owned(),
            phone_number: "11999998888".to_owned(),
            sex: Sex::Male,
        }
    }

    fn first_field(err: AppError) -> (String, String) {
        match err {
            AppError::Validation(mut fields) => {
                let first = fields.remove(0);
                (first.field, first.message)
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn complete_patient_passes() {
        assert!(payload().validate().is_ok());
    }

    #[test]
    fn phone_must_have_exactly_eleven_digits() {
        let mut short = payload();
        short.phone_number = "119876543".to_owned();
        let err: AppError = short.validate().unwrap_err().into();
        let (field, message) = first_field(err);
        assert_eq!(field, "phone_number");
        assert_eq!(message, "Telefone deve conter 11 dígitos");

        let mut long = payload();
        long.phone_number = "119999988889".to_owned();
        assert!(long.validate().is_err());

        let mut truncated = payload();
        truncated.phone_number = "1199999".to_owned();
        assert!(truncated.validate().is_err());
    }

    #[test]
    fn formatted_phone_normalizes_to_digits() {
        let mut formatted = payload();
        formatted.phone_number = "(11) 98765-4321".to_owned();
        assert!(formatted.validate().is_ok());
        assert_eq!(formatted.normalized_phone(), "11987654321");
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut blank = payload();
        blank.name = " ".to_owned();
        let err: AppError = blank.validate().unwrap_err().into();
        assert_eq!(
            first_field(err),
            ("name".to_owned(), "Nome é obrigatório".to_owned())
        );
    }

    #[test]
    fn invalid_email_is_rejected() {
        let mut bad = payload();
        bad.email = "joao-at-x.com".to_owned();
        let err: AppError = bad.validate().unwrap_err().into();
        assert_eq!(
            first_field(err),
            ("email".to_owned(), "E-mail inválido".to_owned())
        );
    }

    #[test]
    fn sex_uses_lowercase_wire_values() {
        assert_eq!(serde_json::to_string(&Sex::Male).unwrap(), "\"male\"");
        assert_eq!(
            serde_json::from_str::<Sex>("\"female\"").unwrap(),
            Sex::Female
        );
        assert!(serde_json::from_str::<Sex>("\"other\"").is_err());
    }
}
