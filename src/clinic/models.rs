use chrono::{DateTime, Utc};
use clinic_agenda::schema::{clinics, users_to_clinics};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Queryable, Selectable, Debug, PartialEq, Identifiable, Serialize)]
#[diesel(table_name=clinics)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Clinic {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = clinics)]
pub struct NewClinic {
    pub id: Uuid,
    pub name: String,
}

#[derive(Insertable)]
#[diesel(table_name = users_to_clinics)]
pub struct UserClinic {
    pub user_id: Uuid,
    pub clinic_id: Uuid,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateClinic {
    #[validate(custom(function = required_name))]
    pub name: String,
}

fn required_name(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("required");
        error.message = Some("Nome é obrigatório".into());
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_is_rejected() {
        let payload = CreateClinic {
            name: "   ".to_owned(),
        };
        let errors = payload.validate().unwrap_err();
        let field_errors = errors.field_errors();
        let violations = field_errors.get("name").expect("name error");
        assert_eq!(
            violations[0].message.as_deref(),
            Some("Nome é obrigatório")
        );
    }

    #[test]
    fn named_clinic_passes() {
        let payload = CreateClinic {
            name: "Saúde+".to_owned(),
        };
        assert!(payload.validate().is_ok());
    }
}
