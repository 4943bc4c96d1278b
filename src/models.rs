use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{Check, FieldRule, Validate};

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Patient {
    pub id: i64,
    pub first_name_th: String,
    pub middle_name_th: String,
    pub last_name_th: String,
    pub first_name_en: String,
    pub middle_name_en: String,
    pub last_name_en: String,
    pub date_of_birth: Option<DateTime<Utc>>,
    /// Hospital-local record number
    pub patient_hn: String,
    pub national_id: String,
    pub passport_id: String,
    pub phone_number: String,
    pub email: String,
    pub gender: String,
    /// Owning tenant / 所属医院
    pub hospital: String,
    pub created_at: DateTime<Utc>,
}

/// Patient record as submitted by the caller, before the store assigns an id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewPatient {
    pub first_name_th: String,
    pub middle_name_th: String,
    pub last_name_th: String,
    pub first_name_en: String,
    pub middle_name_en: String,
    pub last_name_en: String,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub patient_hn: String,
    pub national_id: String,
    pub passport_id: String,
    pub phone_number: String,
    pub email: String,
    pub gender: String,
    pub hospital: String,
}

impl NewPatient {
    pub fn into_patient(self, id: i64, created_at: DateTime<Utc>) -> Patient {
        Patient {
            id,
            first_name_th: self.first_name_th,
            middle_name_th: self.middle_name_th,
            last_name_th: self.last_name_th,
            first_name_en: self.first_name_en,
            middle_name_en: self.middle_name_en,
            last_name_en: self.last_name_en,
            date_of_birth: self.date_of_birth,
            patient_hn: self.patient_hn,
            national_id: self.national_id,
            passport_id: self.passport_id,
            phone_number: self.phone_number,
            email: self.email,
            gender: self.gender,
            hospital: self.hospital,
            created_at,
        }
    }
}

pub const GENDERS: &[&str] = &["male", "female"];

impl Validate for NewPatient {
    fn schema() -> Vec<FieldRule<Self>> {
        vec![
            FieldRule::<Self>::new("national_id", |p| p.national_id.as_str(), &[Check::Required]),
            FieldRule::<Self>::new("gender", |p| p.gender.as_str(), &[Check::Required, Check::OneOf(GENDERS)]),
            FieldRule::<Self>::new("hospital", |p| p.hospital.as_str(), &[Check::Required]),
        ]
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Staff {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub hospital: String,
    pub created_at: DateTime<Utc>,
}

/// Staff account ready to persist (password already hashed)
#[derive(Debug, Clone)]
pub struct NewStaff {
    pub username: String,
    pub password_hash: String,
    pub hospital: String,
}

impl NewStaff {
    pub fn into_staff(self, id: i64, created_at: DateTime<Utc>) -> Staff {
        Staff {
            id,
            username: self.username,
            password_hash: self.password_hash,
            hospital: self.hospital,
            created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateStaffRequest {
    pub username: String,
    pub password: String,
    pub hospital: String,
}

impl Validate for CreateStaffRequest {
    fn schema() -> Vec<FieldRule<Self>> {
        vec![
            FieldRule::<Self>::new("username", |r| r.username.as_str(), &[Check::Required]),
            FieldRule::<Self>::new("password", |r| r.password.as_str(), &[Check::Required]),
            FieldRule::<Self>::new("hospital", |r| r.hospital.as_str(), &[Check::Required]),
        ]
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn schema() -> Vec<FieldRule<Self>> {
        vec![
            FieldRule::<Self>::new("username", |r| r.username.as_str(), &[Check::Required]),
            FieldRule::<Self>::new("password", |r| r.password.as_str(), &[Check::Required]),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_patient_accepts_partial_json() {
        let body = r#"{
            "first_name_th": "ปลาบปลื้ม",
            "first_name_en": "Plabpluem",
            "date_of_birth": "1995-07-21T00:00:00Z",
            "national_id": "890589058905",
            "gender": "male",
            "hospital": "hua-hin hospital"
        }"#;
        let patient: NewPatient = serde_json::from_str(body).unwrap();
        assert_eq!(patient.first_name_en, "Plabpluem");
        assert_eq!(patient.passport_id, "");
        assert_eq!(
            patient.date_of_birth.unwrap().date_naive(),
            chrono::NaiveDate::from_ymd_opt(1995, 7, 21).unwrap()
        );
        assert!(patient.validate().is_ok());
    }

    #[test]
    fn test_staff_never_serializes_password_hash() {
        let staff = NewStaff {
            username: "shinepp".into(),
            password_hash: "$2b$04$secret".into(),
            hospital: "Bangkok Hospital".into(),
        }
        .into_staff(1, Utc::now());
        let json = serde_json::to_value(&staff).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "shinepp");
    }
}
