//! Search query schema / 搜索查询定义

use chrono::NaiveDate;
use serde::Deserialize;

use crate::auth::AuthenticatedIdentity;
use crate::error::{AppError, AppResult};
use crate::models::Patient;

/// Searchable patient columns / 可搜索字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatientField {
    NationalId,
    PassportId,
    FirstNameTh,
    FirstNameEn,
    MiddleNameTh,
    MiddleNameEn,
    LastNameTh,
    LastNameEn,
    PhoneNumber,
    Email,
    Hospital,
}

impl PatientField {
    /// Lower-cased shadow column holding this field in the patients table
    pub fn column(self) -> &'static str {
        match self {
            PatientField::NationalId => "national_id_lower",
            PatientField::PassportId => "passport_id_lower",
            PatientField::FirstNameTh => "first_name_th_lower",
            PatientField::FirstNameEn => "first_name_en_lower",
            PatientField::MiddleNameTh => "middle_name_th_lower",
            PatientField::MiddleNameEn => "middle_name_en_lower",
            PatientField::LastNameTh => "last_name_th_lower",
            PatientField::LastNameEn => "last_name_en_lower",
            PatientField::PhoneNumber => "phone_number_lower",
            PatientField::Email => "email_lower",
            PatientField::Hospital => "hospital_lower",
        }
    }

    pub fn value(self, patient: &Patient) -> &str {
        match self {
            PatientField::NationalId => &patient.national_id,
            PatientField::PassportId => &patient.passport_id,
            PatientField::FirstNameTh => &patient.first_name_th,
            PatientField::FirstNameEn => &patient.first_name_en,
            PatientField::MiddleNameTh => &patient.middle_name_th,
            PatientField::MiddleNameEn => &patient.middle_name_en,
            PatientField::LastNameTh => &patient.last_name_th,
            PatientField::LastNameEn => &patient.last_name_en,
            PatientField::PhoneNumber => &patient.phone_number,
            PatientField::Email => &patient.email,
            PatientField::Hospital => &patient.hospital,
        }
    }
}

/// Client-supplied filters (query string). Has no hospital field, so a
/// `hospital=` parameter is dropped during deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    pub national_id: Option<String>,
    pub passport_id: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    /// `YYYY-MM-DD`
    pub date_of_birth: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
}

/// One search request: optional field filters plus the mandatory tenant scope
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    hospital: String,
    national_id: Option<String>,
    passport_id: Option<String>,
    first_name: Option<String>,
    middle_name: Option<String>,
    last_name: Option<String>,
    date_of_birth: Option<NaiveDate>,
    phone_number: Option<String>,
    email: Option<String>,
}

/// Trimmed value, or None when nothing is left
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl SearchQuery {
    /// Scope a search to the caller's own hospital / 以调用者所属医院为范围
    pub fn for_identity(identity: &AuthenticatedIdentity, filters: SearchFilters) -> AppResult<Self> {
        Self::new(identity.hospital.clone(), filters)
    }

    /// Fails only when `date_of_birth` is present but not a `YYYY-MM-DD` date
    pub fn new(hospital: impl Into<String>, filters: SearchFilters) -> AppResult<Self> {
        let date_of_birth = match present(filters.date_of_birth) {
            Some(raw) => Some(NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
                AppError::validation(format!("date_of_birth must be YYYY-MM-DD, got {}", raw))
            })?),
            None => None,
        };

        Ok(Self {
            hospital: hospital.into(),
            national_id: present(filters.national_id),
            passport_id: present(filters.passport_id),
            first_name: present(filters.first_name),
            middle_name: present(filters.middle_name),
            last_name: present(filters.last_name),
            date_of_birth,
            phone_number: present(filters.phone_number),
            email: present(filters.email),
        })
    }

    pub fn hospital(&self) -> &str { &self.hospital }
    pub fn national_id(&self) -> Option<&str> { self.national_id.as_deref() }
    pub fn passport_id(&self) -> Option<&str> { self.passport_id.as_deref() }
    pub fn first_name(&self) -> Option<&str> { self.first_name.as_deref() }
    pub fn middle_name(&self) -> Option<&str> { self.middle_name.as_deref() }
    pub fn last_name(&self) -> Option<&str> { self.last_name.as_deref() }
    pub fn date_of_birth(&self) -> Option<NaiveDate> { self.date_of_birth }
    pub fn phone_number(&self) -> Option<&str> { self.phone_number.as_deref() }
    pub fn email(&self) -> Option<&str> { self.email.as_deref() }
}
