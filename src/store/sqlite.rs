use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::SqlitePool;

use super::RecordStore;
use crate::error::AppResult;
use crate::models::{NewPatient, NewStaff, Patient, Staff};
use crate::search::{fold_case, Predicate};

/// SQLite-backed store / SQLite 存储
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

#[async_trait]
impl RecordStore for SqliteStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn insert_patient(&self, patient: NewPatient) -> AppResult<Option<Patient>> {
        let now = Utc::now();

        // 唯一约束与插入在同一条语句中完成，并发创建不会产生重复记录
        let result = sqlx::query(
            r#"
            INSERT INTO patients (
                first_name_th, middle_name_th, last_name_th,
                first_name_en, middle_name_en, last_name_en,
                date_of_birth, patient_hn, national_id, passport_id,
                phone_number, email, gender, hospital, created_at,
                first_name_th_lower, middle_name_th_lower, last_name_th_lower,
                first_name_en_lower, middle_name_en_lower, last_name_en_lower,
                national_id_lower, passport_id_lower, phone_number_lower,
                email_lower, hospital_lower
            ) VALUES (
                ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?,
                ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?
            )
            ON CONFLICT(national_id) DO NOTHING
            "#,
        )
        .bind(&patient.first_name_th)
        .bind(&patient.middle_name_th)
        .bind(&patient.last_name_th)
        .bind(&patient.first_name_en)
        .bind(&patient.middle_name_en)
        .bind(&patient.last_name_en)
        .bind(patient.date_of_birth.map(timestamp))
        .bind(&patient.patient_hn)
        .bind(&patient.national_id)
        .bind(&patient.passport_id)
        .bind(&patient.phone_number)
        .bind(&patient.email)
        .bind(&patient.gender)
        .bind(&patient.hospital)
        .bind(timestamp(now))
        .bind(fold_case(&patient.first_name_th))
        .bind(fold_case(&patient.middle_name_th))
        .bind(fold_case(&patient.last_name_th))
        .bind(fold_case(&patient.first_name_en))
        .bind(fold_case(&patient.middle_name_en))
        .bind(fold_case(&patient.last_name_en))
        .bind(fold_case(&patient.national_id))
        .bind(fold_case(&patient.passport_id))
        .bind(fold_case(&patient.phone_number))
        .bind(fold_case(&patient.email))
        .bind(fold_case(&patient.hospital))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(patient.into_patient(result.last_insert_rowid(), now)))
    }

    async fn find_patients(&self, predicate: &Predicate) -> AppResult<Vec<Patient>> {
        let fragment = predicate.to_sql();
        let sql = format!("SELECT * FROM patients WHERE {} ORDER BY id ASC", fragment.sql);

        let mut query = sqlx::query_as::<_, Patient>(&sql);
        for param in &fragment.params {
            query = query.bind(param.clone());
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn get_patient(&self, id: i64) -> AppResult<Option<Patient>> {
        let patient = sqlx::query_as::<_, Patient>("SELECT * FROM patients WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(patient)
    }

    async fn insert_staff(&self, staff: NewStaff) -> AppResult<Option<Staff>> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO staff (username, password_hash, hospital, created_at) VALUES (?, ?, ?, ?)
             ON CONFLICT(username) DO NOTHING",
        )
        .bind(&staff.username)
        .bind(&staff.password_hash)
        .bind(&staff.hospital)
        .bind(timestamp(now))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(staff.into_staff(result.last_insert_rowid(), now)))
    }

    async fn find_staff_by_username(&self, username: &str) -> AppResult<Option<Staff>> {
        let staff = sqlx::query_as::<_, Staff>("SELECT * FROM staff WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(staff)
    }
}
