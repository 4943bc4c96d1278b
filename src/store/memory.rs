use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use super::RecordStore;
use crate::error::AppResult;
use crate::models::{NewPatient, NewStaff, Patient, Staff};
use crate::search::Predicate;

#[derive(Default)]
struct Tables {
    patients: Vec<Patient>,
    staff: Vec<Staff>,
    last_patient_id: i64,
    last_staff_id: i64,
}

/// In-process store / 内存存储
///
/// A single lock guards both tables, so the uniqueness check and the insert
/// happen under the same critical section. Rows are kept in id order.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn insert_patient(&self, patient: NewPatient) -> AppResult<Option<Patient>> {
        let mut tables = self.tables.lock();
        if tables.patients.iter().any(|p| p.national_id == patient.national_id) {
            return Ok(None);
        }
        tables.last_patient_id += 1;
        let created = patient.into_patient(tables.last_patient_id, Utc::now());
        tables.patients.push(created.clone());
        Ok(Some(created))
    }

    async fn find_patients(&self, predicate: &Predicate) -> AppResult<Vec<Patient>> {
        let tables = self.tables.lock();
        Ok(tables
            .patients
            .iter()
            .filter(|p| predicate.matches(p))
            .cloned()
            .collect())
    }

    async fn get_patient(&self, id: i64) -> AppResult<Option<Patient>> {
        let tables = self.tables.lock();
        Ok(tables.patients.iter().find(|p| p.id == id).cloned())
    }

    async fn insert_staff(&self, staff: NewStaff) -> AppResult<Option<Staff>> {
        let mut tables = self.tables.lock();
        if tables.staff.iter().any(|s| s.username == staff.username) {
            return Ok(None);
        }
        tables.last_staff_id += 1;
        let created = staff.into_staff(tables.last_staff_id, Utc::now());
        tables.staff.push(created.clone());
        Ok(Some(created))
    }

    async fn find_staff_by_username(&self, username: &str) -> AppResult<Option<Staff>> {
        let tables = self.tables.lock();
        Ok(tables.staff.iter().find(|s| s.username == username).cloned())
    }
}
