//! Record store abstraction / 记录存储抽象
//!
//! Uniqueness (national_id, username) is enforced inside the store as one
//! atomic check-and-insert. An insert that hits an existing key returns
//! `Ok(None)` and leaves the store untouched.

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{NewPatient, NewStaff, Patient, Staff};
use crate::search::Predicate;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[async_trait]
pub trait RecordStore: Send + Sync {
    fn backend_name(&self) -> &'static str;

    /// `None` when the national_id is already taken
    async fn insert_patient(&self, patient: NewPatient) -> AppResult<Option<Patient>>;

    /// All patients satisfying `predicate`, in creation order
    async fn find_patients(&self, predicate: &Predicate) -> AppResult<Vec<Patient>>;

    async fn get_patient(&self, id: i64) -> AppResult<Option<Patient>>;

    /// `None` when the username is already taken
    async fn insert_staff(&self, staff: NewStaff) -> AppResult<Option<Staff>>;

    async fn find_staff_by_username(&self, username: &str) -> AppResult<Option<Staff>>;
}
