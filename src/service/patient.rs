use std::sync::Arc;

use crate::auth::AuthenticatedIdentity;
use crate::error::{AppError, AppResult};
use crate::models::{NewPatient, Patient};
use crate::search::{Predicate, SearchQuery};
use crate::store::RecordStore;
use crate::validation::Validate;

#[derive(Clone)]
pub struct PatientService {
    store: Arc<dyn RecordStore>,
}

impl PatientService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Validate and persist a patient; national_id must be unused
    pub async fn create_patient(&self, patient: NewPatient) -> AppResult<Patient> {
        patient.validate()?;

        let national_id = patient.national_id.clone();
        match self.store.insert_patient(patient).await? {
            Some(created) => {
                tracing::info!("Patient created: id={} hospital={}", created.id, created.hospital);
                Ok(created)
            }
            None => {
                tracing::warn!("Rejected duplicate national_id {}", national_id);
                Err(AppError::Duplicate("national_id already exist".to_string()))
            }
        }
    }

    /// Patients of the query's hospital matching every present filter
    pub async fn search_patients(&self, query: &SearchQuery) -> AppResult<Vec<Patient>> {
        let predicate = Predicate::compile(query);
        let patients = self.store.find_patients(&predicate).await?;
        tracing::debug!(
            "Patient search in {} returned {} record(s) ({})",
            query.hospital(),
            patients.len(),
            self.store.backend_name()
        );
        Ok(patients)
    }

    /// Single record lookup, limited to the caller's own hospital
    pub async fn find_by_id(&self, identity: &AuthenticatedIdentity, id: i64) -> AppResult<Patient> {
        let scope = Predicate::tenant(&identity.hospital);
        match self.store.get_patient(id).await? {
            Some(patient) if scope.matches(&patient) => Ok(patient),
            _ => Err(AppError::NotFound(format!("patient with id {} not found", id))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchFilters;
    use crate::store::tests::{new_patient, seed};
    use crate::store::MemoryStore;

    fn identity(hospital: &str) -> AuthenticatedIdentity {
        AuthenticatedIdentity {
            user_id: 1,
            username: "walawala".to_string(),
            hospital: hospital.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_validates_before_insert() {
        let store = Arc::new(MemoryStore::new());
        let service = PatientService::new(store.clone());

        let err = service.create_patient(NewPatient::default()).await.unwrap_err();
        match err {
            AppError::Validation(messages) => assert_eq!(
                messages,
                vec!["national_id is required", "gender is required", "hospital is required"]
            ),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(store.find_patients(&Predicate::All(vec![])).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_national_id() {
        let service = PatientService::new(Arc::new(MemoryStore::new()));
        service
            .create_patient(new_patient("สมศักดิ์", "Somsak", "123456", "Bangkok Hospital"))
            .await
            .unwrap();
        let err = service
            .create_patient(new_patient("สมศักดิ์", "Somsak", "123456", "Bangkok Hospital"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Duplicate(ref m) if m == "national_id already exist"));
    }

    #[tokio::test]
    async fn test_search_uses_identity_scope() {
        let store = Arc::new(MemoryStore::new());
        seed(store.as_ref()).await;
        let service = PatientService::new(store);

        let query = SearchQuery::for_identity(&identity("bangkok hospital"), SearchFilters::default()).unwrap();
        let found = service.search_patients(&query).await.unwrap();
        let names: Vec<_> = found.iter().map(|p| p.first_name_en.as_str()).collect();
        assert_eq!(names, vec!["Somsak", "Kanchanok"]);
    }

    #[tokio::test]
    async fn test_find_by_id_is_tenant_scoped() {
        let store = Arc::new(MemoryStore::new());
        seed(store.as_ref()).await;
        let service = PatientService::new(store);

        // id 1 belongs to hua-hin hospital
        let own = service.find_by_id(&identity("HUA-HIN HOSPITAL"), 1).await.unwrap();
        assert_eq!(own.first_name_en, "Plabpluem");

        let err = service.find_by_id(&identity("Bangkok Hospital"), 1).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let err = service.find_by_id(&identity("Bangkok Hospital"), 99).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
