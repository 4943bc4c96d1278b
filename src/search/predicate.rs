//! Search predicate builder / 搜索条件构建
//!
//! Shape of a compiled query:
//!
//! ```text
//! hospital = scope
//!   AND national_id ⊇ q ...
//!   AND (first_name_th ⊇ q OR first_name_en ⊇ q)
//!   AND (last_name_th ⊇ q OR last_name_en ⊇ q) ...
//! ```

use chrono::NaiveDate;

use super::fold_case;
use super::schema::{PatientField, SearchQuery};
use crate::models::Patient;

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Every child holds; empty means true
    All(Vec<Predicate>),
    /// At least one child holds; empty means false
    Any(Vec<Predicate>),
    /// Lower-cased stored value contains `needle` (already lower-cased)
    Contains { field: PatientField, needle: String },
    /// Lower-cased stored value equals `value` (already lower-cased)
    Equals { field: PatientField, value: String },
    /// Stored date of birth falls on this UTC calendar date
    BornOn(NaiveDate),
}

impl Predicate {
    /// Tenant condition: exact, case-insensitive hospital match
    pub fn tenant(hospital: &str) -> Self {
        Predicate::Equals {
            field: PatientField::Hospital,
            value: fold_case(hospital),
        }
    }

    pub fn contains(field: PatientField, needle: &str) -> Self {
        Predicate::Contains {
            field,
            needle: fold_case(needle),
        }
    }

    /// Thai OR English variant of one name part
    pub fn bilingual(th: PatientField, en: PatientField, needle: &str) -> Self {
        Predicate::Any(vec![
            Predicate::contains(th, needle),
            Predicate::contains(en, needle),
        ])
    }

    /// Compile a query. The tenant condition always comes first and is never
    /// omitted, whatever else the query carries.
    pub fn compile(query: &SearchQuery) -> Self {
        let mut conditions = vec![Predicate::tenant(query.hospital())];

        let substring_fields = [
            (PatientField::NationalId, query.national_id()),
            (PatientField::PassportId, query.passport_id()),
            (PatientField::PhoneNumber, query.phone_number()),
            (PatientField::Email, query.email()),
        ];
        for (field, needle) in substring_fields {
            if let Some(needle) = needle {
                conditions.push(Predicate::contains(field, needle));
            }
        }

        let name_parts = [
            (PatientField::FirstNameTh, PatientField::FirstNameEn, query.first_name()),
            (PatientField::MiddleNameTh, PatientField::MiddleNameEn, query.middle_name()),
            (PatientField::LastNameTh, PatientField::LastNameEn, query.last_name()),
        ];
        for (th, en, needle) in name_parts {
            if let Some(needle) = needle {
                conditions.push(Predicate::bilingual(th, en, needle));
            }
        }

        if let Some(date) = query.date_of_birth() {
            conditions.push(Predicate::BornOn(date));
        }

        Predicate::All(conditions)
    }

    /// Evaluate against one candidate record
    pub fn matches(&self, patient: &Patient) -> bool {
        match self {
            Predicate::All(children) => children.iter().all(|p| p.matches(patient)),
            Predicate::Any(children) => children.iter().any(|p| p.matches(patient)),
            Predicate::Contains { field, needle } => {
                fold_case(field.value(patient)).contains(needle.as_str())
            }
            Predicate::Equals { field, value } => fold_case(field.value(patient)) == *value,
            Predicate::BornOn(date) => patient
                .date_of_birth
                .map(|dob| dob.date_naive() == *date)
                .unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchFilters;
    use chrono::{TimeZone, Utc};

    fn patient(id: i64, first_th: &str, first_en: &str, last_en: &str, hospital: &str) -> Patient {
        Patient {
            id,
            first_name_th: first_th.to_string(),
            middle_name_th: "-".to_string(),
            last_name_th: String::new(),
            first_name_en: first_en.to_string(),
            middle_name_en: "D".to_string(),
            last_name_en: last_en.to_string(),
            date_of_birth: Some(Utc.with_ymd_and_hms(1995, 7, 21, 0, 0, 0).unwrap()),
            patient_hn: format!("HN{:05}", id),
            national_id: format!("89058905{:04}", id),
            passport_id: String::new(),
            phone_number: "0812345678".to_string(),
            email: format!("{}@Example.com", first_en),
            gender: "male".to_string(),
            hospital: hospital.to_string(),
            created_at: Utc::now(),
        }
    }

    fn query(hospital: &str, filters: SearchFilters) -> Predicate {
        Predicate::compile(&SearchQuery::new(hospital, filters).unwrap())
    }

    #[test]
    fn test_empty_query_is_tenant_only() {
        let predicate = query("Bangkok Hospital", SearchFilters::default());
        assert_eq!(
            predicate,
            Predicate::All(vec![Predicate::tenant("bangkok hospital")])
        );
    }

    #[test]
    fn test_tenant_is_exact_and_case_insensitive() {
        let p = patient(1, "สมศักดิ์", "Somsak", "Chunsri", "Bangkok Hospital");
        assert!(query("BANGKOK HOSPITAL", SearchFilters::default()).matches(&p));
        assert!(query("bangkok hospital", SearchFilters::default()).matches(&p));
        assert!(!query("Bangkok", SearchFilters::default()).matches(&p));
        assert!(!query("Bangkok Hospital 2", SearchFilters::default()).matches(&p));
    }

    #[test]
    fn test_other_tenant_never_matches() {
        let p = patient(1, "ปลาบปลื้ม", "Plabpluem", "Yodchan", "hua-hin hospital");
        let filters = SearchFilters {
            first_name: Some("Plabpluem".to_string()),
            national_id: Some(p.national_id.clone()),
            ..Default::default()
        };
        assert!(query("hua-hin hospital", filters.clone()).matches(&p));
        assert!(!query("Bangkok Hospital", filters).matches(&p));
    }

    #[test]
    fn test_substring_is_case_insensitive() {
        let p = patient(1, "ปลาบปลื้ม", "Plabpluem", "Yodchan", "hua-hin hospital");
        for needle in ["PLUEM", "pluem", "PlUeM"] {
            let filters = SearchFilters { first_name: Some(needle.to_string()), ..Default::default() };
            assert!(query("hua-hin hospital", filters).matches(&p), "needle {}", needle);
        }
        let email = SearchFilters { email: Some("EXAMPLE.COM".to_string()), ..Default::default() };
        assert!(query("hua-hin hospital", email).matches(&p));
    }

    #[test]
    fn test_name_matches_either_script() {
        let p = patient(3, "กัญชนก", "Kanchanok", "Chunsri", "Bangkok Hospital");
        let thai = SearchFilters { first_name: Some("กัญชนก".to_string()), ..Default::default() };
        let english = SearchFilters { first_name: Some("kanch".to_string()), ..Default::default() };
        assert!(query("Bangkok Hospital", thai).matches(&p));
        assert!(query("Bangkok Hospital", english).matches(&p));
    }

    #[test]
    fn test_name_parts_are_anded() {
        let somsak = patient(2, "สมศักดิ์", "Somsak", "Chunsri", "Bangkok Hospital");
        let other = patient(4, "สมหญิง", "Somying", "Yodchan", "Bangkok Hospital");
        let filters = SearchFilters {
            first_name: Some("Som".to_string()),
            last_name: Some("Chunsri".to_string()),
            ..Default::default()
        };
        let predicate = query("Bangkok Hospital", filters);
        assert!(predicate.matches(&somsak));
        assert!(!predicate.matches(&other));
    }

    #[test]
    fn test_each_name_part_uses_its_own_value() {
        let p = patient(2, "สมศักดิ์", "Somsak", "Chunsri", "Bangkok Hospital");
        // last_name "Somsak" must be compared against last names, not first names
        let filters = SearchFilters { last_name: Some("Somsak".to_string()), ..Default::default() };
        assert!(!query("Bangkok Hospital", filters).matches(&p));
        let middle = SearchFilters { middle_name: Some("d".to_string()), ..Default::default() };
        assert!(query("Bangkok Hospital", middle).matches(&p));
    }

    #[test]
    fn test_date_of_birth_filter() {
        let p = patient(1, "สมศักดิ์", "Somsak", "Chunsri", "Bangkok Hospital");
        let same = SearchFilters { date_of_birth: Some("1995-07-21".to_string()), ..Default::default() };
        let other = SearchFilters { date_of_birth: Some("1995-07-22".to_string()), ..Default::default() };
        assert!(query("Bangkok Hospital", same.clone()).matches(&p));
        assert!(!query("Bangkok Hospital", other).matches(&p));

        let mut unknown = p.clone();
        unknown.date_of_birth = None;
        assert!(!query("Bangkok Hospital", same).matches(&unknown));
    }

    #[test]
    fn test_compiled_shape() {
        let filters = SearchFilters {
            first_name: Some("Som".to_string()),
            phone_number: Some("0812".to_string()),
            ..Default::default()
        };
        assert_eq!(
            query("Bangkok Hospital", filters),
            Predicate::All(vec![
                Predicate::tenant("Bangkok Hospital"),
                Predicate::contains(PatientField::PhoneNumber, "0812"),
                Predicate::bilingual(PatientField::FirstNameTh, PatientField::FirstNameEn, "som"),
            ])
        );
    }
}
