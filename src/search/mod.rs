//! Patient search - compiles a tenant-scoped query into a predicate / 患者搜索模块
//!
//! Architecture principles / 架构原则：
//! - `SearchQuery` is built once per request; the hospital scope comes from the
//!   verified credential, never from request parameters
//! - `Predicate::compile` is a pure transformation and cannot fail
//! - A predicate is evaluated either in Rust (`matches`) or rendered to SQL
//!   (`to_sql`); both paths share the same lower-casing rules
//!
//! Matching rules / 匹配规则：
//! - identifiers and contact fields: case-insensitive substring
//! - name parts: substring on the Thai OR English variant, parts ANDed together
//! - hospital: case-insensitive equality, always present

pub mod predicate;
pub mod schema;
pub mod sql;

pub use predicate::Predicate;
pub use schema::{PatientField, SearchFilters, SearchQuery};
pub use sql::SqlFragment;

/// Per-character lowercase, independent of word position (a final capital
/// sigma folds to `σ`, not `ς`). Used for needles, stored shadow columns and
/// in-memory comparisons alike.
pub fn fold_case(value: &str) -> String {
    value.chars().flat_map(char::to_lowercase).collect()
}
