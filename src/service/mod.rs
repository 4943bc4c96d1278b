//! Business operations on top of a `RecordStore` / 业务服务层

pub mod patient;
pub mod staff;

pub use patient::PatientService;
pub use staff::{LoginOutcome, StaffService};
