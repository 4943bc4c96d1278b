//! Declarative request validation / 声明式参数校验
//!
//! A schema is a list of `{field, accessor, checks}` rules evaluated the same
//! way for every request type. All failures are collected, one message each.

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy)]
pub enum Check {
    /// Non-empty after trimming
    Required,
    /// Exact match against one of the allowed values
    OneOf(&'static [&'static str]),
}

pub struct FieldRule<T> {
    pub field: &'static str,
    pub value: fn(&T) -> &str,
    pub checks: &'static [Check],
}

impl<T> FieldRule<T> {
    pub fn new(field: &'static str, value: fn(&T) -> &str, checks: &'static [Check]) -> Self {
        Self { field, value, checks }
    }

    /// First failing check wins, so a missing field is not also reported as invalid
    fn evaluate(&self, target: &T) -> Option<String> {
        let value = (self.value)(target);
        for check in self.checks {
            match check {
                Check::Required if value.trim().is_empty() => {
                    return Some(format!("{} is required", self.field));
                }
                Check::OneOf(allowed) if !allowed.contains(&value) => {
                    return Some(format!("{} must be one of: {}", self.field, allowed.join(", ")));
                }
                _ => {}
            }
        }
        None
    }
}

pub trait Validate: Sized {
    fn schema() -> Vec<FieldRule<Self>>;

    fn validate(&self) -> AppResult<()> {
        let messages: Vec<String> = Self::schema()
            .iter()
            .filter_map(|rule| rule.evaluate(self))
            .collect();

        if messages.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(messages))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateStaffRequest, LoginRequest, NewPatient};

    fn messages(err: AppError) -> Vec<String> {
        match err {
            AppError::Validation(messages) => messages,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_collects_every_missing_field() {
        let err = CreateStaffRequest::default().validate().unwrap_err();
        assert_eq!(
            messages(err),
            vec!["username is required", "password is required", "hospital is required"]
        );
    }

    #[test]
    fn test_whitespace_counts_as_missing() {
        let req = LoginRequest { username: "   ".into(), password: "x".into() };
        assert_eq!(messages(req.validate().unwrap_err()), vec!["username is required"]);
    }

    #[test]
    fn test_one_of_rejects_unknown_gender() {
        let patient = NewPatient {
            national_id: "123".into(),
            gender: "unknown".into(),
            hospital: "Bangkok Hospital".into(),
            ..Default::default()
        };
        assert_eq!(
            messages(patient.validate().unwrap_err()),
            vec!["gender must be one of: male, female"]
        );
    }

    #[test]
    fn test_missing_gender_reported_once() {
        let patient = NewPatient {
            national_id: "123".into(),
            hospital: "Bangkok Hospital".into(),
            ..Default::default()
        };
        assert_eq!(messages(patient.validate().unwrap_err()), vec!["gender is required"]);
    }
}
