use serde::Serialize;
use std::sync::Arc;

use crate::auth::{IssuedToken, TokenSigner};
use crate::error::{AppError, AppResult};
use crate::models::{CreateStaffRequest, LoginRequest, NewStaff, Staff};
use crate::store::RecordStore;
use crate::validation::Validate;

/// Successful login / 登录结果
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    #[serde(flatten)]
    pub token: IssuedToken,
    pub staff: Staff,
}

#[derive(Clone)]
pub struct StaffService {
    store: Arc<dyn RecordStore>,
    tokens: Arc<TokenSigner>,
    bcrypt_cost: u32,
}

impl StaffService {
    pub fn new(store: Arc<dyn RecordStore>, tokens: Arc<TokenSigner>, bcrypt_cost: u32) -> Self {
        Self { store, tokens, bcrypt_cost }
    }

    /// Register a staff account; username must be unused
    pub async fn create_staff(&self, req: CreateStaffRequest) -> AppResult<Staff> {
        req.validate()?;

        // 先检查一次，避免为已存在的用户名做无谓的 bcrypt 计算；真正的唯一性由存储层保证
        if self.store.find_staff_by_username(&req.username).await?.is_some() {
            return Err(AppError::Duplicate("username already exist".to_string()));
        }

        let password_hash = bcrypt::hash(&req.password, self.bcrypt_cost)?;
        let staff = NewStaff {
            username: req.username,
            password_hash,
            hospital: req.hospital,
        };

        match self.store.insert_staff(staff).await? {
            Some(created) => {
                tracing::info!("Staff created: {} ({})", created.username, created.hospital);
                Ok(created)
            }
            None => Err(AppError::Duplicate("username already exist".to_string())),
        }
    }

    /// Check credentials and issue a bearer token carrying the staff's hospital
    pub async fn login(&self, req: LoginRequest) -> AppResult<LoginOutcome> {
        req.validate()?;

        let staff = self
            .store
            .find_staff_by_username(&req.username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user with username {} not found", req.username)))?;

        if !bcrypt::verify(&req.password, &staff.password_hash)? {
            tracing::warn!("Login failed for {}: password mismatch", staff.username);
            return Err(AppError::PasswordMismatch);
        }

        let token = self.tokens.issue(&staff)?;
        tracing::info!("Staff logged in: {}", staff.username);
        Ok(LoginOutcome { token, staff })
    }
}
