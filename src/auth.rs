//! Bearer credentials / 访问令牌
//!
//! Tokens are compact HS256 JWTs. The signing secret and lifetime are handed
//! to `TokenSigner::new`; nothing in this module reads global state.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use base64::prelude::*;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::Staff;
use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

const BEARER: &str = "Bearer ";

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Token payload / 令牌载荷
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub user_id: i64,
    pub hospital: String,
    pub iat: i64,
    pub exp: i64,
}

/// Verified caller identity; the only source of a search's hospital scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    pub user_id: i64,
    pub username: String,
    pub hospital: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct TokenSigner {
    secret: Vec<u8>,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: impl AsRef<[u8]>, ttl: Duration) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            ttl,
        }
    }

    fn mac(&self) -> AppResult<HmacSha256> {
        HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid signing key: {}", e)))
    }

    pub fn issue(&self, staff: &Staff) -> AppResult<IssuedToken> {
        self.issue_at(staff, Utc::now())
    }

    pub fn issue_at(&self, staff: &Staff, now: DateTime<Utc>) -> AppResult<IssuedToken> {
        let expires_at = now + self.ttl;
        let claims = Claims {
            username: staff.username.clone(),
            user_id: staff.id,
            hospital: staff.hospital.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let header = Header { alg: "HS256".to_string(), typ: "JWT".to_string() };

        let header_json = serde_json::to_vec(&header).map_err(anyhow::Error::from)?;
        let claims_json = serde_json::to_vec(&claims).map_err(anyhow::Error::from)?;
        let signing_input = format!(
            "{}.{}",
            BASE64_URL_SAFE_NO_PAD.encode(header_json),
            BASE64_URL_SAFE_NO_PAD.encode(claims_json)
        );

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = BASE64_URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(IssuedToken {
            token: format!("{}.{}", signing_input, signature),
            expires_at,
        })
    }

    pub fn verify(&self, token: &str) -> AppResult<AuthenticatedIdentity> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> AppResult<AuthenticatedIdentity> {
        let mut parts = token.split('.');
        let (header_b64, claims_b64, signature_b64) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(h), Some(c), Some(s), None) => (h, c, s),
            _ => return Err(AppError::Credential("malformed token".to_string())),
        };

        let header: Header = decode_segment(header_b64)?;
        if header.alg != "HS256" {
            return Err(AppError::Credential(format!("unsupported algorithm {}", header.alg)));
        }

        let signature = BASE64_URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| AppError::Credential("malformed signature".to_string()))?;
        let mut mac = self.mac()?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AppError::Credential("bad signature".to_string()))?;

        let claims: Claims = decode_segment(claims_b64)?;
        if claims.exp <= now.timestamp() {
            return Err(AppError::Credential("token expired".to_string()));
        }

        Ok(AuthenticatedIdentity {
            user_id: claims.user_id,
            username: claims.username,
            hospital: claims.hospital,
        })
    }
}

fn decode_segment<T: serde::de::DeserializeOwned>(segment: &str) -> AppResult<T> {
    let bytes = BASE64_URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| AppError::Credential("malformed token segment".to_string()))?;
    serde_json::from_slice(&bytes)
        .map_err(|_| AppError::Credential("malformed token segment".to_string()))
}

/// Pull the token out of `Authorization: Bearer <token>`
pub fn extract_bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| {
            // auth scheme names are case-insensitive
            let scheme = value.get(..BEARER.len())?;
            scheme
                .eq_ignore_ascii_case(BEARER)
                .then(|| &value[BEARER.len()..])
        })
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthenticatedIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(parts)
            .ok_or_else(|| AppError::Credential("missing bearer token".to_string()))?;
        state.tokens.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staff() -> Staff {
        Staff {
            id: 7,
            username: "walawala12".to_string(),
            password_hash: String::new(),
            hospital: "Bangkok Hospital".to_string(),
            created_at: Utc::now(),
        }
    }

    fn signer() -> TokenSigner {
        TokenSigner::new("test-secret", Duration::hours(24))
    }

    #[test]
    fn test_issue_and_verify() {
        let issued = signer().issue(&staff()).unwrap();
        let identity = signer().verify(&issued.token).unwrap();
        assert_eq!(identity, AuthenticatedIdentity {
            user_id: 7,
            username: "walawala12".to_string(),
            hospital: "Bangkok Hospital".to_string(),
        });
    }

    #[test]
    fn test_token_valid_for_ttl() {
        let now = Utc::now();
        let issued = signer().issue_at(&staff(), now).unwrap();
        assert_eq!(issued.expires_at, now + Duration::hours(24));
        assert!(signer().verify_at(&issued.token, now + Duration::hours(23)).is_ok());
        let err = signer().verify_at(&issued.token, now + Duration::hours(24)).unwrap_err();
        assert!(matches!(err, AppError::Credential(_)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issued = signer().issue(&staff()).unwrap();
        let other = TokenSigner::new("another-secret", Duration::hours(24));
        assert!(matches!(other.verify(&issued.token), Err(AppError::Credential(_))));
    }

    #[test]
    fn test_tampered_claims_rejected() {
        let issued = signer().issue(&staff()).unwrap();
        let parts: Vec<&str> = issued.token.split('.').collect();
        let forged_claims = Claims {
            username: "walawala12".to_string(),
            user_id: 7,
            hospital: "hua-hin hospital".to_string(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 3600,
        };
        let forged = format!(
            "{}.{}.{}",
            parts[0],
            BASE64_URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged_claims).unwrap()),
            parts[2]
        );
        assert!(matches!(signer().verify(&forged), Err(AppError::Credential(_))));
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        for token in ["", "abc", "a.b", "a.b.c.d", "!!!.???.***"] {
            assert!(matches!(signer().verify(token), Err(AppError::Credential(_))), "token {:?}", token);
        }
    }

    #[test]
    fn test_extract_bearer_token() {
        let (parts, _) = axum::http::Request::builder()
            .header(AUTHORIZATION, "Bearer abc.def.ghi")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(extract_bearer_token(&parts), Some("abc.def.ghi"));

        for header in ["bearer abc.def.ghi", "BEARER abc.def.ghi", "bEaReR abc.def.ghi"] {
            let (parts, _) = axum::http::Request::builder()
                .header(AUTHORIZATION, header)
                .body(())
                .unwrap()
                .into_parts();
            assert_eq!(extract_bearer_token(&parts), Some("abc.def.ghi"), "header {:?}", header);
        }

        let (parts, _) = axum::http::Request::builder()
            .header(AUTHORIZATION, "Bear")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(extract_bearer_token(&parts), None);

        let (parts, _) = axum::http::Request::builder()
            .header(AUTHORIZATION, "Basic dXNlcg==")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(extract_bearer_token(&parts), None);
    }
}
