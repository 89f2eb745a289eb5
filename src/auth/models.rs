//! Authentication data models
//!
//! Token issuance lives in the account-management service; this API only
//! validates tokens and resolves the caller's role.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// JWT claims structure
#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// User database model
#[derive(FromRow, Serialize, Deserialize, Debug)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
    pub created_at: Option<String>,
}

/// Caller role resolved during authentication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Admin,
    Hr,
    Partner,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Hr => "HR",
            UserRole::Partner => "PARTNER",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_uppercase().as_str() {
            "ADMIN" => Some(UserRole::Admin),
            "HR" => Some(UserRole::Hr),
            "PARTNER" => Some(UserRole::Partner),
            _ => None,
        }
    }
}
