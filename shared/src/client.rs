//! Client-facing request/response DTOs

use serde::{Deserialize, Serialize};

use crate::models::UserInfo;

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// JWT bearer token
    pub token: String,
    pub user: UserInfo,
}
