use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public account fields, safe to embed in any response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
    pub phone: Option<String>,
}

/// Request body for signup. Fields are optional on the wire so presence
/// can be validated explicitly rather than failing deserialization.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response returned after signup. Never carries the hash.
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub id: Uuid,
    pub email: String,
    pub account: Account,
    pub token: String,
}

/// Response returned after login.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    pub account: Account,
    pub token: String,
}
