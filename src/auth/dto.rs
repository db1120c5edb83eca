use serde::{Deserialize, Serialize};

use crate::auth::repo::User;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub vorname: String,
    pub nachname: String,
    pub email: String,
    pub phone: String,
    pub geburtstag: String,
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for token refresh.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Profile edit: full replace of the mutable fields. A missing password
/// keeps the stored hash.
#[derive(Debug, Deserialize)]
pub struct UpdateMeRequest {
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub geburtstag: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Response returned after login, register or refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: PublicUser,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
    pub vorname: String,
    pub nachname: String,
    pub phone: String,
    pub geburtstag: String,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            vorname: u.vorname,
            nachname: u.nachname,
            phone: u.phone,
            geburtstag: u.geburtstag,
        }
    }
}
