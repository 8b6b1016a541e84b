// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Maps the `user_role` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Superuser,
    Admin,
    Manager,
    Sales,
    /// Assigns inquiry items to costing users.
    Vpp,
    /// Costs the items assigned to them.
    Vp,
    Tech,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    #[schema(example = "maria@example.com")]
    pub email: String,
    #[schema(example = "Maria Silva")]
    pub name: String,
    pub role: Role,

    #[serde(skip_serializing)] // never leaves the server
    #[schema(ignore)]
    pub password_hash: String,

    pub is_active: bool,
    #[schema(example = "en")]
    pub preferred_language: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(email(message = "invalid_email"))]
    #[schema(example = "maria@example.com")]
    pub email: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Maria Silva")]
    pub name: String,

    #[validate(length(min = 6, message = "password_too_short"))]
    pub password: String,

    // Defaults to SALES when omitted.
    pub role: Option<Role>,

    #[schema(example = "de")]
    pub preferred_language: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginUserPayload {
    #[validate(email(message = "invalid_email"))]
    pub email: String,
    #[validate(length(min = 6, message = "password_too_short"))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// Claims carried inside the JWT. The role is re-read from the database on
// every request, so a stale token cannot keep an old role alive.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: usize,
    pub iat: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_screaming_snake_case() {
        assert_eq!(serde_json::to_string(&Role::Vpp).unwrap(), "\"VPP\"");
        assert_eq!(
            serde_json::to_string(&Role::Superuser).unwrap(),
            "\"SUPERUSER\""
        );
        let parsed: Role = serde_json::from_str("\"MANAGER\"").unwrap();
        assert_eq!(parsed, Role::Manager);
    }
}
