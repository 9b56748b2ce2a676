use crate::errors::Result;
use crate::validation::FieldValidator;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "alice")]
    pub username: Option<String>,
    #[schema(example = "correct horse battery")]
    pub password: Option<String>,
    #[schema(example = "alice@example.com")]
    pub email: Option<String>,
}

/// A registration that passed field validation.
#[derive(Debug, Clone)]
pub struct ValidRegistration {
    pub username: String,
    pub password: String,
    pub email: String,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<ValidRegistration> {
        let mut v = FieldValidator::new();
        let username = self.username.map(|u| u.trim().to_string()).filter(|u| !u.is_empty());
        let password = self.password.filter(|p| !p.is_empty());
        v.require("username", username.as_ref());
        v.require("password", password.as_ref());
        v.text("username", username.as_deref());
        v.text("email", self.email.as_deref());
        if let Some(u) = &username
            && u.chars().count() > 150
        {
            v.add("username", "Ensure this field has no more than 150 characters.");
        }
        v.finish()?;

        Ok(ValidRegistration {
            username: username.unwrap_or_default(),
            password: password.unwrap_or_default(),
            email: self.email.map(|e| e.trim().to_string()).unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "alice")]
    pub username: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// Both fields must be present; returns `(username, password)`.
    pub fn validate(self) -> Result<(String, String)> {
        let mut v = FieldValidator::new();
        let username = self.username.map(|u| u.trim().to_string()).filter(|u| !u.is_empty());
        let password = self.password.filter(|p| !p.is_empty());
        v.require("username", username.as_ref());
        v.require("password", password.as_ref());
        v.text("username", username.as_deref());
        v.finish()?;
        Ok((username.unwrap_or_default(), password.unwrap_or_default()))
    }
}

/// Returned by register and login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub message: String,
    /// Send as `Authorization: Token <token>` on every other request
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}
