//! Wire types shared by the catalog API client.
//!
//! Every remote call is wrapped in [`ApiResponse`]. Field names follow the
//! API's camelCase JSON contract.

use serde::{Deserialize, Serialize};

/// Status code used for synthetic transport failures.
pub const NETWORK_ERROR_CODE: i32 = 500;

/// Status code used when authentication could not be recovered.
pub const AUTH_ERROR_CODE: i32 = 401;

// =============================================================================
// ENVELOPE
// =============================================================================

/// Uniform envelope around every API payload.
///
/// `result` is only meaningful when `has_error` is false. Synthetic error
/// envelopes produced by the client carry `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub result: Option<T>,
    #[serde(default)]
    pub has_error: bool,
    #[serde(default)]
    pub error_code: i32,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Build a successful envelope.
    #[must_use]
    pub fn ok(result: T) -> Self {
        Self { result: Some(result), has_error: false, error_code: 0, error_message: None }
    }

    /// Build an error envelope with no result.
    #[must_use]
    pub fn error(code: i32, message: impl Into<String>) -> Self {
        Self { result: None, has_error: true, error_code: code, error_message: Some(message.into()) }
    }

    /// Whether the call succeeded.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        !self.has_error
    }

    /// Take the result, discarding it when the envelope reports an error.
    #[must_use]
    pub fn into_result(self) -> Option<T> {
        if self.has_error { None } else { self.result }
    }
}

// =============================================================================
// AUTH
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token pair issued by login and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPasswordRequest {
    pub token: String,
    pub password: String,
    pub confirm_password: String,
}

// =============================================================================
// USERS & ROLES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    /// Numeric role id as enumerated by `GET /Role`.
    pub role: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
}

// =============================================================================
// PRODUCTS
// =============================================================================

/// Catalog product. The server assigns `id` and the audit fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_by: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Body of product create and update calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRequest {
    pub name: String,
    pub price: f64,
    pub quantity: i64,
}

/// One page of `GET /Product/GetPaged`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    #[serde(default)]
    pub items: Vec<Product>,
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub total_pages: u64,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
