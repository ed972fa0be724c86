//! Client-side validation of form submissions.
//!
//! Every form turns raw text fields into the request body it submits, or a
//! [`ValidationError`] that blocks the submission before any network call.
//! Numbers are parsed strictly: surrounding whitespace is ignored, anything
//! else that is not a complete number is rejected.

use crate::net::types::{
    CreateUserRequest, ForgotPasswordRequest, LoginRequest, Product, ProductRequest, SetPasswordRequest,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("All fields are required")]
    Required(&'static str),
    #[error("Price must be a positive number")]
    InvalidPrice,
    #[error("Quantity must be a non-negative integer")]
    InvalidQuantity,
    #[error("Role must be a numeric role id")]
    InvalidRole,
    #[error("The password reset link is invalid or has expired")]
    InvalidLink,
    #[error("Passwords do not match")]
    PasswordMismatch,
}

impl ValidationError {
    /// Field the error refers to, if any.
    #[must_use]
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Required(field) => Some(field),
            Self::InvalidPrice => Some("price"),
            Self::InvalidQuantity => Some("quantity"),
            Self::InvalidRole => Some("role"),
            Self::InvalidLink => Some("token"),
            Self::PasswordMismatch => Some("confirmPassword"),
        }
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() { Err(ValidationError::Required(field)) } else { Ok(trimmed) }
}

// =============================================================================
// PRODUCT
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
    pub quantity: String,
}

impl ProductForm {
    /// Prefill from an existing product for editing.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self { name: product.name.clone(), price: product.price.to_string(), quantity: product.quantity.to_string() }
    }

    /// # Errors
    ///
    /// Returns the first failing rule: missing field, then price, then quantity.
    pub fn validate(&self) -> Result<ProductRequest, ValidationError> {
        let name = required("name", &self.name)?;
        let price = required("price", &self.price)?;
        let quantity = required("quantity", &self.quantity)?;

        let price = price
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite() && *p > 0.0)
            .ok_or(ValidationError::InvalidPrice)?;
        let quantity = quantity
            .parse::<i64>()
            .ok()
            .filter(|q| *q >= 0)
            .ok_or(ValidationError::InvalidQuantity)?;

        Ok(ProductRequest { name: name.to_owned(), price, quantity })
    }
}

// =============================================================================
// USERS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewUserForm {
    pub name: String,
    pub email: String,
    /// Role id as text, as picked from the role list.
    pub role: String,
}

impl NewUserForm {
    /// # Errors
    ///
    /// Returns an error when a field is blank or the role is not an id.
    pub fn validate(&self) -> Result<CreateUserRequest, ValidationError> {
        let name = required("name", &self.name)?;
        let email = required("email", &self.email)?;
        let role = required("role", &self.role)?;
        let role = role.parse::<i64>().map_err(|_| ValidationError::InvalidRole)?;
        Ok(CreateUserRequest { email: email.to_owned(), name: name.to_owned(), role })
    }
}

// =============================================================================
// PASSWORDS & LOGIN
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetPasswordForm {
    /// Reset token from the emailed link.
    pub token: Option<String>,
    pub password: String,
    pub confirm_password: String,
}

impl SetPasswordForm {
    /// # Errors
    ///
    /// Returns an error when the link carries no token, a password is blank,
    /// or the confirmation differs.
    pub fn validate(&self) -> Result<SetPasswordRequest, ValidationError> {
        let token = self
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ValidationError::InvalidLink)?;
        if self.password.is_empty() {
            return Err(ValidationError::Required("password"));
        }
        if self.confirm_password.is_empty() {
            return Err(ValidationError::Required("confirmPassword"));
        }
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(SetPasswordRequest {
            token: token.to_owned(),
            password: self.password.clone(),
            confirm_password: self.confirm_password.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    /// # Errors
    ///
    /// Returns an error when either field is blank.
    pub fn validate(&self) -> Result<LoginRequest, ValidationError> {
        let email = required("email", &self.email)?;
        if self.password.is_empty() {
            return Err(ValidationError::Required("password"));
        }
        Ok(LoginRequest { email: email.to_owned(), password: self.password.clone() })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForgotPasswordForm {
    pub email: String,
}

impl ForgotPasswordForm {
    /// # Errors
    ///
    /// Returns an error when the email is blank.
    pub fn validate(&self) -> Result<ForgotPasswordRequest, ValidationError> {
        let email = required("email", &self.email)?;
        Ok(ForgotPasswordRequest { email: email.to_owned() })
    }
}

#[cfg(test)]
#[path = "forms_test.rs"]
mod tests;
