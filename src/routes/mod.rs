//! Application routes and their access rules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Routes are the units the guard protects. The CLI maps each command onto
//! one of them so the same checks apply whether a page or a command is
//! being opened.

pub mod guard;

use crate::roles::ADMIN_ROLES;

pub const LOGIN_PATH: &str = "/login";
pub const FORGOT_PASSWORD_PATH: &str = "/forgot-password";
pub const SET_PASSWORD_PATH: &str = "/set-password";
pub const PRODUCTS_PATH: &str = "/products";
pub const USERS_NEW_PATH: &str = "/users/new";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

const NEW_PRODUCT_ID: &str = "new";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    ForgotPassword,
    SetPassword,
    /// Product list. Default landing page after login.
    Products,
    NewProduct,
    ProductDetail(String),
    NewUser,
    Unauthorized,
}

impl Route {
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Login => LOGIN_PATH.to_owned(),
            Self::ForgotPassword => FORGOT_PASSWORD_PATH.to_owned(),
            Self::SetPassword => SET_PASSWORD_PATH.to_owned(),
            Self::Products => PRODUCTS_PATH.to_owned(),
            Self::NewProduct => format!("{PRODUCTS_PATH}/{NEW_PRODUCT_ID}"),
            Self::ProductDetail(id) => format!("{PRODUCTS_PATH}/{id}"),
            Self::NewUser => USERS_NEW_PATH.to_owned(),
            Self::Unauthorized => UNAUTHORIZED_PATH.to_owned(),
        }
    }

    /// Parse a path (query string ignored) into a route.
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        let path = strip_query(path).trim_end_matches('/');
        match path {
            LOGIN_PATH => Some(Self::Login),
            FORGOT_PASSWORD_PATH => Some(Self::ForgotPassword),
            SET_PASSWORD_PATH => Some(Self::SetPassword),
            PRODUCTS_PATH => Some(Self::Products),
            USERS_NEW_PATH => Some(Self::NewUser),
            UNAUTHORIZED_PATH => Some(Self::Unauthorized),
            _ => {
                let id = path.strip_prefix(PRODUCTS_PATH)?.strip_prefix('/')?;
                if id.is_empty() || id.contains('/') {
                    None
                } else if id == NEW_PRODUCT_ID {
                    Some(Self::NewProduct)
                } else {
                    Some(Self::ProductDetail(id.to_owned()))
                }
            }
        }
    }

    /// Roles allowed to open the route, or `None` for any signed-in user.
    #[must_use]
    pub fn allowed_roles(&self) -> Option<&'static [&'static str]> {
        match self {
            Self::NewProduct | Self::ProductDetail(_) | Self::NewUser => Some(ADMIN_ROLES),
            _ => None,
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

/// Entry points reachable without a session.
#[must_use]
pub fn is_public_path(path: &str) -> bool {
    let path = strip_query(path);
    path == LOGIN_PATH || path == FORGOT_PASSWORD_PATH || path.starts_with(SET_PASSWORD_PATH)
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
