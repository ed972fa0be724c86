//! HTTP plumbing for the catalog API: wire types, the transport seam, the
//! envelope-returning client and single-flight token refresh.

pub mod client;
pub mod refresh;
pub mod transport;
pub mod types;

// =============================================================================
// Endpoints (relative to the API base URL)
// =============================================================================

pub const LOGIN_ENDPOINT: &str = "/User/Login";
pub const REFRESH_TOKEN_ENDPOINT: &str = "/User/RefreshToken";
pub const LOGOUT_ENDPOINT: &str = "/User/Logout";
pub const FORGOT_PASSWORD_ENDPOINT: &str = "/User/forgot-password";
pub const SET_PASSWORD_ENDPOINT: &str = "/User/set-password";
pub const USERS_ENDPOINT: &str = "/User";
pub const ROLES_ENDPOINT: &str = "/Role";
pub const PRODUCTS_ENDPOINT: &str = "/Product";
pub const PRODUCTS_PAGED_ENDPOINT: &str = "/Product/GetPaged";
