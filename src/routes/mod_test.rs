use super::*;

// =============================================================================
// Route::path / Route::parse
// =============================================================================

#[test]
fn paths_parse_back_to_routes() {
    for route in [
        Route::Login,
        Route::ForgotPassword,
        Route::SetPassword,
        Route::Products,
        Route::NewProduct,
        Route::ProductDetail("42".into()),
        Route::NewUser,
        Route::Unauthorized,
    ] {
        assert_eq!(Route::parse(&route.path()), Some(route.clone()), "route {route}");
    }
}

#[test]
fn parse_ignores_query_and_trailing_slash() {
    assert_eq!(Route::parse("/set-password?token=abc"), Some(Route::SetPassword));
    assert_eq!(Route::parse("/products/"), Some(Route::Products));
}

#[test]
fn parse_rejects_unknown_paths() {
    assert_eq!(Route::parse("/"), None);
    assert_eq!(Route::parse("/products/1/edit"), None);
    assert_eq!(Route::parse("/admin"), None);
}

// =============================================================================
// allowed_roles
// =============================================================================

#[test]
fn product_editing_and_user_creation_are_admin_only() {
    assert_eq!(Route::NewProduct.allowed_roles(), Some(ADMIN_ROLES));
    assert_eq!(Route::ProductDetail("1".into()).allowed_roles(), Some(ADMIN_ROLES));
    assert_eq!(Route::NewUser.allowed_roles(), Some(ADMIN_ROLES));
    assert_eq!(Route::Products.allowed_roles(), None);
}

// =============================================================================
// is_public_path
// =============================================================================

#[test]
fn public_entry_points() {
    assert!(is_public_path("/login"));
    assert!(is_public_path("/forgot-password"));
    assert!(is_public_path("/set-password"));
    assert!(is_public_path("/set-password?token=xyz"));
}

#[test]
fn protected_paths_are_not_public() {
    assert!(!is_public_path("/products"));
    assert!(!is_public_path("/users/new"));
    assert!(!is_public_path("/unauthorized"));
    assert!(!is_public_path("/login/extra"));
}
