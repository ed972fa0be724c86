use super::*;

fn product(name: &str, price: &str, quantity: &str) -> ProductForm {
    ProductForm { name: name.into(), price: price.into(), quantity: quantity.into() }
}

// =============================================================================
// ProductForm
// =============================================================================

#[test]
fn valid_product_is_converted() {
    let request = product("Widget", "9.99", "3").validate().unwrap();
    assert_eq!(request, ProductRequest { name: "Widget".into(), price: 9.99, quantity: 3 });
}

#[test]
fn non_positive_price_rejected() {
    assert_eq!(product("Widget", "-5", "3").validate(), Err(ValidationError::InvalidPrice));
    assert_eq!(product("Widget", "0", "3").validate(), Err(ValidationError::InvalidPrice));
}

#[test]
fn negative_quantity_rejected() {
    assert_eq!(product("Widget", "9.99", "-1").validate(), Err(ValidationError::InvalidQuantity));
}

#[test]
fn zero_quantity_accepted() {
    assert_eq!(product("Widget", "1", "0").validate().unwrap().quantity, 0);
}

#[test]
fn malformed_numbers_rejected() {
    assert_eq!(product("Widget", "9.99abc", "3").validate(), Err(ValidationError::InvalidPrice));
    assert_eq!(product("Widget", "NaN", "3").validate(), Err(ValidationError::InvalidPrice));
    assert_eq!(product("Widget", "inf", "3").validate(), Err(ValidationError::InvalidPrice));
    assert_eq!(product("Widget", "9.99", "3.5").validate(), Err(ValidationError::InvalidQuantity));
    assert_eq!(product("Widget", "9.99", "three").validate(), Err(ValidationError::InvalidQuantity));
}

#[test]
fn blank_fields_required() {
    assert_eq!(product("  ", "1", "1").validate(), Err(ValidationError::Required("name")));
    assert_eq!(product("Widget", "", "1").validate(), Err(ValidationError::Required("price")));
    assert_eq!(product("Widget", "1", " ").validate(), Err(ValidationError::Required("quantity")));
}

#[test]
fn whitespace_is_trimmed() {
    let request = product(" Widget ", " 2.50 ", " 7 ").validate().unwrap();
    assert_eq!(request.name, "Widget");
    assert!((request.price - 2.5).abs() < f64::EPSILON);
    assert_eq!(request.quantity, 7);
}

#[test]
fn prefill_round_trips_through_validation() {
    let existing = Product {
        id: "p1".into(),
        name: "Widget".into(),
        price: 12.5,
        quantity: 4,
        created_by: None,
        created_at: None,
        updated_by: None,
        updated_at: None,
    };
    let request = ProductForm::from_product(&existing).validate().unwrap();
    assert_eq!(request, ProductRequest { name: "Widget".into(), price: 12.5, quantity: 4 });
}

// =============================================================================
// NewUserForm
// =============================================================================

#[test]
fn new_user_requires_numeric_role() {
    let form = NewUserForm { name: "Bob".into(), email: "bob@example.com".into(), role: "Admin".into() };
    assert_eq!(form.validate(), Err(ValidationError::InvalidRole));

    let form = NewUserForm { role: "2".into(), ..form };
    assert_eq!(
        form.validate().unwrap(),
        CreateUserRequest { email: "bob@example.com".into(), name: "Bob".into(), role: 2 }
    );
}

#[test]
fn new_user_requires_all_fields() {
    let form = NewUserForm { name: "Bob".into(), email: String::new(), role: "2".into() };
    assert_eq!(form.validate(), Err(ValidationError::Required("email")));
    assert_eq!(form.validate().unwrap_err().to_string(), "All fields are required");
}

// =============================================================================
// SetPasswordForm
// =============================================================================

#[test]
fn set_password_needs_token() {
    let form = SetPasswordForm { token: None, password: "pw".into(), confirm_password: "pw".into() };
    assert_eq!(form.validate(), Err(ValidationError::InvalidLink));

    let form = SetPasswordForm { token: Some("  ".into()), ..form };
    assert_eq!(form.validate(), Err(ValidationError::InvalidLink));
}

#[test]
fn set_password_needs_matching_confirmation() {
    let form = SetPasswordForm { token: Some("t".into()), password: "pw1".into(), confirm_password: "pw2".into() };
    assert_eq!(form.validate(), Err(ValidationError::PasswordMismatch));
    assert_eq!(form.validate().unwrap_err().field(), Some("confirmPassword"));
}

#[test]
fn set_password_valid() {
    let form = SetPasswordForm { token: Some("t".into()), password: "pw".into(), confirm_password: "pw".into() };
    let request = form.validate().unwrap();
    assert_eq!(request.token, "t");
    assert_eq!(request.confirm_password, "pw");
}

// =============================================================================
// Login / ForgotPassword
// =============================================================================

#[test]
fn login_requires_both_fields() {
    let form = LoginForm { email: "ada@example.com".into(), password: String::new() };
    assert_eq!(form.validate(), Err(ValidationError::Required("password")));

    let form = LoginForm { email: " ".into(), password: "pw".into() };
    assert_eq!(form.validate(), Err(ValidationError::Required("email")));
}

#[test]
fn login_keeps_password_verbatim() {
    let form = LoginForm { email: " ada@example.com ".into(), password: " pw ".into() };
    let request = form.validate().unwrap();
    assert_eq!(request.email, "ada@example.com");
    assert_eq!(request.password, " pw ");
}

#[test]
fn forgot_password_requires_email() {
    assert_eq!(ForgotPasswordForm::default().validate(), Err(ValidationError::Required("email")));
    assert_eq!(
        ForgotPasswordForm { email: "ada@example.com".into() }.validate().unwrap().email,
        "ada@example.com"
    );
}
