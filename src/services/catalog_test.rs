use reqwest::Method;
use serde_json::json;

use super::*;
use crate::test_helpers::{MockTransport, error_envelope, ok, solo_tab};

fn product_json(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": "Widget",
        "price": 9.99,
        "quantity": 3,
        "createdBy": "ada",
        "createdAt": "2024-05-01T10:00:00Z",
        "updatedBy": "ada",
        "updatedAt": "2024-05-02T10:00:00Z"
    })
}

// =============================================================================
// total_pages / PageQuery
// =============================================================================

#[test]
fn total_pages_rounds_up() {
    assert_eq!(total_pages(95, 10), 10);
    assert_eq!(total_pages(100, 10), 10);
    assert_eq!(total_pages(101, 10), 11);
    assert_eq!(total_pages(0, 10), 0);
}

#[test]
fn total_pages_zero_page_size() {
    assert_eq!(total_pages(95, 0), 0);
}

#[test]
fn page_query_defaults() {
    let query = PageQuery::default();
    assert_eq!(query.page, 1);
    assert_eq!(query.page_size, 10);
    assert!(query.search.is_empty());
    assert_eq!(query.endpoint(), "/Product/GetPaged?page=1&pageSize=10&search=");
}

#[test]
fn new_search_resets_page() {
    let query = PageQuery::default().with_page(4).with_search("blue widget");
    assert_eq!(query.page, 1);
    assert_eq!(query.endpoint(), "/Product/GetPaged?page=1&pageSize=10&search=blue+widget");
}

#[test]
fn search_is_url_encoded() {
    let query = PageQuery::default().with_search("a&b=c");
    assert!(query.endpoint().ends_with("search=a%26b%3Dc"));
}

#[test]
fn page_zero_is_clamped() {
    assert_eq!(PageQuery::default().with_page(0).page, 1);
}

#[test]
fn default_role_is_first_listed() {
    let roles = vec![Role { id: 3, name: "Viewer".into() }, Role { id: 1, name: "Admin".into() }];
    assert_eq!(default_role_id(&roles), Some(3));
    assert_eq!(default_role_id(&[]), None);
}

// =============================================================================
// ProductService
// =============================================================================

#[tokio::test]
async fn get_fetches_by_id() {
    let transport = MockTransport::new(|_| ok(product_json("p1")));
    let tab = solo_tab(transport.clone());

    let product = ProductService::new(tab.client.clone()).get("p1").await.into_result().unwrap();

    assert_eq!(product.name, "Widget");
    assert_eq!(product.created_by.as_deref(), Some("ada"));
    let sent = transport.requests();
    assert_eq!(sent[0].method, Method::GET);
    assert_eq!(sent[0].url, "http://api.test/api/v1/Product/p1");
}

#[tokio::test]
async fn list_decodes_page() {
    let transport = MockTransport::new(|_| {
        ok(json!({
            "items": [product_json("p1"), product_json("p2")],
            "totalCount": 95,
            "pageSize": 10,
            "currentPage": 2,
            "totalPages": 10
        }))
    });
    let tab = solo_tab(transport.clone());
    let query = PageQuery::default().with_page(2);

    let page = ProductService::new(tab.client.clone()).list(&query).await.into_result().unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.current_page, 2);
    assert_eq!(page.page_count(), 10);
    assert!(transport.requests()[0].url.ends_with("/Product/GetPaged?page=2&pageSize=10&search="));
}

#[tokio::test]
async fn create_posts_request_body() {
    let transport = MockTransport::new(|_| ok(product_json("p9")));
    let tab = solo_tab(transport.clone());
    let request = ProductRequest { name: "Widget".into(), price: 9.99, quantity: 3 };

    let response = ProductService::new(tab.client.clone()).create(&request).await;

    assert!(response.is_ok());
    let sent = transport.requests();
    assert_eq!(sent[0].method, Method::POST);
    assert!(sent[0].url.ends_with("/Product"));
    assert_eq!(sent[0].body, Some(json!({ "name": "Widget", "price": 9.99, "quantity": 3 })));
}

#[tokio::test]
async fn update_puts_to_product_path() {
    let transport = MockTransport::new(|_| ok(product_json("p1")));
    let tab = solo_tab(transport.clone());
    let request = ProductRequest { name: "Widget".into(), price: 12.5, quantity: 0 };

    let _ = ProductService::new(tab.client.clone()).update("p1", &request).await;

    let sent = transport.requests();
    assert_eq!(sent[0].method, Method::PUT);
    assert!(sent[0].url.ends_with("/Product/p1"));
}

#[tokio::test]
async fn product_id_is_a_single_path_segment() {
    let transport = MockTransport::new(|_| ok(product_json("x")));
    let tab = solo_tab(transport.clone());
    let service = ProductService::new(tab.client.clone());

    let _ = service.get(" a/b?c#d ").await;
    let request = ProductRequest { name: "Widget".into(), price: 1.0, quantity: 1 };
    let _ = service.update("a b+c", &request).await;

    let sent = transport.requests();
    assert_eq!(sent[0].url, "http://api.test/api/v1/Product/a%2Fb%3Fc%23d");
    assert!(sent[1].url.ends_with("/Product/a%20b%2Bc"));
}

#[tokio::test]
async fn server_error_is_returned_to_caller() {
    let transport = MockTransport::new(|_| error_envelope(404, 404, "Product not found"));
    let tab = solo_tab(transport);

    let response = ProductService::new(tab.client.clone()).get("missing").await;

    assert!(response.has_error);
    assert!(response.into_result().is_none());
    assert_eq!(tab.notifier.notices()[0].description, "Product not found");
}

// =============================================================================
// RoleService
// =============================================================================

#[tokio::test]
async fn roles_are_listed() {
    let transport = MockTransport::new(|_| ok(json!([{ "id": 1, "name": "SuperAdmin" }, { "id": 2, "name": "Admin" }])));
    let tab = solo_tab(transport.clone());

    let roles = RoleService::new(tab.client.clone()).list().await.into_result().unwrap();

    assert_eq!(roles.len(), 2);
    assert_eq!(default_role_id(&roles), Some(1));
    assert!(transport.requests()[0].url.ends_with("/Role"));
}
