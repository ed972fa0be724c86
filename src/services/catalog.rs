//! Product and role catalog calls.

use url::form_urlencoded;

use crate::net::client::ApiClient;
use crate::net::types::{ApiResponse, Product, ProductPage, ProductRequest, Role};
use crate::net::{PRODUCTS_ENDPOINT, PRODUCTS_PAGED_ENDPOINT, ROLES_ENDPOINT};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

// =============================================================================
// PAGING
// =============================================================================

/// One page request of the product list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    /// 1-based.
    pub page: u32,
    pub page_size: u32,
    pub search: String,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self { page: 1, page_size: DEFAULT_PAGE_SIZE, search: String::new() }
    }
}

impl PageQuery {
    /// Change the search term. A new search always starts at page 1.
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self.page = 1;
        self
    }

    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Endpoint with the query string for this page.
    #[must_use]
    pub fn endpoint(&self) -> String {
        let search: String = form_urlencoded::byte_serialize(self.search.as_bytes()).collect();
        format!("{PRODUCTS_PAGED_ENDPOINT}?page={}&pageSize={}&search={search}", self.page, self.page_size)
    }
}

/// Number of pages needed for `total_count` items. Zero when `page_size` is zero.
#[must_use]
pub fn total_pages(total_count: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total_count.div_ceil(u64::from(page_size))
}

impl ProductPage {
    /// Page count derived from the totals rather than trusted from the server.
    #[must_use]
    pub fn page_count(&self) -> u64 {
        total_pages(self.total_count, self.page_size)
    }
}

// =============================================================================
// PRODUCTS
// =============================================================================

#[derive(Clone)]
pub struct ProductService {
    client: ApiClient,
}

impl ProductService {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, id: &str) -> ApiResponse<Product> {
        self.client.get(&product_endpoint(id)).await
    }

    pub async fn list(&self, query: &PageQuery) -> ApiResponse<ProductPage> {
        self.client.get(&query.endpoint()).await
    }

    pub async fn create(&self, request: &ProductRequest) -> ApiResponse<Product> {
        self.client.post(PRODUCTS_ENDPOINT, request).await
    }

    pub async fn update(&self, id: &str, request: &ProductRequest) -> ApiResponse<Product> {
        self.client.put(&product_endpoint(id), request).await
    }
}

/// Product path with the id as a single percent-encoded segment.
fn product_endpoint(id: &str) -> String {
    // byte_serialize writes spaces as `+` (form style); a literal `+` is already `%2B`.
    let id = form_urlencoded::byte_serialize(id.trim().as_bytes()).collect::<String>().replace('+', "%20");
    format!("{PRODUCTS_ENDPOINT}/{id}")
}

// =============================================================================
// ROLES
// =============================================================================

#[derive(Clone)]
pub struct RoleService {
    client: ApiClient,
}

impl RoleService {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> ApiResponse<Vec<Role>> {
        self.client.get(ROLES_ENDPOINT).await
    }
}

/// Role preselected on the new-user form: the first one the server lists.
#[must_use]
pub fn default_role_id(roles: &[Role]) -> Option<i64> {
    roles.first().map(|role| role.id)
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
