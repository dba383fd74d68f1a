//! Admin backend API client.
//!
//! Authenticated HTTP communication with the shop backend: orders, catalog,
//! products, notification broadcast, admin chat, and image upload. Every
//! endpoint has exactly one response schema, deserialized here — callers
//! never see raw JSON and never branch on response shape.

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::error::ConsoleError;
use crate::models::{
    Broadcast, Category, ChatMessage, ChatSummary, NewCategory, NewSubcategory, Order,
    OrderStatus, Product,
};
use crate::storage;
use crate::uploads::ImageFile;

/// Default timeout for API requests (30 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// URL normalisation
// ---------------------------------------------------------------------------

/// Normalise the backend base URL:
/// - strip trailing slashes
/// - strip a trailing `/api` segment (endpoint paths re-add it)
/// - ensure a scheme is present (https, or http for localhost)
pub fn normalize_base_url(url: &str) -> String {
    let mut url = url.trim().to_string();

    // Ensure scheme
    if !url.starts_with("http://") && !url.starts_with("https://") {
        if url.starts_with("localhost") || url.starts_with("127.0.0.1") {
            url = format!("http://{url}");
        } else {
            url = format!("https://{url}");
        }
    }

    // Strip trailing slashes
    while url.ends_with('/') {
        url.pop();
    }

    // Strip trailing /api
    if url.ends_with("/api") {
        url.truncate(url.len() - 4);
    }

    while url.ends_with('/') {
        url.pop();
    }

    url
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// Convert a `reqwest::Error` into a user-friendly message.
fn friendly_error(url: &str, err: &reqwest::Error) -> String {
    if err.is_connect() {
        return format!("Cannot reach backend at {url}");
    }
    if err.is_timeout() {
        return format!("Connection to {url} timed out");
    }
    if err.is_builder() {
        return format!("Invalid backend URL: {url}");
    }
    format!("Network error communicating with {url}: {err}")
}

/// Convert an HTTP status code into a user-friendly message.
fn status_error(status: StatusCode) -> String {
    match status.as_u16() {
        401 => "Session expired — please sign in again".to_string(),
        403 => "Not authorized for admin actions".to_string(),
        404 => "Backend endpoint not found".to_string(),
        s if s >= 500 => format!("Backend server error (HTTP {s})"),
        s => format!("Unexpected response from backend (HTTP {s})"),
    }
}

/// Extract the most specific message from an error response body. The
/// backend puts validation detail under `error`/`message` plus an optional
/// `details`/`errors` field.
fn error_detail(status: StatusCode, body_text: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body_text) {
        let message = json
            .get("error")
            .or_else(|| json.get("message"))
            .and_then(Value::as_str)
            .map(|s| s.to_string())
            .unwrap_or_else(|| status_error(status));
        let details = json.get("details").or_else(|| json.get("errors")).cloned();
        if let Some(details) = details {
            format!("{message} (HTTP {}): {}", status.as_u16(), details)
        } else {
            format!("{message} (HTTP {})", status.as_u16())
        }
    } else if !body_text.trim().is_empty() {
        format!(
            "{} (HTTP {}): {}",
            status_error(status),
            status.as_u16(),
            body_text.trim()
        )
    } else {
        format!("{} (HTTP {})", status_error(status), status.as_u16())
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Authenticated client for the admin backend. Cheap to clone; one instance
/// is shared by all controllers.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
    token: Option<String>,
}

impl ApiClient {
    /// Build a client for the given backend URL. The session token is read
    /// from the credential store on every request, so a re-login takes
    /// effect without rebuilding the client.
    pub fn new(backend_url: &str) -> Result<Self, ConsoleError> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| ConsoleError::remote(format!("Failed to create HTTP client: {e}")))?;
        Ok(ApiClient {
            base_url: normalize_base_url(backend_url),
            client,
            token: None,
        })
    }

    /// Build a client from the stored backend URL.
    pub fn from_storage() -> Result<Self, ConsoleError> {
        let url = storage::get_backend_url()
            .ok_or_else(|| ConsoleError::remote("Backend URL is not configured"))?;
        Self::new(&url)
    }

    /// Pin the session token instead of reading it from the credential
    /// store per request.
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn bearer_token(&self) -> Option<String> {
        self.token.clone().or_else(storage::get_session_token)
    }

    /// Dispatch a request and give back the raw successful response.
    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<reqwest::Response, ConsoleError> {
        let full_url = format!("{}{path}", self.base_url);
        debug!(%method, path, "backend request");

        let mut req = self.client.request(method, &full_url);
        if let Some(token) = self.bearer_token() {
            req = req.bearer_auth(token);
        }
        if let Some(b) = body {
            req = req.json(&b);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| ConsoleError::remote(friendly_error(&self.base_url, &e)))?;
        let status = resp.status();
        if !status.is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(ConsoleError::remote(error_detail(status, &body_text)));
        }
        Ok(resp)
    }

    /// Request expecting a typed JSON response.
    async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, ConsoleError> {
        let resp = self.dispatch(method, path, body).await?;
        let body_text = resp.text().await.unwrap_or_default();
        serde_json::from_str(&body_text).map_err(|e| ConsoleError::response(e.to_string()))
    }

    /// Request where only success matters; the body (ack or entity) is
    /// dropped without inspection.
    async fn fetch_ack(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<(), ConsoleError> {
        self.dispatch(method, path, body).await.map(|_| ())
    }

    fn json_body<B: Serialize>(body: &B) -> Result<Value, ConsoleError> {
        serde_json::to_value(body).map_err(|e| ConsoleError::response(e.to_string()))
    }

    // -- Orders -------------------------------------------------------------

    pub async fn list_orders(&self) -> Result<Vec<Order>, ConsoleError> {
        self.fetch(Method::GET, "/api/orders", None).await
    }

    pub async fn update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<(), ConsoleError> {
        let body = serde_json::json!({ "status": status });
        self.fetch_ack(
            Method::PUT,
            &format!("/api/orders/{order_id}/status"),
            Some(body),
        )
        .await
    }

    pub async fn delete_order(&self, order_id: &str) -> Result<(), ConsoleError> {
        self.fetch_ack(Method::DELETE, &format!("/api/orders/{order_id}"), None)
            .await
    }

    // -- Categories ---------------------------------------------------------

    pub async fn list_categories(&self) -> Result<Vec<Category>, ConsoleError> {
        self.fetch(Method::GET, "/api/categories", None).await
    }

    pub async fn create_category(&self, category: &NewCategory) -> Result<Category, ConsoleError> {
        let body = Self::json_body(category)?;
        self.fetch(Method::POST, "/api/categories", Some(body)).await
    }

    pub async fn update_category_title(
        &self,
        category_id: &str,
        title: &str,
    ) -> Result<(), ConsoleError> {
        let body = serde_json::json!({ "title": title });
        self.fetch_ack(
            Method::PUT,
            &format!("/api/categories/{category_id}"),
            Some(body),
        )
        .await
    }

    pub async fn delete_category(&self, category_id: &str) -> Result<(), ConsoleError> {
        self.fetch_ack(
            Method::DELETE,
            &format!("/api/categories/{category_id}"),
            None,
        )
        .await
    }

    /// Add subcategories to an existing category. Returns the full updated
    /// category with server-assigned subcategory identities.
    pub async fn add_subcategories(
        &self,
        category_id: &str,
        subcategories: &[NewSubcategory],
    ) -> Result<Category, ConsoleError> {
        let body = Self::json_body(&subcategories)?;
        self.fetch(
            Method::POST,
            &format!("/api/categories/{category_id}/subcategories"),
            Some(body),
        )
        .await
    }

    pub async fn update_subcategory_title(
        &self,
        category_id: &str,
        subcategory_id: &str,
        title: &str,
    ) -> Result<Category, ConsoleError> {
        let body = serde_json::json!({ "title": title });
        self.fetch(
            Method::PUT,
            &format!("/api/categories/{category_id}/subcategories/{subcategory_id}"),
            Some(body),
        )
        .await
    }

    pub async fn delete_subcategory(
        &self,
        category_id: &str,
        subcategory_id: &str,
    ) -> Result<Category, ConsoleError> {
        self.fetch(
            Method::DELETE,
            &format!("/api/categories/{category_id}/subcategories/{subcategory_id}"),
            None,
        )
        .await
    }

    // -- Image upload -------------------------------------------------------

    /// Upload an image and return its public URL. Multipart, field `image`.
    pub async fn upload_image(&self, file: &ImageFile) -> Result<String, ConsoleError> {
        #[derive(Deserialize)]
        struct UploadResponse {
            url: String,
        }

        let part = reqwest::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| ConsoleError::validation(format!("Invalid image content type: {e}")))?;
        let form = reqwest::multipart::Form::new().part("image", part);

        let full_url = format!("{}/api/upload", self.base_url);
        let mut req = self.client.post(&full_url).multipart(form);
        if let Some(token) = self.bearer_token() {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| ConsoleError::remote(friendly_error(&self.base_url, &e)))?;
        let status = resp.status();
        if !status.is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(ConsoleError::remote(error_detail(status, &body_text)));
        }
        let parsed: UploadResponse = resp
            .json()
            .await
            .map_err(|e| ConsoleError::response(e.to_string()))?;
        Ok(parsed.url)
    }

    // -- Products -----------------------------------------------------------

    pub async fn list_products(
        &self,
        category_title: Option<&str>,
    ) -> Result<Vec<Product>, ConsoleError> {
        self.fetch(Method::GET, &products_path(category_title), None)
            .await
    }

    pub async fn get_product(&self, sku: &str) -> Result<Product, ConsoleError> {
        self.fetch(Method::GET, &format!("/api/products/{sku}"), None)
            .await
    }

    pub async fn create_product(&self, product: &Product) -> Result<Product, ConsoleError> {
        let body = Self::json_body(product)?;
        self.fetch(Method::POST, "/api/products", Some(body)).await
    }

    pub async fn update_product(
        &self,
        sku: &str,
        product: &Product,
    ) -> Result<Product, ConsoleError> {
        let body = Self::json_body(product)?;
        self.fetch(Method::PUT, &format!("/api/products/{sku}"), Some(body))
            .await
    }

    pub async fn delete_product(&self, sku: &str) -> Result<(), ConsoleError> {
        self.fetch_ack(Method::DELETE, &format!("/api/products/{sku}"), None)
            .await
    }

    // -- Notifications & chat -----------------------------------------------

    pub async fn send_broadcast(&self, broadcast: &Broadcast) -> Result<(), ConsoleError> {
        let body = Self::json_body(broadcast)?;
        self.fetch_ack(Method::POST, "/api/notifications/send-to-all", Some(body))
            .await
    }

    pub async fn list_chats(&self) -> Result<Vec<ChatSummary>, ConsoleError> {
        self.fetch(Method::GET, "/api/chats/all", None).await
    }

    pub async fn list_chat_messages(
        &self,
        chat_id: &str,
    ) -> Result<Vec<ChatMessage>, ConsoleError> {
        self.fetch(Method::GET, &format!("/api/chats/{chat_id}/messages"), None)
            .await
    }

    pub async fn send_chat_reply(&self, chat_id: &str, message: &str) -> Result<(), ConsoleError> {
        let body = serde_json::json!({ "message": message });
        self.fetch_ack(
            Method::POST,
            &format!("/api/chats/{chat_id}/messages"),
            Some(body),
        )
        .await
    }
}

/// Path for the product listing, with the optional category filter
/// percent-encoded into the query string.
fn products_path(category_title: Option<&str>) -> String {
    match category_title {
        Some(title) => format!("/api/products?category={}", urlencoding::encode(title)),
        None => "/api/products".to_string(),
    }
}

// ===========================================================================
// Tests
// ===========================================================================
