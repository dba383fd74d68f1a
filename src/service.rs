//! Remote-service seams for the controllers.
//!
//! Controllers are generic over these traits so they can be exercised
//! against in-memory fakes in tests; `ApiClient` is the production
//! implementation for all of them.

use crate::api::ApiClient;
use crate::error::ConsoleError;
use crate::models::{
    Broadcast, Category, ChatMessage, ChatSummary, NewCategory, NewSubcategory, Order,
    OrderStatus, Product,
};
use crate::uploads::ImageFile;

/// Order collection operations (list orders screen).
#[allow(async_fn_in_trait)]
pub trait OrderService {
    async fn list_orders(&self) -> Result<Vec<Order>, ConsoleError>;
    async fn update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<(), ConsoleError>;
    async fn delete_order(&self, order_id: &str) -> Result<(), ConsoleError>;
}

/// Category tree operations, including image upload (uploads gate the
/// structural calls, so they belong to the same seam).
#[allow(async_fn_in_trait)]
pub trait CategoryService {
    async fn list_categories(&self) -> Result<Vec<Category>, ConsoleError>;
    async fn create_category(&self, category: &NewCategory) -> Result<Category, ConsoleError>;
    async fn update_category_title(
        &self,
        category_id: &str,
        title: &str,
    ) -> Result<(), ConsoleError>;
    async fn delete_category(&self, category_id: &str) -> Result<(), ConsoleError>;
    async fn add_subcategories(
        &self,
        category_id: &str,
        subcategories: &[NewSubcategory],
    ) -> Result<Category, ConsoleError>;
    async fn update_subcategory_title(
        &self,
        category_id: &str,
        subcategory_id: &str,
        title: &str,
    ) -> Result<Category, ConsoleError>;
    async fn delete_subcategory(
        &self,
        category_id: &str,
        subcategory_id: &str,
    ) -> Result<Category, ConsoleError>;
    async fn upload_image(&self, file: &ImageFile) -> Result<String, ConsoleError>;
}

/// Product catalog operations (products screens and dashboard counts).
#[allow(async_fn_in_trait)]
pub trait ProductService {
    async fn list_products(
        &self,
        category_title: Option<&str>,
    ) -> Result<Vec<Product>, ConsoleError>;
    async fn get_product(&self, sku: &str) -> Result<Product, ConsoleError>;
    async fn create_product(&self, product: &Product) -> Result<Product, ConsoleError>;
    async fn update_product(&self, sku: &str, product: &Product)
        -> Result<Product, ConsoleError>;
    async fn delete_product(&self, sku: &str) -> Result<(), ConsoleError>;
}

/// Notification broadcast and admin chat operations.
#[allow(async_fn_in_trait)]
pub trait MessagingService {
    async fn send_broadcast(&self, broadcast: &Broadcast) -> Result<(), ConsoleError>;
    async fn list_chats(&self) -> Result<Vec<ChatSummary>, ConsoleError>;
    async fn list_chat_messages(&self, chat_id: &str) -> Result<Vec<ChatMessage>, ConsoleError>;
    async fn send_chat_reply(&self, chat_id: &str, message: &str) -> Result<(), ConsoleError>;
}

// ---------------------------------------------------------------------------
// Confirmation
// ---------------------------------------------------------------------------

/// User confirmation gate for destructive or state-changing actions. The
/// presentation layer supplies the real prompt; declining means no remote
/// call is made and local state is untouched.
pub trait ConfirmPrompt {
    fn confirm(&self, message: &str) -> bool;
}

/// Confirms everything. For headless use and scripting.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

impl ConfirmPrompt for AutoConfirm {
    fn confirm(&self, _message: &str) -> bool {
        true
    }
}

/// Result of a confirmation-gated mutation: either the remote call ran to
/// completion, or the user declined and nothing was dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    Declined,
}

impl MutationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MutationOutcome::Applied)
    }
}

// ---------------------------------------------------------------------------
// Production implementation
// ---------------------------------------------------------------------------

impl OrderService for ApiClient {
    async fn list_orders(&self) -> Result<Vec<Order>, ConsoleError> {
        ApiClient::list_orders(self).await
    }

    async fn update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<(), ConsoleError> {
        ApiClient::update_order_status(self, order_id, status).await
    }

    async fn delete_order(&self, order_id: &str) -> Result<(), ConsoleError> {
        ApiClient::delete_order(self, order_id).await
    }
}

impl CategoryService for ApiClient {
    async fn list_categories(&self) -> Result<Vec<Category>, ConsoleError> {
        ApiClient::list_categories(self).await
    }

    async fn create_category(&self, category: &NewCategory) -> Result<Category, ConsoleError> {
        ApiClient::create_category(self, category).await
    }

    async fn update_category_title(
        &self,
        category_id: &str,
        title: &str,
    ) -> Result<(), ConsoleError> {
        ApiClient::update_category_title(self, category_id, title).await
    }

    async fn delete_category(&self, category_id: &str) -> Result<(), ConsoleError> {
        ApiClient::delete_category(self, category_id).await
    }

    async fn add_subcategories(
        &self,
        category_id: &str,
        subcategories: &[NewSubcategory],
    ) -> Result<Category, ConsoleError> {
        ApiClient::add_subcategories(self, category_id, subcategories).await
    }

    async fn update_subcategory_title(
        &self,
        category_id: &str,
        subcategory_id: &str,
        title: &str,
    ) -> Result<Category, ConsoleError> {
        ApiClient::update_subcategory_title(self, category_id, subcategory_id, title).await
    }

    async fn delete_subcategory(
        &self,
        category_id: &str,
        subcategory_id: &str,
    ) -> Result<Category, ConsoleError> {
        ApiClient::delete_subcategory(self, category_id, subcategory_id).await
    }

    async fn upload_image(&self, file: &ImageFile) -> Result<String, ConsoleError> {
        ApiClient::upload_image(self, file).await
    }
}

impl ProductService for ApiClient {
    async fn list_products(
        &self,
        category_title: Option<&str>,
    ) -> Result<Vec<Product>, ConsoleError> {
        ApiClient::list_products(self, category_title).await
    }

    async fn get_product(&self, sku: &str) -> Result<Product, ConsoleError> {
        ApiClient::get_product(self, sku).await
    }

    async fn create_product(&self, product: &Product) -> Result<Product, ConsoleError> {
        ApiClient::create_product(self, product).await
    }

    async fn update_product(
        &self,
        sku: &str,
        product: &Product,
    ) -> Result<Product, ConsoleError> {
        ApiClient::update_product(self, sku, product).await
    }

    async fn delete_product(&self, sku: &str) -> Result<(), ConsoleError> {
        ApiClient::delete_product(self, sku).await
    }
}

impl MessagingService for ApiClient {
    async fn send_broadcast(&self, broadcast: &Broadcast) -> Result<(), ConsoleError> {
        ApiClient::send_broadcast(self, broadcast).await
    }

    async fn list_chats(&self) -> Result<Vec<ChatSummary>, ConsoleError> {
        ApiClient::list_chats(self).await
    }

    async fn list_chat_messages(&self, chat_id: &str) -> Result<Vec<ChatMessage>, ConsoleError> {
        ApiClient::list_chat_messages(self, chat_id).await
    }

    async fn send_chat_reply(&self, chat_id: &str, message: &str) -> Result<(), ConsoleError> {
        ApiClient::send_chat_reply(self, chat_id, message).await
    }
}
