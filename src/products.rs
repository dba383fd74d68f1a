//! Products screens controller (list, add, edit).
//!
//! Same shape as the orders screen: a local mirror of the product
//! collection, mutations that reconcile only from the backend's response,
//! and a form that validates locally before any remote call.

use tracing::{info, warn};

use crate::error::ConsoleError;
use crate::models::Product;
use crate::service::{ConfirmPrompt, MutationOutcome, ProductService};

/// The add/edit product form. Numeric fields stay text until submit, the
/// way the inputs hold them; `to_product` does the parsing.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub sku: String,
    pub title: String,
    pub brand_name: String,
    pub image: String,
    pub price: String,
    pub price_after_discount: String,
    pub discount_percent: String,
    pub description: String,
    pub rating: String,
    pub category_title: String,
}

fn optional_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse().ok()
}

fn optional_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl ProductForm {
    /// Validate and convert into a request payload. SKU, title, and a
    /// parseable price are required; optional numerics that fail to parse
    /// are dropped rather than rejected.
    pub fn to_product(&self) -> Result<Product, ConsoleError> {
        let sku = self.sku.trim();
        if sku.is_empty() {
            return Err(ConsoleError::validation("SKU is required."));
        }
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ConsoleError::validation("Product title is required."));
        }
        let price: f64 = self
            .price
            .trim()
            .parse()
            .map_err(|_| ConsoleError::validation("Price must be a number."))?;

        Ok(Product {
            sku: sku.to_string(),
            title: title.to_string(),
            brand_name: optional_text(&self.brand_name),
            image: optional_text(&self.image),
            price,
            price_after_discount: optional_number(&self.price_after_discount),
            discount_percent: optional_number(&self.discount_percent),
            description: optional_text(&self.description),
            rating: optional_number(&self.rating),
            category_title: optional_text(&self.category_title),
        })
    }
}

pub struct ProductListController<S, C> {
    service: S,
    confirm: C,
    products: Vec<Product>,
    error: Option<String>,
}

impl<S: ProductService, C: ConfirmPrompt> ProductListController<S, C> {
    pub fn new(service: S, confirm: C) -> Self {
        ProductListController {
            service,
            confirm,
            products: Vec::new(),
            error: None,
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Fetch the product collection, optionally filtered by category
    /// title. On failure the previously loaded mirror is kept.
    pub async fn load_products(
        &mut self,
        category_title: Option<&str>,
    ) -> Result<(), ConsoleError> {
        match self.service.list_products(category_title).await {
            Ok(products) => {
                info!(count = products.len(), "loaded products");
                self.products = products;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "failed to load products");
                self.error = Some("Failed to load products.".to_string());
                Err(e)
            }
        }
    }

    /// Create a product from the form; the backend's returned object is
    /// appended to the mirror.
    pub async fn create_product(&mut self, form: &ProductForm) -> Result<(), ConsoleError> {
        let product = form.to_product()?;
        match self.service.create_product(&product).await {
            Ok(created) => {
                info!(sku = %created.sku, "product created");
                self.products.push(created);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "product create failed");
                self.error = Some("Failed to add product.".to_string());
                Err(e)
            }
        }
    }

    /// Update a product by SKU; the backend's returned object replaces the
    /// mirror entry.
    pub async fn update_product(
        &mut self,
        sku: &str,
        form: &ProductForm,
    ) -> Result<(), ConsoleError> {
        let product = form.to_product()?;
        match self.service.update_product(sku, &product).await {
            Ok(updated) => {
                if let Some(entry) = self.products.iter_mut().find(|p| p.sku == sku) {
                    *entry = updated;
                }
                Ok(())
            }
            Err(e) => {
                warn!(sku, error = %e, "product update failed");
                self.error = Some("Failed to update product.".to_string());
                Err(e)
            }
        }
    }

    /// Delete a product. Confirmation-gated; the entry leaves the mirror
    /// only after the backend confirms.
    pub async fn delete_product(&mut self, sku: &str) -> Result<MutationOutcome, ConsoleError> {
        if !self
            .confirm
            .confirm("Are you sure you want to delete this product?")
        {
            return Ok(MutationOutcome::Declined);
        }
        match self.service.delete_product(sku).await {
            Ok(()) => {
                self.products.retain(|p| p.sku != sku);
                info!(sku, "product deleted");
                Ok(MutationOutcome::Applied)
            }
            Err(e) => {
                warn!(sku, error = %e, "product delete failed");
                self.error = Some("Failed to delete product.".to_string());
                Err(e)
            }
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
