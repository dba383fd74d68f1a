//! Wire types for the admin backend API.
//!
//! Identity normalization happens here, once: the backend emits `_id` on
//! some records and `id` on others, and every type in this module coalesces
//! both spellings into a single canonical field via serde attributes.
//! Controllers never branch on response shape.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// A backend timestamp. The backend is inconsistent: order timestamps arrive
/// either as RFC 3339 strings, epoch-millisecond numbers, or wrapped objects
/// of the form `{"seconds": n}`. All three deserialize into UTC here;
/// serialization always emits RFC 3339.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp(pub DateTime<Utc>);

#[derive(Deserialize)]
#[serde(untagged)]
enum TimestampRepr {
    Wrapped { seconds: i64 },
    Millis(i64),
    Text(String),
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = TimestampRepr::deserialize(deserializer)?;
        let dt = match repr {
            TimestampRepr::Wrapped { seconds } => Utc
                .timestamp_opt(seconds, 0)
                .single()
                .ok_or_else(|| serde::de::Error::custom("epoch seconds out of range"))?,
            TimestampRepr::Millis(ms) => Utc
                .timestamp_millis_opt(ms)
                .single()
                .ok_or_else(|| serde::de::Error::custom("epoch millis out of range"))?,
            TimestampRepr::Text(s) => DateTime::parse_from_rfc3339(&s)
                .map_err(serde::de::Error::custom)?
                .with_timezone(&Utc),
        };
        Ok(Timestamp(dt))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_rfc3339())
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// Order fulfilment status. The listing order below is presentation order,
/// not a transition graph: the backend owns transition legality and the
/// console permits any status to move to any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Placed,
    Processing,
    Shipped,
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// All statuses, in the order the status dropdown presents them.
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Placed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "Placed",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::OutForDelivery => "Out for Delivery",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown order status: {s}"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl ShippingAddress {
    /// "First Last" with missing parts dropped; empty when neither is set.
    pub fn full_name(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or("").trim();
        let last = self.last_name.as_deref().unwrap_or("").trim();
        [first, last]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(alias = "_id")]
    pub id: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub estimated_delivery: Option<Timestamp>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
}

impl Order {
    /// Customer display name, or "N/A" when the shipping address is absent
    /// or carries no name.
    pub fn customer_name(&self) -> String {
        self.shipping_address
            .as_ref()
            .map(ShippingAddress::full_name)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "N/A".to_string())
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subcategory {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default, rename = "subCategories")]
    pub sub_categories: Vec<Subcategory>,
}

/// Request body for creating a subcategory. No identity: the backend
/// assigns `_id` and returns the updated parent category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSubcategory {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// Request body for creating a category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCategory {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(rename = "subCategories")]
    pub sub_categories: Vec<NewSubcategory>,
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

/// Catalog product, keyed by SKU rather than object id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub sku: String,
    pub title: String,
    #[serde(default)]
    pub brand_name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub price_after_discount: Option<f64>,
    #[serde(default)]
    pub discount_percent: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub category_title: Option<String>,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// Aggregate counts shown on the dashboard landing screen. Derived
/// client-side from collection lengths; the backend has no counts endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCounts {
    pub products: usize,
    pub orders: usize,
}

// ---------------------------------------------------------------------------
// Notifications & chat
// ---------------------------------------------------------------------------

/// Broadcast notification payload sent to all customers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Broadcast {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummary {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub last_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(alias = "_id")]
    pub id: String,
    pub sender_id: String,
    pub message: String,
    #[serde(default)]
    pub sent_at: Option<Timestamp>,
}

// ===========================================================================
// Tests
// ===========================================================================
