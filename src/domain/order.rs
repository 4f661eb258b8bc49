use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::StockDeduction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Cancelled,
}

/// One line of a placed order, priced from the catalog at placement time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItem {
    pub product_id: u64,
    pub product_name: String,
    pub quantity: u32,
    pub price: f64,
    pub image_url: Option<String>,
}

/// Represents a customer order.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: u64,
    pub user_id: u64,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    /// Stored as submitted by the client.
    pub shipping_address: Value,
    pub status: OrderStatus,
    pub order_date: DateTime<Utc>,
}

/// Params for inserting an already-validated, already-stocked order.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub user_id: u64,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub shipping_address: Value,
}

#[derive(Debug, Clone)]
pub struct OrderPatch {
    pub status: OrderStatus,
}

/// A line of an order request: which product and how many.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub product_id: u64,
    pub quantity: u32,
}

/// An order request as submitted by a customer.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub user_id: u64,
    pub lines: Vec<OrderLine>,
    pub total_amount: f64,
    pub shipping_address: Value,
}

impl Order {
    pub fn lines(&self) -> Vec<OrderLine> {
        self.items
            .iter()
            .map(|item| OrderLine {
                product_id: item.product_id,
                quantity: item.quantity,
            })
            .collect()
    }

    /// Newest first, ties broken by the higher id.
    pub fn newest_first(a: &Order, b: &Order) -> std::cmp::Ordering {
        b.order_date.cmp(&a.order_date).then(b.id.cmp(&a.id))
    }
}

impl From<StockDeduction> for OrderItem {
    fn from(deduction: StockDeduction) -> Self {
        Self {
            product_id: deduction.product_id,
            product_name: deduction.name,
            quantity: deduction.quantity,
            price: deduction.unit_price,
            image_url: deduction.image_url,
        }
    }
}

/// Sum of `price * quantity`, rounded to cents.
pub fn order_total(items: &[OrderItem]) -> f64 {
    let total: f64 = items.iter().map(|item| item.price * f64::from(item.quantity)).sum();
    (total * 100.0).round() / 100.0
}

impl OrderLine {
    pub fn new(product_id: u64, quantity: u32) -> Self {
        Self { product_id, quantity }
    }
}
