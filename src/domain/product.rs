use serde::Serialize;

/// Represents a product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock_quantity: u32,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProductCreate {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock_quantity: u32,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

/// Full replacement of the editable fields. `image_url: None` keeps the
/// current image.
#[derive(Debug, Clone)]
pub struct ProductPatch {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock_quantity: u32,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

/// What a successful stock deduction hands back to the order flow: the
/// catalog data the order line is priced from.
#[derive(Debug, Clone, PartialEq)]
pub struct StockDeduction {
    pub product_id: u64,
    pub name: String,
    pub unit_price: f64,
    pub image_url: Option<String>,
    pub quantity: u32,
    pub remaining: u32,
}

#[cfg(test)]
impl Product {
    pub fn new(id: u64, name: impl Into<String>, price: f64, stock_quantity: u32) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            price,
            stock_quantity,
            category: None,
            image_url: None,
        }
    }
}

#[cfg(test)]
impl ProductCreate {
    pub fn new(name: impl Into<String>, price: f64, stock_quantity: u32) -> Self {
        Self {
            name: name.into(),
            description: None,
            price,
            stock_quantity,
            category: None,
            image_url: None,
        }
    }
}
