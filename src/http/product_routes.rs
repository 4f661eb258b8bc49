use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, instrument};

use super::{error::AppError, extract::AdminUser, AppState};
use crate::domain::{Product, ProductCreate, ProductPatch};

const INVALID_PRODUCT: &str =
    "Missing required fields or invalid data: name, price, stock_quantity must be valid numbers.";

/// Body of create and update. Numbers may arrive as JSON numbers or as
/// numeric strings (form-style clients).
#[derive(Deserialize)]
pub struct ProductRequest {
    name: Option<String>,
    description: Option<String>,
    price: Option<Value>,
    stock_quantity: Option<Value>,
    category: Option<String>,
    image_url: Option<String>,
}

struct ValidProduct {
    name: String,
    description: Option<String>,
    price: f64,
    stock_quantity: u32,
    category: Option<String>,
    image_url: Option<String>,
}

pub(super) fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(super) fn parse_quantity(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ProductRequest {
    fn validate(self) -> Result<ValidProduct, AppError> {
        let invalid = || AppError::BadRequest(INVALID_PRODUCT.to_string());

        let name = non_blank(self.name).ok_or_else(invalid)?;
        let price = self
            .price
            .as_ref()
            .and_then(parse_number)
            .filter(|price| price.is_finite() && *price >= 0.0)
            .ok_or_else(invalid)?;
        let stock_quantity = self.stock_quantity.as_ref().and_then(parse_quantity).ok_or_else(invalid)?;

        Ok(ValidProduct {
            name,
            description: self.description,
            price,
            stock_quantity,
            category: non_blank(self.category),
            image_url: non_blank(self.image_url),
        })
    }
}

pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(state.products.list_products().await?))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Product>, AppError> {
    state
        .products
        .get_product(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

#[instrument(skip_all, fields(admin_id = admin.id))]
pub async fn create_product(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    payload: Result<Json<ProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let Json(request) = payload?;
    let valid = request.validate()?;

    let product = state
        .products
        .create_product(ProductCreate {
            name: valid.name,
            description: valid.description,
            price: valid.price,
            stock_quantity: valid.stock_quantity,
            category: valid.category,
            image_url: valid.image_url,
        })
        .await?;

    info!(product_id = product.id, "Product created");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Product created successfully",
            "productId": product.id,
            "product": product,
        })),
    ))
}

#[instrument(skip_all, fields(admin_id = admin.id, product_id = id))]
pub async fn update_product(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<u64>,
    payload: Result<Json<ProductRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(request) = payload?;
    let valid = request.validate()?;

    let product = state
        .products
        .update_product(
            id,
            ProductPatch {
                name: valid.name,
                description: valid.description,
                price: valid.price,
                stock_quantity: valid.stock_quantity,
                category: valid.category,
                image_url: valid.image_url,
            },
        )
        .await?;

    info!("Product updated");
    Ok(Json(json!({ "message": "Product updated successfully", "product": product })))
}

#[instrument(skip_all, fields(admin_id = admin.id, product_id = id))]
pub async fn delete_product(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<u64>,
) -> Result<Json<Value>, AppError> {
    state.products.delete_product(id).await?;

    info!("Product deleted");
    Ok(Json(json!({ "message": "Product deleted successfully" })))
}
