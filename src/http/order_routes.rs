use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, instrument};

use super::{
    error::AppError,
    extract::{AdminUser, AuthUser},
    product_routes::{parse_number, parse_quantity},
    AppState,
};
use crate::domain::{Order, OrderItem, OrderLine, OrderStatus, PlaceOrder, User};

#[derive(Deserialize)]
pub struct OrderLineRequest {
    id: u64,
    #[serde(default)]
    quantity: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    #[serde(default)]
    items: Vec<OrderLineRequest>,
    #[serde(default)]
    total_amount: Value,
    #[serde(default)]
    shipping_address: Value,
}

#[derive(Serialize)]
pub struct OrderItemView {
    product_id: u64,
    product_name: String,
    quantity: u32,
    item_price: f64,
    image_url: Option<String>,
}

#[derive(Serialize)]
pub struct CustomerView {
    username: String,
    email: String,
}

/// An order as the storefront shows it. Admin listings also carry the
/// customer and the shipping address.
#[derive(Serialize)]
pub struct OrderView {
    order_id: u64,
    order_date: DateTime<Utc>,
    total_amount: f64,
    status: OrderStatus,
    items: Vec<OrderItemView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shipping_address: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer: Option<CustomerView>,
}

impl From<OrderItem> for OrderItemView {
    fn from(item: OrderItem) -> Self {
        Self {
            product_id: item.product_id,
            product_name: item.product_name,
            quantity: item.quantity,
            item_price: item.price,
            image_url: item.image_url,
        }
    }
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self {
            order_id: order.id,
            order_date: order.order_date,
            total_amount: order.total_amount,
            status: order.status,
            items: order.items.into_iter().map(OrderItemView::from).collect(),
            shipping_address: None,
            customer: None,
        }
    }
}

impl OrderRequest {
    fn into_place_order(self, user_id: u64) -> Result<PlaceOrder, AppError> {
        let lines = self
            .items
            .into_iter()
            .map(|line| {
                let quantity = match line.quantity {
                    Value::Null => 0,
                    ref value => parse_quantity(value).ok_or_else(|| {
                        AppError::BadRequest(format!("Invalid quantity for product {}", line.id))
                    })?,
                };
                Ok(OrderLine::new(line.id, quantity))
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(PlaceOrder {
            user_id,
            lines,
            // Missing or garbage totals fall through to order validation.
            total_amount: parse_number(&self.total_amount).unwrap_or(0.0),
            shipping_address: self.shipping_address,
        })
    }
}

#[instrument(skip_all, fields(user_id = claims.id))]
pub async fn place_order(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    payload: Result<Json<OrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let Json(request) = payload?;
    let request = request.into_place_order(claims.id)?;

    let order = state.orders.place_order(request).await?;

    info!(order_id = order.id, "Order placed");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Order placed successfully!",
            "orderId": order.id,
            "order": OrderView::from(order),
        })),
    ))
}

#[instrument(skip_all, fields(user_id = claims.id))]
pub async fn my_orders(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<Vec<OrderView>>, AppError> {
    let orders = state.orders.user_orders(claims.id).await?;
    Ok(Json(orders.into_iter().map(OrderView::from).collect()))
}

#[instrument(skip_all, fields(admin_id = admin.id))]
pub async fn all_orders(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<Json<Vec<OrderView>>, AppError> {
    let orders = state.orders.all_orders().await?;
    let users: HashMap<u64, User> = state
        .users
        .list_users()
        .await?
        .into_iter()
        .map(|user| (user.id, user))
        .collect();

    // Orders whose customer no longer exists are left out.
    let views = orders
        .into_iter()
        .filter_map(|order| {
            let user = users.get(&order.user_id)?;
            let customer = CustomerView {
                username: user.username.clone(),
                email: user.email.clone(),
            };
            let shipping_address = order.shipping_address.clone();
            Some(OrderView {
                shipping_address: Some(shipping_address),
                customer: Some(customer),
                ..OrderView::from(order)
            })
        })
        .collect();

    Ok(Json(views))
}

/// Owners may cancel their own orders, admins any order. Someone else's
/// order looks like a missing one.
#[instrument(skip_all, fields(user_id = claims.id, order_id = id))]
pub async fn cancel_order(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<u64>,
) -> Result<Json<Value>, AppError> {
    let not_found = || AppError::NotFound("Order not found".to_string());

    let order = state.orders.get_order(id).await?.ok_or_else(not_found)?;
    if order.user_id != claims.id && !claims.is_admin() {
        return Err(not_found());
    }

    let order = state.orders.cancel_order(id).await?;

    info!("Order cancelled");
    Ok(Json(json!({
        "message": "Order cancelled successfully",
        "order": OrderView::from(order),
    })))
}
