use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::actor_framework::ResourceClient;
use crate::clients::{ProductClient, UserClient};
use crate::domain::{order_total, Order, OrderCreate, OrderItem, OrderPatch, OrderStatus, PlaceOrder};
use crate::order_actor::OrderError;
use crate::product_actor::ProductError;

/// Largest gap tolerated between the client's total and the catalog total
/// before a warning is logged.
const TOTAL_TOLERANCE: f64 = 0.01;

/// Client for interacting with the Order actor.
///
/// This client handles the order transaction: validating the customer,
/// deducting stock for every line atomically, then recording the order.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    user_client: UserClient,
    product_client: ProductClient,
}

impl_client_methods!(OrderClient, Order, OrderError, order);

fn has_shipping_address(address: &Value) -> bool {
    match address {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

fn validate(request: &PlaceOrder) -> Result<(), OrderError> {
    if request.lines.is_empty()
        || !request.total_amount.is_finite()
        || request.total_amount <= 0.0
        || !has_shipping_address(&request.shipping_address)
    {
        return Err(OrderError::ValidationError(
            "Missing required order details: items, totalAmount, shippingAddress".to_string(),
        ));
    }

    if let Some(line) = request.lines.iter().find(|line| line.quantity == 0) {
        return Err(OrderError::ValidationError(format!(
            "Invalid quantity for product {}",
            line.product_id
        )));
    }

    Ok(())
}

impl From<ProductError> for OrderError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(id) => OrderError::InvalidProduct(id),
            ProductError::ActorCommunicationError(msg) => OrderError::ActorCommunicationError(msg),
            ProductError::ValidationError(msg) => OrderError::ValidationError(msg),
            other @ (ProductError::InsufficientStock { .. } | ProductError::InvalidQuantity(_)) => {
                OrderError::InsufficientStock(other.to_string())
            }
        }
    }
}

impl OrderClient {
    pub fn new(
        inner: ResourceClient<Order>,
        user_client: UserClient,
        product_client: ProductClient,
    ) -> Self {
        Self {
            inner,
            user_client,
            product_client,
        }
    }

    /// Places an order.
    ///
    /// 1. **Validate request** - lines, quantities, total, shipping address
    /// 2. **Validate user** via the User actor
    /// 3. **Deduct stock** for all lines in one Product actor transaction
    /// 4. **Record order** in the Order actor, restocking if that fails
    #[instrument(
        skip(self, request),
        fields(user_id = request.user_id, line_count = request.lines.len())
    )]
    pub async fn place_order(&self, request: PlaceOrder) -> Result<Order, OrderError> {
        info!("Processing place_order request");

        // Step 1: Validate request
        validate(&request)?;

        // Step 2: Validate user
        match self.user_client.get_user(request.user_id).await {
            Ok(Some(user)) => info!(user_name = %user.username, "User validation successful"),
            Ok(None) => {
                error!("User not found");
                return Err(OrderError::InvalidUser(request.user_id.to_string()));
            }
            Err(e) => {
                error!(error = %e, "User validation failed");
                return Err(OrderError::InvalidUser(format!("User validation failed: {}", e)));
            }
        }

        // Step 3: Deduct stock, all lines or nothing
        let deductions = match self.product_client.deduct_stock(&request.lines).await {
            Ok(deductions) => deductions,
            Err(e) => {
                error!(error = %e, "Stock deduction failed");
                return Err(e.into());
            }
        };

        info!("Stock deducted successfully");

        // Priced from the catalog snapshot
        let items: Vec<OrderItem> = deductions.into_iter().map(OrderItem::from).collect();
        let total_amount = order_total(&items);
        if (total_amount - request.total_amount).abs() > TOTAL_TOLERANCE {
            warn!(
                submitted = request.total_amount,
                computed = total_amount,
                "Submitted total differs from catalog total"
            );
        }

        // Step 4: Record the order
        let params = OrderCreate {
            user_id: request.user_id,
            items,
            total_amount,
            shipping_address: request.shipping_address,
        };

        match self.inner.create(params).await {
            Ok(order) => {
                info!(order_id = order.id, total = order.total_amount, "Order placed successfully");
                Ok(order)
            }
            Err(e) => {
                error!(error = %e, "Recording order failed, restocking");
                if let Err(restock_err) = self.product_client.restock(&request.lines).await {
                    error!(error = %restock_err, "Restock after failed order failed");
                }
                Err(e.into())
            }
        }
    }

    /// Orders of one customer, newest first.
    #[instrument(skip(self))]
    pub async fn user_orders(&self, user_id: u64) -> Result<Vec<Order>, OrderError> {
        debug!("Sending request");
        let mut orders = self
            .inner
            .list(Some(Box::new(move |order: &Order| order.user_id == user_id)))
            .await?;
        orders.sort_by(Order::newest_first);
        Ok(orders)
    }

    /// Every order, newest first.
    #[instrument(skip(self))]
    pub async fn all_orders(&self) -> Result<Vec<Order>, OrderError> {
        debug!("Sending request");
        let mut orders = self.inner.list(None).await?;
        orders.sort_by(Order::newest_first);
        Ok(orders)
    }

    /// Cancels a pending order and puts its stock back.
    ///
    /// The status flip is the commit point: the order actor lets exactly one
    /// caller move an order out of `pending`, so the stock is returned once.
    /// The restock itself is one transaction; if it fails no line is
    /// restocked, the failure is logged and the cancellation still stands.
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, id: u64) -> Result<Order, OrderError> {
        info!("Processing cancel_order request");

        let order = self
            .inner
            .update(
                id,
                OrderPatch {
                    status: OrderStatus::Cancelled,
                },
            )
            .await?;

        match self.product_client.restock(&order.lines()).await {
            Ok(()) => info!("Order cancelled"),
            Err(e) => error!(error = %e, "Order cancelled but its stock was not returned"),
        }

        Ok(order)
    }
}
