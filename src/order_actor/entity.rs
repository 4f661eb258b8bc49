use chrono::Utc;

use super::OrderError;
use crate::actor_framework::Entity;
use crate::domain::{Order, OrderCreate, OrderPatch, OrderStatus};

impl Entity for Order {
    type Id = u64;
    type CreateParams = OrderCreate;
    type Patch = OrderPatch;
    type Action = (); // No custom actions for now
    type ActionResult = ();
    type Error = OrderError;

    fn id(&self) -> u64 {
        self.id
    }

    /// Creates a new Order from creation parameters.
    ///
    /// # Notes
    /// The order is initialized as `Pending` and stamped with the current time.
    fn from_create_params(id: u64, params: OrderCreate) -> Result<Self, OrderError> {
        if params.items.is_empty() {
            return Err(OrderError::ValidationError("order has no items".to_string()));
        }

        Ok(Self {
            id,
            user_id: params.user_id,
            items: params.items,
            total_amount: params.total_amount,
            shipping_address: params.shipping_address,
            status: OrderStatus::Pending,
            order_date: Utc::now(),
        })
    }

    /// Only a pending order may be cancelled; every other transition is refused.
    fn on_update(&mut self, patch: OrderPatch) -> Result<(), OrderError> {
        match (self.status, patch.status) {
            (OrderStatus::Pending, OrderStatus::Cancelled) => {
                self.status = OrderStatus::Cancelled;
                Ok(())
            }
            (from, to) => Err(OrderError::InvalidTransition { from, to }),
        }
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), OrderError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderItem;
    use serde_json::json;

    fn create_params() -> OrderCreate {
        OrderCreate {
            user_id: 3,
            items: vec![OrderItem {
                product_id: 1,
                product_name: "Kane Fry".into(),
                quantity: 2,
                price: 300.0,
                image_url: None,
            }],
            total_amount: 600.0,
            shipping_address: json!({ "city": "Udupi" }),
        }
    }

    #[test]
    fn test_new_orders_are_pending() {
        let order = Order::from_create_params(10, create_params()).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.id, 10);
    }

    #[test]
    fn test_empty_order_is_rejected() {
        let mut params = create_params();
        params.items.clear();
        assert!(matches!(
            Order::from_create_params(1, params),
            Err(OrderError::ValidationError(_))
        ));
    }

    #[test]
    fn test_cancel_only_once() {
        let mut order = Order::from_create_params(1, create_params()).unwrap();
        let cancel = || OrderPatch {
            status: OrderStatus::Cancelled,
        };

        order.on_update(cancel()).unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);

        assert_eq!(
            order.on_update(cancel()),
            Err(OrderError::InvalidTransition {
                from: OrderStatus::Cancelled,
                to: OrderStatus::Cancelled
            })
        );
    }
}
