use super::actions::{ProductAction, ProductActionResult};
use super::ProductError;
use crate::actor_framework::Entity;
use crate::domain::{Product, ProductCreate, ProductPatch, StockDeduction};

fn validate(name: &str, price: f64) -> Result<(), ProductError> {
    if name.trim().is_empty() {
        return Err(ProductError::ValidationError("name is required".to_string()));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(ProductError::ValidationError(format!("invalid price: {price}")));
    }
    Ok(())
}

impl Entity for Product {
    type Id = u64;
    type CreateParams = ProductCreate;
    type Patch = ProductPatch;
    type Action = ProductAction;
    type ActionResult = ProductActionResult;
    type Error = ProductError;

    fn id(&self) -> u64 {
        self.id
    }

    fn from_create_params(id: u64, params: ProductCreate) -> Result<Self, ProductError> {
        validate(&params.name, params.price)?;

        Ok(Self {
            id,
            name: params.name.trim().to_string(),
            description: params.description,
            price: params.price,
            stock_quantity: params.stock_quantity,
            category: params.category,
            image_url: params.image_url,
        })
    }

    /// Replaces every editable field. The image is only replaced when the
    /// patch carries one.
    fn on_update(&mut self, patch: ProductPatch) -> Result<(), ProductError> {
        validate(&patch.name, patch.price)?;

        self.name = patch.name.trim().to_string();
        self.description = patch.description;
        self.price = patch.price;
        self.stock_quantity = patch.stock_quantity;
        self.category = patch.category;
        if let Some(image_url) = patch.image_url {
            self.image_url = Some(image_url);
        }
        Ok(())
    }

    /// Handles product-specific actions.
    ///
    /// `DeductStock` is the conditional decrement every order line goes
    /// through: stock never drops below zero.
    fn handle_action(&mut self, action: ProductAction) -> Result<ProductActionResult, ProductError> {
        match action {
            ProductAction::DeductStock(0) => Err(ProductError::InvalidQuantity(0)),
            ProductAction::DeductStock(quantity) => {
                if self.stock_quantity < quantity {
                    return Err(ProductError::InsufficientStock {
                        product_id: self.id,
                        requested: quantity,
                        available: self.stock_quantity,
                    });
                }
                self.stock_quantity -= quantity;
                Ok(ProductActionResult::Deducted(StockDeduction {
                    product_id: self.id,
                    name: self.name.clone(),
                    unit_price: self.price,
                    image_url: self.image_url.clone(),
                    quantity,
                    remaining: self.stock_quantity,
                }))
            }
            ProductAction::Restock(quantity) => {
                self.stock_quantity = self.stock_quantity.checked_add(quantity).ok_or_else(|| {
                    ProductError::ValidationError(format!("restocking {quantity} overflows stock"))
                })?;
                Ok(ProductActionResult::Restocked(self.stock_quantity))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deduct_only_when_sufficient() {
        let mut product = Product::new(7, "Mangalore Buns", 40.0, 5);

        let result = product.handle_action(ProductAction::DeductStock(5)).unwrap();
        match result {
            ProductActionResult::Deducted(deduction) => {
                assert_eq!(deduction.remaining, 0);
                assert_eq!(deduction.unit_price, 40.0);
                assert_eq!(deduction.name, "Mangalore Buns");
            }
            other => panic!("Unexpected result: {:?}", other),
        }

        assert_eq!(
            product.handle_action(ProductAction::DeductStock(1)),
            Err(ProductError::InsufficientStock {
                product_id: 7,
                requested: 1,
                available: 0
            })
        );
        assert_eq!(product.stock_quantity, 0);
    }

    #[test]
    fn test_zero_quantity_is_rejected() {
        let mut product = Product::new(1, "Kori Rotti", 120.0, 3);
        assert_eq!(
            product.handle_action(ProductAction::DeductStock(0)),
            Err(ProductError::InvalidQuantity(0))
        );
        assert_eq!(product.stock_quantity, 3);
    }

    #[test]
    fn test_restock_checks_overflow() {
        let mut product = Product::new(1, "Neer Dosa", 60.0, u32::MAX - 1);
        assert_eq!(
            product.handle_action(ProductAction::Restock(1)),
            Ok(ProductActionResult::Restocked(u32::MAX))
        );
        assert!(matches!(
            product.handle_action(ProductAction::Restock(1)),
            Err(ProductError::ValidationError(_))
        ));
    }

    #[test]
    fn test_update_keeps_image_when_absent() {
        let mut product = Product::new(1, "Ghee Roast", 250.0, 2);
        product.image_url = Some("https://img.example/ghee.png".into());

        product
            .on_update(ProductPatch {
                name: "Chicken Ghee Roast".into(),
                description: Some("Spicy".into()),
                price: 280.0,
                stock_quantity: 9,
                category: Some("Mains".into()),
                image_url: None,
            })
            .unwrap();

        assert_eq!(product.name, "Chicken Ghee Roast");
        assert_eq!(product.stock_quantity, 9);
        assert_eq!(product.image_url.as_deref(), Some("https://img.example/ghee.png"));
    }

    #[test]
    fn test_invalid_price_is_rejected() {
        let created = Product::from_create_params(1, ProductCreate::new("Goli Baje", -1.0, 1));
        assert!(matches!(created, Err(ProductError::ValidationError(_))));

        let blank = Product::from_create_params(1, ProductCreate::new("  ", 1.0, 1));
        assert!(matches!(blank, Err(ProductError::ValidationError(_))));
    }
}
