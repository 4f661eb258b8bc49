use tracing::{debug, instrument, warn};

use crate::actor_framework::{FrameworkError, ResourceClient};
use crate::domain::{OrderLine, Product, ProductCreate, ProductPatch, StockDeduction};
use crate::product_actor::{ProductAction, ProductActionResult, ProductError};

/// Client for interacting with the Product actor.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

impl_basic_client!(ProductClient, Product, ProductError, product);

fn unexpected(result: ProductActionResult) -> ProductError {
    ProductError::ActorCommunicationError(format!("Unexpected result: {:?}", result))
}

impl ProductClient {
    #[instrument(skip(self, params), fields(name = %params.name))]
    pub async fn create_product(&self, params: ProductCreate) -> Result<Product, ProductError> {
        debug!("Sending request");
        Ok(self.inner.create(params).await?)
    }

    /// Every product, newest first.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ProductError> {
        debug!("Sending request");
        let mut products = self.inner.list(None).await?;
        products.reverse();
        Ok(products)
    }

    #[instrument(skip(self, patch))]
    pub async fn update_product(&self, id: u64, patch: ProductPatch) -> Result<Product, ProductError> {
        debug!("Sending request");
        Ok(self.inner.update(id, patch).await?)
    }

    /// Deducts stock for every line in a single transaction. Either every
    /// line is deducted or none is.
    #[instrument(skip(self, lines), fields(line_count = lines.len()))]
    pub async fn deduct_stock(&self, lines: &[OrderLine]) -> Result<Vec<StockDeduction>, ProductError> {
        debug!("Sending request");
        let actions = lines
            .iter()
            .map(|line| (line.product_id, ProductAction::DeductStock(line.quantity)))
            .collect();

        self.inner
            .transact(actions)
            .await?
            .into_iter()
            .map(|result| match result {
                ProductActionResult::Deducted(deduction) => Ok(deduction),
                other => Err(unexpected(other)),
            })
            .collect()
    }

    /// Puts stock back for every line in a single transaction. Products
    /// deleted since the deduction are dropped from the batch, which is then
    /// retried with the lines that remain.
    #[instrument(skip(self, lines), fields(line_count = lines.len()))]
    pub async fn restock(&self, lines: &[OrderLine]) -> Result<(), ProductError> {
        debug!("Sending request");
        let mut pending: Vec<&OrderLine> = lines.iter().collect();

        while !pending.is_empty() {
            let actions = pending
                .iter()
                .map(|line| (line.product_id, ProductAction::Restock(line.quantity)))
                .collect();

            match self.inner.transact(actions).await {
                Ok(results) => {
                    for result in results {
                        match result {
                            ProductActionResult::Restocked(level) => debug!(stock = level, "Restocked"),
                            other => return Err(unexpected(other)),
                        }
                    }
                    return Ok(());
                }
                Err(FrameworkError::NotFound(id)) => {
                    let before = pending.len();
                    pending.retain(|line| line.product_id.to_string() != id);
                    if pending.len() == before {
                        return Err(ProductError::NotFound(id));
                    }
                    warn!(product_id = %id, "Product gone, skipping restock");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
