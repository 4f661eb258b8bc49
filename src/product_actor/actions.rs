use crate::domain::StockDeduction;

/// Custom actions for Product entities.
///
/// These actions represent domain-specific operations that can be performed
/// on a product beyond standard CRUD operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductAction {
    /// Decrements stock by the given quantity, only if that much is on hand.
    ///
    /// # Errors
    /// Fails on a zero quantity or when the request exceeds available stock.
    DeductStock(u32),
    /// Puts the given quantity back on the shelf.
    Restock(u32),
}

/// Results from ProductActions - variants match 1:1 with ProductAction
#[derive(Debug, Clone, PartialEq)]
pub enum ProductActionResult {
    Deducted(StockDeduction),
    Restocked(u32),
}
