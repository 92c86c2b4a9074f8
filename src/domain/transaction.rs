// ============================================================
// Layer 3 — Transaction Domain Type
// ============================================================
// One row of a client transaction table. Both the period-1 and
// the period-2 snapshot are plain Vec<Transaction>.
//
// The serde field names match the CSV header exactly:
//   client_id,revenue,quantity,loss,product_id,product_category,transaction_date
// so a missing column fails deserialisation instead of silently
// producing zeros.

use serde::{Deserialize, Serialize};

/// A single client transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub client_id:        String,
    pub revenue:          f64,
    pub quantity:         f64,
    pub loss:             f64,
    pub product_id:       String,
    pub product_category: String,
    /// Kept as the raw string; every distinct value counts as
    /// one active day.
    pub transaction_date: String,
}

impl Transaction {
    pub fn new(
        client_id:        impl Into<String>,
        revenue:          f64,
        quantity:         f64,
        loss:             f64,
        product_id:       impl Into<String>,
        product_category: impl Into<String>,
        transaction_date: impl Into<String>,
    ) -> Self {
        Self {
            client_id:        client_id.into(),
            revenue,
            quantity,
            loss,
            product_id:       product_id.into(),
            product_category: product_category.into(),
            transaction_date: transaction_date.into(),
        }
    }
}
