// ============================================================
// Layer 3 — Feature Schema
// ============================================================
// The fixed, ordered column layout of a client feature vector:
//
//   [0] total_revenue
//   [1] avg_transaction_value
//   [2] transaction_count
//   [3] unique_products
//   [4] product_categories
//   [5] avg_quantity_per_transaction
//   [6] total_loss
//   [7] days_active
//   [8..] category_ratio_<cat>, one per category in `categories`
//
// The category list is discovered once from the period-1 table
// at training time and saved next to the model. Inference reuses
// it verbatim so the vector width can never drift.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::domain::error::ChurnError;

/// Names of the aggregate columns that precede the category ratios.
pub const BASE_FEATURES: [&str; 8] = [
    "total_revenue",
    "avg_transaction_value",
    "transaction_count",
    "unique_products",
    "product_categories",
    "avg_quantity_per_transaction",
    "total_loss",
    "days_active",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    /// Product categories in order of first appearance in period 1
    pub categories: Vec<String>,
}

impl FeatureSchema {
    pub fn new(categories: Vec<String>) -> Self {
        Self { categories }
    }

    /// Total number of columns: 8 aggregates + one ratio per category.
    pub fn width(&self) -> usize {
        BASE_FEATURES.len() + self.categories.len()
    }

    pub fn column_names(&self) -> Vec<String> {
        BASE_FEATURES
            .iter()
            .map(|s| s.to_string())
            .chain(self.categories.iter().map(|c| format!("category_ratio_{c}")))
            .collect()
    }

    /// Reject a feature matrix whose width differs from this schema.
    pub fn check_width(&self, matrix: &Array2<f64>) -> Result<(), ChurnError> {
        let expected = self.width();
        match matrix.ncols() {
            found if found == expected => Ok(()),
            found                      => Err(ChurnError::SchemaMismatch { expected, found }),
        }
    }
}
