// ============================================================
// Layer 4 — Feature Extractor
// ============================================================
// Turns two raw transaction tables into a labelled feature matrix.
//
//   period 1 ──┬──► FeatureSchema (categories, first-seen order)
//              ├──► one feature row per period-1 client
//              └──► client id set A
//   period 2 ─────► client id set B
//
//   label = 1 if id ∈ A \ B (churned), 0 if id ∈ A ∩ B (retained)
//
// Only period-1 rows are aggregated; period 2 is used for labels
// alone. Clients that appear only in period 2 never reach the
// output.
//
// Reference: Rust Book §8 (HashMap), §13 (Iterators)

use ndarray::{Array2, ArrayViewMut1};
use std::collections::{HashMap, HashSet};

use crate::domain::{
    error::ChurnError,
    schema::{FeatureSchema, BASE_FEATURES},
    transaction::Transaction,
};

/// Feature matrix of a transaction table: row `i` belongs to
/// `client_ids[i]`, columns follow the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientTable {
    pub client_ids: Vec<String>,
    pub features:   Array2<f64>,
}

/// Output of `extract_training_set`. `client_ids`, `features` and
/// `labels` are parallel vectors in period-1 first-appearance order.
#[derive(Debug, Clone)]
pub struct LabelledFeatures {
    pub schema:     FeatureSchema,
    pub client_ids: Vec<String>,
    pub features:   Array2<f64>,
    pub labels:     Vec<u8>,
}

impl LabelledFeatures {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn churn_count(&self) -> usize {
        self.labels.iter().filter(|&&l| l == 1).count()
    }
}

/// Collect product categories in order of first appearance.
pub fn discover_schema(transactions: &[Transaction]) -> FeatureSchema {
    let mut seen       = HashSet::new();
    let mut categories = Vec::new();
    for t in transactions {
        if seen.insert(t.product_category.as_str()) {
            categories.push(t.product_category.clone());
        }
    }
    FeatureSchema::new(categories)
}

/// Build one feature row per distinct client in `transactions`,
/// using a fixed schema. Works for training-time and
/// inference-time tables alike.
///
/// Transactions whose category is not in the schema still count
/// towards the aggregates, but not towards any ratio column.
pub fn client_rows(schema: &FeatureSchema, transactions: &[Transaction]) -> ClientTable {
    let category_index: HashMap<&str, usize> = schema
        .categories
        .iter()
        .enumerate()
        .map(|(i, c)| (c.as_str(), BASE_FEATURES.len() + i))
        .collect();

    // Group rows per client, remembering first-appearance order
    let mut order: Vec<&str>                        = Vec::new();
    let mut groups: HashMap<&str, Vec<&Transaction>> = HashMap::new();
    for t in transactions {
        groups
            .entry(t.client_id.as_str())
            .or_insert_with(|| {
                order.push(t.client_id.as_str());
                Vec::new()
            })
            .push(t);
    }

    let mut features = Array2::zeros((order.len(), schema.width()));
    for (id, row) in order.iter().zip(features.rows_mut()) {
        aggregate(row, &category_index, &groups[id]);
    }

    ClientTable {
        client_ids: order.into_iter().map(str::to_string).collect(),
        features,
    }
}

/// Aggregate one client's rows into a zeroed feature row. `rows` is
/// never empty because groups are only created on a first row.
fn aggregate(
    mut out:        ArrayViewMut1<f64>,
    category_index: &HashMap<&str, usize>,
    rows:           &[&Transaction],
) {
    let n = rows.len() as f64;

    let total_revenue: f64  = rows.iter().map(|t| t.revenue).sum();
    let total_quantity: f64 = rows.iter().map(|t| t.quantity).sum();
    let total_loss: f64     = rows.iter().map(|t| t.loss).sum();

    let products:   HashSet<&str> = rows.iter().map(|t| t.product_id.as_str()).collect();
    let categories: HashSet<&str> = rows.iter().map(|t| t.product_category.as_str()).collect();
    let days:       HashSet<&str> = rows.iter().map(|t| t.transaction_date.as_str()).collect();

    let base = [
        total_revenue,
        total_revenue / n,
        n,
        products.len() as f64,
        categories.len() as f64,
        total_quantity / n,
        total_loss,
        days.len() as f64,
    ];
    for (col, v) in base.into_iter().enumerate() {
        out[col] = v;
    }

    for t in rows {
        if let Some(&col) = category_index.get(t.product_category.as_str()) {
            out[col] += 1.0;
        }
    }
    out.iter_mut().skip(BASE_FEATURES.len()).for_each(|v| *v /= n);
}

/// Derive schema, features and churn labels from the two periods.
pub fn extract_training_set(
    period1: &[Transaction],
    period2: &[Transaction],
) -> Result<LabelledFeatures, ChurnError> {
    if period1.is_empty() {
        return Err(ChurnError::EmptyInput("period 1 has no transactions".into()));
    }

    let retained: HashSet<&str> = period2.iter().map(|t| t.client_id.as_str()).collect();
    let schema = discover_schema(period1);
    let table  = client_rows(&schema, period1);

    let labels = table
        .client_ids
        .iter()
        .map(|id| u8::from(!retained.contains(id.as_str())))
        .collect();

    let extracted = LabelledFeatures {
        schema,
        client_ids: table.client_ids,
        features:   table.features,
        labels,
    };
    let churned   = extracted.churn_count();
    tracing::info!(
        "Extracted {} clients × {} features ({} churned)",
        extracted.len(),
        extracted.schema.width(),
        churned
    );
    if churned == 0 || churned == extracted.len() {
        tracing::warn!("All clients share one label; the classifier has nothing to separate");
    }

    Ok(extracted)
}
