// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// Shuffles samples with a seeded RNG and splits them into
//   - Training set:   used to update model weights
//   - Validation set: used to pick the best snapshot
//
// The validation side gets ceil(n × val_fraction) samples, so
// even a tiny table keeps at least one validation sample when
// val_fraction > 0. The same seed always gives the same split.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom.
//
// Reference: rand crate documentation

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Shuffle `samples` with `seed` and split into (train, validation).
///
/// # Example
/// ```
/// use churn_transformer::data::splitter::split_train_val;
/// let (train, val) = split_train_val((0..10).collect::<Vec<_>>(), 0.2, 42);
/// assert_eq!((train.len(), val.len()), (8, 2));
/// ```
pub fn split_train_val<T>(mut samples: Vec<T>, val_fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    let total = samples.len();
    let n_val = ((total as f64) * val_fraction).ceil().max(0.0) as usize;
    let n_val = n_val.min(total);

    // split_off(n) keeps [0..n) in `samples` and returns [n..total)
    let val = samples.split_off(total - n_val);

    tracing::debug!(
        "Dataset split: {} training, {} validation",
        samples.len(),
        val.len(),
    );

    (samples, val)
}
