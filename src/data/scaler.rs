// ============================================================
// Layer 4 — Standard Scaler
// ============================================================
// Per-column standardisation: z = (x - mean) / std
//
// The statistics are learned once (`fit`) on the training matrix
// and then applied unchanged (`transform`) to every later matrix,
// including inference rows. Refitting on inference data would
// shift the inputs away from what the model was trained on.
//
// std is the population standard deviation (divide by n).
// A constant column has std 0; its scale is replaced by 1.0 so
// the column maps to 0 instead of NaN.

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::domain::error::ChurnError;

/// Fitted scaler state. There is no "unfitted" value: the only
/// constructors are `fit` and `fit_transform`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean:  Array1<f64>,
    pub scale: Array1<f64>,
}

impl StandardScaler {
    /// Learn per-column mean and standard deviation.
    pub fn fit(matrix: &Array2<f64>) -> Result<Self, ChurnError> {
        let mean = matrix
            .mean_axis(Axis(0))
            .ok_or_else(|| ChurnError::EmptyInput("cannot fit a scaler on zero rows".into()))?;

        let scale = matrix
            .std_axis(Axis(0), 0.0)
            .mapv(|std| if std < 10.0 * f64::EPSILON { 1.0 } else { std });

        Ok(Self { mean, scale })
    }

    /// Fit on `matrix` and return the scaler with the standardised matrix.
    pub fn fit_transform(matrix: &Array2<f64>) -> Result<(Self, Array2<f64>), ChurnError> {
        let scaler = Self::fit(matrix)?;
        let scaled = scaler.transform(matrix)?;
        Ok((scaler, scaled))
    }

    /// Apply the fitted statistics without refitting.
    pub fn transform(&self, matrix: &Array2<f64>) -> Result<Array2<f64>, ChurnError> {
        if matrix.ncols() != self.width() {
            return Err(ChurnError::SchemaMismatch {
                expected: self.width(),
                found:    matrix.ncols(),
            });
        }
        Ok((matrix - &self.mean) / &self.scale)
    }

    /// Number of columns the scaler was fitted on.
    pub fn width(&self) -> usize {
        self.mean.len()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn matrix() -> Array2<f64> {
        array![
            [1.0, 10.0, 5.0],
            [2.0, 20.0, 5.0],
            [3.0, 60.0, 5.0],
            [6.0, 30.0, 5.0],
        ]
    }

    #[test]
    fn test_fit_transform_centres_and_scales() {
        let (_, scaled) = StandardScaler::fit_transform(&matrix()).unwrap();
        for c in 0..2 {
            let col  = scaled.column(c);
            let mean = col.mean().unwrap();
            let std  = col.std(0.0);
            assert!(mean.abs() < 1e-9, "column {c} mean {mean}");
            assert!((std - 1.0).abs() < 1e-9, "column {c} std {std}");
        }
    }

    #[test]
    fn test_constant_column_maps_to_zero() {
        let (scaler, scaled) = StandardScaler::fit_transform(&matrix()).unwrap();
        assert_eq!(scaler.scale[2], 1.0);
        assert!(scaled.column(2).iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_transform_does_not_refit() {
        let scaler = StandardScaler::fit(&matrix()).unwrap();
        let out    = scaler.transform(&array![[3.0, 30.0, 5.0]]).unwrap();
        // mean of column 0 is 3.0
        assert_eq!(out[[0, 0]], 0.0);
        assert_eq!(out[[0, 1]], 0.0);
        assert_eq!(scaler, StandardScaler::fit(&matrix()).unwrap());
    }

    #[test]
    fn test_population_std() {
        // sample std of [0, 4] would be 2.83
        let scaler = StandardScaler::fit(&array![[0.0], [4.0]]).unwrap();
        assert_eq!(scaler.mean, array![2.0]);
        assert_eq!(scaler.scale, array![2.0]);
    }

    #[test]
    fn test_width_mismatch_is_reported() {
        let scaler = StandardScaler::fit(&matrix()).unwrap();
        let err    = scaler.transform(&array![[1.0, 2.0]]).unwrap_err();
        assert_eq!(err, ChurnError::SchemaMismatch { expected: 3, found: 2 });
    }

    #[test]
    fn test_fit_on_empty_matrix_fails() {
        let empty = Array2::<f64>::zeros((0, 3));
        assert!(matches!(StandardScaler::fit(&empty), Err(ChurnError::EmptyInput(_))));
    }

    #[test]
    fn test_state_survives_json() {
        let scaler = StandardScaler::fit(&matrix()).unwrap();
        let json   = serde_json::to_string(&scaler).unwrap();
        let back: StandardScaler = serde_json::from_str(&json).unwrap();
        assert_eq!(back, scaler);
    }
}
