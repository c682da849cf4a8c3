use pointfit_3d::NeighborLocator;
use serde::{Deserialize, Serialize};

use crate::error::MlsError;

/// Smallest neighborhood size derived from a smoothing factor.
pub const MIN_NEIGHBORS: usize = 5;

/// Parameters of the curve and surface smoothers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MlsParams {
    /// Fraction of the points used as neighborhood, typically in [0, 2].
    pub smoothing_factor: f64,
    /// Neighborhood radius in absolute units. When positive, it replaces the
    /// smoothing factor.
    pub radius: Option<f64>,
}

impl Default for MlsParams {
    fn default() -> Self {
        Self {
            smoothing_factor: 0.2,
            radius: None,
        }
    }
}

/// How the neighborhood of each point is gathered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Selection {
    Count(usize),
    Radius(f64),
}

impl MlsParams {
    /// Resolve the neighborhood selection for `num_points` points.
    ///
    /// The neighborhood count is `round(num_points * smoothing_factor / divisor)`,
    /// raised to [`MIN_NEIGHBORS`].
    pub(crate) fn selection(&self, num_points: usize, divisor: f64) -> Result<Selection, MlsError> {
        match self.radius {
            Some(r) if r.is_nan() || r < 0.0 => {
                return Err(MlsError::InvalidParameter(format!(
                    "radius must be positive, got {r}"
                )))
            }
            Some(r) if r > 0.0 => return Ok(Selection::Radius(r)),
            _ => {}
        }

        let f = self.smoothing_factor;
        if !f.is_finite() || f < 0.0 {
            return Err(MlsError::InvalidParameter(format!(
                "smoothing factor must be non negative, got {f}"
            )));
        }

        let count = (num_points as f64 * f / divisor).round() as usize;
        if count < MIN_NEIGHBORS {
            log::warn!(
                "smoothing factor {f} selects {count} neighbors, using {MIN_NEIGHBORS} instead"
            );
            return Ok(Selection::Count(MIN_NEIGHBORS));
        }
        Ok(Selection::Count(count))
    }
}

impl Selection {
    /// Gather the neighborhood of `query`.
    pub(crate) fn gather(&self, locator: &NeighborLocator, query: &[f64; 3]) -> Vec<[f64; 3]> {
        let neighbors = match *self {
            Selection::Count(k) => locator.k_nearest(query, k),
            Selection::Radius(r) => locator.within_radius(query, r),
        };
        locator.gather(&neighbors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_count() -> Result<(), MlsError> {
        let params = MlsParams::default();
        assert_eq!(params.selection(1000, 10.0)?, Selection::Count(20));
        assert_eq!(params.selection(1000, 100.0)?, Selection::Count(MIN_NEIGHBORS));
        assert_eq!(params.selection(10, 10.0)?, Selection::Count(MIN_NEIGHBORS));

        let params = MlsParams {
            smoothing_factor: 1.0,
            radius: None,
        };
        assert_eq!(params.selection(1234, 100.0)?, Selection::Count(12));
        Ok(())
    }

    #[test]
    fn test_selection_radius() -> Result<(), MlsError> {
        let params = MlsParams {
            smoothing_factor: 0.2,
            radius: Some(0.5),
        };
        assert_eq!(params.selection(1000, 10.0)?, Selection::Radius(0.5));

        let zero = MlsParams {
            smoothing_factor: 0.2,
            radius: Some(0.0),
        };
        assert_eq!(zero.selection(1000, 10.0)?, Selection::Count(20));
        Ok(())
    }

    #[test]
    fn test_selection_invalid() {
        let negative = MlsParams {
            smoothing_factor: 0.2,
            radius: Some(-1.0),
        };
        assert!(matches!(
            negative.selection(10, 10.0),
            Err(MlsError::InvalidParameter(_))
        ));

        let nan = MlsParams {
            smoothing_factor: f64::NAN,
            radius: None,
        };
        assert!(matches!(
            nan.selection(10, 10.0),
            Err(MlsError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_gather() {
        let points: Vec<[f64; 3]> = (0..10).map(|i| [i as f64, 0.0, 0.0]).collect();
        let locator = NeighborLocator::<3>::new(&points);

        let near = Selection::Count(3).gather(&locator, &[0.1, 0.0, 0.0]);
        assert_eq!(near, vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]);

        let within = Selection::Radius(1.5).gather(&locator, &[5.0, 0.0, 0.0]);
        assert_eq!(within.len(), 3);
    }
}
