//! Ordinary kriging of pollutant values along a route.
//!
//! Only two real observations exist per route (the endpoints), so the
//! interpolator manufactures a 4-point calibration set: both endpoints plus
//! two points offset north and south of the start-end midpoint, each carrying
//! the endpoint average. Each pollutant field is then kriged
//! independently with a fixed Gaussian variogram over planar degree
//! coordinates (`x = lon`, `y = lat`).
//!
//! A field whose system cannot be solved falls back to the start endpoint's
//! value at every route point. The failure never reaches the caller.

use nalgebra::{DMatrix, DVector, Dyn, LU};
use thiserror::Error;

use crate::models::{
    round2, InterpolatedPoint, PollutantField, PollutantProfile, RoutePoint, RouteProfile,
};
use crate::spatial::{midpoint, planar_distance_deg};

/// Fraction of the endpoint separation used as the perturbation offset.
const PERTURBATION_RATIO: f64 = 0.1;
/// Minimum perturbation offset in degrees.
const MIN_PERTURBATION_DEG: f64 = 0.005;
/// Distances at or below this are treated as the same location.
const COINCIDENT_EPS: f64 = 1e-10;

/// Numerical failure while fitting or evaluating a kriging model.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum KrigingError {
    #[error("calibration inputs have mismatched lengths")]
    MismatchedInputs,
    #[error("calibration set is empty")]
    Empty,
    #[error("non-finite calibration value")]
    NonFinite,
    #[error("calibration points {0} and {1} coincide")]
    CoincidentPoints(usize, usize),
    #[error("kriging system is singular")]
    Singular,
    #[error("prediction is not finite")]
    NonFinitePrediction,
}

/// Gaussian variogram with fixed parameters.
///
/// `gamma(h) = (sill - nugget) * (1 - exp(-h^2 / (range * 4/7)^2)) + nugget`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianVariogram {
    pub sill: f64,
    pub range: f64,
    pub nugget: f64,
}

impl Default for GaussianVariogram {
    fn default() -> Self {
        Self {
            sill: 1.0,
            range: 0.1,
            nugget: 0.1,
        }
    }
}

impl GaussianVariogram {
    pub fn gamma(&self, h: f64) -> f64 {
        let partial_sill = self.sill - self.nugget;
        let effective_range = self.range * 4.0 / 7.0;
        partial_sill * (1.0 - (-(h * h) / (effective_range * effective_range)).exp()) + self.nugget
    }
}

/// Fitted ordinary kriging model over a small set of samples.
#[derive(Debug, Clone)]
pub struct OrdinaryKriging {
    xs: Vec<f64>,
    ys: Vec<f64>,
    values: Vec<f64>,
    variogram: GaussianVariogram,
    lu: LU<f64, Dyn, Dyn>,
}

impl OrdinaryKriging {
    /// Build and factorize the kriging system for the given samples.
    pub fn fit(
        xs: &[f64],
        ys: &[f64],
        values: &[f64],
        variogram: GaussianVariogram,
    ) -> Result<Self, KrigingError> {
        let n = values.len();
        if xs.len() != n || ys.len() != n {
            return Err(KrigingError::MismatchedInputs);
        }
        if n == 0 {
            return Err(KrigingError::Empty);
        }
        if xs
            .iter()
            .chain(ys.iter())
            .chain(values.iter())
            .any(|v| !v.is_finite())
        {
            return Err(KrigingError::NonFinite);
        }

        let mut system = DMatrix::<f64>::zeros(n + 1, n + 1);
        for i in 0..n {
            for j in (i + 1)..n {
                let h = planar_distance_deg(ys[i], xs[i], ys[j], xs[j]);
                if h <= COINCIDENT_EPS {
                    return Err(KrigingError::CoincidentPoints(i, j));
                }
                let gamma = variogram.gamma(h);
                system[(i, j)] = gamma;
                system[(j, i)] = gamma;
            }
            system[(i, n)] = 1.0;
            system[(n, i)] = 1.0;
        }

        let lu = system.lu();
        if !lu.is_invertible() {
            return Err(KrigingError::Singular);
        }

        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            values: values.to_vec(),
            variogram,
            lu,
        })
    }

    /// Estimate the value at `(x, y)`.
    ///
    /// A query that coincides with a sample returns that sample exactly.
    pub fn predict(&self, x: f64, y: f64) -> Result<f64, KrigingError> {
        let n = self.values.len();
        let mut rhs = DVector::<f64>::zeros(n + 1);
        for i in 0..n {
            let h = planar_distance_deg(self.ys[i], self.xs[i], y, x);
            rhs[i] = if h <= COINCIDENT_EPS {
                0.0
            } else {
                self.variogram.gamma(h)
            };
        }
        rhs[n] = 1.0;

        let weights = self.lu.solve(&rhs).ok_or(KrigingError::Singular)?;
        let estimate: f64 = (0..n).map(|i| weights[i] * self.values[i]).sum();
        if estimate.is_finite() {
            Ok(estimate)
        } else {
            Err(KrigingError::NonFinitePrediction)
        }
    }
}

/// Synthetic calibration geometry derived from two route endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationSet {
    pub xs: [f64; 4],
    pub ys: [f64; 4],
}

impl CalibrationSet {
    /// Endpoints first, then the two perturbation points.
    pub fn from_endpoints(start: &PollutantProfile, end: &PollutantProfile) -> Self {
        let (mid_lat, mid_lon) = midpoint(start.lat, start.lon, end.lat, end.lon);
        let separation = planar_distance_deg(start.lat, start.lon, end.lat, end.lon);
        let offset = (separation * PERTURBATION_RATIO).max(MIN_PERTURBATION_DEG);

        // Perturbations move along latitude only, whatever the route heading.
        Self {
            xs: [start.lon, end.lon, mid_lon, mid_lon],
            ys: [start.lat, end.lat, mid_lat + offset, mid_lat - offset],
        }
    }
}

/// Interpolate every target pollutant along a route with the default variogram.
pub fn interpolate(
    start: &PollutantProfile,
    end: &PollutantProfile,
    points: &[RoutePoint],
) -> RouteProfile {
    interpolate_with(GaussianVariogram::default(), start, end, points)
}

/// Interpolate every target pollutant along a route.
///
/// The output has one entry per input point, in input order.
pub fn interpolate_with(
    variogram: GaussianVariogram,
    start: &PollutantProfile,
    end: &PollutantProfile,
    points: &[RoutePoint],
) -> RouteProfile {
    let calibration = CalibrationSet::from_endpoints(start, end);
    let mut profile: RouteProfile = points.iter().copied().map(InterpolatedPoint::empty).collect();

    for field in PollutantField::ALL {
        let fallback = start.field(field);
        match interpolate_field(&calibration, variogram, fallback, end.field(field), points) {
            Ok(values) => {
                for (entry, value) in profile.iter_mut().zip(values) {
                    entry.set_field(field, value);
                }
            }
            Err(err) => {
                tracing::warn!(
                    field = field.as_str(),
                    error = %err,
                    "kriging failed, using start endpoint value"
                );
                for entry in profile.iter_mut() {
                    entry.set_field(field, fallback);
                }
            }
        }
    }

    profile
}

fn interpolate_field(
    calibration: &CalibrationSet,
    variogram: GaussianVariogram,
    start_value: f64,
    end_value: f64,
    points: &[RoutePoint],
) -> Result<Vec<f64>, KrigingError> {
    let average = (start_value + end_value) / 2.0;
    let values = [start_value, end_value, average, average];
    let model = OrdinaryKriging::fit(&calibration.xs, &calibration.ys, &values, variogram)?;

    points
        .iter()
        .map(|point| model.predict(point.lon, point.lat).map(round2))
        .collect()
}
