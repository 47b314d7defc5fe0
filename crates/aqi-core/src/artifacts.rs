//! Exported scaler and model artifacts.
//!
//! Both are plain JSON documents produced by the training pipeline. They are
//! validated once on construction so inference never sees ragged weights.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::forecast::{FeatureScaler, SequenceModel};

/// Standardization parameters, one entry per feature column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Check dimensions and replace zero scales with 1.
    pub fn validated(mut self) -> Result<Self, ModelError> {
        if self.mean.is_empty() || self.mean.len() != self.scale.len() {
            return Err(ModelError::shape(
                format!("{} scale entries", self.mean.len()),
                format!("{} scale entries", self.scale.len()),
            ));
        }
        if self.mean.iter().chain(&self.scale).any(|v| !v.is_finite()) {
            return Err(ModelError::NonFinite("scaler parameters"));
        }
        for scale in &mut self.scale {
            if *scale == 0.0 {
                *scale = 1.0;
            }
        }
        Ok(self)
    }

    pub fn features(&self) -> usize {
        self.mean.len()
    }
}

impl FeatureScaler for StandardScaler {
    fn transform(&self, features: &DMatrix<f64>) -> Result<DMatrix<f64>, ModelError> {
        if features.ncols() != self.mean.len() {
            return Err(ModelError::shape(
                format!("{} columns", self.mean.len()),
                format!("{} columns", features.ncols()),
            ));
        }
        let mut scaled = features.clone();
        for (col, mut column) in scaled.column_iter_mut().enumerate() {
            let (mean, scale) = (self.mean[col], self.scale[col]);
            column.apply(|value| *value = (*value - mean) / scale);
        }
        if scaled.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::NonFinite("scaled features"));
        }
        Ok(scaled)
    }
}

/// Serialized linear sequence head.
///
/// `weights[h]` holds the flattened `timesteps x features` window (row-major,
/// timestep outer) for horizon step `h`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearHeadArtifact {
    pub timesteps: usize,
    pub features: usize,
    pub horizon: usize,
    pub stations: usize,
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
    pub station_bias: Vec<Vec<f64>>,
}

/// Linear readout over a flattened history window with a per-station bias.
#[derive(Debug, Clone)]
pub struct LinearSequenceHead {
    timesteps: usize,
    features: usize,
    weights: DMatrix<f64>,
    bias: DVector<f64>,
    station_bias: Vec<DVector<f64>>,
}

impl LinearSequenceHead {
    pub fn from_artifact(artifact: LinearHeadArtifact) -> Result<Self, ModelError> {
        let LinearHeadArtifact {
            timesteps,
            features,
            horizon,
            stations,
            weights,
            bias,
            station_bias,
        } = artifact;
        let inputs = timesteps * features;

        if inputs == 0 || horizon == 0 || stations == 0 {
            return Err(ModelError::Other(
                "model dimensions must be non-zero".to_string(),
            ));
        }
        if weights.len() != horizon || weights.iter().any(|row| row.len() != inputs) {
            return Err(ModelError::shape(
                format!("{horizon} weight rows of {inputs}"),
                "ragged weight matrix",
            ));
        }
        if bias.len() != horizon {
            return Err(ModelError::shape(
                format!("{horizon} bias entries"),
                format!("{}", bias.len()),
            ));
        }
        if station_bias.len() != stations || station_bias.iter().any(|row| row.len() != horizon) {
            return Err(ModelError::shape(
                format!("{stations} station bias rows of {horizon}"),
                "ragged station bias",
            ));
        }

        let flat: Vec<f64> = weights.into_iter().flatten().collect();
        let head = Self {
            timesteps,
            features,
            weights: DMatrix::from_row_slice(horizon, inputs, &flat),
            bias: DVector::from_vec(bias),
            station_bias: station_bias.into_iter().map(DVector::from_vec).collect(),
        };
        if head.weights.iter().chain(head.bias.iter()).any(|v| !v.is_finite()) {
            return Err(ModelError::NonFinite("model weights"));
        }
        Ok(head)
    }

    pub fn stations(&self) -> usize {
        self.station_bias.len()
    }
}

impl SequenceModel for LinearSequenceHead {
    fn timesteps(&self) -> usize {
        self.timesteps
    }

    fn input_width(&self) -> usize {
        self.features
    }

    fn horizon(&self) -> usize {
        self.bias.len()
    }

    fn predict(
        &self,
        sequences: &[DMatrix<f64>],
        station_indices: &[usize],
    ) -> Result<Vec<Vec<f64>>, ModelError> {
        if sequences.len() != station_indices.len() {
            return Err(ModelError::shape(
                format!("{} station indices", sequences.len()),
                format!("{}", station_indices.len()),
            ));
        }

        let mut outputs = Vec::with_capacity(sequences.len());
        for (sequence, &station) in sequences.iter().zip(station_indices) {
            if sequence.shape() != (self.timesteps, self.features) {
                return Err(ModelError::shape(
                    format!("{}x{}", self.timesteps, self.features),
                    format!("{}x{}", sequence.nrows(), sequence.ncols()),
                ));
            }
            let station_bias = self.station_bias.get(station).ok_or(ModelError::StationIndex {
                index: station,
                stations: self.station_bias.len(),
            })?;

            // nalgebra is column-major; transpose to flatten timestep-outer.
            let input = DVector::from_iterator(
                self.timesteps * self.features,
                sequence.transpose().iter().copied(),
            );
            let output = &self.weights * input + &self.bias + station_bias;
            outputs.push(output.iter().copied().collect());
        }
        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn head(stations: usize) -> LinearHeadArtifact {
        LinearHeadArtifact {
            timesteps: 2,
            features: 2,
            horizon: 2,
            stations,
            // step 0 reads the last timestep's first feature, step 1 sums everything
            weights: vec![vec![0.0, 0.0, 1.0, 0.0], vec![1.0, 1.0, 1.0, 1.0]],
            bias: vec![1.0, 0.0],
            station_bias: (0..stations).map(|s| vec![s as f64 * 10.0, 0.0]).collect(),
        }
    }

    #[test]
    fn scaler_standardizes_columns() {
        let scaler = StandardScaler { mean: vec![10.0, 0.0], scale: vec![2.0, 0.0] }
            .validated()
            .unwrap();
        let input = DMatrix::from_row_slice(2, 2, &[12.0, 5.0, 8.0, -1.0]);

        let out = scaler.transform(&input).unwrap();

        assert_eq!(out, DMatrix::from_row_slice(2, 2, &[1.0, 5.0, -1.0, -1.0]));
    }

    #[test]
    fn scaler_rejects_wrong_width() {
        let scaler = StandardScaler { mean: vec![0.0; 3], scale: vec![1.0; 3] };
        let err = scaler.transform(&DMatrix::zeros(4, 2)).unwrap_err();
        assert!(matches!(err, ModelError::Shape { .. }));
    }

    #[test]
    fn scaler_rejects_mismatched_parameters() {
        let scaler = StandardScaler { mean: vec![0.0; 3], scale: vec![1.0; 2] };
        assert!(scaler.validated().is_err());
    }

    #[test]
    fn linear_head_reads_timestep_major_window() {
        let model = LinearSequenceHead::from_artifact(head(3)).unwrap();
        let window = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);

        let out = model
            .predict(&[window.clone(), window], &[0, 2])
            .unwrap();

        assert_eq!(out, vec![vec![4.0, 10.0], vec![24.0, 10.0]]);
        assert_eq!(model.horizon(), 2);
        assert_eq!(model.stations(), 3);
    }

    #[test]
    fn linear_head_rejects_unknown_station() {
        let model = LinearSequenceHead::from_artifact(head(1)).unwrap();
        let err = model.predict(&[DMatrix::zeros(2, 2)], &[1]).unwrap_err();
        assert_eq!(err, ModelError::StationIndex { index: 1, stations: 1 });
    }

    #[test]
    fn ragged_artifact_is_rejected() {
        let mut artifact = head(2);
        artifact.weights[1].pop();
        assert!(LinearSequenceHead::from_artifact(artifact).is_err());

        let mut artifact = head(2);
        artifact.station_bias.pop();
        assert!(LinearSequenceHead::from_artifact(artifact).is_err());
    }

    #[test]
    fn artifact_parses_from_json() {
        let json = r#"{
            "timesteps": 1, "features": 1, "horizon": 1, "stations": 1,
            "weights": [[2.0]], "bias": [0.5], "station_bias": [[0.0]]
        }"#;
        let artifact: LinearHeadArtifact = serde_json::from_str(json).unwrap();
        let model = LinearSequenceHead::from_artifact(artifact).unwrap();
        let out = model.predict(&[DMatrix::from_element(1, 1, 3.0)], &[0]).unwrap();
        assert_eq!(out, vec![vec![6.5]]);
    }
}
