/*!
This module defines the narrow interface between a model build and the boosting engine that grows the trees. The engine itself is external. A build only ever trains an initial booster, adds one tree at a time, predicts, asks for feature scores, and serializes the result.
*/

use crate::options::BoosterParams;
use fnv::FnvHashMap;
use gbm_bridge_features::{TrainingData, TrainingMatrix};
use ndarray::prelude::*;
use std::path::Path;
use thiserror::Error;

/// An opaque failure reported by the boosting engine.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("boosting engine error: {message}")]
pub struct EngineError {
	pub message: String,
}

impl EngineError {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
		}
	}
}

pub trait BoostingEngine {
	type Booster: Booster;

	/// Create a booster with zero trees for `data`.
	fn initial_train(
		&self,
		data: &TrainingData,
		params: &BoosterParams,
	) -> Result<Self::Booster, EngineError>;

	/// Return true if the engine can train on the GPU with id `gpu_id`.
	fn gpu_available(&self, gpu_id: usize) -> bool;
}

/// A `Booster` is exclusively owned by one model build.
pub trait Booster {
	/// Grow the trees of boosting round `round`.
	fn update(&mut self, data: &TrainingData, round: usize) -> Result<(), EngineError>;

	fn serialize(&self) -> Result<Vec<u8>, EngineError>;

	/// Predict every row of `matrix`. Regressors return one column. Binary classifiers return one column holding the probability of class 1, and multiclass classifiers return one column per class.
	fn predict(&self, matrix: &TrainingMatrix) -> Result<Array2<f32>, EngineError>;

	/// Compute an importance score for each feature named in the feature map file at `feature_map_path`. Features that were never used may be absent.
	fn feature_score(&self, feature_map_path: &Path)
		-> Result<FnvHashMap<String, f32>, EngineError>;
}
