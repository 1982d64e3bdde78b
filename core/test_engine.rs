use crate::{
	control::{JobControl, ManualClock},
	engine::{Booster, BoostingEngine, EngineError},
	options::BoosterParams,
};
use fnv::FnvHashMap;
use gbm_bridge_dataframe::{Column, DataFrame, EnumColumn, NumberColumn};
use gbm_bridge_features::{TrainingData, TrainingMatrix};
use ndarray::prelude::*;
use std::{
	path::{Path, PathBuf},
	sync::{
		atomic::{AtomicUsize, Ordering},
		Arc, Mutex,
	},
};

/**
A boosting engine for tests. Its regressors predict `n_trees * step` for every row, and its classifiers predict uniform probabilities. Every update advances the clock by `tree_millis` and every prediction by `predict_millis`. Feature scores are read back from the feature map file, and feature `i` scores `i + 1`.
*/
pub struct FakeEngine {
	pub clock: Arc<ManualClock>,
	pub tree_millis: u64,
	pub predict_millis: u64,
	pub sleep_millis: u64,
	pub step: f32,
	pub gpu_available: bool,
	pub fail_initial_train: bool,
	pub fail_rounds: Vec<usize>,
	pub cancel_after_round: Option<(usize, JobControl)>,
	pub predict_calls: Arc<AtomicUsize>,
	pub active_builds: Arc<AtomicUsize>,
	pub max_active_builds: Arc<AtomicUsize>,
	pub feature_map_path: Arc<Mutex<Option<PathBuf>>>,
}

impl FakeEngine {
	pub fn new(clock: Arc<ManualClock>) -> Self {
		Self {
			clock,
			tree_millis: 1000,
			predict_millis: 0,
			sleep_millis: 0,
			step: 1.0,
			gpu_available: false,
			fail_initial_train: false,
			fail_rounds: Vec::new(),
			cancel_after_round: None,
			predict_calls: Arc::new(AtomicUsize::new(0)),
			active_builds: Arc::new(AtomicUsize::new(0)),
			max_active_builds: Arc::new(AtomicUsize::new(0)),
			feature_map_path: Arc::new(Mutex::new(None)),
		}
	}

	pub fn predict_calls(&self) -> usize {
		self.predict_calls.load(Ordering::SeqCst)
	}

	pub fn max_active_builds(&self) -> usize {
		self.max_active_builds.load(Ordering::SeqCst)
	}

	pub fn last_feature_map_path(&self) -> Option<PathBuf> {
		self.feature_map_path.lock().unwrap().clone()
	}
}

pub struct FakeBooster {
	clock: Arc<ManualClock>,
	tree_millis: u64,
	predict_millis: u64,
	sleep_millis: u64,
	step: f32,
	fail_rounds: Vec<usize>,
	cancel_after_round: Option<(usize, JobControl)>,
	objective: String,
	n_classes: usize,
	n_trees: usize,
	predict_calls: Arc<AtomicUsize>,
	active_builds: Arc<AtomicUsize>,
	feature_map_path: Arc<Mutex<Option<PathBuf>>>,
}

impl BoostingEngine for FakeEngine {
	type Booster = FakeBooster;

	fn initial_train(
		&self,
		_data: &TrainingData,
		params: &BoosterParams,
	) -> Result<FakeBooster, EngineError> {
		if self.fail_initial_train {
			return Err(EngineError::new("the engine failed to start"));
		}
		let objective = params
			.get("objective")
			.and_then(|objective| objective.as_str())
			.unwrap_or("reg:squarederror")
			.to_owned();
		let n_classes = params
			.get("num_class")
			.and_then(|n_classes| n_classes.as_u64())
			.unwrap_or(2) as usize;
		let active = self.active_builds.fetch_add(1, Ordering::SeqCst) + 1;
		self.max_active_builds.fetch_max(active, Ordering::SeqCst);
		Ok(FakeBooster {
			clock: self.clock.clone(),
			tree_millis: self.tree_millis,
			predict_millis: self.predict_millis,
			sleep_millis: self.sleep_millis,
			step: self.step,
			fail_rounds: self.fail_rounds.clone(),
			cancel_after_round: self.cancel_after_round.clone(),
			objective,
			n_classes,
			n_trees: 0,
			predict_calls: self.predict_calls.clone(),
			active_builds: self.active_builds.clone(),
			feature_map_path: self.feature_map_path.clone(),
		})
	}

	fn gpu_available(&self, _gpu_id: usize) -> bool {
		self.gpu_available
	}
}

impl Drop for FakeBooster {
	fn drop(&mut self) {
		self.active_builds.fetch_sub(1, Ordering::SeqCst);
	}
}

impl Booster for FakeBooster {
	fn update(&mut self, _data: &TrainingData, round: usize) -> Result<(), EngineError> {
		self.clock.advance(self.tree_millis);
		if self.sleep_millis > 0 {
			std::thread::sleep(std::time::Duration::from_millis(self.sleep_millis));
		}
		if let Some((cancel_round, control)) = &self.cancel_after_round {
			if *cancel_round == round {
				control.cancel();
			}
		}
		if self.fail_rounds.contains(&round) {
			return Err(EngineError::new(format!("round {} failed", round)));
		}
		self.n_trees += 1;
		Ok(())
	}

	fn serialize(&self) -> Result<Vec<u8>, EngineError> {
		Ok(format!("fake booster with {} trees", self.n_trees).into_bytes())
	}

	fn predict(&self, matrix: &TrainingMatrix) -> Result<Array2<f32>, EngineError> {
		self.predict_calls.fetch_add(1, Ordering::SeqCst);
		self.clock.advance(self.predict_millis);
		let n_rows = matrix.rows();
		let predictions = match self.objective.as_str() {
			"binary:logistic" => Array::from_elem((n_rows, 1), 0.5),
			"multi:softprob" => {
				Array::from_elem((n_rows, self.n_classes), 1.0 / self.n_classes as f32)
			}
			_ => Array::from_elem((n_rows, 1), self.n_trees as f32 * self.step),
		};
		Ok(predictions)
	}

	fn feature_score(
		&self,
		feature_map_path: &Path,
	) -> Result<FnvHashMap<String, f32>, EngineError> {
		*self.feature_map_path.lock().unwrap() = Some(feature_map_path.to_owned());
		let feature_map = std::fs::read_to_string(feature_map_path)
			.map_err(|error| EngineError::new(error.to_string()))?;
		let mut scores = FnvHashMap::default();
		for line in feature_map.lines() {
			let mut fields = line.split_whitespace();
			let index: usize = fields
				.next()
				.and_then(|index| index.parse().ok())
				.ok_or_else(|| EngineError::new("malformed feature map"))?;
			let name = fields
				.next()
				.ok_or_else(|| EngineError::new("malformed feature map"))?;
			scores.insert(name.to_owned(), (index + 1) as f32);
		}
		Ok(scores)
	}
}

/// A frame with a number response "y" that is zero everywhere, an enum column "color", and a number column "x".
pub fn regression_frame(n_rows: usize) -> DataFrame {
	let colors: Vec<Option<&str>> = (0..n_rows)
		.map(|i| if i % 2 == 0 { Some("red") } else { Some("blue") })
		.collect();
	DataFrame::new(vec![
		Column::Enum(EnumColumn::from_values(
			"color".to_owned(),
			vec!["red".to_owned(), "blue".to_owned()],
			&colors,
		)),
		Column::Number(NumberColumn::new(
			"x".to_owned(),
			(0..n_rows).map(|i| i as f32).collect(),
		)),
		Column::Number(NumberColumn::new("y".to_owned(), vec![0.0; n_rows])),
	])
}

/// A frame with a two class enum response "label" and a number column "x".
pub fn classification_frame(n_rows: usize) -> DataFrame {
	let labels: Vec<Option<&str>> = (0..n_rows)
		.map(|i| if i % 3 == 0 { Some("yes") } else { Some("no") })
		.collect();
	DataFrame::new(vec![
		Column::Number(NumberColumn::new(
			"x".to_owned(),
			(0..n_rows).map(|i| (i % 7) as f32).collect(),
		)),
		Column::Enum(EnumColumn::from_values(
			"label".to_owned(),
			vec!["no".to_owned(), "yes".to_owned()],
			&labels,
		)),
	])
}
